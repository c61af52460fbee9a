use crate::error::{FileFailure, LoadError, ParseError};
use crate::extractor::extract_workbook;
use crate::record::{EmissionsRecord, year_order};
use crate::schema::TemplateSchema;
use calamine::{Reader, Xlsx};
use log::{info, warn};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// An uploaded workbook: its original file name and raw bytes.
#[derive(Clone, Debug)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Extract an emissions record from workbook bytes
///
/// # Arguments
/// * `name` - File name used in messages and stored on the record
/// * `bytes` - Raw xlsx content
/// * `schema` - Workbook template to read with
///
/// # Returns
/// * `Result<EmissionsRecord, ParseError>` - The record, or the structural failure
pub fn from_bytes(
    name: &str,
    bytes: &[u8],
    schema: &TemplateSchema,
) -> Result<EmissionsRecord, ParseError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    extract_workbook(&mut workbook, name, schema)
}

/// Load an emissions record from an Excel file
///
/// Only `.xlsx` workbooks are accepted; the extension is checked before the
/// file is read.
///
/// # Examples
/// ```no_run
/// use ghg_dashboard::loader::from_excel;
/// use ghg_dashboard::schema::TemplateSchema;
///
/// match from_excel("Calculadora_Memoria_Huella.xlsx", &TemplateSchema::default()) {
///     Ok(record) => println!("Total: {:.2} tCO2e", record.total_emissions_tco2e),
///     Err(e) => eprintln!("Error loading workbook: {}", e),
/// }
/// ```
pub fn from_excel(
    filepath: impl AsRef<Path>,
    schema: &TemplateSchema,
) -> Result<EmissionsRecord, ParseError> {
    let path = filepath.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("xlsx") => {
            let bytes = std::fs::read(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            from_bytes(&name, &bytes, schema)
        }
        Some(ext) => Err(ParseError::UnsupportedFormat(ext.to_string())),
        None => Err(ParseError::UnsupportedFormat(String::new())),
    }
}

/// Records produced by one load pass.
#[derive(Debug)]
pub struct RecordSet {
    /// Successfully extracted records, year ascending
    pub records: Vec<EmissionsRecord>,
    /// Files that were rejected; they are excluded from `records`
    pub failures: Vec<FileFailure>,
    /// True when the records come from the configured example dataset
    pub used_fallback: bool,
}

impl RecordSet {
    /// The most recent inventory (last in year order).
    pub fn latest(&self) -> Option<&EmissionsRecord> {
        self.records.last()
    }
}

/// Extract every upload, or the fallback dataset when nothing was uploaded
///
/// A structural failure in one file is logged and recorded, and the remaining
/// files are still processed. If no record can be produced at all the pass
/// ends with [`LoadError::NoData`].
///
/// # Arguments
/// * `uploads` - Workbooks submitted by the user, in upload order
/// * `fallback` - Example dataset injected by configuration, used only when `uploads` is empty
/// * `schema` - Workbook template
pub fn load_records(
    uploads: &[Upload],
    fallback: Option<&Path>,
    schema: &TemplateSchema,
) -> Result<RecordSet, LoadError> {
    load_each(uploads, fallback, schema, |upload| {
        (upload.name.clone(), from_bytes(&upload.name, &upload.bytes, schema))
    })
}

/// Same as [`load_records`] for workbooks on disk
///
/// Each path goes through [`from_excel`], so an unreadable file or a wrong
/// extension only rejects that file.
pub fn load_paths(
    paths: &[PathBuf],
    fallback: Option<&Path>,
    schema: &TemplateSchema,
) -> Result<RecordSet, LoadError> {
    load_each(paths, fallback, schema, |path| {
        (path.display().to_string(), from_excel(path, schema))
    })
}

fn load_each<T, F>(
    items: &[T],
    fallback: Option<&Path>,
    schema: &TemplateSchema,
    extract: F,
) -> Result<RecordSet, LoadError>
where
    F: Fn(&T) -> (String, Result<EmissionsRecord, ParseError>),
{
    let mut records = Vec::new();
    let mut failures = Vec::new();
    let mut used_fallback = false;

    if !items.is_empty() {
        for item in items {
            match extract(item) {
                (_, Ok(record)) => records.push(record),
                (name, Err(error)) => {
                    warn!("Error reading {}: {}", name, error);
                    failures.push(FileFailure { name, error });
                }
            }
        }
    } else if let Some(path) = fallback {
        match from_excel(path, schema) {
            Ok(record) => {
                info!("No uploads, using example dataset {}", path.display());
                used_fallback = true;
                records.push(record);
            }
            Err(error) => {
                warn!("Could not load example dataset {}: {}", path.display(), error);
                failures.push(FileFailure {
                    name: path.display().to_string(),
                    error,
                });
            }
        }
    }

    if records.is_empty() {
        return Err(LoadError::NoData { failures });
    }

    // Stable: records sharing a year keep upload order
    records.sort_by(|a, b| year_order(&a.year, &b.year));
    info!(
        "Loaded {} record(s), rejected {} file(s)",
        records.len(),
        failures.len()
    );

    Ok(RecordSet {
        records,
        failures,
        used_fallback,
    })
}
