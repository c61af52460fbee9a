use thiserror::Error;

/// Structural failure while extracting a record from one workbook.
///
/// Value-level problems (a numeric cell holding text, a blank metadata value)
/// never produce a `ParseError`; they leave the affected field unset.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The bytes could not be opened as an xlsx workbook.
    #[error("not a valid workbook: {0}")]
    InvalidWorkbook(#[from] calamine::XlsxError),

    #[error("required sheet '{sheet}' not found in workbook")]
    MissingSheet { sheet: String },

    #[error("required column '{column}' not found in header row {row} of sheet '{sheet}'")]
    MissingColumn {
        sheet: String,
        column: &'static str,
        /// 1-based row number, as shown in a spreadsheet application
        row: u32,
    },

    #[error("unsupported file type '{0}', expected an .xlsx workbook")]
    UnsupportedFormat(String),

    #[error("could not read workbook file: {0}")]
    Io(#[from] std::io::Error),
}

/// A file that was rejected while loading an upload set.
#[derive(Debug)]
pub struct FileFailure {
    pub name: String,
    pub error: ParseError,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "error reading {}: {}", self.name, self.error)
    }
}

/// Failure of a whole load pass.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Nothing could be extracted: every upload failed and no usable
    /// fallback dataset was configured.
    #[error("no emissions data available ({} file(s) rejected)", failures.len())]
    NoData { failures: Vec<FileFailure> },
}
