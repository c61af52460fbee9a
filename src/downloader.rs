use crate::record::DetailRow;
use crate::schema::{DetailColumn, EXPORT_COLUMNS};
use std::error::Error;

/// Cell of the export table. Unset values stay empty.
enum ExportValue<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

fn export_value(row: &DetailRow, column: DetailColumn) -> ExportValue<'_> {
    match column {
        DetailColumn::Scope => ExportValue::Text(&row.scope),
        DetailColumn::Category => ExportValue::Text(&row.category),
        DetailColumn::Source => ExportValue::Text(&row.source),
        DetailColumn::ActivityValue => ExportValue::Number(row.activity_value),
        DetailColumn::ActivityUnit => ExportValue::Text(&row.activity_unit),
        DetailColumn::Emissions => ExportValue::Number(row.emissions_tco2e),
        DetailColumn::PercentOfTotal => ExportValue::Number(row.percent_of_total),
        DetailColumn::Co2Kg => ExportValue::Number(row.gases.co2_kg),
        DetailColumn::Ch4Kg => ExportValue::Number(row.gases.ch4_kg),
        DetailColumn::N2oKg => ExportValue::Number(row.gases.n2o_kg),
    }
}

// Quote a field when it holds a separator, quote or line break
fn push_csv_field(out: &mut String, value: &str) {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        out.push('"');
        out.push_str(&value.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(value);
    }
}

/// Convert detail rows to CSV
///
/// Writes a header row with the canonical column names followed by one line
/// per row. Special characters (commas, quotes, newlines) are escaped and
/// unset numeric values are written as empty fields.
///
/// # Examples
/// ```
/// use ghg_dashboard::DetailRow;
/// use ghg_dashboard::downloader::to_csv;
///
/// let rows: Vec<DetailRow> = Vec::new();
/// let csv = to_csv(&rows);
/// assert!(csv.starts_with("Alcance,Categoría,Fuente de Emisión"));
/// ```
pub fn to_csv<'a, I>(rows: I) -> String
where
    I: IntoIterator<Item = &'a DetailRow>,
{
    let mut csv_content = String::new();

    for (i, column) in EXPORT_COLUMNS.iter().enumerate() {
        if i > 0 {
            csv_content.push(',');
        }
        push_csv_field(&mut csv_content, column.canonical_name());
    }
    csv_content.push('\n');

    for row in rows {
        for (i, column) in EXPORT_COLUMNS.iter().enumerate() {
            if i > 0 {
                csv_content.push(',');
            }
            match export_value(row, *column) {
                ExportValue::Text(text) => push_csv_field(&mut csv_content, text),
                ExportValue::Number(Some(value)) => csv_content.push_str(&value.to_string()),
                ExportValue::Number(None) => {}
            }
        }
        csv_content.push('\n');
    }

    csv_content
}

/// Convert detail rows to XLSX format
///
/// Uses rust_xlsxwriter to produce a single worksheet holding the same table
/// as [`to_csv`].
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx<'a, I>(rows: I) -> Result<Vec<u8>, Box<dyn Error>>
where
    I: IntoIterator<Item = &'a DetailRow>,
{
    use rust_xlsxwriter::{Format, Workbook};

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Emisiones")?;

    let bold = Format::new().set_bold();
    for (c, column) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, column.canonical_name(), &bold)?;
    }

    for (r, row) in rows.into_iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, column) in EXPORT_COLUMNS.iter().enumerate() {
            match export_value(row, *column) {
                ExportValue::Text(text) => {
                    worksheet.write_string(r, c as u16, text)?;
                }
                ExportValue::Number(Some(value)) => {
                    worksheet.write_number(r, c as u16, value)?;
                }
                ExportValue::Number(None) => {}
            }
        }
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

/// Write the CSV export to a file.
pub fn save_csv<'a, I>(rows: I, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn Error>>
where
    I: IntoIterator<Item = &'a DetailRow>,
{
    std::fs::write(path, to_csv(rows))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::GasMasses;

    fn row(source: &str, emissions: Option<f64>) -> DetailRow {
        DetailRow {
            scope: "Alcance 1".to_string(),
            category: "1.2 - Combustión móvil".to_string(),
            source: source.to_string(),
            activity_value: Some(1200.0),
            activity_unit: "L".to_string(),
            emissions_tco2e: emissions,
            percent_of_total: Some(0.25),
            gases: GasMasses::default(),
            year: None,
        }
    }

    #[test]
    fn csv_has_canonical_header_and_escapes_fields() {
        let rows = vec![row("Diésel, flota \"A\"", Some(3.5)), row("Bencina", None)];
        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Alcance,Categoría,Fuente de Emisión,Dato de Actividad (DA),Unidad DA,Emisiones (tCO2e),% del total"
        );
        assert_eq!(
            lines[1],
            "Alcance 1,1.2 - Combustión móvil,\"Diésel, flota \"\"A\"\"\",1200,L,3.5,0.25"
        );
        assert_eq!(lines[2], "Alcance 1,1.2 - Combustión móvil,Bencina,1200,L,,0.25");
        assert_eq!(lines.len(), 3);
    }
}
