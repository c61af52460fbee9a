//! Workbook → [`EmissionsRecord`] extraction.
//!
//! Structural problems (missing sheet, missing required column) abort with a
//! [`ParseError`]. Value problems degrade the affected field to `None`.

use crate::cell::{cell_at, cell_number, cell_text, excel_serial_to_date, is_blank, iso_date_prefix, last_row};
use crate::error::ParseError;
use crate::record::{CategoryRow, DetailRow, EmissionsRecord, GasMasses, InventoryYear, TotalBasis};
use crate::schema::{DetailColumn, DetailSchema, MetadataField, MetadataSchema, SummarySchema, TemplateSchema};
use calamine::{Data, Range, Reader, Xlsx};
use chrono::Datelike;
use log::debug;
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Read-only view of one worksheet addressed in absolute sheet coordinates.
///
/// This is the single reader shared by the three sheet parsers; they differ
/// only in the schema they hand it.
pub struct SheetView<'a> {
    pub name: &'a str,
    range: &'a Range<Data>,
}

impl<'a> SheetView<'a> {
    pub fn new(name: &'a str, range: &'a Range<Data>) -> Self {
        SheetView { name, range }
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&'a Data> {
        cell_at(self.range, row, col)
    }

    pub fn text(&self, row: u32, col: u32) -> String {
        cell_text(self.cell(row, col))
    }

    pub fn number(&self, row: u32, col: u32) -> Option<f64> {
        cell_number(self.cell(row, col))
    }

    /// Rows from `first` up to `first + limit` (exclusive), stopping at the
    /// last used row of the sheet.
    pub fn rows(&self, first: u32, limit: Option<u32>) -> std::ops::Range<u32> {
        let end = match last_row(self.range) {
            Some(last) => last.saturating_add(1),
            None => return first..first,
        };
        let end = match limit {
            Some(limit) => end.min(first.saturating_add(limit)),
            None => end,
        };
        first..end.max(first)
    }

    /// Used columns of the sheet.
    pub fn columns(&self) -> std::ops::Range<u32> {
        match (self.range.start(), self.range.end()) {
            (Some((_, first)), Some((_, last))) => first..last + 1,
            _ => 0..0,
        }
    }
}

/// Parsed summary sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub rows: Vec<CategoryRow>,
    pub total_tco2e: f64,
    pub basis: TotalBasis,
}

/// Parse (category, emission, percent) triples.
///
/// Rows with a blank label or a non-numeric emission are skipped. A final row
/// whose label contains the total token becomes the declared total and is
/// removed from the breakdown; otherwise the total is the breakdown sum.
pub fn parse_summary(sheet: &SheetView<'_>, schema: &SummarySchema) -> Summary {
    let mut rows = Vec::new();

    for row in sheet.rows(schema.first_data_row, None) {
        let category = sheet.text(row, schema.category_col);
        if category.is_empty() {
            continue;
        }
        let Some(emissions_tco2e) = sheet.number(row, schema.emission_col) else {
            debug!(
                "{}: row {} ('{}') has no numeric emission, skipped",
                sheet.name,
                row + 1,
                category
            );
            continue;
        };
        rows.push(CategoryRow {
            category,
            emissions_tco2e,
            percent_of_total: sheet.number(row, schema.percent_col),
        });
    }

    let token = schema.total_token.to_lowercase();
    let declared_total = match rows.last() {
        Some(last) if last.category.to_lowercase().contains(&token) => Some(last.emissions_tco2e),
        _ => None,
    };

    match declared_total {
        Some(total_tco2e) => {
            rows.pop();
            Summary {
                rows,
                total_tco2e,
                basis: TotalBasis::Declared,
            }
        }
        None => {
            let total_tco2e = rows.iter().map(|r| r.emissions_tco2e).sum();
            Summary {
                rows,
                total_tco2e,
                basis: TotalBasis::Summed,
            }
        }
    }
}

/// Parsed metadata sheet. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub year: Option<InventoryYear>,
    pub employee_count: Option<f64>,
    pub floor_area_m2: Option<f64>,
}

/// Scan label/value pairs. Later matches overwrite earlier ones, including
/// with `None` when the later value does not coerce.
pub fn parse_metadata(sheet: &SheetView<'_>, schema: &MetadataSchema) -> Metadata {
    let mut metadata = Metadata::default();

    for row in sheet.rows(schema.first_row, Some(schema.max_rows)) {
        let label = sheet.text(row, schema.label_col);
        if label.is_empty() {
            continue;
        }
        let value = sheet.cell(row, schema.value_col);
        for field in schema.fields_for(&label) {
            match field {
                MetadataField::Year => metadata.year = coerce_year(value),
                MetadataField::Employees => metadata.employee_count = positive_number(value),
                MetadataField::FloorArea => metadata.floor_area_m2 = positive_number(value),
            }
        }
    }

    metadata
}

fn positive_number(cell: Option<&Data>) -> Option<f64> {
    cell_number(cell).filter(|v| *v > 0.0)
}

/// Year from a metadata cell: numbers are truncated to an integer, dates give
/// their calendar year, other text is kept verbatim.
pub fn coerce_year(cell: Option<&Data>) -> Option<InventoryYear> {
    match cell? {
        Data::Empty | Data::Error(_) => None,
        Data::Int(i) => Some(match i32::try_from(*i) {
            Ok(year) => InventoryYear::Year(year),
            Err(_) => InventoryYear::Label(i.to_string()),
        }),
        Data::Float(f) if f.is_finite() => Some(InventoryYear::Year(f.trunc() as i32)),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64()).map(|d| InventoryYear::Year(d.year())),
        Data::DateTimeIso(s) => Some(match iso_date_prefix(s) {
            Some(date) => InventoryYear::Year(date.year()),
            None => InventoryYear::Label(s.trim().to_string()),
        }),
        other => {
            let text = cell_text(Some(other));
            if text.is_empty() {
                return None;
            }
            Some(match text.parse::<f64>() {
                Ok(v) if v.is_finite() => InventoryYear::Year(v.trunc() as i32),
                _ => InventoryYear::Label(text),
            })
        }
    }
}

/// Location of each recognised column in the detail sheet's header row.
#[derive(Debug, Default, Clone)]
pub struct HeaderMap {
    columns: HashMap<DetailColumn, u32>,
}

impl HeaderMap {
    /// Match every header cell against the known column patterns. The first
    /// cell naming a column wins. Fails if a required column is absent.
    pub fn locate(sheet: &SheetView<'_>, schema: &DetailSchema) -> Result<Self, ParseError> {
        let mut columns = HashMap::new();
        for col in sheet.columns() {
            let raw = sheet.text(schema.header_row, col);
            if raw.is_empty() {
                continue;
            }
            if let Some(column) = DetailColumn::from_header(&raw) {
                columns.entry(column).or_insert(col);
            }
        }

        if let Some(missing) = schema.required.iter().find(|c| !columns.contains_key(*c)) {
            return Err(ParseError::MissingColumn {
                sheet: sheet.name.to_string(),
                column: missing.canonical_name(),
                row: schema.header_row + 1,
            });
        }

        Ok(HeaderMap { columns })
    }

    pub fn get(&self, column: DetailColumn) -> Option<u32> {
        self.columns.get(&column).copied()
    }
}

/// Parse per-source rows under the header. Blank rows are skipped; every
/// other row is kept, with non-numeric values left unset.
pub fn parse_detail(
    sheet: &SheetView<'_>,
    schema: &DetailSchema,
    year: Option<&InventoryYear>,
) -> Result<Vec<DetailRow>, ParseError> {
    let header = HeaderMap::locate(sheet, schema)?;
    let mapped: Vec<u32> = header.columns.values().copied().collect();

    let text = |row: u32, column: DetailColumn| {
        header.get(column).map(|col| sheet.text(row, col)).unwrap_or_default()
    };
    let number = |row: u32, column: DetailColumn| header.get(column).and_then(|col| sheet.number(row, col));

    let mut rows = Vec::new();
    for row in sheet.rows(schema.header_row + 1, None) {
        if mapped.iter().all(|col| is_blank(sheet.cell(row, *col))) {
            continue;
        }

        let emissions_tco2e = number(row, DetailColumn::Emissions);
        if emissions_tco2e.is_none() {
            debug!(
                "{}: row {} has no numeric emission, kept without value",
                sheet.name,
                row + 1
            );
        }

        rows.push(DetailRow {
            scope: text(row, DetailColumn::Scope),
            category: text(row, DetailColumn::Category),
            source: text(row, DetailColumn::Source),
            activity_value: number(row, DetailColumn::ActivityValue),
            activity_unit: text(row, DetailColumn::ActivityUnit),
            emissions_tco2e,
            percent_of_total: number(row, DetailColumn::PercentOfTotal),
            gases: GasMasses {
                co2_kg: number(row, DetailColumn::Co2Kg),
                ch4_kg: number(row, DetailColumn::Ch4Kg),
                n2o_kg: number(row, DetailColumn::N2oKg),
            },
            year: year.cloned(),
        });
    }

    Ok(rows)
}

fn sheet_range<RS: Read + Seek>(workbook: &mut Xlsx<RS>, name: &str) -> Result<Range<Data>, ParseError> {
    if !workbook.sheet_names().iter().any(|s| s == name) {
        return Err(ParseError::MissingSheet {
            sheet: name.to_string(),
        });
    }
    Ok(workbook.worksheet_range(name)?)
}

/// Extract a full record from an opened workbook.
pub fn extract_workbook<RS: Read + Seek>(
    workbook: &mut Xlsx<RS>,
    source_name: &str,
    schema: &TemplateSchema,
) -> Result<EmissionsRecord, ParseError> {
    // Resolve every sheet before parsing so a missing one fails fast
    let summary_range = sheet_range(workbook, &schema.summary.sheet)?;
    let metadata_range = sheet_range(workbook, &schema.metadata.sheet)?;
    let detail_range = sheet_range(workbook, &schema.detail.sheet)?;

    let summary = parse_summary(&SheetView::new(&schema.summary.sheet, &summary_range), &schema.summary);
    let metadata = parse_metadata(&SheetView::new(&schema.metadata.sheet, &metadata_range), &schema.metadata);
    let source_detail = parse_detail(
        &SheetView::new(&schema.detail.sheet, &detail_range),
        &schema.detail,
        metadata.year.as_ref(),
    )?;

    debug!(
        "{}: {} categories, {} detail rows, total {:.2} tCO2e ({:?})",
        source_name,
        summary.rows.len(),
        source_detail.len(),
        summary.total_tco2e,
        summary.basis
    );

    Ok(EmissionsRecord {
        source_name: source_name.to_string(),
        year: metadata.year,
        total_emissions_tco2e: summary.total_tco2e,
        total_basis: summary.basis,
        employee_count: metadata.employee_count,
        floor_area_m2: metadata.floor_area_m2,
        category_breakdown: summary.rows,
        source_detail,
    })
}
