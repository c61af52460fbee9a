//! Declarative description of the inventory workbook template.
//!
//! Everything position- or wording-dependent about the workbook lives here:
//! sheet names, row offsets, metadata label needles and the header patterns
//! of the detail sheet. The extractor reads any workbook through a
//! [`TemplateSchema`], so a template revision only touches this module.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
    static ref SCOPE_HEADER: Regex = Regex::new(r"^(alcance|scope)$").unwrap();
    static ref CATEGORY_HEADER: Regex = Regex::new(r"^(categor[íi]a|category)$").unwrap();
    static ref SOURCE_HEADER: Regex =
        Regex::new(r"^(fuente( de emisi[óo]n)?|(emission )?source)$").unwrap();
    static ref ACTIVITY_VALUE_HEADER: Regex =
        Regex::new(r"^(dato de actividad( \(da\))?|activity data( \(ad\))?)$").unwrap();
    static ref ACTIVITY_UNIT_HEADER: Regex =
        Regex::new(r"^(unidad( da)?|(activity )?unit)$").unwrap();
    static ref EMISSIONS_HEADER: Regex =
        Regex::new(r"^(emisi[óo]n(es)?|emissions?) ?(co2e ?\[t\]|\(?tco2e\)?|co2e \(t\))$").unwrap();
    static ref PERCENT_HEADER: Regex = Regex::new(r"^% ?(del|of) total$").unwrap();
    static ref CO2_KG_HEADER: Regex = Regex::new(r"^emisi[óo]n co2 ?\[kg\]$").unwrap();
    static ref CH4_KG_HEADER: Regex = Regex::new(r"^emisi[óo]n ch4 ?\[kg\]$").unwrap();
    static ref N2O_KG_HEADER: Regex = Regex::new(r"^emisi[óo]n n2o ?\[kg\]$").unwrap();
}

/// Collapse whitespace (embedded line breaks included), trim and lower-case a
/// raw header so that `"Emisión CO2e\n[t]"` and `"emisión co2e [t]"` compare equal.
pub fn normalize_header(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw.trim(), " ").to_lowercase()
}

/// Columns of the detail sheet, located by header pattern rather than position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DetailColumn {
    Scope,
    Category,
    Source,
    ActivityValue,
    ActivityUnit,
    Emissions,
    PercentOfTotal,
    Co2Kg,
    Ch4Kg,
    N2oKg,
}

pub const DETAIL_COLUMNS: [DetailColumn; 10] = [
    DetailColumn::Scope,
    DetailColumn::Category,
    DetailColumn::Source,
    DetailColumn::ActivityValue,
    DetailColumn::ActivityUnit,
    DetailColumn::Emissions,
    DetailColumn::PercentOfTotal,
    DetailColumn::Co2Kg,
    DetailColumn::Ch4Kg,
    DetailColumn::N2oKg,
];

/// Columns of the detail table as shown and exported, in order.
pub const EXPORT_COLUMNS: [DetailColumn; 7] = [
    DetailColumn::Scope,
    DetailColumn::Category,
    DetailColumn::Source,
    DetailColumn::ActivityValue,
    DetailColumn::ActivityUnit,
    DetailColumn::Emissions,
    DetailColumn::PercentOfTotal,
];

impl DetailColumn {
    /// Name used in the detail table and in exports.
    pub fn canonical_name(self) -> &'static str {
        match self {
            DetailColumn::Scope => "Alcance",
            DetailColumn::Category => "Categoría",
            DetailColumn::Source => "Fuente de Emisión",
            DetailColumn::ActivityValue => "Dato de Actividad (DA)",
            DetailColumn::ActivityUnit => "Unidad DA",
            DetailColumn::Emissions => "Emisiones (tCO2e)",
            DetailColumn::PercentOfTotal => "% del total",
            DetailColumn::Co2Kg => "Emisión CO2 [kg]",
            DetailColumn::Ch4Kg => "Emisión CH4 [kg]",
            DetailColumn::N2oKg => "Emisión N2O [kg]",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            DetailColumn::Scope => &SCOPE_HEADER,
            DetailColumn::Category => &CATEGORY_HEADER,
            DetailColumn::Source => &SOURCE_HEADER,
            DetailColumn::ActivityValue => &ACTIVITY_VALUE_HEADER,
            DetailColumn::ActivityUnit => &ACTIVITY_UNIT_HEADER,
            DetailColumn::Emissions => &EMISSIONS_HEADER,
            DetailColumn::PercentOfTotal => &PERCENT_HEADER,
            DetailColumn::Co2Kg => &CO2_KG_HEADER,
            DetailColumn::Ch4Kg => &CH4_KG_HEADER,
            DetailColumn::N2oKg => &N2O_KG_HEADER,
        }
    }

    /// Whether a raw header cell names this column.
    pub fn matches_header(self, raw: &str) -> bool {
        self.pattern().is_match(&normalize_header(raw))
    }

    /// The column a raw header names, if it is one the template knows.
    pub fn from_header(raw: &str) -> Option<DetailColumn> {
        let normalized = normalize_header(raw);
        DETAIL_COLUMNS
            .into_iter()
            .find(|column| column.pattern().is_match(&normalized))
    }
}

/// Fields read from the label/value pairs of the metadata sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetadataField {
    Year,
    Employees,
    FloorArea,
}

/// A metadata field and the lower-case substrings that identify its label.
#[derive(Clone, Debug)]
pub struct LabelRule {
    pub field: MetadataField,
    pub needles: Vec<String>,
}

impl LabelRule {
    pub fn new(field: MetadataField, needles: &[&str]) -> Self {
        LabelRule {
            field,
            needles: needles.iter().map(|n| n.to_lowercase()).collect(),
        }
    }
}

/// Summary sheet: per-category totals in three fixed columns.
#[derive(Clone, Debug)]
pub struct SummarySchema {
    pub sheet: String,
    /// First data row (0-based); the template's header sits just above it
    pub first_data_row: u32,
    pub category_col: u32,
    pub emission_col: u32,
    pub percent_col: u32,
    /// Case-insensitive token marking the trailing total row
    pub total_token: String,
}

/// Metadata sheet: free-form label/value pairs scanned over a capped row range.
#[derive(Clone, Debug)]
pub struct MetadataSchema {
    pub sheet: String,
    pub first_row: u32,
    pub max_rows: u32,
    pub label_col: u32,
    pub value_col: u32,
    pub rules: Vec<LabelRule>,
}

impl MetadataSchema {
    /// Every field whose needles occur in `label`.
    pub fn fields_for<'a>(&'a self, label: &str) -> impl Iterator<Item = MetadataField> + 'a {
        let label = label.trim().to_lowercase();
        self.rules
            .iter()
            .filter(move |rule| rule.needles.iter().any(|n| label.contains(n.as_str())))
            .map(|rule| rule.field)
    }
}

/// Detail sheet: one row per emission source under a header row.
#[derive(Clone, Debug)]
pub struct DetailSchema {
    pub sheet: String,
    pub header_row: u32,
    pub required: Vec<DetailColumn>,
}

impl DetailSchema {
    pub fn is_required(&self, column: DetailColumn) -> bool {
        self.required.contains(&column)
    }
}

/// The whole workbook template.
#[derive(Clone, Debug)]
pub struct TemplateSchema {
    pub summary: SummarySchema,
    pub metadata: MetadataSchema,
    pub detail: DetailSchema,
}

impl Default for TemplateSchema {
    /// The HuellaChile organizational footprint calculator layout.
    fn default() -> Self {
        TemplateSchema {
            summary: SummarySchema {
                sheet: "Resumen Cálculo".to_string(),
                first_data_row: 3,
                category_col: 0,
                emission_col: 1,
                percent_col: 2,
                total_token: "total".to_string(),
            },
            metadata: MetadataSchema {
                sheet: "Alcances".to_string(),
                first_row: 1,
                max_rows: 30,
                label_col: 0,
                value_col: 1,
                rules: vec![
                    LabelRule::new(MetadataField::Year, &["año inventario", "year of inventory"]),
                    LabelRule::new(MetadataField::Employees, &["trabajadores", "workers"]),
                    LabelRule::new(MetadataField::FloorArea, &["superficie", "area"]),
                ],
            },
            detail: DetailSchema {
                sheet: "Resumen Emisiones".to_string(),
                header_row: 1,
                required: vec![
                    DetailColumn::Scope,
                    DetailColumn::Category,
                    DetailColumn::Source,
                    DetailColumn::Emissions,
                ],
            },
        }
    }
}
