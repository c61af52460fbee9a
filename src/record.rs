use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Inventory year as written in the metadata sheet: a number when the cell
/// holds one, otherwise the raw label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum InventoryYear {
    Year(i32),
    Label(String),
}

impl fmt::Display for InventoryYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InventoryYear::Year(y) => write!(f, "{}", y),
            InventoryYear::Label(s) => f.write_str(s),
        }
    }
}

// Numeric years sort before free-text labels.
impl Ord for InventoryYear {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (InventoryYear::Year(a), InventoryYear::Year(b)) => a.cmp(b),
            (InventoryYear::Year(_), InventoryYear::Label(_)) => Ordering::Less,
            (InventoryYear::Label(_), InventoryYear::Year(_)) => Ordering::Greater,
            (InventoryYear::Label(a), InventoryYear::Label(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for InventoryYear {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering used for year-over-year views; records without a year go last.
pub fn year_order(a: &Option<InventoryYear>, b: &Option<InventoryYear>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Where `total_emissions_tco2e` came from. Exactly one basis applies to a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TotalBasis {
    /// Trailing summary row whose label contains "total"
    Declared,
    /// Sum of the category breakdown
    Summed,
}

/// One row of the summary sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub emissions_tco2e: f64,
    pub percent_of_total: Option<f64>,
}

/// Per-gas masses in kilograms, present only when the template has the columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GasMasses {
    pub co2_kg: Option<f64>,
    pub ch4_kg: Option<f64>,
    pub n2o_kg: Option<f64>,
}

/// One emission source from the detail sheet.
///
/// `emissions_tco2e` is `None` when the cell was blank or not numeric; the row
/// stays in the table but is ignored by every aggregation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetailRow {
    pub scope: String,
    pub category: String,
    pub source: String,
    pub activity_value: Option<f64>,
    pub activity_unit: String,
    pub emissions_tco2e: Option<f64>,
    pub percent_of_total: Option<f64>,
    pub gases: GasMasses,
    pub year: Option<InventoryYear>,
}

/// Normalized contents of one inventory workbook.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EmissionsRecord {
    /// File name the record was read from
    pub source_name: String,
    pub year: Option<InventoryYear>,
    pub total_emissions_tco2e: f64,
    pub total_basis: TotalBasis,
    pub employee_count: Option<f64>,
    pub floor_area_m2: Option<f64>,
    pub category_breakdown: Vec<CategoryRow>,
    pub source_detail: Vec<DetailRow>,
}

impl EmissionsRecord {
    /// Year formatted for titles and file names.
    pub fn year_label(&self) -> String {
        match &self.year {
            Some(year) => year.to_string(),
            None => "unknown".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_years_sort_before_labels_and_missing_last() {
        let mut years = vec![
            None,
            Some(InventoryYear::Label("2022-bis".into())),
            Some(InventoryYear::Year(2024)),
            Some(InventoryYear::Year(2023)),
        ];
        years.sort_by(year_order);
        assert_eq!(
            years,
            vec![
                Some(InventoryYear::Year(2023)),
                Some(InventoryYear::Year(2024)),
                Some(InventoryYear::Label("2022-bis".into())),
                None,
            ]
        );
    }

    #[test]
    fn year_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            InventoryYear::Year(2024),
            InventoryYear::Label("FY24".into()),
        ])
        .unwrap();
        assert_eq!(json, r#"[2024,"FY24"]"#);
    }
}
