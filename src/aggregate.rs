use crate::record::{CategoryRow, DetailRow, EmissionsRecord, InventoryYear, year_order};
use crate::scope::{ALL_SCOPES, Scope, is_scope_heading};
use serde::Serialize;
use std::collections::HashMap;

/// Emissions of one scope bucket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScopeTotal {
    pub scope: Scope,
    pub label: String,
    pub emissions_tco2e: f64,
}

/// Sum the breakdown rows whose label starts with each scope prefix.
///
/// Categories outside the three scopes are not counted anywhere, so the three
/// totals need not add up to the record total.
pub fn scope_totals(rows: &[CategoryRow]) -> Vec<ScopeTotal> {
    ALL_SCOPES
        .into_iter()
        .map(|scope| ScopeTotal {
            scope,
            label: scope.to_string(),
            emissions_tco2e: rows
                .iter()
                .filter(|r| scope.matches(&r.category))
                .map(|r| r.emissions_tco2e)
                .sum(),
        })
        .collect()
}

fn ratio(total: f64, denominator: Option<f64>) -> Option<f64> {
    denominator.filter(|d| *d != 0.0).map(|d| total / d)
}

/// tCO2e per worker; `None` when the headcount is unset or zero.
pub fn per_employee(record: &EmissionsRecord) -> Option<f64> {
    ratio(record.total_emissions_tco2e, record.employee_count)
}

/// tCO2e per m²; `None` when the floor area is unset or zero.
pub fn per_floor_area(record: &EmissionsRecord) -> Option<f64> {
    ratio(record.total_emissions_tco2e, record.floor_area_m2)
}

/// Emissions summed for one source label.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SourceTotal {
    pub source: String,
    pub emissions_tco2e: f64,
}

/// The `n` largest emission sources.
///
/// Rows are grouped by source label and only numeric emissions are summed;
/// a source without any numeric value is left out. Groups are ordered by
/// descending total, equal totals keeping first-appearance order.
pub fn top_sources<'a, I>(rows: I, n: usize) -> Vec<SourceTotal>
where
    I: IntoIterator<Item = &'a DetailRow>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<SourceTotal> = Vec::new();

    for row in rows {
        let Some(value) = row.emissions_tco2e else {
            continue;
        };
        match index.get(row.source.as_str()) {
            Some(&i) => totals[i].emissions_tco2e += value,
            None => {
                index.insert(row.source.as_str(), totals.len());
                totals.push(SourceTotal {
                    source: row.source.clone(),
                    emissions_tco2e: value,
                });
            }
        }
    }

    // sort_by is stable
    totals.sort_by(|a, b| b.emissions_tco2e.total_cmp(&a.emissions_tco2e));
    totals.truncate(n);
    totals
}

/// One row of the year-over-year table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub year: Option<InventoryYear>,
    pub source_name: String,
    pub emissions_tco2e: f64,
    pub per_employee: Option<f64>,
    pub per_floor_area: Option<f64>,
}

/// Totals and intensities per record, ordered by year ascending regardless of
/// the order the records were given in.
pub fn comparison_table(records: &[EmissionsRecord]) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = records
        .iter()
        .map(|record| ComparisonRow {
            year: record.year.clone(),
            source_name: record.source_name.clone(),
            emissions_tco2e: record.total_emissions_tco2e,
            per_employee: per_employee(record),
            per_floor_area: per_floor_area(record),
        })
        .collect();
    rows.sort_by(|a, b| year_order(&a.year, &b.year));
    rows
}

/// Breakdown rows worth charting: positive emissions, scope heading rows
/// removed, largest first.
pub fn category_chart_rows(rows: &[CategoryRow]) -> Vec<CategoryRow> {
    let mut chart: Vec<CategoryRow> = rows
        .iter()
        .filter(|r| r.emissions_tco2e > 0.0 && !is_scope_heading(&r.category))
        .cloned()
        .collect();
    chart.sort_by(|a, b| b.emissions_tco2e.total_cmp(&a.emissions_tco2e));
    chart
}

/// Direct (Scope 1) emissions split by gas, in tonnes.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GasComposition {
    pub co2_t: f64,
    pub ch4_t: f64,
    pub n2o_t: f64,
}

impl GasComposition {
    pub fn total_t(&self) -> f64 {
        self.co2_t + self.ch4_t + self.n2o_t
    }
}

/// Sum the per-gas kg columns over Scope 1 detail rows. Missing cells count
/// as zero.
pub fn direct_gas_composition(rows: &[DetailRow]) -> GasComposition {
    let kg = rows
        .iter()
        .filter(|r| Scope::Direct.mentioned_in(&r.scope))
        .fold((0.0, 0.0, 0.0), |(co2, ch4, n2o), r| {
            (
                co2 + r.gases.co2_kg.unwrap_or(0.0),
                ch4 + r.gases.ch4_kg.unwrap_or(0.0),
                n2o + r.gases.n2o_kg.unwrap_or(0.0),
            )
        });
    GasComposition {
        co2_t: kg.0 / 1000.0,
        ch4_t: kg.1 / 1000.0,
        n2o_t: kg.2 / 1000.0,
    }
}
