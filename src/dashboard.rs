use crate::aggregate::{
    ComparisonRow, GasComposition, ScopeTotal, SourceTotal, category_chart_rows, comparison_table,
    direct_gas_composition, per_employee, per_floor_area, scope_totals, top_sources,
};
use crate::filter::{DetailFilter, category_options, scope_options};
use crate::loader::RecordSet;
use crate::record::{CategoryRow, DetailRow, EmissionsRecord, InventoryYear, TotalBasis};
use crate::scope::Scope;
use serde::Serialize;

/// Shown wherever a metric cannot be computed.
pub const NOT_AVAILABLE: &str = "N/A";

pub const DEFAULT_TOP_N: usize = 5;

/// User selections for one render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardRequest {
    pub filter: DetailFilter,
    pub top_n: usize,
}

impl Default for DashboardRequest {
    fn default() -> Self {
        DashboardRequest {
            filter: DetailFilter::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: String,
    pub value: String,
}

/// Format an optional metric with two decimals, or [`NOT_AVAILABLE`].
pub fn format_metric(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{:.2} {}", v, unit),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    /// Year-over-year table, present only when several inventories were loaded
    pub comparison: Option<Vec<ComparisonRow>>,
    pub year: Option<InventoryYear>,
    pub source_name: String,
    pub total_emissions_tco2e: f64,
    pub total_basis: TotalBasis,
    pub metrics: Vec<MetricCard>,
    pub scope_totals: Vec<ScopeTotal>,
    pub categories: Vec<CategoryRow>,
    pub category_chart: Vec<CategoryRow>,
    pub top_sources: Vec<SourceTotal>,
    /// Scope 1 split by gas, only when there are direct emissions
    pub gas_composition: Option<GasComposition>,
    pub scope_options: Vec<String>,
    pub category_options: Vec<String>,
    pub detail: Vec<DetailRow>,
    pub export_file_name: String,
    pub failures: Vec<String>,
    pub notice: Option<String>,
}

/// Metric cards for one record: intensity per worker, per m², and the total.
pub fn metric_cards(record: &EmissionsRecord) -> Vec<MetricCard> {
    vec![
        MetricCard {
            label: "Emissions per worker".to_string(),
            value: format_metric(per_employee(record), "tCO2e/person"),
        },
        MetricCard {
            label: "Emissions per floor area".to_string(),
            value: format_metric(per_floor_area(record), "tCO2e/m²"),
        },
        MetricCard {
            label: "Total emissions".to_string(),
            value: format_metric(Some(record.total_emissions_tco2e), "tCO2e"),
        },
    ]
}

/// Detail rows of `record` passing `filter`, in sheet order.
pub fn filtered_detail(record: &EmissionsRecord, filter: &DetailFilter) -> Vec<DetailRow> {
    filter
        .apply(&record.source_detail)
        .into_iter()
        .cloned()
        .collect()
}

/// File name offered for the filtered CSV export.
pub fn export_file_name(record: &EmissionsRecord, extension: &str) -> String {
    format!("emisiones_filtradas_{}.{}", record.year_label(), extension)
}

/// Build the view for the most recent inventory in `set`, plus the
/// comparison table when more than one inventory was loaded.
///
/// Returns `None` for an empty set; callers treat that as the terminal
/// no-data state.
pub fn build_dashboard(set: &RecordSet, request: &DashboardRequest) -> Option<Dashboard> {
    let record = set.latest()?;

    let comparison = (set.records.len() > 1).then(|| comparison_table(&set.records));
    let scopes = scope_totals(&record.category_breakdown);
    let direct_total = scopes
        .iter()
        .find(|t| t.scope == Scope::Direct)
        .map(|t| t.emissions_tco2e)
        .unwrap_or(0.0);
    let detail = filtered_detail(record, &request.filter);

    Some(Dashboard {
        comparison,
        year: record.year.clone(),
        source_name: record.source_name.clone(),
        total_emissions_tco2e: record.total_emissions_tco2e,
        total_basis: record.total_basis,
        metrics: metric_cards(record),
        scope_totals: scopes,
        categories: record.category_breakdown.clone(),
        category_chart: category_chart_rows(&record.category_breakdown),
        top_sources: top_sources(&detail, request.top_n),
        gas_composition: (direct_total > 0.0).then(|| direct_gas_composition(&record.source_detail)),
        scope_options: scope_options(&record.source_detail),
        category_options: category_options(&record.source_detail),
        detail,
        export_file_name: export_file_name(record, "csv"),
        failures: set.failures.iter().map(|f| f.to_string()).collect(),
        notice: set.used_fallback.then(|| {
            format!(
                "Showing the example dataset ({}); upload a workbook to replace it.",
                record.source_name
            )
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_format_two_decimals_or_not_available() {
        assert_eq!(format_metric(Some(12.346), "tCO2e"), "12.35 tCO2e");
        assert_eq!(format_metric(None, "tCO2e/m²"), NOT_AVAILABLE);
    }
}
