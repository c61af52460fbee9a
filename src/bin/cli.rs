#![cfg(not(tarpaulin_include))]

use clap::Parser;
use ghg_dashboard::config::ReportArgs;
use ghg_dashboard::dashboard::{DashboardRequest, NOT_AVAILABLE, build_dashboard, format_metric};
use ghg_dashboard::downloader::save_csv;
use ghg_dashboard::filter::{DetailFilter, Selection};
use ghg_dashboard::LoadError;
use ghg_dashboard::loader::load_paths;
use ghg_dashboard::schema::TemplateSchema;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ReportArgs::parse();

    let set = match load_paths(&args.files, args.example_dataset.as_deref(), &TemplateSchema::default()) {
        Ok(set) => set,
        Err(LoadError::NoData { failures }) => {
            for failure in &failures {
                eprintln!("⚠️  {}", failure);
            }
            return Err(LoadError::NoData { failures }.into());
        }
    };
    for failure in &set.failures {
        eprintln!("⚠️  {}", failure);
    }

    let request = DashboardRequest {
        filter: DetailFilter {
            scopes: Selection::from_values(args.scopes.iter().cloned()),
            categories: Selection::from_values(args.categories.iter().cloned()),
        },
        top_n: args.top_n,
    };
    let dashboard = build_dashboard(&set, &request).ok_or("no emissions data available")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        if let Some(path) = &args.csv {
            save_csv(&dashboard.detail, path)?;
        }
        return Ok(());
    }

    if let Some(notice) = &dashboard.notice {
        println!("{}", notice);
    }

    if let Some(rows) = &dashboard.comparison {
        println!("\n== Year comparison ==");
        println!("{:<10} {:>14} {:>16} {:>12}", "Year", "tCO2e", "tCO2e/worker", "tCO2e/m²");
        for row in rows {
            let year = row
                .year
                .as_ref()
                .map(|y| y.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string());
            let ratio = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| NOT_AVAILABLE.to_string());
            println!(
                "{:<10} {:>14.2} {:>16} {:>12}",
                year,
                row.emissions_tco2e,
                ratio(row.per_employee),
                ratio(row.per_floor_area)
            );
        }
    }

    let year = dashboard
        .year
        .as_ref()
        .map(|y| y.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    println!("\n== Inventory {} ({}) ==", year, dashboard.source_name);
    for card in &dashboard.metrics {
        println!("{:<26} {}", card.label, card.value);
    }

    println!("\n== Emissions by scope ==");
    for total in &dashboard.scope_totals {
        println!("{:<26} {}", total.label, format_metric(Some(total.emissions_tco2e), "tCO2e"));
    }

    println!("\n== Top {} emission sources ==", request.top_n);
    for (rank, source) in dashboard.top_sources.iter().enumerate() {
        println!("{:>2}. {:<40} {:>10.2} tCO2e", rank + 1, source.source, source.emissions_tco2e);
    }

    if let Some(gases) = &dashboard.gas_composition {
        println!("\n== Scope 1 by gas ==");
        println!("CO2 {:.3} t   CH4 {:.3} t   N2O {:.3} t", gases.co2_t, gases.ch4_t, gases.n2o_t);
    }

    println!("\n{} detail row(s) selected", dashboard.detail.len());
    if let Some(path) = &args.csv {
        save_csv(&dashboard.detail, path)?;
        println!("Filtered rows written to {}", path.display());
    }

    Ok(())
}
