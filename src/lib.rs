/*!
# GHG Emissions Dashboard

Reporting dashboard for organizational greenhouse-gas (GHG) inventories,
built in Rust.

## Overview

An inventory workbook (the HuellaChile organizational footprint calculator
template) is uploaded, parsed into a normalized [`EmissionsRecord`], and
turned into metric cards, charts, a filterable detail table and CSV/XLSX
exports. Several workbooks can be uploaded at once to compare inventory
years.

## Architecture

### Extraction
- **Schema** - Declarative description of the template: sheet names, row
  offsets, metadata label needles, detail header patterns
- **Extractor** - One generic sheet reader driven by the schema. Structural
  problems (missing sheet or required column) fail with [`ParseError`];
  unreadable values leave the field unset
- **Loader** - Extracts every upload independently, falls back to a
  configured example dataset, orders records by year

### Aggregation
- Scope 1/2/3 totals, intensity per worker and per m², top-N sources,
  year comparison, Scope 1 split by gas
- Detail filtering by scope and category (multi-select)

### Presentation
- Dashboard view model with "N/A" for metrics that cannot be computed
- CSV export (and XLSX, PNG charts and the axum web server with the `web`
  feature)

## Numeric coercion

Rows whose emission value is blank or not numeric are dropped from every
aggregation. Summary rows of that kind are skipped; detail rows are kept in
the table with an unset value.

## Modules

- **cell**: calamine cell access and coercion
- **schema**: workbook template
- **extractor**: workbook to record
- **record**: record types
- **scope**: scope buckets
- **aggregate**: totals, ratios, rankings
- **filter**: detail table selection
- **loader**: upload sets and fallback dataset
- **dashboard**: view model
- **downloader**: CSV / XLSX export
- **graph**: bar charts
- **config**: command-line and environment settings
- **app**: routing and handlers (`web` feature)
*/

pub mod aggregate;
pub mod cell;
pub mod config;
pub mod dashboard;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod record;
pub mod schema;
pub mod scope;

#[cfg(feature = "web")]
pub mod app;

/// Re-export the types most callers need
pub use error::{FileFailure, LoadError, ParseError};
pub use loader::{RecordSet, Upload, from_bytes, from_excel, load_paths, load_records};
pub use record::{CategoryRow, DetailRow, EmissionsRecord, InventoryYear, TotalBasis};
pub use schema::TemplateSchema;
