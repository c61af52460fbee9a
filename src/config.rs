use crate::dashboard::DEFAULT_TOP_N;
use clap::Parser;
use std::path::PathBuf;

/// Web dashboard settings.
#[derive(Parser, Debug, Clone)]
#[command(name = "ghg-dashboard", about = "GHG emissions inventory dashboard")]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "GHG_BIND", default_value = "127.0.0.1:3000")]
    pub bind: String,

    /// Workbook shown when a request carries no uploads
    #[arg(long, env = "GHG_EXAMPLE_DATASET")]
    pub example_dataset: Option<PathBuf>,

    /// Directory served under /static (logo, stylesheets)
    #[arg(long, env = "GHG_STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    /// Largest accepted request body, in megabytes
    #[arg(long, default_value_t = 20)]
    pub max_upload_mb: usize,

    /// Number of sources in the top-N chart when the request does not say
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,
}

impl ServerArgs {
    /// Request body cap in bytes, saturating on absurd megabyte values.
    pub fn body_limit(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Command-line report settings.
#[derive(Parser, Debug, Clone)]
#[command(name = "ghg-report", about = "Summarize GHG inventory workbooks")]
pub struct ReportArgs {
    /// Inventory workbooks (.xlsx); several files enable the year comparison
    pub files: Vec<PathBuf>,

    /// Workbook used when no files are given
    #[arg(long, env = "GHG_EXAMPLE_DATASET")]
    pub example_dataset: Option<PathBuf>,

    /// Keep only detail rows of these scopes (repeatable)
    #[arg(long = "scope")]
    pub scopes: Vec<String>,

    /// Keep only detail rows of these categories (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Number of sources in the top-N listing
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Write the filtered detail table to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print the dashboard as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
}
