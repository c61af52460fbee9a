#![cfg(not(tarpaulin_include))]

use clap::Parser;
use ghg_dashboard::{app, config::ServerArgs};

/// Main entry point for the web dashboard
///
/// Reads settings from the command line (or `GHG_*` environment variables),
/// initializes logging and serves the dashboard until interrupted.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = ServerArgs::parse();
    if args.example_dataset.is_none() {
        log::info!("No example dataset configured; requests without uploads will get no data");
    }

    // Start the web application
    app::run(args).await
}
