mod analytics;
mod basket;
mod config;
mod db;
mod entry;
mod filter;
mod items;
mod logging;
mod models;
mod run;
mod sheet;
mod store;
mod ui;

use anyhow::Result;
use tracing::{info, warn};

use config::{AppPaths, Settings, STORE_ENV};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let paths = AppPaths::resolve()?;

    let (settings, settings_error) = match Settings::load_from(&paths.settings_file()) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    let settings = settings.with_store_override(std::env::var(STORE_ENV).ok());

    if let Err(e) = logging::init(&paths.data_dir, &settings.log_level) {
        eprintln!("Warning: {e:#}");
    }
    if let Some(e) = settings_error {
        warn!(error = %format!("{e:#}"), "Using default settings");
        eprintln!("Warning: {e:#}; using default settings");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "Starting shoptui");

    match args.len() {
        1 => {
            let mut ledger = run::open_ledger(&settings, &paths)?;
            run::as_tui(&mut ledger, &settings)
        }
        _ => run::as_cli(&args, &settings, &paths),
    }
}
