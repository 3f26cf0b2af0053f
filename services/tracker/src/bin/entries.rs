//! services/tracker/src/bin/entries.rs
//!
//! Prints every recorded day and exits.

use health_journal_core::journal::Journal;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_lib::{adapters::JsonStore, config::Config, console::write_history, error::TrackerError};

fn main() -> Result<(), TrackerError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // --- 2. Open Storage ---
    if !config.data_dir.exists() {
        println!("No data directory found.");
        return Ok(());
    }
    let store = Arc::new(JsonStore::new(&config.data_dir, &config.catalog_dir));
    let journal = Journal::open(store.clone(), store.clone(), store);

    // --- 3. Print Every Day ---
    let mut out = io::stdout().lock();
    write_history(&journal, &mut out)?;
    out.flush()?;
    Ok(())
}
