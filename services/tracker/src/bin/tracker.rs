//! services/tracker/src/bin/tracker.rs

use health_journal_core::journal::Journal;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tracker_lib::{
    adapters::JsonStore,
    config::Config,
    console::{Prompter, Session},
    error::TrackerError,
};

fn main() -> Result<(), TrackerError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    info!(
        data_dir = %config.data_dir.display(),
        catalog_dir = %config.catalog_dir.display(),
        "Configuration loaded. Opening journal..."
    );

    // --- 2. Open Storage & Load the Catalog ---
    let store = Arc::new(JsonStore::new(&config.data_dir, &config.catalog_dir));
    store.ensure_dirs()?;
    let journal = Journal::open(store.clone(), store.clone(), store);
    info!("Journal ready.");

    // --- 3. Run the Console Session ---
    let today = chrono::Local::now().date_naive();
    let stdin = io::stdin();
    let prompter = Prompter::new(stdin.lock(), io::stdout().lock());
    let mut session = Session::new(journal, prompter, today, config.summary_days);
    session.run()
}
