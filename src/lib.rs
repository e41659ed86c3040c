pub mod db;
pub mod notification;
pub mod settings;
pub mod stats;
pub mod timer;
pub mod viewmodel;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use env_logger::Env;

use db::Database;
use notification::LogNotifier;
use settings::SettingsStore;
use timer::TimerController;

pub struct AppState {
    pub db: Database,
    pub timer: TimerController,
    pub settings: SettingsStore,
}

/// Reads `RUST_LOG`; defaults to `info`, or `debug` when `STUDYSMART_DEBUG` is set.
pub fn init_logging() {
    let default_level = if settings::debug_enabled() { "debug" } else { "info" };
    // A second call (tests, embedding hosts) keeps the first logger.
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .try_init();
}

/// Opens the store and settings under `data_dir` and wires the timer to the
/// status notifier.
pub fn init(data_dir: &Path) -> Result<AppState> {
    log::info!("StudySmart starting up...");

    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    let database = Database::new(data_dir.join("studysmart.sqlite3"))?;
    let settings_store = SettingsStore::new(data_dir.join("settings.json"))?;

    notification::request_permission(&settings_store);

    let notifier = LogNotifier::new(settings_store.notifications());
    let timer_controller = TimerController::new(Arc::new(notifier), settings::debug_enabled());

    Ok(AppState {
        db: database,
        timer: timer_controller,
        settings: settings_store,
    })
}
