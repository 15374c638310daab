mod app;
mod segment_font;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    path::Path,
    sync::Mutex,
};

use picomenu_core::{
    catalog::{CatalogLoader, CatalogPaths, CatalogWatcher},
    config::{self, AppConfig},
    menu::{MenuNavigator, SelectionMemory},
    store::SelectionStore,
    translate::Translator,
};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    init_logging(&config.log_dir)?;
    info!(language = %config.language, "Starting picomenu");

    let loader = CatalogLoader::new(CatalogPaths::from_config(&config));
    let catalog = loader.catalog().context("failed to load engine catalog")?;

    let store = SelectionStore::new(&config.state_path);
    let memory = match store.load() {
        Ok(memory) => memory,
        Err(err) => {
            warn!(?err, "Ignoring unreadable selections");
            SelectionMemory::default()
        }
    };

    let mut translator = Translator::new(
        config.beep,
        config.beep_level,
        config.language,
        env!("CARGO_PKG_VERSION"),
    );
    translator.set_capital(config.capital);

    let mut navigator = MenuNavigator::new(translator, memory);
    navigator.set_exit_on_top_up(config.exit_on_top_up);
    navigator.set_catalog(catalog);
    navigator.set_state_current_engine();

    let mut app = app::ClockApp::new(navigator, loader.clone(), store);
    if config.watch_catalog {
        let (catalog_tx, catalog_rx) = mpsc::channel(16);
        match CatalogWatcher::spawn(&loader.paths(), catalog_tx) {
            Ok(watcher) => app.attach_watcher(watcher, catalog_rx),
            Err(err) => warn!(?err, "Catalog watching disabled"),
        }
    }
    app.run().await
}

fn init_logging(log_dir: &Path) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
    let log_path = log_dir.join("picomenu.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // The terminal belongs to the clock screen, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
