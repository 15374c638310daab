use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::loader::CatalogPaths;

/// Events emitted when the catalog files change on disk.
#[derive(Debug)]
pub enum CatalogEvent {
    /// Engine, level or book files were created, modified or removed.
    Changed {
        /// Affected catalog files.
        paths: Vec<PathBuf>,
    },
    /// The watcher reported an error.
    Error(anyhow::Error),
}

/// Watches the engine and book directories.
///
/// Watching stops when the value is dropped.
pub struct CatalogWatcher {
    _watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl CatalogWatcher {
    /// Start watching the directories in `paths`, sending events to `sender`.
    ///
    /// Directories that do not exist yet are skipped.
    pub fn spawn(paths: &CatalogPaths, sender: mpsc::Sender<CatalogEvent>) -> Result<Self> {
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let event = match result {
                Ok(event) => event,
                Err(err) => {
                    let _ = sender.blocking_send(CatalogEvent::Error(err.into()));
                    return;
                }
            };
            if !matches!(
                event.kind,
                EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
            ) {
                return;
            }
            let paths: Vec<PathBuf> = event
                .paths
                .into_iter()
                .filter(|path| is_catalog_file(path))
                .collect();
            if paths.is_empty() {
                return;
            }
            debug!(?paths, "Catalog files changed");
            let _ = sender.blocking_send(CatalogEvent::Changed { paths });
        })
        .context("failed to create catalog watcher")?;

        let mut watched = Vec::new();
        for dir in [&paths.engines_dir, &paths.books_dir] {
            if watched.contains(dir) {
                continue;
            }
            if !dir.is_dir() {
                warn!("Not watching missing directory {}", dir.display());
                continue;
            }
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("failed to watch {}", dir.display()))?;
            info!("Watching {}", dir.display());
            watched.push(dir.clone());
        }

        Ok(Self {
            _watcher: watcher,
            watched,
        })
    }

    /// Directories currently watched.
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

/// Whether a change to `path` affects the catalog.
pub fn is_catalog_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("ini" | "uci" | "bin")
    )
}
