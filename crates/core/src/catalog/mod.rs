//! Installed engines and opening books.

pub mod ini;
mod loader;
mod watch;

pub use loader::{read_books, read_engine_ini, CatalogLoader, CatalogPaths, EngineCatalog};
pub use watch::{is_catalog_file, CatalogEvent, CatalogWatcher};
