#![warn(clippy::all, missing_docs)]

//! Core logic for the picomenu clock menu.
//!
//! This crate hosts the menu state machine, the clock text translator,
//! engine/book catalog loading and watching, configuration handling and
//! persistence of remembered selections used by the terminal front end.

pub mod catalog;
pub mod config;
pub mod menu;
pub mod models;
pub mod store;
pub mod translate;

pub use catalog::{CatalogEvent, CatalogLoader, CatalogPaths, CatalogWatcher, EngineCatalog};
pub use config::AppConfig;
pub use menu::{MenuNavigator, MenuOutcome, MenuState, Selection, SelectionMemory};
pub use models::{BookDescriptor, DisplayLabel, EngineCategory, EngineDescriptor, LevelDescriptor};
pub use store::SelectionStore;
pub use translate::{DisplayText, Translator};
