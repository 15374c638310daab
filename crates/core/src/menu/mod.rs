//! Clock menu navigation.
//!
//! [`MenuNavigator`] walks a fixed tree of [`MenuState`]s. Lists of engines,
//! levels and books come from the bound catalog; confirmed choices land in
//! [`SelectionMemory`] and restore the cursors when a list is re-entered.

mod memory;
mod navigator;
mod state;

pub use memory::{ActiveEngine, Selection, SelectionMemory};
pub use navigator::{MenuNavigator, MenuOutcome};
pub use state::{ListKind, MenuState};
