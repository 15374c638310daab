use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    models::{EngineCategory, PlayMode, TimeControl},
    translate::{BeepMode, Language},
};

/// Engine that is currently in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEngine {
    /// List the engine was chosen from.
    pub category: EngineCategory,
    /// Engine file, as listed in the catalog.
    pub file: String,
}

/// A confirmed menu choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Selection {
    /// Play mode.
    Mode {
        /// Chosen mode.
        mode: PlayMode,
    },
    /// Time control preset.
    Time {
        /// Chosen preset.
        control: TimeControl,
    },
    /// Opening book.
    Book {
        /// Book file.
        file: String,
    },
    /// Engine, optionally with one of its levels.
    Engine {
        /// List the engine was chosen from.
        category: EngineCategory,
        /// Engine file.
        file: String,
        /// Level label; `None` for engines without levels.
        level: Option<String>,
    },
    /// Display language.
    Language {
        /// Chosen language.
        language: Language,
    },
    /// Beep mode.
    Beep {
        /// Chosen mode.
        beep: BeepMode,
    },
}

impl Selection {
    /// Translator id of the confirmation message.
    pub fn ack_id(&self) -> &'static str {
        match self {
            Self::Mode { .. } => "okmode",
            Self::Time { .. } => "oktime",
            Self::Book { .. } => "okbook",
            Self::Engine { .. } => "okengine",
            Self::Language { .. } => "oklang",
            Self::Beep { .. } => "okbeep",
        }
    }
}

/// Last confirmed choices, used to restore cursors when a list is re-entered.
///
/// Only [`SelectionMemory::record`] changes it, so confirming the same choice
/// twice leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionMemory {
    /// Engine in use.
    pub current_engine: Option<ActiveEngine>,
    /// Last engine file confirmed per category.
    pub last_engine: BTreeMap<EngineCategory, String>,
    /// Last level label confirmed per engine file.
    pub last_level: BTreeMap<String, String>,
    /// Last play mode.
    pub mode: Option<PlayMode>,
    /// Last time control.
    pub time_control: Option<TimeControl>,
    /// Last book file.
    pub book: Option<String>,
    /// Last display language.
    pub language: Option<Language>,
    /// Last beep mode.
    pub beep: Option<BeepMode>,
}

impl SelectionMemory {
    /// Store a confirmed choice.
    pub fn record(&mut self, selection: &Selection) {
        match selection {
            Selection::Mode { mode } => self.mode = Some(*mode),
            Selection::Time { control } => self.time_control = Some(*control),
            Selection::Book { file } => self.book = Some(file.clone()),
            Selection::Engine {
                category,
                file,
                level,
            } => {
                self.current_engine = Some(ActiveEngine {
                    category: *category,
                    file: file.clone(),
                });
                self.last_engine.insert(*category, file.clone());
                if let Some(level) = level {
                    self.last_level.insert(file.clone(), level.clone());
                }
            }
            Selection::Language { language } => self.language = Some(*language),
            Selection::Beep { beep } => self.beep = Some(*beep),
        }
    }

    /// Engine file to preselect in `category`.
    ///
    /// The last confirmed engine of the category wins; otherwise the active
    /// engine if it belongs to the category.
    pub fn engine_in(&self, category: EngineCategory) -> Option<&str> {
        self.last_engine.get(&category).map(String::as_str).or_else(|| {
            self.current_engine
                .as_ref()
                .filter(|active| active.category == category)
                .map(|active| active.file.as_str())
        })
    }

    /// Level label to preselect for the engine `file`.
    pub fn level_of(&self, file: &str) -> Option<&str> {
        self.last_level.get(file).map(String::as_str)
    }
}
