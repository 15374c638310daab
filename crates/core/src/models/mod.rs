//! Shared domain models.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// Fixed-width label variants for the three clock display sizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DisplayLabel {
    /// Text for wide displays (web, large LCDs).
    pub large: String,
    /// Eight-character variant for the XL/3000 clocks.
    pub medium: String,
    /// Six-character variant for the smallest clocks.
    pub small: String,
}

impl DisplayLabel {
    /// Build a label from `name`, truncating for the smaller variants.
    pub fn from_name(name: &str) -> Self {
        Self {
            large: name.to_string(),
            medium: name.chars().take(8).collect(),
            small: name.chars().take(6).collect(),
        }
    }
}

/// Engine list a descriptor belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum EngineCategory {
    /// Current UCI engines.
    Modern,
    /// Emulated dedicated chess computers.
    Retro,
    /// User curated shortlist.
    Favorite,
}

impl EngineCategory {
    /// Every category in menu order.
    pub const ALL: [EngineCategory; 3] = [Self::Modern, Self::Retro, Self::Favorite];
}

impl fmt::Display for EngineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Modern => "modern",
            Self::Retro => "retro",
            Self::Favorite => "favorite",
        };
        f.write_str(name)
    }
}

/// One selectable strength/time setting of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDescriptor {
    /// Section name from the engine's `.uci` file (e.g. `Level@03`, `2 Cores`).
    pub label: String,
    /// UCI options applied when this level is chosen.
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl LevelDescriptor {
    /// Level without any options.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            options: BTreeMap::new(),
        }
    }
}

/// Installed engine as listed in an engine ini file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDescriptor {
    /// Path to the engine executable; unique within a category.
    pub file: String,
    /// Human-readable engine name.
    pub name: String,
    /// Advertised strength, if the ini file provides one.
    pub elo: Option<String>,
    /// Display label shown on the clock.
    pub display: DisplayLabel,
    /// Selectable levels in file order; empty when the engine has none.
    #[serde(default)]
    pub levels: Vec<LevelDescriptor>,
}

impl EngineDescriptor {
    /// Engine whose display label is derived from `name`.
    pub fn new(file: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            file: file.into(),
            display: DisplayLabel::from_name(&name),
            name,
            elo: None,
            levels: Vec::new(),
        }
    }

    /// Attach levels, replacing any existing ones.
    pub fn with_levels<I, L>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.levels = levels.into_iter().map(LevelDescriptor::new).collect();
        self
    }

    /// Whether choosing this engine leads to a level submenu.
    pub fn has_levels(&self) -> bool {
        !self.levels.is_empty()
    }

    /// Position of the level labelled `label`.
    pub fn level_index(&self, label: &str) -> Option<usize> {
        self.levels.iter().position(|level| level.label == label)
    }
}

/// Opening book listed in the books directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDescriptor {
    /// Book file name relative to the books directory.
    pub file: String,
    /// Display label shown on the clock.
    pub display: DisplayLabel,
}

impl BookDescriptor {
    /// Book labelled with `name`.
    pub fn new(file: impl Into<String>, name: &str) -> Self {
        Self {
            file: file.into(),
            display: DisplayLabel::from_name(name),
        }
    }
}

/// Play modes offered in the mode menu.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    Normal,
    Training,
    Brain,
    Analysis,
    Kibitz,
    Observe,
    Remote,
    Ponder,
}

impl PlayMode {
    /// Menu order.
    pub const ALL: [PlayMode; 8] = [
        Self::Normal,
        Self::Training,
        Self::Brain,
        Self::Analysis,
        Self::Kibitz,
        Self::Observe,
        Self::Remote,
        Self::Ponder,
    ];

    /// Translator id of the menu entry.
    pub fn text_id(&self) -> &'static str {
        match self {
            Self::Normal => "mode_normal_menu",
            Self::Training => "mode_training_menu",
            Self::Brain => "mode_brain_menu",
            Self::Analysis => "mode_analysis_menu",
            Self::Kibitz => "mode_kibitz_menu",
            Self::Observe => "mode_observe_menu",
            Self::Remote => "mode_remote_menu",
            Self::Ponder => "mode_ponder_menu",
        }
    }
}

/// Kinds of clock time control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeMode {
    /// Fixed seconds per move.
    Fixed,
    /// Minutes for the whole game.
    Blitz,
    /// Minutes plus increment per move.
    Fischer,
}

/// A concrete time control preset.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TimeControl {
    Fixed { seconds: u32 },
    Blitz { minutes: u32 },
    Fischer { minutes: u32, increment: u32 },
}

const FIXED_PRESETS: [TimeControl; 8] = [
    TimeControl::Fixed { seconds: 1 },
    TimeControl::Fixed { seconds: 3 },
    TimeControl::Fixed { seconds: 5 },
    TimeControl::Fixed { seconds: 10 },
    TimeControl::Fixed { seconds: 15 },
    TimeControl::Fixed { seconds: 30 },
    TimeControl::Fixed { seconds: 60 },
    TimeControl::Fixed { seconds: 90 },
];

const BLITZ_PRESETS: [TimeControl; 8] = [
    TimeControl::Blitz { minutes: 1 },
    TimeControl::Blitz { minutes: 3 },
    TimeControl::Blitz { minutes: 5 },
    TimeControl::Blitz { minutes: 10 },
    TimeControl::Blitz { minutes: 15 },
    TimeControl::Blitz { minutes: 30 },
    TimeControl::Blitz { minutes: 60 },
    TimeControl::Blitz { minutes: 90 },
];

const FISCHER_PRESETS: [TimeControl; 9] = [
    TimeControl::Fischer { minutes: 1, increment: 1 },
    TimeControl::Fischer { minutes: 3, increment: 2 },
    TimeControl::Fischer { minutes: 4, increment: 2 },
    TimeControl::Fischer { minutes: 5, increment: 3 },
    TimeControl::Fischer { minutes: 10, increment: 5 },
    TimeControl::Fischer { minutes: 15, increment: 10 },
    TimeControl::Fischer { minutes: 30, increment: 15 },
    TimeControl::Fischer { minutes: 60, increment: 20 },
    TimeControl::Fischer { minutes: 90, increment: 30 },
];

impl TimeMode {
    /// Menu order.
    pub const ALL: [TimeMode; 3] = [Self::Fixed, Self::Blitz, Self::Fischer];

    /// Presets offered for this mode, in menu order.
    pub fn presets(&self) -> &'static [TimeControl] {
        match self {
            Self::Fixed => &FIXED_PRESETS,
            Self::Blitz => &BLITZ_PRESETS,
            Self::Fischer => &FISCHER_PRESETS,
        }
    }
}

impl TimeControl {
    /// Mode this preset belongs to.
    pub fn mode(&self) -> TimeMode {
        match self {
            Self::Fixed { .. } => TimeMode::Fixed,
            Self::Blitz { .. } => TimeMode::Blitz,
            Self::Fischer { .. } => TimeMode::Fischer,
        }
    }

    /// Translator id and message used to label the preset.
    pub fn text_args(&self) -> (&'static str, String) {
        match self {
            Self::Fixed { seconds } => ("tc_fixed", format!("{seconds:>2}")),
            Self::Blitz { minutes } => ("tc_blitz", format!("{minutes:>2}")),
            Self::Fischer { minutes, increment } => {
                ("tc_fisch", format!("{minutes:>2} {increment:>2}"))
            }
        }
    }
}
