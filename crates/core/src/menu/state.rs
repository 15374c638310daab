//! Static menu tree.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::{EngineCategory, TimeMode};

/// A node of the menu tree.
///
/// The topology is fixed: [`MenuState::parent`] and [`MenuState::children`]
/// form a table, and siblings are ordered by their parent's child list.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MenuState {
    Top,
    Mode,
    ModeType,
    Time,
    TimeFixed,
    TimeFixedCtrl,
    TimeBlitz,
    TimeBlitzCtrl,
    TimeFischer,
    TimeFischerCtrl,
    Book,
    BookName,
    Engine,
    EngModern,
    EngModernName,
    EngModernNameLevel,
    EngRetro,
    EngRetroName,
    EngRetroNameLevel,
    EngFav,
    EngFavName,
    EngFavNameLevel,
    Sys,
    SysLang,
    SysLangName,
    SysSound,
    SysSoundType,
}

/// Ordered content behind a list-bearing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Play modes.
    Modes,
    /// Time control presets of one mode.
    TimeControls(TimeMode),
    /// Opening books.
    Books,
    /// Engines of one category.
    Engines(EngineCategory),
    /// Levels of the engine under the engine cursor.
    Levels(EngineCategory),
    /// Display languages.
    Languages,
    /// Beep modes.
    BeepModes,
}

use MenuState::*;

const TOP_CHILDREN: &[MenuState] = &[Mode, Time, Book, Engine, Sys];
const TIME_CHILDREN: &[MenuState] = &[TimeFixed, TimeBlitz, TimeFischer];
const ENGINE_CHILDREN: &[MenuState] = &[EngModern, EngRetro, EngFav];
const SYS_CHILDREN: &[MenuState] = &[SysLang, SysSound];

impl MenuState {
    /// Parent node; `None` only for [`MenuState::Top`].
    pub fn parent(self) -> Option<MenuState> {
        let parent = match self {
            Top => return None,
            Mode | Time | Book | Engine | Sys => Top,
            ModeType => Mode,
            TimeFixed | TimeBlitz | TimeFischer => Time,
            TimeFixedCtrl => TimeFixed,
            TimeBlitzCtrl => TimeBlitz,
            TimeFischerCtrl => TimeFischer,
            BookName => Book,
            EngModern | EngRetro | EngFav => Engine,
            EngModernName => EngModern,
            EngRetroName => EngRetro,
            EngFavName => EngFav,
            EngModernNameLevel => EngModernName,
            EngRetroNameLevel => EngRetroName,
            EngFavNameLevel => EngFavName,
            SysLang | SysSound => Sys,
            SysLangName => SysLang,
            SysSoundType => SysSound,
        };
        Some(parent)
    }

    /// Child nodes in sibling order.
    ///
    /// List states report their item-dependent child (the level list under an
    /// engine list) even though only engines with levels lead there.
    pub fn children(self) -> &'static [MenuState] {
        match self {
            Top => TOP_CHILDREN,
            Mode => &[ModeType],
            Time => TIME_CHILDREN,
            TimeFixed => &[TimeFixedCtrl],
            TimeBlitz => &[TimeBlitzCtrl],
            TimeFischer => &[TimeFischerCtrl],
            Book => &[BookName],
            Engine => ENGINE_CHILDREN,
            EngModern => &[EngModernName],
            EngRetro => &[EngRetroName],
            EngFav => &[EngFavName],
            EngModernName => &[EngModernNameLevel],
            EngRetroName => &[EngRetroNameLevel],
            EngFavName => &[EngFavNameLevel],
            Sys => SYS_CHILDREN,
            SysLang => &[SysLangName],
            SysSound => &[SysSoundType],
            ModeType | TimeFixedCtrl | TimeBlitzCtrl | TimeFischerCtrl | BookName
            | EngModernNameLevel | EngRetroNameLevel | EngFavNameLevel | SysLangName
            | SysSoundType => &[],
        }
    }

    /// Siblings including `self`, in order.
    pub fn siblings(self) -> &'static [MenuState] {
        self.parent().map(MenuState::children).unwrap_or(&[])
    }

    /// List shown while in this state, if any.
    pub fn list(self) -> Option<ListKind> {
        let kind = match self {
            ModeType => ListKind::Modes,
            TimeFixedCtrl => ListKind::TimeControls(TimeMode::Fixed),
            TimeBlitzCtrl => ListKind::TimeControls(TimeMode::Blitz),
            TimeFischerCtrl => ListKind::TimeControls(TimeMode::Fischer),
            BookName => ListKind::Books,
            EngModernName => ListKind::Engines(EngineCategory::Modern),
            EngRetroName => ListKind::Engines(EngineCategory::Retro),
            EngFavName => ListKind::Engines(EngineCategory::Favorite),
            EngModernNameLevel => ListKind::Levels(EngineCategory::Modern),
            EngRetroNameLevel => ListKind::Levels(EngineCategory::Retro),
            EngFavNameLevel => ListKind::Levels(EngineCategory::Favorite),
            SysLangName => ListKind::Languages,
            SysSoundType => ListKind::BeepModes,
            _ => return None,
        };
        Some(kind)
    }

    /// Translator id of a fixed heading; `None` for list states.
    pub fn heading_id(self) -> Option<&'static str> {
        let id = match self {
            Top => "picochess",
            Mode => "top_mode_menu",
            Time => "top_time_menu",
            Book => "top_book_menu",
            Engine => "top_engine_menu",
            Sys => "top_system_menu",
            TimeFixed => "timemode_fixed_menu",
            TimeBlitz => "timemode_blitz_menu",
            TimeFischer => "timemode_fischer_menu",
            EngModern => "engine_menu_modern",
            EngRetro => "engine_menu_retro",
            EngFav => "engine_menu_favorites",
            SysLang => "system_language_menu",
            SysSound => "system_sound_menu",
            _ => return None,
        };
        Some(id)
    }

    /// Heading for an engine category.
    pub fn engine_heading(category: EngineCategory) -> MenuState {
        match category {
            EngineCategory::Modern => EngModern,
            EngineCategory::Retro => EngRetro,
            EngineCategory::Favorite => EngFav,
        }
    }

    /// Heading for a time mode.
    pub fn time_heading(mode: TimeMode) -> MenuState {
        match mode {
            TimeMode::Fixed => TimeFixed,
            TimeMode::Blitz => TimeBlitz,
            TimeMode::Fischer => TimeFischer,
        }
    }
}

impl fmt::Display for MenuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Top => "TOP",
            Mode => "MODE",
            ModeType => "MODE_TYPE",
            Time => "TIME",
            TimeFixed => "TIME_FIXED",
            TimeFixedCtrl => "TIME_FIXED_CTRL",
            TimeBlitz => "TIME_BLITZ",
            TimeBlitzCtrl => "TIME_BLITZ_CTRL",
            TimeFischer => "TIME_FISCHER",
            TimeFischerCtrl => "TIME_FISCHER_CTRL",
            Book => "BOOK",
            BookName => "BOOK_NAME",
            Engine => "ENGINE",
            EngModern => "ENG_MODERN",
            EngModernName => "ENG_MODERN_NAME",
            EngModernNameLevel => "ENG_MODERN_NAME_LEVEL",
            EngRetro => "ENG_RETRO",
            EngRetroName => "ENG_RETRO_NAME",
            EngRetroNameLevel => "ENG_RETRO_NAME_LEVEL",
            EngFav => "ENG_FAV",
            EngFavName => "ENG_FAV_NAME",
            EngFavNameLevel => "ENG_FAV_NAME_LEVEL",
            Sys => "SYS",
            SysLang => "SYS_LANG",
            SysLangName => "SYS_LANG_NAME",
            SysSound => "SYS_SOUND",
            SysSoundType => "SYS_SOUND_TYPE",
        };
        f.write_str(name)
    }
}
