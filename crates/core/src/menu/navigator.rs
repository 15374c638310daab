use std::{collections::HashMap, sync::Arc};

use tracing::{debug, info, warn};

use super::{
    memory::{ActiveEngine, Selection, SelectionMemory},
    state::{ListKind, MenuState},
};
use crate::{
    catalog::EngineCatalog,
    models::{BookDescriptor, EngineCategory, EngineDescriptor, PlayMode, TimeMode},
    translate::{BeepMode, DisplayText, Language, Translator},
};

/// Entry under the cursor before a catalog change.
#[derive(Debug, Default)]
struct CursorAnchor {
    file: Option<String>,
    level: Option<String>,
}

/// Result of a navigation input.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuOutcome {
    /// The menu moved (or stayed); show this text.
    Show(DisplayText),
    /// A leaf was confirmed. The menu is back at the top level.
    Committed {
        /// What was chosen.
        selection: Selection,
        /// Confirmation text to show.
        ack: DisplayText,
    },
    /// `up` was pressed at the top level and the menu should be closed.
    Exit,
}

impl MenuOutcome {
    /// Text of a [`MenuOutcome::Show`].
    pub fn text(&self) -> Option<&DisplayText> {
        match self {
            Self::Show(text) => Some(text),
            _ => None,
        }
    }

    /// Text to put on the display, including commit confirmations.
    pub fn display(&self) -> Option<&DisplayText> {
        match self {
            Self::Show(text) | Self::Committed { ack: text, .. } => Some(text),
            Self::Exit => None,
        }
    }

    /// Whether a selection was confirmed.
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Clock menu state machine.
///
/// Driven by four directional inputs. Every input is total: empty lists and
/// stale cursors degrade to no-ops instead of errors.
pub struct MenuNavigator {
    state: MenuState,
    /// Cursor into the list of the current state.
    item: usize,
    /// Engine cursor kept while browsing that engine's levels.
    engine: usize,
    /// Child last visited per group, cleared when returning to the top.
    group_child: HashMap<MenuState, MenuState>,
    catalog: EngineCatalog,
    memory: SelectionMemory,
    active: Option<ActiveEngine>,
    translator: Translator,
    exit_on_top_up: bool,
}

impl MenuNavigator {
    /// Create a navigator at the top level.
    ///
    /// Language and beep mode remembered in `memory` are applied to `translator`.
    pub fn new(mut translator: Translator, memory: SelectionMemory) -> Self {
        if let Some(language) = memory.language {
            translator.set_language(language);
        }
        if let Some(beep) = memory.beep {
            translator.set_beep(beep);
        }
        Self {
            state: MenuState::Top,
            item: 0,
            engine: 0,
            group_child: HashMap::new(),
            catalog: EngineCatalog::default(),
            active: memory.current_engine.clone(),
            memory,
            translator,
            exit_on_top_up: false,
        }
    }

    /// Report [`MenuOutcome::Exit`] when `up` is pressed at the top level.
    pub fn set_exit_on_top_up(&mut self, exit: bool) {
        self.exit_on_top_up = exit;
    }

    /// Current menu node.
    pub fn state(&self) -> MenuState {
        self.state
    }

    /// Remembered selections.
    pub fn memory(&self) -> &SelectionMemory {
        &self.memory
    }

    /// Bound catalog.
    pub fn catalog(&self) -> &EngineCatalog {
        &self.catalog
    }

    /// Text renderer.
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Mutable text renderer, e.g. to switch capital mode.
    pub fn translator_mut(&mut self) -> &mut Translator {
        &mut self.translator
    }

    /// Cursor and length of the current list, if the current state has one.
    pub fn position(&self) -> Option<(usize, usize)> {
        let kind = self.state.list()?;
        Some((self.item, self.list_len(kind)))
    }

    /// Bind the modern engine list.
    pub fn set_modern_engines(&mut self, engines: impl Into<Arc<[EngineDescriptor]>>) {
        let anchor = self.cursor_anchor();
        self.catalog.modern = engines.into();
        self.rebind(anchor);
    }

    /// Bind the retro engine list.
    pub fn set_retro_engines(&mut self, engines: impl Into<Arc<[EngineDescriptor]>>) {
        let anchor = self.cursor_anchor();
        self.catalog.retro = engines.into();
        self.rebind(anchor);
    }

    /// Bind the favorite engine list.
    pub fn set_favorite_engines(&mut self, engines: impl Into<Arc<[EngineDescriptor]>>) {
        let anchor = self.cursor_anchor();
        self.catalog.favorites = engines.into();
        self.rebind(anchor);
    }

    /// Bind the opening book list.
    pub fn set_books(&mut self, books: impl Into<Arc<[BookDescriptor]>>) {
        let anchor = self.cursor_anchor();
        self.catalog.books = books.into();
        self.rebind(anchor);
    }

    /// Bind a whole catalog, e.g. after a reload.
    pub fn set_catalog(&mut self, catalog: EngineCatalog) {
        let anchor = self.cursor_anchor();
        self.catalog = catalog;
        self.rebind(anchor);
    }

    /// Resolve the engine in use from the remembered selection.
    ///
    /// Falls back to the first modern, then retro, then favorite engine when
    /// nothing is remembered or the remembered engine is gone.
    pub fn set_state_current_engine(&mut self) {
        self.active = self.resolve_active_engine();
        match &self.active {
            Some(active) => debug!(category = %active.category, file = %active.file, "Active engine"),
            None => warn!("No engine installed"),
        }
    }

    /// Label of the engine in use; `None` when no engine is installed.
    pub fn get_current_engine_name(&self) -> Option<DisplayText> {
        let active = self
            .active
            .clone()
            .filter(|active| self.catalog.find_engine(active.category, &active.file).is_some())
            .or_else(|| self.resolve_active_engine())?;
        let (_, engine) = self.catalog.find_engine(active.category, &active.file)?;
        Some(self.translator.label(&engine.display))
    }

    /// Return to the top level, forgetting visited children and cursors.
    pub fn enter_top_menu(&mut self) -> DisplayText {
        self.reset_to_top();
        self.current_text()
    }

    /// Text for the current state.
    pub fn current_text(&self) -> DisplayText {
        match self.state.list() {
            Some(kind) => self.item_text(kind),
            None => self.heading_text(self.state),
        }
    }

    /// Move to the parent node.
    pub fn main_up(&mut self) -> MenuOutcome {
        let Some(parent) = self.state.parent() else {
            if self.exit_on_top_up {
                debug!("Leaving menu from top level");
                return MenuOutcome::Exit;
            }
            return MenuOutcome::Show(self.current_text());
        };

        match self.state.list() {
            Some(ListKind::Levels(_)) => self.item = self.engine,
            Some(_) => self.item = 0,
            None => {}
        }
        self.enter(parent);
        MenuOutcome::Show(self.current_text())
    }

    /// Descend one level, or confirm the item under the cursor.
    pub fn main_down(&mut self) -> MenuOutcome {
        match self.state.list() {
            Some(kind) => self.descend_from_list(kind),
            None => self.descend_from_heading(),
        }
    }

    /// Previous sibling or list item, wrapping at the start.
    pub fn main_left(&mut self) -> MenuOutcome {
        self.step(false)
    }

    /// Next sibling or list item, wrapping at the end.
    pub fn main_right(&mut self) -> MenuOutcome {
        self.step(true)
    }

    fn step(&mut self, forward: bool) -> MenuOutcome {
        if let Some(kind) = self.state.list() {
            let len = self.list_len(kind);
            if len > 0 {
                self.item = cycle(self.item.min(len - 1), len, forward);
            }
            return MenuOutcome::Show(self.item_text(kind));
        }

        let siblings = self.state.siblings();
        if let Some(position) = siblings.iter().position(|state| *state == self.state) {
            self.enter(siblings[cycle(position, siblings.len(), forward)]);
        }
        MenuOutcome::Show(self.current_text())
    }

    fn descend_from_heading(&mut self) -> MenuOutcome {
        let children = self.state.children();
        let list_child = match children {
            [child] => child.list().map(|kind| (*child, kind)),
            _ => None,
        };

        let Some((child, kind)) = list_child else {
            let child = self
                .group_child
                .get(&self.state)
                .copied()
                .unwrap_or_else(|| self.default_child(self.state));
            self.enter(child);
            return MenuOutcome::Show(self.current_text());
        };

        if self.list_len(kind) == 0 {
            debug!(state = %self.state, "Nothing to list");
            return MenuOutcome::Show(self.current_text());
        }
        self.item = self.restore_cursor(kind);
        self.enter(child);
        MenuOutcome::Show(self.current_text())
    }

    fn descend_from_list(&mut self, kind: ListKind) -> MenuOutcome {
        let selection = match kind {
            ListKind::Modes => PlayMode::ALL
                .get(self.item)
                .map(|mode| Selection::Mode { mode: *mode }),
            ListKind::TimeControls(mode) => mode
                .presets()
                .get(self.item)
                .map(|control| Selection::Time { control: *control }),
            ListKind::Books => self
                .catalog
                .books
                .get(self.item)
                .map(|book| Selection::Book {
                    file: book.file.clone(),
                }),
            ListKind::Engines(category) => {
                let Some(engine) = self.catalog.category(category).get(self.item) else {
                    return MenuOutcome::Show(self.current_text());
                };
                if engine.has_levels() {
                    let level_state = self.state.children().first().copied();
                    if let Some(level_state) = level_state {
                        self.engine = self.item;
                        self.item = self.restore_cursor(ListKind::Levels(category));
                        self.enter(level_state);
                        return MenuOutcome::Show(self.current_text());
                    }
                }
                Some(Selection::Engine {
                    category,
                    file: engine.file.clone(),
                    level: None,
                })
            }
            ListKind::Levels(category) => self
                .catalog
                .category(category)
                .get(self.engine)
                .and_then(|engine| {
                    engine.levels.get(self.item).map(|level| Selection::Engine {
                        category,
                        file: engine.file.clone(),
                        level: Some(level.label.clone()),
                    })
                }),
            ListKind::Languages => Language::ALL
                .get(self.item)
                .map(|language| Selection::Language {
                    language: *language,
                }),
            ListKind::BeepModes => BeepMode::ALL
                .get(self.item)
                .map(|beep| Selection::Beep { beep: *beep }),
        };

        match selection {
            Some(selection) => self.commit(selection),
            None => MenuOutcome::Show(self.current_text()),
        }
    }

    fn commit(&mut self, selection: Selection) -> MenuOutcome {
        self.memory.record(&selection);
        match &selection {
            Selection::Engine { category, file, .. } => {
                self.active = Some(ActiveEngine {
                    category: *category,
                    file: file.clone(),
                });
            }
            Selection::Language { language } => self.translator.set_language(*language),
            Selection::Beep { beep } => self.translator.set_beep(*beep),
            _ => {}
        }
        info!(?selection, "Menu selection committed");

        self.reset_to_top();
        let ack = self
            .translator
            .text(&format!("K10_{}", selection.ack_id()), "");
        MenuOutcome::Committed { selection, ack }
    }

    fn reset_to_top(&mut self) {
        self.state = MenuState::Top;
        self.item = 0;
        self.engine = 0;
        self.group_child.clear();
    }

    fn enter(&mut self, state: MenuState) {
        debug!(from = %self.state, to = %state, "Menu transition");
        if let Some(parent) = state.parent() {
            if parent.children().len() > 1 {
                self.group_child.insert(parent, state);
            }
        }
        self.state = state;
    }

    fn default_child(&self, group: MenuState) -> MenuState {
        match group {
            MenuState::Top => MenuState::Engine,
            MenuState::Engine => self
                .active
                .as_ref()
                .map(|active| MenuState::engine_heading(active.category))
                .unwrap_or(MenuState::EngModern),
            MenuState::Time => MenuState::time_heading(
                self.memory
                    .time_control
                    .map(|control| control.mode())
                    .unwrap_or(TimeMode::Fixed),
            ),
            MenuState::Sys => MenuState::SysLang,
            other => other.children().first().copied().unwrap_or(other),
        }
    }

    fn list_len(&self, kind: ListKind) -> usize {
        match kind {
            ListKind::Modes => PlayMode::ALL.len(),
            ListKind::TimeControls(mode) => mode.presets().len(),
            ListKind::Books => self.catalog.books.len(),
            ListKind::Engines(category) => self.catalog.category(category).len(),
            ListKind::Levels(category) => self
                .catalog
                .category(category)
                .get(self.engine)
                .map_or(0, |engine| engine.levels.len()),
            ListKind::Languages => Language::ALL.len(),
            ListKind::BeepModes => BeepMode::ALL.len(),
        }
    }

    /// Cursor to start from when entering a list.
    fn restore_cursor(&self, kind: ListKind) -> usize {
        let index = match kind {
            ListKind::Modes => self
                .memory
                .mode
                .and_then(|mode| PlayMode::ALL.iter().position(|entry| *entry == mode)),
            ListKind::TimeControls(mode) => self
                .memory
                .time_control
                .filter(|control| control.mode() == mode)
                .and_then(|control| mode.presets().iter().position(|entry| *entry == control)),
            ListKind::Books => self.memory.book.as_deref().and_then(|file| {
                let index = self.catalog.books.iter().position(|book| book.file == file);
                if index.is_none() {
                    warn!("Remembered book {file} not found");
                }
                index
            }),
            ListKind::Engines(category) => self.memory.engine_in(category).and_then(|file| {
                let index = self
                    .catalog
                    .find_engine(category, file)
                    .map(|(index, _)| index);
                if index.is_none() {
                    warn!("Remembered {category} engine {file} not found");
                }
                index
            }),
            ListKind::Levels(category) => {
                self.catalog
                    .category(category)
                    .get(self.engine)
                    .and_then(|engine| {
                        self.memory
                            .level_of(&engine.file)
                            .and_then(|label| engine.level_index(label))
                    })
            }
            ListKind::Languages => Language::ALL
                .iter()
                .position(|language| *language == self.translator.language()),
            ListKind::BeepModes => BeepMode::ALL
                .iter()
                .position(|beep| *beep == self.translator.beep()),
        };
        index.unwrap_or(0)
    }

    fn cursor_anchor(&self) -> CursorAnchor {
        match self.state.list() {
            Some(ListKind::Books) => CursorAnchor {
                file: self.catalog.books.get(self.item).map(|book| book.file.clone()),
                level: None,
            },
            Some(ListKind::Engines(category)) => CursorAnchor {
                file: self
                    .catalog
                    .category(category)
                    .get(self.item)
                    .map(|engine| engine.file.clone()),
                level: None,
            },
            Some(ListKind::Levels(category)) => {
                let engine = self.catalog.category(category).get(self.engine);
                CursorAnchor {
                    file: engine.map(|engine| engine.file.clone()),
                    level: engine
                        .and_then(|engine| engine.levels.get(self.item))
                        .map(|level| level.label.clone()),
                }
            }
            _ => CursorAnchor::default(),
        }
    }

    /// Bring the state and cursors back in range after a catalog change.
    ///
    /// Cursors follow the entry they pointed at before the change and fall
    /// back to the first entry when it is gone.
    fn rebind(&mut self, anchor: CursorAnchor) {
        let Some(kind) = self.state.list() else {
            return;
        };

        match kind {
            ListKind::Levels(category) => {
                self.rebind_levels(category, anchor);
                return;
            }
            ListKind::Engines(category) => {
                self.item = anchor
                    .file
                    .as_deref()
                    .and_then(|file| self.catalog.find_engine(category, file))
                    .map_or(0, |(index, _)| index);
            }
            ListKind::Books => {
                self.item = anchor
                    .file
                    .as_deref()
                    .and_then(|file| self.catalog.books.iter().position(|book| book.file == file))
                    .unwrap_or(0);
            }
            _ => {}
        }

        let len = self.list_len(kind);
        if len == 0 {
            warn!(state = %self.state, "List emptied by reload");
            if let Some(parent) = self.state.parent() {
                self.state = parent;
            }
            self.item = 0;
        } else if self.item >= len {
            self.item = 0;
        }
    }

    fn rebind_levels(&mut self, category: EngineCategory, anchor: CursorAnchor) {
        if self.catalog.category(category).is_empty() {
            warn!(state = %self.state, "Engine list emptied by reload");
            self.state = MenuState::engine_heading(category);
            self.item = 0;
            self.engine = 0;
            return;
        }

        let found = anchor
            .file
            .as_deref()
            .and_then(|file| self.catalog.find_engine(category, file));
        let (engine, item) = match found {
            Some((index, engine)) => (
                index,
                anchor
                    .level
                    .as_deref()
                    .and_then(|label| engine.level_index(label))
                    .unwrap_or(0),
            ),
            None => {
                warn!(state = %self.state, "Engine under the cursor removed by reload");
                (0, 0)
            }
        };
        self.engine = engine;
        self.item = item;

        if self.list_len(ListKind::Levels(category)) == 0 {
            if let Some(parent) = self.state.parent() {
                self.state = parent;
            }
            self.item = self.engine;
        }
    }

    fn resolve_active_engine(&self) -> Option<ActiveEngine> {
        if let Some(active) = &self.memory.current_engine {
            if self
                .catalog
                .find_engine(active.category, &active.file)
                .is_some()
            {
                return Some(active.clone());
            }
            warn!("Remembered engine {} not installed", active.file);
        }

        EngineCategory::ALL.into_iter().find_map(|category| {
            self.catalog
                .category(category)
                .first()
                .map(|engine| ActiveEngine {
                    category,
                    file: engine.file.clone(),
                })
        })
    }

    fn heading_text(&self, state: MenuState) -> DisplayText {
        let id = state.heading_id().unwrap_or("errormenu");
        self.translator.text(&format!("B00_{id}"), "")
    }

    fn item_text(&self, kind: ListKind) -> DisplayText {
        let index = self.item;
        let text = match kind {
            ListKind::Modes => PlayMode::ALL
                .get(index)
                .map(|mode| self.translator.text(&format!("B00_{}", mode.text_id()), "")),
            ListKind::TimeControls(mode) => mode.presets().get(index).map(|control| {
                let (id, msg) = control.text_args();
                self.translator.text(&format!("B00_{id}"), &msg)
            }),
            ListKind::Books => self
                .catalog
                .books
                .get(index)
                .map(|book| self.translator.label(&book.display)),
            ListKind::Engines(category) => self
                .catalog
                .category(category)
                .get(index)
                .map(|engine| self.translator.label(&engine.display)),
            ListKind::Levels(category) => self
                .catalog
                .category(category)
                .get(self.engine)
                .and_then(|engine| engine.levels.get(index))
                .map(|level| self.translator.text("B00_level", &level.label)),
            ListKind::Languages => Language::ALL.get(index).map(|language| {
                self.translator
                    .text(&format!("B00_{}", language.text_id()), "")
            }),
            ListKind::BeepModes => BeepMode::ALL
                .get(index)
                .map(|beep| self.translator.text(&format!("B00_{}", beep.text_id()), "")),
        };
        text.unwrap_or_else(|| self.translator.text("B00_errormenu", ""))
    }
}

fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if forward {
        (index + 1) % len
    } else {
        (index + len - 1) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LevelDescriptor, TimeControl};

    fn numbered_levels(count: usize) -> Vec<String> {
        (0..count).map(|index| format!("Level@{index:02}")).collect()
    }

    fn modern_engines() -> Vec<EngineDescriptor> {
        vec![
            EngineDescriptor::new("engines/lc0", "Lc0")
                .with_levels(["1 Core", "2 Cores", "3 Cores", "4 Cores"]),
            EngineDescriptor::new("engines/mcbrain_99_32", "McBrain9932")
                .with_levels(numbered_levels(21)),
            EngineDescriptor::new("engines/stockfish15", "Stockfish 15")
                .with_levels(numbered_levels(21)),
            EngineDescriptor::new("engines/zurichess", "zurichess")
                .with_levels(numbered_levels(10)),
        ]
    }

    fn retro_engines() -> Vec<EngineDescriptor> {
        let milano_levels = [
            "Level 00 - speed",
            "Level 01 - 5s move",
            "Level 02 - 15s move",
            "Level 03 - 30s move",
            "Level 04 - 1m move",
            "Level 05 - 2m move",
            "Level 06 - 3m move",
            "Level 07 - 5m game",
            "Level 08 - 15m game",
            "Level 09 - 30m game",
            "Level 10 - 60m game",
        ];
        vec![
            EngineDescriptor::new("engines/mame/mephisto_academy", "Mep.Academy")
                .with_levels(milano_levels),
            EngineDescriptor::new("engines/mame/mephisto_amsterdam", "M.Amsterdam")
                .with_levels(milano_levels),
            EngineDescriptor::new("engines/mame/mephisto_milano", "Mep. Milano")
                .with_levels(milano_levels),
            EngineDescriptor::new("engines/mame/mephisto_mm2", "Mep. MM II"),
            EngineDescriptor::new("engines/mame/schachzwerg", "Schachzwerg"),
        ]
    }

    fn favorite_engines() -> Vec<EngineDescriptor> {
        vec![
            EngineDescriptor::new("engines/stockfish15", "Stockfish 15")
                .with_levels(numbered_levels(21)),
            EngineDescriptor::new("engines/rodent4", "Rodent 4").with_levels(numbered_levels(5)),
            EngineDescriptor::new("engines/mame/mephisto_milano", "Mep. Milano"),
        ]
    }

    fn books() -> Vec<BookDescriptor> {
        vec![
            BookDescriptor::new("a-fun.bin", "fun"),
            BookDescriptor::new("b-gm.bin", "gm"),
            BookDescriptor::new("c-elo.bin", "elo"),
        ]
    }

    fn menu_with(memory: SelectionMemory) -> MenuNavigator {
        let translator = Translator::new(BeepMode::Off, 0, Language::En, "version");
        let mut menu = MenuNavigator::new(translator, memory);
        menu.set_modern_engines(modern_engines());
        menu.set_retro_engines(retro_engines());
        menu.set_favorite_engines(favorite_engines());
        menu.set_books(books());
        menu
    }

    fn menu() -> MenuNavigator {
        menu_with(SelectionMemory::default())
    }

    fn large(outcome: MenuOutcome) -> String {
        match outcome {
            MenuOutcome::Show(text) => text.large,
            other => panic!("expected a label, got {other:?}"),
        }
    }

    #[test]
    fn engine_menu_traversal() {
        let mut menu = menu();
        menu.set_state_current_engine();
        assert_eq!(menu.get_current_engine_name().unwrap().large, "Lc0");

        menu.enter_top_menu();
        assert_eq!(menu.state(), MenuState::Top);
        menu.main_down();
        assert_eq!(menu.state(), MenuState::Engine);
        menu.main_right();
        assert_eq!(menu.state(), MenuState::Sys);
        menu.main_left();
        assert_eq!(menu.state(), MenuState::Engine);
        menu.main_left();
        assert_eq!(menu.state(), MenuState::Book);
        menu.main_right();
        assert_eq!(menu.state(), MenuState::Engine);

        menu.main_down();
        assert_eq!(menu.state(), MenuState::EngModern);
        menu.main_up();
        assert_eq!(menu.state(), MenuState::Engine);
        menu.main_down();
        assert_eq!(menu.state(), MenuState::EngModern);
        menu.main_right();
        assert_eq!(menu.state(), MenuState::EngRetro);
        menu.main_up();
        menu.main_down();
        assert_eq!(menu.state(), MenuState::EngRetro);
        menu.main_right();
        assert_eq!(menu.state(), MenuState::EngFav);
        menu.main_up();
        menu.main_down();
        assert_eq!(menu.state(), MenuState::EngFav);
        menu.main_right();
        assert_eq!(menu.state(), MenuState::EngModern);
        menu.main_left();
        assert_eq!(menu.state(), MenuState::EngFav);
        menu.main_left();
        assert_eq!(menu.state(), MenuState::EngRetro);
        menu.main_left();
        assert_eq!(menu.state(), MenuState::EngModern);

        assert_eq!(large(menu.main_down()), "Lc0");
        assert_eq!(menu.state(), MenuState::EngModernName);
        assert_eq!(large(menu.main_right()), "McBrain9932");
        assert_eq!(large(menu.main_left()), "Lc0");
        menu.main_up();
        assert_eq!(menu.state(), MenuState::EngModern);

        menu.main_right();
        assert_eq!(large(menu.main_down()), "Mep.Academy");
        assert_eq!(menu.state(), MenuState::EngRetroName);
        assert_eq!(large(menu.main_right()), "M.Amsterdam");
        assert_eq!(large(menu.main_left()), "Mep.Academy");
        menu.main_up();
        assert_eq!(menu.state(), MenuState::EngRetro);

        menu.main_right();
        assert_eq!(large(menu.main_down()), "Stockfish 15");
        assert_eq!(menu.state(), MenuState::EngFavName);
        assert_eq!(large(menu.main_right()), "Rodent 4");
        assert_eq!(large(menu.main_left()), "Stockfish 15");
        assert_eq!(large(menu.main_down()), "level     0");
        assert_eq!(menu.state(), MenuState::EngFavNameLevel);
        assert_eq!(large(menu.main_right()), "level     1");
        assert_eq!(large(menu.main_left()), "level     0");

        menu.main_up();
        assert_eq!(menu.state(), MenuState::EngFavName);
        menu.main_up();
        menu.main_right();
        assert_eq!(large(menu.main_down()), "Lc0");
        assert_eq!(large(menu.main_down()), "1 Core");
        assert_eq!(menu.state(), MenuState::EngModernNameLevel);
        assert_eq!(large(menu.main_right()), "2 Cores");
        assert_eq!(large(menu.main_left()), "1 Core");

        menu.main_up();
        assert_eq!(menu.state(), MenuState::EngModernName);
        menu.main_up();
        menu.main_right();
        assert_eq!(large(menu.main_down()), "Mep.Academy");
        assert_eq!(large(menu.main_down()), "Level 00 - speed");
        assert_eq!(menu.state(), MenuState::EngRetroNameLevel);
        assert_eq!(large(menu.main_right()), "Level 01 - 5s move");
        assert_eq!(large(menu.main_left()), "Level 00 - speed");
        menu.main_up();
        assert_eq!(menu.state(), MenuState::EngRetroName);
    }

    #[test]
    fn modern_engine_is_restored_after_commit() {
        let mut menu = menu();
        menu.set_state_current_engine();
        menu.enter_top_menu();
        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Modern Engines");
        menu.main_down();
        assert_eq!(large(menu.main_left()), "zurichess");
        assert_eq!(large(menu.main_down()), "level     0");

        let outcome = menu.main_down();
        assert!(outcome.is_committed());
        assert!(outcome.text().is_none());
        assert_eq!(
            outcome.display().map(|text| text.large.trim().to_string()),
            Some("ok engine".to_string())
        );
        assert_eq!(menu.state(), MenuState::Top);
        assert_eq!(menu.get_current_engine_name().unwrap().large, "zurichess");

        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Modern Engines");
        assert_eq!(large(menu.main_down()), "zurichess");
    }

    #[test]
    fn retro_engine_without_levels_commits_directly() {
        let mut menu = menu();
        menu.set_state_current_engine();
        menu.enter_top_menu();
        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Modern Engines");
        assert_eq!(large(menu.main_right()), "Retro Engines");
        menu.main_down();
        assert_eq!(large(menu.main_left()), "Schachzwerg");

        match menu.main_down() {
            MenuOutcome::Committed { selection, ack } => {
                assert_eq!(
                    selection,
                    Selection::Engine {
                        category: EngineCategory::Retro,
                        file: "engines/mame/schachzwerg".to_string(),
                        level: None,
                    }
                );
                assert_eq!(ack.large.trim(), "ok engine");
            }
            other => panic!("expected a commit, got {other:?}"),
        }
        assert_eq!(menu.get_current_engine_name().unwrap().large, "Schachzwerg");

        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Retro Engines");
        assert_eq!(large(menu.main_down()), "Schachzwerg");
    }

    #[test]
    fn retro_engine_level_is_restored() {
        let mut menu = menu();
        menu.set_state_current_engine();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        assert_eq!(large(menu.main_right()), "Retro Engines");
        menu.main_down();
        menu.main_right();
        assert_eq!(large(menu.main_right()), "Mep. Milano");
        menu.main_down();
        assert_eq!(large(menu.main_left()), "Level 10 - 60m game");
        assert!(menu.main_down().is_committed());
        assert_eq!(menu.get_current_engine_name().unwrap().large, "Mep. Milano");

        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Retro Engines");
        assert_eq!(large(menu.main_down()), "Mep. Milano");
        assert_eq!(large(menu.main_down()), "Level 10 - 60m game");
    }

    #[test]
    fn each_category_remembers_its_own_engine() {
        let mut menu = menu();
        menu.set_state_current_engine();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        menu.main_down();
        assert_eq!(large(menu.main_left()), "zurichess");
        menu.main_down();
        assert!(menu.main_down().is_committed());

        menu.enter_top_menu();
        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Modern Engines");
        assert_eq!(large(menu.main_right()), "Retro Engines");
        menu.main_down();
        assert_eq!(large(menu.main_left()), "Schachzwerg");
        assert!(menu.main_down().is_committed());

        menu.enter_top_menu();
        assert_eq!(large(menu.main_down()).trim(), "Engine");
        assert_eq!(large(menu.main_down()), "Retro Engines");
        assert_eq!(large(menu.main_left()), "Modern Engines");
        assert_eq!(large(menu.main_down()), "zurichess");
    }

    #[test]
    fn lists_wrap_in_both_directions() {
        let mut menu = menu();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        let first = large(menu.main_down());
        let count = modern_engines().len();
        for _ in 0..count - 1 {
            assert_ne!(large(menu.main_right()), first);
        }
        assert_eq!(large(menu.main_right()), first);

        let last = large(menu.main_left());
        assert_eq!(last, "zurichess");
        assert_eq!(large(menu.main_right()), first);

        menu.enter_top_menu();
        menu.main_down();
        let top_level = [
            MenuState::Sys,
            MenuState::Mode,
            MenuState::Time,
            MenuState::Book,
            MenuState::Engine,
        ];
        for expected in top_level {
            menu.main_right();
            assert_eq!(menu.state(), expected);
        }
    }

    #[test]
    fn down_then_up_keeps_the_cursor() {
        let mut menu = menu();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        menu.main_down();
        let engine = large(menu.main_right());
        assert_eq!(engine, "McBrain9932");
        assert_eq!(menu.position(), Some((1, 4)));

        menu.main_down();
        assert_eq!(menu.state(), MenuState::EngModernNameLevel);
        assert_eq!(large(menu.main_up()), engine);
        assert_eq!(menu.state(), MenuState::EngModernName);
        assert_eq!(menu.position(), Some((1, 4)));

        menu.main_up();
        let heading = menu.state();
        menu.main_down();
        menu.main_up();
        assert_eq!(menu.state(), heading);
    }

    #[test]
    fn committing_twice_is_idempotent() {
        let mut menu = menu();
        let pick_second_level = |menu: &mut MenuNavigator| {
            menu.enter_top_menu();
            menu.main_down();
            menu.main_down();
            menu.main_down();
            menu.main_down();
            menu.main_right();
            menu.main_down()
        };

        let first = pick_second_level(&mut menu);
        let snapshot = menu.memory().clone();
        assert_eq!(snapshot.level_of("engines/lc0"), Some("2 Cores"));

        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        menu.main_down();
        assert_eq!(large(menu.main_down()), "2 Cores");
        let second = menu.main_down();
        assert_eq!(first, second);
        assert_eq!(menu.memory(), &snapshot);
    }

    #[test]
    fn top_level_up_depends_on_exit_policy() {
        let mut menu = menu();
        let top = menu.enter_top_menu();
        assert_eq!(menu.main_up(), MenuOutcome::Show(top));
        assert_eq!(menu.state(), MenuState::Top);

        menu.set_exit_on_top_up(true);
        assert_eq!(menu.main_up(), MenuOutcome::Exit);
        assert!(MenuOutcome::Exit.display().is_none());
        assert_eq!(menu.state(), MenuState::Top);

        let before = menu.main_left();
        assert_eq!(menu.state(), MenuState::Top);
        assert_eq!(before.text().map(|text| text.large.clone()), Some(top_large(&menu)));
    }

    fn top_large(menu: &MenuNavigator) -> String {
        menu.current_text().large
    }

    #[test]
    fn empty_lists_are_not_entered() {
        let translator = Translator::new(BeepMode::Off, 0, Language::En, "version");
        let mut menu = MenuNavigator::new(translator, SelectionMemory::default());
        menu.set_state_current_engine();
        assert!(menu.get_current_engine_name().is_none());

        menu.enter_top_menu();
        menu.main_down();
        assert_eq!(large(menu.main_down()), "Modern Engines");
        assert_eq!(large(menu.main_down()), "Modern Engines");
        assert_eq!(menu.state(), MenuState::EngModern);

        menu.main_up();
        menu.main_left();
        assert_eq!(menu.state(), MenuState::Book);
        menu.main_down();
        assert_eq!(menu.state(), MenuState::Book);
    }

    #[test]
    fn single_item_lists_wrap_onto_themselves() {
        let mut menu = menu();
        menu.set_books(vec![BookDescriptor::new("only.bin", "only")]);
        menu.enter_top_menu();
        menu.main_down();
        menu.main_left();
        assert_eq!(large(menu.main_down()), "only");
        assert_eq!(large(menu.main_right()), "only");
        assert_eq!(large(menu.main_left()), "only");
    }

    #[test]
    fn reload_clamps_stale_cursors() {
        let mut menu = menu();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        menu.main_down();
        assert_eq!(large(menu.main_left()), "zurichess");
        menu.main_down();
        assert_eq!(menu.state(), MenuState::EngModernNameLevel);
        menu.main_right();
        menu.main_right();
        assert_eq!(menu.position(), Some((2, 10)));

        let mut shorter = modern_engines();
        shorter.truncate(2);
        menu.set_modern_engines(shorter);
        assert_eq!(menu.state(), MenuState::EngModernNameLevel);
        assert_eq!(menu.current_text().large, "1 Core");
        assert_eq!(menu.position(), Some((0, 4)));

        menu.set_modern_engines(vec![EngineDescriptor::new("engines/lc0", "Lc0")]);
        assert_eq!(menu.state(), MenuState::EngModernName);
        assert_eq!(menu.current_text().large, "Lc0");

        menu.set_modern_engines(Vec::new());
        assert_eq!(menu.state(), MenuState::EngModern);
    }

    #[test]
    fn reload_keeps_the_entry_under_the_cursor() {
        let mut menu = menu();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        assert_eq!(large(menu.main_down()), "Lc0");
        menu.main_right();
        assert_eq!(large(menu.main_right()), "Stockfish 15");
        menu.main_down();
        menu.main_right();
        menu.main_right();
        menu.main_right();
        let level = menu.current_text();
        assert_eq!(menu.position(), Some((3, 21)));

        let mut reordered = modern_engines();
        reordered.remove(0);
        reordered.reverse();
        menu.set_modern_engines(reordered);
        assert_eq!(menu.state(), MenuState::EngModernNameLevel);
        assert_eq!(menu.current_text(), level);
        assert_eq!(menu.position(), Some((3, 21)));

        assert_eq!(large(menu.main_up()), "Stockfish 15");
        assert_eq!(menu.position(), Some((1, 3)));
        menu.set_modern_engines(modern_engines());
        assert_eq!(menu.current_text().large, "Stockfish 15");
        assert_eq!(menu.position(), Some((2, 4)));

        menu.enter_top_menu();
        menu.main_down();
        menu.main_left();
        assert_eq!(large(menu.main_down()), "fun");
        assert_eq!(large(menu.main_right()), "gm");
        menu.set_books(books()[1..].to_vec());
        assert_eq!(menu.current_text().large, "gm");
        assert_eq!(menu.position(), Some((0, 2)));
    }

    #[test]
    fn missing_remembered_engine_falls_back_to_first() {
        let memory = SelectionMemory {
            current_engine: Some(ActiveEngine {
                category: EngineCategory::Retro,
                file: "engines/mame/uninstalled".to_string(),
            }),
            last_engine: [(EngineCategory::Retro, "engines/mame/uninstalled".to_string())]
                .into_iter()
                .collect(),
            ..SelectionMemory::default()
        };
        let mut menu = menu_with(memory);
        menu.set_state_current_engine();
        assert_eq!(menu.get_current_engine_name().unwrap().large, "Lc0");

        menu.enter_top_menu();
        menu.main_down();
        assert_eq!(large(menu.main_down()), "Modern Engines");
        menu.main_right();
        assert_eq!(large(menu.main_down()), "Mep.Academy");
    }

    #[test]
    fn remembered_engine_selects_category_and_item() {
        let mut memory = SelectionMemory::default();
        memory.record(&Selection::Engine {
            category: EngineCategory::Favorite,
            file: "engines/rodent4".to_string(),
            level: Some("Level@03".to_string()),
        });
        let mut menu = menu_with(memory);
        menu.set_state_current_engine();
        assert_eq!(menu.get_current_engine_name().unwrap().large, "Rodent 4");

        menu.enter_top_menu();
        menu.main_down();
        assert_eq!(large(menu.main_down()), "Favorites  ");
        assert_eq!(large(menu.main_down()), "Rodent 4");
        assert_eq!(large(menu.main_down()), "level     3");
    }

    #[test]
    fn mode_time_and_book_commits() {
        let mut menu = menu();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_left();
        menu.main_left();
        assert_eq!(menu.state(), MenuState::Time);
        assert_eq!(large(menu.main_down()).trim(), "Move time");
        assert_eq!(large(menu.main_right()).trim(), "Game time");
        assert_eq!(large(menu.main_down()), "Game time 1");
        assert_eq!(large(menu.main_right()), "Game time 3");
        match menu.main_down() {
            MenuOutcome::Committed { selection, .. } => assert_eq!(
                selection,
                Selection::Time {
                    control: TimeControl::Blitz { minutes: 3 }
                }
            ),
            other => panic!("expected a commit, got {other:?}"),
        }

        menu.main_down();
        menu.main_left();
        menu.main_left();
        assert_eq!(large(menu.main_down()).trim(), "Game time");
        assert_eq!(large(menu.main_down()), "Game time 3");
        menu.main_up();
        menu.main_up();

        menu.main_left();
        assert_eq!(menu.state(), MenuState::Mode);
        assert_eq!(large(menu.main_down()).trim(), "Normal");
        menu.main_right();
        assert!(menu.main_down().is_committed());
        assert_eq!(menu.memory().mode, Some(PlayMode::Training));

        menu.main_down();
        menu.main_left();
        assert_eq!(menu.state(), MenuState::Book);
        assert_eq!(large(menu.main_down()), "fun");
        assert_eq!(large(menu.main_left()), "elo");
        assert!(menu.main_down().is_committed());
        assert_eq!(menu.memory().book.as_deref(), Some("c-elo.bin"));
    }

    #[test]
    fn language_commit_switches_translator() {
        let mut menu = menu();
        menu.enter_top_menu();
        menu.main_down();
        menu.main_right();
        assert_eq!(menu.state(), MenuState::Sys);
        assert_eq!(large(menu.main_down()).trim(), "Language");
        assert_eq!(large(menu.main_down()).trim(), "English");
        assert_eq!(large(menu.main_right()).trim(), "German");

        match menu.main_down() {
            MenuOutcome::Committed { selection, .. } => assert_eq!(
                selection,
                Selection::Language {
                    language: Language::De
                }
            ),
            other => panic!("expected a commit, got {other:?}"),
        }
        assert_eq!(menu.translator().language(), Language::De);
        assert_eq!(menu.memory().language, Some(Language::De));

        menu.main_down();
        menu.main_right();
        menu.main_down();
        menu.main_right();
        assert_eq!(menu.state(), MenuState::SysSound);
        menu.main_down();
        assert_eq!(menu.position(), Some((0, 3)));
        menu.main_right();
        menu.main_right();
        assert!(menu.main_down().is_committed());
        assert_eq!(menu.translator().beep(), BeepMode::On);
    }

    #[test]
    fn remembered_language_applies_on_start() {
        let memory = SelectionMemory {
            language: Some(Language::Fr),
            beep: Some(BeepMode::On),
            ..SelectionMemory::default()
        };
        let menu = menu_with(memory);
        assert_eq!(menu.translator().language(), Language::Fr);
        assert_eq!(menu.translator().beep(), BeepMode::On);
    }

    #[test]
    fn level_descriptors_keep_options() {
        let mut engine = EngineDescriptor::new("engines/lc0", "Lc0");
        let mut level = LevelDescriptor::new("2 Cores");
        level.options.insert("Threads".to_string(), "2".to_string());
        engine.levels.push(level);

        let mut menu = menu();
        menu.set_modern_engines(vec![engine]);
        menu.enter_top_menu();
        menu.main_down();
        menu.main_down();
        menu.main_down();
        assert_eq!(large(menu.main_down()), "2 Cores");
        let options = &menu.catalog().modern[0].levels[0].options;
        assert_eq!(options.get("Threads").map(String::as_str), Some("2"));
    }
}
