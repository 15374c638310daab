use std::{io, thread, time::Duration, time::Instant};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use picomenu_core::{
    catalog::{CatalogEvent, CatalogLoader, CatalogWatcher},
    menu::{MenuNavigator, MenuOutcome, Selection},
    store::SelectionStore,
    translate::DisplayText,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::segment_font;

const TICK_RATE: Duration = Duration::from_millis(250);
const CLOCK_WIDTH: usize = 8;

#[derive(Debug, Clone)]
struct Theme {
    accent: Color,
    segment: Color,
    muted: Color,
    primary_fg: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            segment: Color::LightRed,
            muted: Color::DarkGray,
            primary_fg: Color::White,
            warning: Color::Yellow,
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Navigation input decoded from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Up,
    Down,
    Left,
    Right,
    TopMenu,
    Quit,
}

/// Terminal front end that mimics the clock display.
pub struct ClockApp {
    navigator: MenuNavigator,
    loader: CatalogLoader,
    store: SelectionStore,
    watcher: Option<CatalogWatcher>,
    catalog_rx: Option<mpsc::Receiver<CatalogEvent>>,
    state: UiState,
    theme: Theme,
}

impl ClockApp {
    pub fn new(navigator: MenuNavigator, loader: CatalogLoader, store: SelectionStore) -> Self {
        Self {
            navigator,
            loader,
            store,
            watcher: None,
            catalog_rx: None,
            state: UiState::default(),
            theme: Theme::default(),
        }
    }

    pub fn attach_watcher(
        &mut self,
        watcher: CatalogWatcher,
        receiver: mpsc::Receiver<CatalogEvent>,
    ) {
        self.watcher = Some(watcher);
        self.catalog_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        let banner = self.navigator.enter_top_menu();
        self.state.show(banner);
        let engines = self.navigator.catalog().engine_count();
        let engine = self
            .navigator
            .get_current_engine_name()
            .map(|text| text.large)
            .unwrap_or_else(|| "none".to_string());
        self.state
            .set_status(format!("{engines} engines installed, active: {engine}"));
        if let Some(watcher) = &self.watcher {
            info!(dirs = watcher.watched().len(), "Catalog watcher attached");
        }

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut catalog_rx = self.catalog_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            if let Some(rx) = catalog_rx.as_mut() {
                let mut catalog_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_catalog = rx.recv() => {
                        match maybe_catalog {
                            Some(event) => self.handle_catalog_event(event),
                            None => catalog_closed = true,
                        }
                    }
                }
                if catalog_closed {
                    catalog_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }
        }

        restore_terminal(&mut terminal)?;
        self.watcher = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(Event::Key(key))) => {
                if let Some(command) = command_for(&key) {
                    self.apply_command(command);
                }
                true
            }
            Some(AppEvent::Input(_)) => true,
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            None => false,
        }
    }

    fn handle_tick(&mut self) {
        if self.state.expired() {
            self.state.show(self.navigator.current_text());
        }
    }

    fn apply_command(&mut self, command: Command) {
        let outcome = match command {
            Command::Up => self.navigator.main_up(),
            Command::Down => self.navigator.main_down(),
            Command::Left => self.navigator.main_left(),
            Command::Right => self.navigator.main_right(),
            Command::TopMenu => MenuOutcome::Show(self.navigator.enter_top_menu()),
            Command::Quit => {
                self.state.should_quit = true;
                return;
            }
        };
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&mut self, outcome: MenuOutcome) {
        match outcome {
            MenuOutcome::Show(text) => self.state.show(text),
            MenuOutcome::Committed { selection, ack } => {
                self.state.show(ack);
                let summary = describe(&selection);
                match self.store.persist(self.navigator.memory()) {
                    Ok(_) => self.state.set_status(format!("Selected {summary}")),
                    Err(err) => {
                        error!(?err, "Failed to save selections");
                        self.state
                            .set_status(format!("Selected {summary}, but saving failed: {err}"));
                    }
                }
            }
            MenuOutcome::Exit => {
                info!("Menu closed from top level");
                self.state.should_quit = true;
            }
        }
    }

    fn handle_catalog_event(&mut self, event: CatalogEvent) {
        match event {
            CatalogEvent::Changed { paths } => {
                info!(changed = paths.len(), "Catalog files changed");
                self.loader.refresh();
                match self.loader.catalog() {
                    Ok(catalog) => {
                        let engines = catalog.engine_count();
                        let books = catalog.books.len();
                        self.navigator.set_catalog(catalog);
                        self.state.show(self.navigator.current_text());
                        self.state
                            .set_status(format!("Catalog reloaded: {engines} engines, {books} books"));
                    }
                    Err(err) => {
                        warn!(?err, "Catalog reload failed");
                        self.state.set_status(format!("Catalog reload failed: {err}"));
                    }
                }
            }
            CatalogEvent::Error(err) => {
                error!(?err, "Catalog watcher failed");
                self.state.set_status(format!("Catalog watcher failed: {err}"));
            }
        }
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.size();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(segment_font::FONT_HEIGHT as u16 + 2),
                Constraint::Length(4),
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_clock(frame, layout[0]);
        self.render_variants(frame, layout[1]);
        self.render_position(frame, layout[2]);
        self.render_help(frame, layout[3]);
        self.render_status(frame, layout[4]);
    }

    fn render_clock(&self, frame: &mut Frame, area: Rect) {
        let text = &self.state.display;
        let medium = pad(&text.medium, CLOCK_WIDTH);
        let style = Style::default()
            .fg(self.theme.segment)
            .add_modifier(Modifier::BOLD);
        let lines: Vec<Line> = segment_font::render(&medium)
            .into_iter()
            .map(|row| Line::from(Span::styled(row, style)))
            .collect();

        let mut title = " Clock ".to_string();
        if text.beep {
            title.push_str("♪ ");
        }
        let width = (segment_font::width(CLOCK_WIDTH) as u16 + 2).min(area.width);
        let clock_area = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y,
            width,
            area.height,
        );
        let clock = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(self.theme.accent)),
            )
            .alignment(Alignment::Center);
        frame.render_widget(clock, clock_area);
    }

    fn render_variants(&self, frame: &mut Frame, area: Rect) {
        let text = &self.state.display;
        let label = Style::default().fg(self.theme.muted);
        let value = Style::default().fg(self.theme.primary_fg);
        let lines = vec![
            Line::from(vec![
                Span::styled("large  ", label),
                Span::styled(format!("[{}]", text.large), value),
            ]),
            Line::from(vec![
                Span::styled("small  ", label),
                Span::styled(format!("[{}]", text.small), value),
            ]),
        ];
        let paragraph =
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Display"));
        frame.render_widget(paragraph, area);
    }

    fn render_position(&self, frame: &mut Frame, area: Rect) {
        let mut state_line = vec![Span::styled(
            self.navigator.state().to_string(),
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )];
        if let Some((index, len)) = self.navigator.position() {
            state_line.push(Span::styled(
                format!("  {}/{}", index + 1, len),
                Style::default().fg(self.theme.muted),
            ));
        }

        let engine = self
            .navigator
            .get_current_engine_name()
            .map(|text| text.large)
            .unwrap_or_else(|| "no engine installed".to_string());
        let engine_line = Line::from(vec![
            Span::styled("engine ", Style::default().fg(self.theme.muted)),
            Span::styled(engine, Style::default().fg(self.theme.primary_fg)),
            Span::styled(
                format!("  language {}", self.navigator.translator().language()),
                Style::default().fg(self.theme.muted),
            ),
        ]);

        let paragraph = Paragraph::new(vec![Line::from(state_line), engine_line])
            .block(Block::default().borders(Borders::ALL).title("Menu"));
        frame.render_widget(paragraph, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from("←/h →/l  previous / next"),
            Line::from("↓/j Enter  open or confirm"),
            Line::from("↑/k Esc Backspace  back"),
            Line::from("m  top menu    q  quit"),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Keys"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let style = if self.state.status.contains("failed") {
            Style::default().fg(self.theme.warning)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let paragraph = Paragraph::new(Line::from(Span::styled(self.state.status.clone(), style)))
            .block(Block::default().borders(Borders::ALL).title("Status"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn command_for(key: &KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    let command = match key.code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Esc | KeyCode::Backspace => Command::Up,
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Enter => Command::Down,
        KeyCode::Left | KeyCode::Char('h') => Command::Left,
        KeyCode::Right | KeyCode::Char('l') => Command::Right,
        KeyCode::Char('m') => Command::TopMenu,
        KeyCode::Char('q') => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn describe(selection: &Selection) -> String {
    match selection {
        Selection::Mode { mode } => format!("mode {mode:?}"),
        Selection::Time { control } => format!("time control {control:?}"),
        Selection::Book { file } => format!("book {file}"),
        Selection::Engine {
            file,
            level: Some(level),
            ..
        } => format!("engine {file} at {level}"),
        Selection::Engine { file, .. } => format!("engine {file}"),
        Selection::Language { language } => format!("language {language}"),
        Selection::Beep { beep } => format!("beep {beep:?}"),
    }
}

fn pad(text: &str, width: usize) -> String {
    let mut padded: String = text.chars().take(width).collect();
    let len = padded.chars().count();
    padded.extend(std::iter::repeat(' ').take(width - len));
    padded
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    display: DisplayText,
    shown_at: Instant,
    status: String,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            display: DisplayText {
                large: String::new(),
                medium: String::new(),
                small: String::new(),
                wait: false,
                beep: false,
                maxtime: 0.0,
                devs: Default::default(),
            },
            shown_at: Instant::now(),
            status: "Ready".to_string(),
            should_quit: false,
        }
    }
}

impl UiState {
    fn show(&mut self, text: DisplayText) {
        self.display = text;
        self.shown_at = Instant::now();
    }

    /// Whether a timed message has been on screen long enough.
    fn expired(&self) -> bool {
        self.display.maxtime > 0.0
            && self.shown_at.elapsed().as_secs_f32() >= self.display.maxtime
    }

    fn set_status(&mut self, message: String) {
        self.status = format!("{}  {message}", Local::now().format("%H:%M:%S"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn maps_arrows_and_vi_keys() {
        assert_eq!(command_for(&key(KeyCode::Left)), Some(Command::Left));
        assert_eq!(command_for(&key(KeyCode::Char('l'))), Some(Command::Right));
        assert_eq!(command_for(&key(KeyCode::Enter)), Some(Command::Down));
        assert_eq!(command_for(&key(KeyCode::Esc)), Some(Command::Up));
        assert_eq!(command_for(&key(KeyCode::Char('m'))), Some(Command::TopMenu));
        assert_eq!(command_for(&key(KeyCode::Char('x'))), None);
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn pads_and_truncates_to_clock_width() {
        assert_eq!(pad("Lc0", CLOCK_WIDTH), "Lc0     ");
        assert_eq!(pad("Mep. Milano", CLOCK_WIDTH), "Mep. Mil");
    }

    #[test]
    fn timed_messages_expire() {
        let mut state = UiState::default();
        assert!(!state.expired());
        let mut text = state.display.clone();
        text.maxtime = 0.01;
        state.show(text);
        thread::sleep(Duration::from_millis(20));
        assert!(state.expired());
    }
}
