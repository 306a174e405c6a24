use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;
use crate::metrics::Timespan;
use crate::session::SessionResult;
use crate::stats::HistoricalStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Menu,
    Settings,
    Typing,
    Results,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum MenuItem {
    Start,
    Settings,
    Statistics,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [
        MenuItem::Start,
        MenuItem::Settings,
        MenuItem::Statistics,
        MenuItem::Exit,
    ];
}

/// Side effect the runner must perform after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    /// Fetch words and play a session of this length.
    Start(Timespan),
    /// Remember this length in the config, then play a session with it.
    Configure(Timespan),
    LoadHistory,
    Quit,
}

/// Screen state outside of a running session.
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub config: Config,
    pub menu_index: usize,
    pub settings_index: usize,
    pub last_result: Option<SessionResult>,
    pub history: Option<HistoricalStatistics>,
    /// One-line notice shown under the menu, e.g. a failed save.
    pub notice: Option<String>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let settings_index = Timespan::CHOICES
            .iter()
            .position(|&secs| secs == config.timespan_secs)
            .unwrap_or(0);

        Self {
            state: AppState::Menu,
            config,
            menu_index: 0,
            settings_index,
            last_result: None,
            history: None,
            notice: None,
        }
    }

    pub fn selected_menu_item(&self) -> MenuItem {
        MenuItem::ALL[self.menu_index.min(MenuItem::ALL.len() - 1)]
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.state {
            AppState::Menu => self.on_menu_key(key.code),
            AppState::Settings => self.on_settings_key(key.code),
            // keystrokes belong to the session driver while typing
            AppState::Typing => Action::None,
            AppState::Results | AppState::History => {
                if matches!(key.code, KeyCode::Tab | KeyCode::Enter | KeyCode::Esc) {
                    self.state = AppState::Menu;
                }
                Action::None
            }
        }
    }

    fn on_menu_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_index = self.menu_index.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_index = (self.menu_index + 1).min(MenuItem::ALL.len() - 1);
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.notice = None;
                match self.selected_menu_item() {
                    MenuItem::Start => Action::Start(self.config.timespan()),
                    MenuItem::Settings => {
                        self.state = AppState::Settings;
                        Action::None
                    }
                    MenuItem::Statistics => Action::LoadHistory,
                    MenuItem::Exit => Action::Quit,
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => Action::Quit,
            _ => Action::None,
        }
    }

    fn on_settings_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.settings_index = self.settings_index.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.settings_index =
                    (self.settings_index + 1).min(Timespan::CHOICES.len() - 1);
                Action::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                match Timespan::from_secs(Timespan::CHOICES[self.settings_index]) {
                    Ok(timespan) => {
                        self.config.timespan_secs = timespan.secs();
                        Action::Configure(timespan)
                    }
                    Err(_) => Action::None,
                }
            }
            KeyCode::Esc => {
                self.state = AppState::Menu;
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn start_typing(&mut self) {
        self.state = AppState::Typing;
    }

    pub fn show_results(&mut self, result: SessionResult) {
        self.last_result = Some(result);
        self.state = AppState::Results;
    }

    pub fn show_history(&mut self, history: HistoricalStatistics) {
        self.history = Some(history);
        self.state = AppState::History;
    }
}
