use std::collections::VecDeque;
use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::action::Action;
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::system::collector::Collector;
use crate::system::snapshot::MonitorSnapshot;
use crate::system::source::{HostSource, ProcFs, clock_ticks_per_second};
use crate::ui::theme::Theme;

const CPU_HISTORY_CAPACITY: usize = 120;
const STATUS_TTL_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub refresh: KeyCode,
    pub pause: KeyCode,
    pub more: KeyCode,
    pub fewer: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::Char('r')),
            pause: parse_key(&kb.pause).unwrap_or(KeyCode::Char('p')),
            more: parse_key(&kb.more).unwrap_or(KeyCode::Char('+')),
            fewer: parse_key(&kb.fewer).unwrap_or(KeyCode::Char('-')),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Returns (key_label, description) pairs for all configurable keybinds.
    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        vec![
            (key_label(self.quit), "Quit"),
            (key_label(self.refresh), "Refresh now"),
            (key_label(self.pause), "Pause / resume"),
            (key_label(self.more), "Show more processes"),
            (key_label(self.fewer), "Show fewer processes"),
            (key_label(self.help), "Toggle help"),
            ("Esc".to_string(), "Quit"),
            ("Ctrl+C".to_string(), "Quit (always)"),
        ]
    }
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

/// State of the continuous-monitoring view.
pub struct App<S: HostSource + Clone = ProcFs> {
    pub running: bool,
    pub paused: bool,
    pub collector: Collector<S>,
    pub snapshot: MonitorSnapshot,
    pub cpu_history: VecDeque<u64>,
    cpu_history_capacity: usize,
    pub input_mode: InputMode,
    pub status_message: Option<(String, Instant)>,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    pub ticks_per_second: u64,
    pub refresh_rate_ms: u64,
}

impl<S: HostSource + Clone> App<S> {
    pub fn new(collector: Collector<S>, config: &Config) -> Self {
        let mut app = App {
            running: true,
            paused: false,
            collector,
            snapshot: MonitorSnapshot::default(),
            cpu_history: VecDeque::with_capacity(CPU_HISTORY_CAPACITY),
            cpu_history_capacity: CPU_HISTORY_CAPACITY,
            input_mode: InputMode::Normal,
            status_message: None,
            theme: Theme::from_config(&config.general.theme),
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            ticks_per_second: clock_ticks_per_second(),
            refresh_rate_ms: config.general.refresh_rate_ms,
        };
        app.refresh_data();
        app
    }

    pub fn refresh_data(&mut self) {
        match self.collector.refresh() {
            Ok(snapshot) => {
                if snapshot.cpu_ready {
                    let cpu_val = (snapshot.cpu.active * 100.0) as u64;
                    if self.cpu_history.len() == self.cpu_history_capacity {
                        self.cpu_history.pop_front();
                    }
                    self.cpu_history.push_back(cpu_val);
                }
                self.snapshot = snapshot;
            }
            Err(err) => self.set_status(format!("Refresh failed: {err}")),
        }
        self.expire_status();
    }

    pub fn on_tick(&mut self) {
        if self.paused {
            self.expire_status();
        } else {
            self.refresh_data();
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits (hardwired safety)
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        if code == kb.quit || code == KeyCode::Esc {
            return Action::Quit;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }
        if code == kb.pause {
            return Action::TogglePause;
        }
        if code == kb.more {
            return Action::MoreProcesses;
        }
        if code == kb.fewer {
            return Action::FewerProcesses;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }

        Action::None
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        if key.code == self.keybinds.help || key.code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Refresh => self.refresh_data(),
            Action::TogglePause => {
                self.paused = !self.paused;
                let msg = if self.paused { "Paused" } else { "Resumed" };
                self.set_status(msg.to_string());
            }
            Action::MoreProcesses => {
                self.collector
                    .set_top_limit(self.collector.top_limit().saturating_add(1));
                self.refresh_data();
            }
            Action::FewerProcesses => {
                let limit = self.collector.top_limit();
                if limit > 1 {
                    self.collector.set_top_limit(limit - 1);
                    self.refresh_data();
                }
            }
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::None => {}
        }
    }

    pub fn top_limit(&self) -> usize {
        self.collector.top_limit()
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_entries(&self) -> Vec<(String, &'static str)> {
        self.keybinds.help_entries()
    }

    fn set_status(&mut self, msg: String) {
        self.status_message = Some((msg, Instant::now()));
    }

    fn expire_status(&mut self) {
        if let Some((_, created)) = &self.status_message
            && created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::collector::MAX_TOP_LIMIT;
    use crate::system::testing::{FakeHost, cpu_line};

    fn host() -> FakeHost {
        FakeHost::new()
            .with_cpu_stats([
                cpu_line([0, 0, 0, 0, 0, 0, 0, 0]),
                cpu_line([50, 0, 0, 50, 0, 0, 0, 0]),
            ])
            .with_process(1, "init", 1, 1)
            .with_process(2, "compiler", 900, 100)
            .with_process(3, "shell", 10, 5)
    }

    fn make_app(host: &FakeHost, limit: usize) -> App<&FakeHost> {
        App::new(Collector::new(host, limit), &Config::default())
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn new_app_holds_first_snapshot() {
        let host = host();
        let app = make_app(&host, 2);
        assert_eq!(app.snapshot.top.len(), 2);
        assert_eq!(app.snapshot.top.processes[0].pid, 2);
        assert!(!app.snapshot.cpu_ready);
        assert!(app.cpu_history.is_empty());
        assert!(app.running);
    }

    #[test]
    fn tick_refreshes_unless_paused() {
        let host = host();
        let mut app = make_app(&host, 5);
        app.on_tick();
        assert!(app.snapshot.cpu_ready);
        assert_eq!(app.cpu_history.len(), 1);
        assert_eq!(app.cpu_history.back(), Some(&5000));

        app.dispatch(Action::TogglePause);
        assert!(app.paused);
        app.on_tick();
        assert_eq!(app.cpu_history.len(), 1);
    }

    #[test]
    fn more_and_fewer_adjust_limit() {
        let host = host();
        let mut app = make_app(&host, 1);
        app.dispatch(Action::MoreProcesses);
        assert_eq!(app.top_limit(), 2);
        assert_eq!(app.snapshot.top.len(), 2);

        app.dispatch(Action::FewerProcesses);
        app.dispatch(Action::FewerProcesses);
        assert_eq!(app.top_limit(), 1);

        app.collector.set_top_limit(MAX_TOP_LIMIT);
        app.dispatch(Action::MoreProcesses);
        assert_eq!(app.top_limit(), MAX_TOP_LIMIT);
    }

    #[test]
    fn refresh_failure_becomes_status_message() {
        let host = FakeHost::new().with_process(1, "init", 1, 1);
        let app = make_app(&host, 5);
        let (msg, _) = app.status_message.as_ref().expect("status message");
        assert!(msg.starts_with("Refresh failed"));
        assert!(app.snapshot.top.is_empty());
    }

    #[test]
    fn default_keybinds() {
        let host = host();
        let app = make_app(&host, 5);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Esc)), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(app.map_key(press(KeyCode::Char('p'))), Action::TogglePause);
        assert_eq!(app.map_key(press(KeyCode::Char('+'))), Action::MoreProcesses);
        assert_eq!(app.map_key(press(KeyCode::Char('-'))), Action::FewerProcesses);
        assert_eq!(app.map_key(press(KeyCode::Char('x'))), Action::None);

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);
    }

    #[test]
    fn custom_keybind_remap_works() {
        let host = host();
        let mut app = make_app(&host, 5);
        app.keybinds.quit = KeyCode::Char('x');
        assert_eq!(app.map_key(press(KeyCode::Char('x'))), Action::Quit);
        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let host = host();
        let mut app = make_app(&host, 5);
        app.dispatch(Action::ToggleHelp);
        assert!(app.show_help());

        assert_eq!(app.map_key(press(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.map_key(press(KeyCode::Char('?'))), Action::ToggleHelp);
        assert_eq!(app.map_key(press(KeyCode::Esc)), Action::ToggleHelp);

        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(app.map_key(key), Action::Quit);

        app.dispatch(Action::ToggleHelp);
        assert!(!app.show_help());
    }

    #[test]
    fn quit_stops_running() {
        let host = host();
        let mut app = make_app(&host, 5);
        app.dispatch(Action::Quit);
        assert!(!app.running);
    }
}
