use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub log: LogConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub sample_window_ms: u64,
    pub top_limit: usize,
    pub refresh_rate_ms: u64,
    pub proc_root: PathBuf,
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            sample_window_ms: 1000,
            top_limit: 5,
            refresh_rate_ms: 2000,
            proc_root: PathBuf::from("/proc"),
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub path: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            enabled: false,
            path: default_log_path(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub refresh: String,
    pub pause: String,
    pub more: String,
    pub fewer: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            refresh: "r".to_string(),
            pause: "p".to_string(),
            more: "+".to_string(),
            fewer: "-".to_string(),
            help: "?".to_string(),
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sysmon").join("config.toml"))
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("sysmon").join("activity.log"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

/// Parses a keybind name such as `"q"`, `"Enter"` or `"Esc"`.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "space" => Some(KeyCode::Char(' ')),
        "tab" => Some(KeyCode::Tab),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.sample_window_ms, 1000);
        assert_eq!(config.general.top_limit, 5);
        assert_eq!(config.general.refresh_rate_ms, 2000);
        assert_eq!(config.general.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.general.theme, "dark");
        assert!(!config.log.enabled);
        assert_eq!(config.keybinds.quit, "q");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
top_limit = 10
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.top_limit, 10);
        // Other fields should be defaults
        assert_eq!(config.general.sample_window_ms, 1000);
        assert_eq!(config.keybinds.refresh, "r");
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
sample_window_ms = 250
top_limit = 8
refresh_rate_ms = 500
proc_root = "/host/proc"
theme = "light"

[log]
enabled = true
path = "/var/log/sysmon.log"

[keybinds]
quit = "x"
pause = "space"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.sample_window_ms, 250);
        assert_eq!(config.general.top_limit, 8);
        assert_eq!(config.general.refresh_rate_ms, 500);
        assert_eq!(config.general.proc_root, PathBuf::from("/host/proc"));
        assert_eq!(config.general.theme, "light");
        assert!(config.log.enabled);
        assert_eq!(config.log.path, Some(PathBuf::from("/var/log/sysmon.log")));
        assert_eq!(config.keybinds.quit, "x");
        assert_eq!(parse_key(&config.keybinds.pause), Some(KeyCode::Char(' ')));
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.top_limit, 5);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("sysmon_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.sample_window_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }

    #[test]
    fn key_names() {
        assert_eq!(parse_key("q"), Some(KeyCode::Char('q')));
        assert_eq!(parse_key("+"), Some(KeyCode::Char('+')));
        assert_eq!(parse_key("Escape"), Some(KeyCode::Esc));
        assert_eq!(parse_key("Enter"), Some(KeyCode::Enter));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key(""), None);
    }
}
