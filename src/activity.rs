//! File-based activity log for the driver layer.
//!
//! The log is a value handed to whoever records actions; nothing is
//! installed as the global subscriber.

use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr, eyre};
use tracing::Dispatch;

use crate::config::LogConfig;

const ACTIVITY_TARGET: &str = "sysmon::activity";

#[derive(Clone)]
pub struct ActivityLog {
    dispatch: Dispatch,
}

impl ActivityLog {
    /// Appends JSON lines to `path`, creating parent directories as needed.
    pub fn to_file(path: &Path) -> Result<Self> {
        ensure_parent_dir(path)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("cannot open activity log {}", path.display()))?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: File) -> Self {
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .json()
            .with_max_level(tracing::Level::INFO)
            .with_writer(Mutex::new(file))
            .finish();
        Self {
            dispatch: Dispatch::new(subscriber),
        }
    }

    /// An explicit `log_file` wins over the `[log]` section. Opening
    /// failures are errors, never a silent fallback to `disabled`.
    pub fn from_settings(log_file: Option<&Path>, settings: &LogConfig) -> Result<Self> {
        if let Some(path) = log_file {
            return Self::to_file(path);
        }
        if !settings.enabled {
            return Ok(Self::disabled());
        }
        match settings.path {
            Some(ref path) => Self::to_file(path),
            None => Err(eyre!(
                "activity log is enabled but no log path is configured"
            )),
        }
    }

    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    pub fn record(&self, action: &str, detail: &str) {
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::info!(target: ACTIVITY_TARGET, action, detail, "activity");
        });
    }

    pub fn failure(&self, action: &str, err: &dyn Display) {
        let error = err.to_string();
        tracing::dispatcher::with_default(&self.dispatch, || {
            tracing::warn!(target: ACTIVITY_TARGET, action, error = error.as_str(), "activity failed");
        });
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_json_lines() {
        let dir = std::env::temp_dir().join(format!("sysmon_activity_{}", std::process::id()));
        let path = dir.join("nested").join("activity.log");
        let _ = fs::remove_dir_all(&dir);

        let log = ActivityLog::to_file(&path).unwrap();
        log.record("cpu_usage", "window=1000ms");
        log.failure("top_processes", &"registry unreadable");

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["fields"]["action"], "cpu_usage");
        assert_eq!(lines[0]["fields"]["detail"], "window=1000ms");
        assert_eq!(lines[0]["level"], "INFO");
        assert_eq!(lines[1]["fields"]["error"], "registry unreadable");
        assert_eq!(lines[1]["level"], "WARN");

        let _ = fs::remove_dir_all(&dir);
    }

    fn temp_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "sysmon_activity_{tag}_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn unopenable_path_is_an_error() {
        let dir = temp_dir("blocked");
        let blocker = dir.join("not_a_dir");
        fs::write(&blocker, "plain file").unwrap();

        assert!(ActivityLog::to_file(&blocker.join("activity.log")).is_err());

        let settings = LogConfig {
            enabled: true,
            path: Some(blocker.join("activity.log")),
        };
        assert!(ActivityLog::from_settings(None, &settings).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn enabled_without_path_is_an_error() {
        let settings = LogConfig {
            enabled: true,
            path: None,
        };
        let err = ActivityLog::from_settings(None, &settings)
            .err()
            .expect("missing path rejected");
        assert!(err.to_string().contains("no log path"));
    }

    #[test]
    fn disabled_settings_open_nothing() {
        let dir = temp_dir("disabled");
        let path = dir.join("activity.log");
        let settings = LogConfig {
            enabled: false,
            path: Some(path.clone()),
        };

        let log = ActivityLog::from_settings(None, &settings).unwrap();
        log.record("menu_start", "/proc");
        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn explicit_file_overrides_disabled_settings() {
        let dir = temp_dir("explicit");
        let path = dir.join("cli.log");
        let settings = LogConfig {
            enabled: false,
            path: None,
        };

        let log = ActivityLog::from_settings(Some(&path), &settings).unwrap();
        log.record("menu_start", "/proc");
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("menu_start"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn disabled_log_is_silent() {
        let log = ActivityLog::disabled();
        log.record("menu", "noop");
    }
}
