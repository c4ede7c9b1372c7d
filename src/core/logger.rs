//! Logging setup for the dashboard.

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::setting::SETTINGS;
use super::utility::get_folder_path;

/// Level used when `log.level` is missing or unreadable
const DEFAULT_LEVEL: Level = Level::INFO;

/// Parse a `log.level` value such as `"debug"` or `"WARN"`
fn parse_level(value: &str) -> Level {
    value.trim().parse().unwrap_or(DEFAULT_LEVEL)
}

/// Initialize the global subscriber from settings.
///
/// Falls back to console-only output when the log file cannot be opened.
pub fn init_logger() {
    let level = SETTINGS
        .get_string("log.level")
        .map(|value| parse_level(&value))
        .unwrap_or(DEFAULT_LEVEL);
    let log_console = SETTINGS.get_bool("log.console").unwrap_or(true);
    let log_file = SETTINGS.get_bool("log.file").unwrap_or(true);

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let file = if log_file { open_log_file() } else { None };
    let console_layer = (log_console || file.is_none()).then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(true)
    });
    let file_layer = file.map(|file| {
        fmt::layer()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
    });

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    if let Err(e) = result {
        eprintln!("logger already initialised: {}", e);
    }
}

fn open_log_file() -> Option<File> {
    let log_path = get_log_file_path();
    if let Some(parent) = log_path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("cannot open log file {}: {}", log_path.display(), e);
            None
        }
    }
}

/// Get the log file path for today
fn get_log_file_path() -> PathBuf {
    let log_folder = get_folder_path("log");
    let today = Local::now().format("%Y%m%d").to_string();
    let filename = format!("fxdash_{}.log", today);
    log_folder.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("error"), Level::ERROR);
        assert_eq!(parse_level("loud"), DEFAULT_LEVEL);
    }
}
