use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LogSettings;
use crate::error::{Error, Result};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "RPG_AUDIO_LOG";

const DEFAULT_FILTER: &str = "rpg_audio=info";

/// Filter from `RPG_AUDIO_LOG`, else the configured directive, else the default.
pub fn filter(settings: &LogSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::new(settings.filter.as_deref().unwrap_or(DEFAULT_FILTER))
    })
}

/// Install the global subscriber.
///
/// The TUI owns the terminal, so without a log file nothing is installed and
/// events are discarded.
pub fn init(settings: &LogSettings) -> Result<()> {
    let Some(path) = &settings.file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(settings))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
