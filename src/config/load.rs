use std::env;
use std::path::PathBuf;

use super::schema::Settings;

/// Prefix of the variables that override single settings, e.g.
/// `RPG_AUDIO__AUDIO__CROSSFADE_MS`.
const ENV_PREFIX: &str = "RPG_AUDIO";
/// Points at a config file outside the XDG location.
const PATH_VAR: &str = "RPG_AUDIO_CONFIG_PATH";

impl Settings {
    /// Layer the config file (if any) under environment overrides, on top of
    /// the serde defaults.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = resolve_config_path() {
            // A missing file just means defaults.
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.frame_ms == 0 {
            return Err("audio.frame_ms must be >= 1".to_string());
        }
        if self.audio.end_poll_ms == 0 {
            return Err("audio.end_poll_ms must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.master_volume) {
            return Err("audio.master_volume must be within [0, 1]".to_string());
        }
        Ok(())
    }
}

/// Where the config file is read from. `RPG_AUDIO_CONFIG_PATH` wins; otherwise
/// the XDG location.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `rpg-audio/config.toml` under the user's config directory
/// (`$XDG_CONFIG_HOME`, else `$HOME/.config`).
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("rpg-audio").join("config.toml"))
}
