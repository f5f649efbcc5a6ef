use crate::config;

/// Load settings, falling back to defaults when they are missing or invalid.
///
/// Runs before logging is set up, so problems go to stderr.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("rpg-audio: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the app from starting.
            eprintln!("rpg-audio: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}

/// Engine tunables derived from the `[audio]` and `[vault]` tables.
pub fn engine_options(settings: &config::Settings) -> crate::audio::EngineOptions {
    crate::audio::EngineOptions {
        master_volume: settings.audio.master_volume,
        crossfade: settings.audio.crossfade(),
        orphan_grace: settings.audio.orphan_grace(),
        frame: settings.audio.frame(),
        audio_folder: settings.vault.audio_folder.clone(),
    }
}
