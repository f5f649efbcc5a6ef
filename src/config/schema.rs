use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/rpg-audio/config.toml` or `~/.config/rpg-audio/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RPG_AUDIO__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub vault: VaultSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial master volume in `[0, 1]`.
    pub master_volume: f32,
    /// Crossfade between exclusive tracks of the same type (milliseconds).
    /// Set to 0 to cut instead.
    pub crossfade_ms: u64,
    /// How long a track may sit idle after its note went away before it is
    /// evicted (milliseconds).
    pub orphan_grace_ms: u64,
    /// Fade frame cadence (milliseconds).
    pub frame_ms: u64,
    /// How often playing tracks are checked for end-of-media (milliseconds).
    pub end_poll_ms: u64,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl AudioSettings {
    pub fn crossfade(&self) -> Duration {
        Duration::from_millis(self.crossfade_ms)
    }

    pub fn orphan_grace(&self) -> Duration {
        Duration::from_millis(self.orphan_grace_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }

    pub fn end_poll(&self) -> Duration {
        Duration::from_millis(self.end_poll_ms)
    }

    pub fn quit_fade_out(&self) -> Duration {
        Duration::from_millis(self.quit_fade_out_ms)
    }
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            crossfade_ms: 2000,
            orphan_grace_ms: 2000,
            frame_ms: 16,
            end_poll_ms: 200,
            quit_fade_out_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VaultSettings {
    /// Vault-relative folder that file references are also looked up in.
    pub audio_folder: String,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// File extensions of notes that may hold track blocks.
    pub note_extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for VaultSettings {
    fn default() -> Self {
        Self {
            audio_folder: "audio".to_string(),
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            note_extensions: vec!["md".into()],
            follow_links: true,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// Volume change per key press for track and master volume.
    pub volume_step: f32,
    /// Duration of the manual fade in/out keys (milliseconds).
    pub fade_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ rpg-audio ~ ".to_string(),
            volume_step: 0.05,
            fade_ms: 1500,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Log file. Without one, logs are discarded since the UI owns the terminal.
    pub file: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `rpg_audio=debug`.
    pub filter: Option<String>,
}
