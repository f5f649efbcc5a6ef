//! Capabilities the engine consumes from its host.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PlaybackError;

/// One playable voice. The engine owns exactly one per registered track.
pub trait PlaybackHandle {
    /// Assign a new source. Playback restarts from the beginning of it.
    fn set_source(&mut self, path: &Path);
    fn has_source(&self) -> bool;
    /// Native looping of the current source.
    fn set_loop(&mut self, looping: bool);
    fn play(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self);
    fn set_position(&mut self, position: Duration) -> Result<(), PlaybackError>;
    fn set_gain(&mut self, gain: f32);
    /// Drop the source and any buffered audio.
    fn release(&mut self);
    /// Report end-of-media once per finished source.
    fn take_ended(&mut self) -> bool;
}

/// Creates playback handles.
pub trait PlaybackBackend {
    fn open(&mut self, id: &str) -> Box<dyn PlaybackHandle>;
}

/// Turns a file reference from a track definition into something playable.
pub trait FileResolver {
    /// Look `path` up as given, then relative to `audio_folder`.
    fn resolve(&self, path: &str, audio_folder: &str) -> Option<PathBuf>;
}
