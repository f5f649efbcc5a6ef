//! Track model, notifications and engine commands.

use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The play state of a single track.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// A track as declared by a note block. Immutable once registered; a new
/// registration under the same id replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDefinition {
    pub id: String,
    pub name: String,
    /// Free-form grouping tag ("music", "ambience", ...). Exclusivity applies per tag.
    pub kind: String,
    pub files: Vec<String>,
    /// Single file: native loop. Several files: restart the playlist at the end.
    pub looping: bool,
    /// Starting this track silences other playing tracks of the same kind.
    pub exclusive: bool,
    /// Play a multi-file playlist in shuffled order.
    pub random: bool,
    /// Track ids to stop when this one starts.
    pub stops: Vec<String>,
    /// Track ids to start when this one starts.
    pub starts: Vec<String>,
}

impl TrackDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        files: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
            files,
            looping: false,
            exclusive: false,
            random: false,
            stops: Vec::new(),
            starts: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.files.is_empty()
    }

    pub fn is_playlist(&self) -> bool {
        self.files.len() > 1
    }
}

/// Mutable state of a registered track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    pub def: TrackDefinition,
    pub play_state: PlayState,
    /// Per-track volume in `[0, 1]`.
    pub volume: f32,
    /// Index into `def.files` of the file currently selected.
    pub current_index: usize,
    pub error: Option<String>,
}

impl TrackState {
    pub fn new(def: TrackDefinition) -> Self {
        Self {
            def,
            play_state: PlayState::Stopped,
            volume: 1.0,
            current_index: 0,
            error: None,
        }
    }

    pub fn current_file(&self) -> Option<&str> {
        self.def.files.get(self.current_index).map(String::as_str)
    }
}

/// Notification kinds a subscriber can listen to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    TrackChanged,
    TracksUpdated,
    MasterVolume,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// One track's state changed.
    TrackChanged(String),
    /// Tracks were added or removed, or a definition was replaced.
    TracksUpdated,
    /// The master volume changed to the given value.
    MasterVolume(f32),
}

impl AudioEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            AudioEvent::TrackChanged(_) => EventKind::TrackChanged,
            AudioEvent::TracksUpdated => EventKind::TracksUpdated,
            AudioEvent::MasterVolume(_) => EventKind::MasterVolume,
        }
    }
}

/// Intents forwarded from the UI to the engine thread.
#[derive(Debug)]
pub enum EngineCmd {
    Register(TrackDefinition),
    /// A surface stopped showing this track; evict it later unless it plays.
    Detach(String),
    /// Pause when playing, play otherwise.
    Toggle(String),
    Stop(String),
    StopAll,
    SetTrackVolume(String, f32),
    SetMasterVolume(f32),
    FadeOutKind { kind: String, fade_ms: u64 },
    FadeInKind { kind: String, fade_ms: u64 },
    FadeOutAll { fade_ms: u64 },
    FadeInAll { fade_ms: u64 },
    SetCrossfade { crossfade_ms: u64 },
    /// Replace the file index used to resolve track files.
    Reindex(crate::vault::VaultIndex),
    /// Fade everything out over `fade_out_ms`, release all audio and exit.
    Quit { fade_out_ms: u64 },
}

/// What the UI reads to render the board.
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub tracks: Vec<TrackState>,
    pub master_volume: f32,
    pub crossfade: Duration,
}

pub type BoardHandle = Arc<Mutex<BoardSnapshot>>;
