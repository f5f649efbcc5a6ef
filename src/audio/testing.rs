//! In-memory playback capabilities for tests.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::clock::ManualClock;
use crate::error::PlaybackError;

use super::handle::{FileResolver, PlaybackBackend, PlaybackHandle};
use super::manager::{AudioManager, EngineOptions};
use super::types::{AudioEvent, EventKind, TrackDefinition};

/// What a fake handle has been told to do.
#[derive(Debug, Default, Clone)]
pub struct HandleLog {
    pub source: Option<PathBuf>,
    pub sources_set: usize,
    pub looping: bool,
    pub playing: bool,
    pub gain: f32,
    pub releases: usize,
    pub ended: bool,
}

type Shared<T> = Rc<RefCell<T>>;

#[derive(Clone, Default)]
pub struct FakeBackend {
    handles: Shared<HashMap<String, Shared<HandleLog>>>,
    failing: Shared<HashSet<String>>,
}

impl FakeBackend {
    pub fn log(&self, id: &str) -> HandleLog {
        self.handles
            .borrow()
            .get(id)
            .map(|log| log.borrow().clone())
            .unwrap_or_else(|| panic!("no handle opened for {id}"))
    }

    /// Make every later `play` on `id` fail.
    pub fn fail_play(&self, id: &str) {
        self.failing.borrow_mut().insert(id.to_string());
    }

    /// Simulate the current source of `id` running out.
    pub fn finish(&self, id: &str) {
        if let Some(log) = self.handles.borrow().get(id) {
            log.borrow_mut().ended = true;
        }
    }
}

impl PlaybackBackend for FakeBackend {
    fn open(&mut self, id: &str) -> Box<dyn PlaybackHandle> {
        let log = Rc::new(RefCell::new(HandleLog {
            gain: 1.0,
            ..HandleLog::default()
        }));
        self.handles.borrow_mut().insert(id.to_string(), log.clone());
        Box::new(FakeHandle {
            id: id.to_string(),
            log,
            failing: self.failing.clone(),
        })
    }
}

struct FakeHandle {
    id: String,
    log: Shared<HandleLog>,
    failing: Shared<HashSet<String>>,
}

impl PlaybackHandle for FakeHandle {
    fn set_source(&mut self, path: &Path) {
        let mut log = self.log.borrow_mut();
        log.source = Some(path.to_path_buf());
        log.sources_set += 1;
        log.playing = false;
        log.ended = false;
    }

    fn has_source(&self) -> bool {
        self.log.borrow().source.is_some()
    }

    fn set_loop(&mut self, looping: bool) {
        self.log.borrow_mut().looping = looping;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.failing.borrow().contains(&self.id) {
            return Err(PlaybackError::Open {
                path: self.log.borrow().source.clone().unwrap_or_default(),
                source: io::Error::other("device busy"),
            });
        }
        let mut log = self.log.borrow_mut();
        if log.source.is_none() {
            return Err(PlaybackError::NoSource);
        }
        log.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.log.borrow_mut().playing = false;
    }

    fn set_position(&mut self, _position: Duration) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn set_gain(&mut self, gain: f32) {
        self.log.borrow_mut().gain = gain;
    }

    fn release(&mut self) {
        let mut log = self.log.borrow_mut();
        log.source = None;
        log.playing = false;
        log.releases += 1;
    }

    fn take_ended(&mut self) -> bool {
        let mut log = self.log.borrow_mut();
        if log.ended && log.playing {
            log.ended = false;
            log.playing = false;
            return true;
        }
        false
    }
}

/// Resolves only the paths it was given, as-is or under the audio folder.
pub struct SetResolver(HashSet<String>);

impl SetResolver {
    pub fn with(files: &[&str]) -> Self {
        Self(files.iter().map(|f| f.to_string()).collect())
    }
}

impl FileResolver for SetResolver {
    fn resolve(&self, path: &str, audio_folder: &str) -> Option<PathBuf> {
        if self.0.contains(path) {
            return Some(PathBuf::from(path));
        }
        let nested = format!("{audio_folder}/{path}");
        self.0.contains(&nested).then(|| PathBuf::from(nested))
    }
}

pub const FRAME: Duration = Duration::from_millis(16);

pub struct Harness {
    pub manager: AudioManager,
    pub backend: FakeBackend,
    pub clock: ManualClock,
    pub events: Shared<Vec<AudioEvent>>,
}

/// A manager over fake playback that resolves `files`.
pub fn harness(files: &[&str], crossfade_ms: u64) -> Harness {
    let backend = FakeBackend::default();
    let clock = ManualClock::new();
    let options = EngineOptions {
        crossfade: Duration::from_millis(crossfade_ms),
        frame: FRAME,
        ..EngineOptions::default()
    };
    let mut manager = AudioManager::new(
        options,
        Box::new(SetResolver::with(files)),
        Box::new(backend.clone()),
        Box::new(clock.clone()),
    );

    let events: Shared<Vec<AudioEvent>> = Rc::default();
    for kind in [
        EventKind::TrackChanged,
        EventKind::TracksUpdated,
        EventKind::MasterVolume,
    ] {
        let events = events.clone();
        manager.subscribe(kind, move |e| events.borrow_mut().push(e.clone()));
    }

    Harness {
        manager,
        backend,
        clock,
        events,
    }
}

impl Harness {
    /// Advance simulated time frame by frame, pumping after each step.
    pub fn run_for(&mut self, total: Duration) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            self.clock.advance(FRAME);
            self.manager.pump();
            elapsed += FRAME;
        }
    }

    /// End the current source of `id` and let the manager notice.
    pub fn finish(&mut self, id: &str) {
        self.backend.finish(id);
        self.manager.pump();
    }

    pub fn take_events(&self) -> Vec<AudioEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }
}

pub fn track(id: &str, kind: &str, files: &[&str]) -> TrackDefinition {
    TrackDefinition::new(
        id,
        id.to_uppercase(),
        kind,
        files.iter().map(|f| f.to_string()).collect(),
    )
}
