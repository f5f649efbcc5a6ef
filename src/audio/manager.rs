//! The playback orchestrator.
//!
//! `AudioManager` owns every track, every playback handle and every fade. All
//! calls happen on one thread; time-driven work (fade frames, end-of-media,
//! orphan deadlines) is done in [`AudioManager::pump`], which the host calls
//! whenever [`AudioManager::next_wakeup`] says something is due.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::clock::Clock;
use crate::error::TrackError;
use crate::fade::{DEFAULT_FRAME, FadeEngine, FadeOutcome};

use super::bus::{EventBus, SubscriptionId};
use super::handle::{FileResolver, PlaybackBackend};
use super::mixer::Mixer;
use super::orphans::OrphanTimers;
use super::queue::{ShuffleOrder, next_sequential};
use super::types::{AudioEvent, EventKind, PlayState, TrackDefinition, TrackState};

/// Tunables the manager is created with.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub master_volume: f32,
    /// Crossfade between exclusive tracks of the same kind. Zero cuts instead.
    pub crossfade: Duration,
    /// How long a detached track may sit idle before it is evicted.
    pub orphan_grace: Duration,
    /// Fade frame cadence.
    pub frame: Duration,
    /// Folder that relative file references are also looked up in.
    pub audio_folder: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            crossfade: Duration::from_millis(2000),
            orphan_grace: Duration::from_millis(2000),
            frame: DEFAULT_FRAME,
            audio_folder: String::new(),
        }
    }
}

/// What to do with a track once its fade reaches the target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FadeFollowUp {
    Stop,
    Pause,
    /// Nothing beyond dropping the multiplier.
    Settle,
}

pub struct AudioManager {
    mixer: Mixer,
    fades: FadeEngine<String, Mixer>,
    follow_ups: HashMap<String, FadeFollowUp>,
    orphans: OrphanTimers,
    shuffles: HashMap<String, ShuffleOrder>,
    bus: EventBus,
    resolver: Box<dyn FileResolver>,
    backend: Box<dyn PlaybackBackend>,
    clock: Box<dyn Clock>,
    rng: StdRng,
    audio_folder: String,
    crossfade: Duration,
    orphan_grace: Duration,
}

impl AudioManager {
    pub fn new(
        options: EngineOptions,
        resolver: Box<dyn FileResolver>,
        backend: Box<dyn PlaybackBackend>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self {
            mixer: Mixer::new(options.master_volume),
            fades: FadeEngine::new(options.frame),
            follow_ups: HashMap::new(),
            orphans: OrphanTimers::default(),
            shuffles: HashMap::new(),
            bus: EventBus::new(),
            resolver,
            backend,
            clock,
            rng: StdRng::from_entropy(),
            audio_folder: options.audio_folder,
            crossfade: options.crossfade,
            orphan_grace: options.orphan_grace,
        }
    }

    // ---- configuration -------------------------------------------------

    pub fn set_audio_folder(&mut self, folder: impl Into<String>) {
        self.audio_folder = folder.into();
    }

    pub fn set_crossfade(&mut self, crossfade: Duration) {
        self.crossfade = crossfade;
    }

    pub fn crossfade(&self) -> Duration {
        self.crossfade
    }

    pub fn set_resolver(&mut self, resolver: Box<dyn FileResolver>) {
        self.resolver = resolver;
    }

    // ---- notifications -------------------------------------------------

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&AudioEvent) + 'static,
    {
        self.bus.subscribe(kind, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    fn emit_track(&mut self, id: &str) {
        self.bus.emit(&AudioEvent::TrackChanged(id.to_string()));
    }

    // ---- introspection -------------------------------------------------

    /// Snapshot of every track in registration order.
    pub fn all_tracks(&self) -> Vec<TrackState> {
        self.mixer.registry.iter().cloned().collect()
    }

    pub fn track(&self, id: &str) -> Option<TrackState> {
        self.mixer.registry.get(id).cloned()
    }

    #[cfg(test)]
    pub fn fade_multiplier(&self, id: &str) -> Option<f32> {
        self.mixer.multiplier(id)
    }

    #[cfg(test)]
    pub fn effective_volume(&self, id: &str) -> Option<f32> {
        self.mixer.effective_volume(id)
    }

    pub fn is_fading(&self, id: &str) -> bool {
        self.fades.is_active(&id.to_string())
    }

    pub fn has_playing(&self) -> bool {
        self.mixer
            .registry
            .iter()
            .any(|s| s.play_state == PlayState::Playing)
    }

    // ---- registration --------------------------------------------------

    pub fn register(&mut self, def: TrackDefinition) {
        if !def.is_valid() {
            warn!(track = %def.id, "ignoring track definition without id or files");
            return;
        }
        self.orphans.cancel(&def.id);

        let id = def.id.clone();
        let len = def.files.len();
        if self.mixer.registry.upsert(def) {
            debug!(track = %id, "registered");
        } else if self.shuffles.get(&id).is_some_and(|o| !o.fits(len)) {
            self.shuffles.remove(&id);
        }
        self.bus.emit(&AudioEvent::TracksUpdated);
    }

    pub fn unregister(&mut self, id: &str) {
        if !self.mixer.registry.contains(id) {
            return;
        }
        self.orphans.cancel(id);
        self.cancel_fade(id);
        self.stop(id);
        self.shuffles.remove(id);
        self.mixer.registry.remove(id);
        debug!(track = id, "unregistered");
        self.bus.emit(&AudioEvent::TracksUpdated);
    }

    // ---- transport -----------------------------------------------------

    pub fn play(&mut self, id: &str) {
        let mut chain = Vec::new();
        self.play_chain(id, &mut chain);
    }

    /// `chain` holds every track started by the current trigger cascade so
    /// that `starts` cycles terminate.
    fn play_chain(&mut self, id: &str, chain: &mut Vec<String>) {
        chain.push(id.to_string());
        let Some(state) = self.mixer.registry.get(id) else {
            return;
        };
        let def = state.def.clone();
        let prior = state.play_state;

        let crossfading = def.exclusive && self.silence_rivals(&def);

        if prior == PlayState::Stopped {
            self.prepare_order(id, &def);
        }
        let Some(file) = self
            .mixer
            .registry
            .get(id)
            .and_then(|s| s.current_file())
            .map(str::to_string)
        else {
            return;
        };

        let Some(path) = self.resolver.resolve(&file, &self.audio_folder) else {
            warn!(track = id, file = %file, "file not found");
            self.fail(id, TrackError::NotFound(file));
            return;
        };

        let handle = self.mixer.registry.ensure_handle(id, self.backend.as_mut());
        if !(prior == PlayState::Paused && handle.has_source()) {
            handle.set_source(&path);
            handle.set_loop(def.looping && !def.is_playlist());
        }
        if let Err(e) = handle.play() {
            warn!(track = id, error = %e, "failed to start playback");
            self.fail(id, TrackError::PlaybackFailed(file));
            return;
        }

        if let Some(state) = self.mixer.registry.get_mut(id) {
            state.play_state = PlayState::Playing;
            state.error = None;
        }
        // Playing again overrides a fade-out still heading for stop or pause.
        if matches!(
            self.follow_ups.get(id),
            Some(FadeFollowUp::Stop | FadeFollowUp::Pause)
        ) {
            self.cancel_fade(id);
        }
        if crossfading {
            self.fade_in(id, self.crossfade);
        } else {
            self.mixer.apply_volume(id);
        }
        self.emit_track(id);
        self.run_triggers(&def, chain);
    }

    /// Stop or fade out every other playing track of the same kind. Returns
    /// whether a crossfade was started.
    fn silence_rivals(&mut self, def: &TrackDefinition) -> bool {
        let rivals: Vec<String> = self
            .mixer
            .registry
            .iter()
            .filter(|s| {
                s.def.id != def.id && s.def.kind == def.kind && s.play_state == PlayState::Playing
            })
            .map(|s| s.def.id.clone())
            .collect();

        let mut crossfading = false;
        for rival in rivals {
            if self.crossfade.is_zero() {
                self.stop(&rival);
            } else {
                let from = self.mixer.multiplier(&rival).unwrap_or(1.0);
                self.start_fade(&rival, from, 0.0, self.crossfade, FadeFollowUp::Stop);
                crossfading = true;
            }
        }
        crossfading
    }

    /// Pick the starting file for a track leaving `Stopped`.
    fn prepare_order(&mut self, id: &str, def: &TrackDefinition) {
        if !(def.random && def.is_playlist()) {
            self.shuffles.remove(id);
            if let Some(state) = self.mixer.registry.get_mut(id) {
                state.current_index = 0;
            }
            return;
        }
        let order = ShuffleOrder::new(def.files.len(), &mut self.rng);
        if let Some(state) = self.mixer.registry.get_mut(id) {
            state.current_index = order.current();
        }
        self.shuffles.insert(id.to_string(), order);
    }

    fn run_triggers(&mut self, def: &TrackDefinition, chain: &mut Vec<String>) {
        for other in &def.stops {
            if *other != def.id {
                self.stop(other);
            }
        }
        for other in &def.starts {
            if chain.contains(other) {
                continue;
            }
            let playing = self
                .mixer
                .registry
                .get(other)
                .is_some_and(|s| s.play_state == PlayState::Playing);
            if !playing {
                self.play_chain(other, chain);
            }
        }
    }

    /// Record a resolution or start failure and settle the track at the start
    /// of its playlist. The handle is left as it was.
    fn fail(&mut self, id: &str, error: TrackError) {
        self.shuffles.remove(id);
        if let Some(state) = self.mixer.registry.get_mut(id) {
            state.error = Some(error.to_string());
            state.play_state = PlayState::Stopped;
            state.current_index = 0;
        }
        self.emit_track(id);
    }

    pub fn pause(&mut self, id: &str) {
        let Some(state) = self.mixer.registry.get_mut(id) else {
            return;
        };
        if state.play_state != PlayState::Playing {
            return;
        }
        state.play_state = PlayState::Paused;
        if let Some(handle) = self.mixer.registry.handle_mut(id) {
            handle.pause();
        }
        self.emit_track(id);
    }

    /// Stop and rewind. Does nothing for a track that is already settled.
    pub fn stop(&mut self, id: &str) {
        let Some(state) = self.mixer.registry.get(id) else {
            return;
        };
        let settled = state.play_state == PlayState::Stopped
            && state.current_index == 0
            && state.error.is_none()
            && !self.is_fading(id)
            && self.mixer.multiplier(id).is_none();
        if settled {
            return;
        }

        self.cancel_fade(id);
        if let Some(handle) = self.mixer.registry.handle_mut(id) {
            handle.pause();
            if let Err(e) = handle.set_position(Duration::ZERO) {
                debug!(track = id, error = %e, "rewind failed");
            }
        }
        self.shuffles.remove(id);
        if let Some(state) = self.mixer.registry.get_mut(id) {
            state.play_state = PlayState::Stopped;
            state.current_index = 0;
            state.error = None;
        }
        self.emit_track(id);
    }

    pub fn stop_all(&mut self) {
        self.fades.cancel_all();
        self.follow_ups.clear();
        self.mixer.clear_multipliers();
        for id in self.mixer.registry.ids() {
            self.stop(&id);
        }
    }

    /// Pause when playing, play otherwise.
    pub fn toggle(&mut self, id: &str) {
        match self.mixer.registry.get(id).map(|s| s.play_state) {
            Some(PlayState::Playing) => self.pause(id),
            Some(_) => self.play(id),
            None => {}
        }
    }

    // ---- volume --------------------------------------------------------

    pub fn set_track_volume(&mut self, id: &str, volume: f32) {
        let Some(state) = self.mixer.registry.get_mut(id) else {
            return;
        };
        state.volume = volume.clamp(0.0, 1.0);
        self.mixer.apply_volume(id);
        self.emit_track(id);
    }

    pub fn master_volume(&self) -> f32 {
        self.mixer.master()
    }

    pub fn set_master_volume(&mut self, value: f32) {
        self.mixer.set_master(value);
        self.mixer.apply_all();
        self.bus.emit(&AudioEvent::MasterVolume(self.mixer.master()));
    }

    // ---- fades ---------------------------------------------------------

    fn start_fade(&mut self, id: &str, from: f32, to: f32, duration: Duration, then: FadeFollowUp) {
        let now = self.clock.now();
        let key = id.to_string();
        let target = key.clone();

        // A new fade replaces the old one, follow-up included.
        self.follow_ups.remove(id);
        let signal = self.fades.start(
            key.clone(),
            from,
            to,
            duration,
            now,
            &mut self.mixer,
            move |mixer: &mut Mixer, value| {
                mixer.set_multiplier(&target, value);
                mixer.apply_volume(&target);
            },
        );
        self.follow_ups.insert(key, then);

        if signal.outcome() == Some(FadeOutcome::Completed) {
            self.finish_fade(id);
        }
    }

    fn fade_in(&mut self, id: &str, duration: Duration) {
        self.mixer.set_multiplier(id, 0.0);
        self.mixer.apply_volume(id);
        self.start_fade(id, 0.0, 1.0, duration, FadeFollowUp::Settle);
    }

    fn finish_fade(&mut self, id: &str) {
        let follow_up = self.follow_ups.remove(id);
        self.mixer.clear_multiplier(id);
        if !self.mixer.registry.contains(id) {
            debug!(track = id, "fade finished for a track that is gone");
            return;
        }
        match follow_up {
            Some(FadeFollowUp::Stop) => self.stop(id),
            Some(FadeFollowUp::Pause) => self.pause(id),
            Some(FadeFollowUp::Settle) | None => {}
        }
    }

    /// Cancel the fade of `id` and drop its multiplier.
    fn cancel_fade(&mut self, id: &str) {
        self.fades.cancel(&id.to_string());
        self.follow_ups.remove(id);
        self.mixer.clear_multiplier(id);
    }

    /// Fade every playing track of `kind` to silence, then pause it.
    pub fn fade_out_type(&mut self, kind: &str, duration: Duration) {
        self.fade_out_where(duration, |s| s.def.kind == kind);
    }

    /// Resume every paused track of `kind` from silence.
    pub fn fade_in_type(&mut self, kind: &str, duration: Duration) {
        self.fade_in_where(duration, |s| s.def.kind == kind);
    }

    pub fn fade_out_all(&mut self, duration: Duration) {
        self.fade_out_where(duration, |_| true);
    }

    pub fn fade_in_all(&mut self, duration: Duration) {
        self.fade_in_where(duration, |_| true);
    }

    fn fade_out_where(&mut self, duration: Duration, pred: impl Fn(&TrackState) -> bool) {
        let ids: Vec<String> = self
            .mixer
            .registry
            .iter()
            .filter(|s| s.play_state == PlayState::Playing && pred(s))
            .map(|s| s.def.id.clone())
            .collect();
        for id in ids {
            let from = self.mixer.multiplier(&id).unwrap_or(1.0);
            self.start_fade(&id, from, 0.0, duration, FadeFollowUp::Pause);
        }
    }

    fn fade_in_where(&mut self, duration: Duration, pred: impl Fn(&TrackState) -> bool) {
        let ids: Vec<String> = self
            .mixer
            .registry
            .iter()
            .filter(|s| s.play_state == PlayState::Paused && pred(s))
            .map(|s| s.def.id.clone())
            .collect();
        for id in ids {
            self.cancel_fade(&id);
            self.mixer.set_multiplier(&id, 0.0);
            self.mixer.apply_volume(&id);
            self.play(&id);

            let playing = self
                .mixer
                .registry
                .get(&id)
                .is_some_and(|s| s.play_state == PlayState::Playing);
            if playing {
                self.start_fade(&id, 0.0, 1.0, duration, FadeFollowUp::Settle);
            } else {
                warn!(track = %id, "fade-in aborted, track did not start");
                self.cancel_fade(&id);
            }
        }
    }

    // ---- end of media --------------------------------------------------

    /// Advance a playlist, wrap it, or settle the track once its source ended.
    pub fn on_media_ended(&mut self, id: &str) {
        let Some(state) = self.mixer.registry.get(id) else {
            return;
        };
        if state.play_state != PlayState::Playing {
            debug!(track = id, "ignoring end-of-media for a track that is not playing");
            return;
        }
        let def = state.def.clone();
        let index = state.current_index;

        let next = if def.is_playlist() {
            match self.shuffles.get_mut(id) {
                Some(order) if order.fits(def.files.len()) => {
                    order.advance(def.looping, &mut self.rng)
                }
                _ => next_sequential(index, def.files.len(), def.looping),
            }
        } else {
            None
        };

        match next {
            Some(next) => {
                if let Some(state) = self.mixer.registry.get_mut(id) {
                    state.current_index = next;
                }
                self.play_current_index(id);
            }
            None => {
                self.shuffles.remove(id);
                if let Some(state) = self.mixer.registry.get_mut(id) {
                    state.play_state = PlayState::Stopped;
                    state.current_index = 0;
                }
                self.emit_track(id);
            }
        }
    }

    /// Load and start the file at the track's current index on its existing handle.
    fn play_current_index(&mut self, id: &str) {
        let Some(file) = self
            .mixer
            .registry
            .get(id)
            .and_then(|s| s.current_file())
            .map(str::to_string)
        else {
            return;
        };
        let Some(path) = self.resolver.resolve(&file, &self.audio_folder) else {
            warn!(track = id, file = %file, "playlist file not found");
            self.fail(id, TrackError::NotFound(file));
            return;
        };
        let Some(handle) = self.mixer.registry.handle_mut(id) else {
            return;
        };

        handle.set_source(&path);
        handle.set_loop(false);
        if let Err(e) = handle.play() {
            warn!(track = id, error = %e, "failed to start next playlist file");
            self.fail(id, TrackError::PlaybackFailed(file));
            return;
        }
        if let Some(state) = self.mixer.registry.get_mut(id) {
            state.error = None;
        }
        self.mixer.apply_volume(id);
        self.emit_track(id);
    }

    fn poll_media(&mut self) {
        let ended: Vec<String> = self
            .mixer
            .registry
            .handle_ids()
            .into_iter()
            .filter(|id| {
                self.mixer
                    .registry
                    .handle_mut(id)
                    .is_some_and(|h| h.take_ended())
            })
            .collect();
        for id in ended {
            self.on_media_ended(&id);
        }
    }

    // ---- orphans -------------------------------------------------------

    /// A surface detached from `id`: evict it after the grace period unless it
    /// is re-registered or still playing by then.
    pub fn schedule_orphan_check(&mut self, id: &str) {
        if !self.mixer.registry.contains(id) {
            return;
        }
        let at = self.clock.now() + self.orphan_grace;
        self.orphans.arm(id, at);
    }

    #[cfg(test)]
    pub fn has_orphan_check(&self, id: &str) -> bool {
        self.orphans.is_armed(id)
    }

    fn evict_orphan(&mut self, id: &str) {
        match self.mixer.registry.get(id).map(|s| s.play_state) {
            None => {}
            Some(PlayState::Playing) => debug!(track = id, "orphaned track still playing, keeping it"),
            Some(_) => {
                debug!(track = id, "evicting orphaned track");
                self.unregister(id);
            }
        }
    }

    // ---- driving -------------------------------------------------------

    /// Run everything that is due: a fade frame, end-of-media handling and
    /// expired orphan checks.
    pub fn pump(&mut self) {
        let now = self.clock.now();
        if self.fades.is_running() {
            for id in self.fades.tick(now, &mut self.mixer) {
                self.finish_fade(&id);
            }
        }
        self.poll_media();
        for id in self.orphans.take_due(now) {
            self.evict_orphan(&id);
        }
    }

    /// Earliest instant at which [`pump`](Self::pump) has timed work to do.
    /// `None` means only external input or end-of-media can change anything.
    pub fn next_wakeup(&self) -> Option<Instant> {
        [self.fades.next_frame(), self.orphans.next_deadline()]
            .into_iter()
            .flatten()
            .min()
    }

    pub fn is_idle(&self) -> bool {
        self.fades.is_empty()
    }

    /// Tear everything down: fades, orphan timers, handles and tracks.
    pub fn destroy_all(&mut self) {
        self.fades.destroy();
        self.follow_ups.clear();
        self.mixer.clear_multipliers();
        self.orphans.clear();
        self.shuffles.clear();
        self.mixer.registry.clear();
    }
}
