//! Gain bookkeeping: registry plus master volume and fade multipliers.
//!
//! This is the context fade callbacks run against, so a fade tick can update
//! a multiplier and push the new gain to the handle in one step.

use std::collections::HashMap;

use super::registry::TrackRegistry;

/// `volume * master * fade`, each input clamped to `[0, 1]`; a missing fade
/// multiplier counts as 1.
pub fn effective_volume(volume: f32, master: f32, fade: Option<f32>) -> f32 {
    volume.clamp(0.0, 1.0) * master.clamp(0.0, 1.0) * fade.unwrap_or(1.0).clamp(0.0, 1.0)
}

pub(crate) struct Mixer {
    pub registry: TrackRegistry,
    master: f32,
    multipliers: HashMap<String, f32>,
}

impl Mixer {
    pub fn new(master: f32) -> Self {
        Self {
            registry: TrackRegistry::default(),
            master: master.clamp(0.0, 1.0),
            multipliers: HashMap::new(),
        }
    }

    pub fn master(&self) -> f32 {
        self.master
    }

    pub fn set_master(&mut self, value: f32) {
        self.master = value.clamp(0.0, 1.0);
    }

    pub fn multiplier(&self, id: &str) -> Option<f32> {
        self.multipliers.get(id).copied()
    }

    pub fn set_multiplier(&mut self, id: &str, value: f32) {
        self.multipliers.insert(id.to_string(), value.clamp(0.0, 1.0));
    }

    pub fn clear_multiplier(&mut self, id: &str) {
        self.multipliers.remove(id);
    }

    pub fn clear_multipliers(&mut self) {
        self.multipliers.clear();
    }

    pub fn effective_volume(&self, id: &str) -> Option<f32> {
        let state = self.registry.get(id)?;
        Some(effective_volume(
            state.volume,
            self.master,
            self.multiplier(id),
        ))
    }

    /// Push the effective volume of `id` to its handle, if both exist.
    pub fn apply_volume(&mut self, id: &str) {
        let Some(gain) = self.effective_volume(id) else {
            return;
        };
        if let Some(handle) = self.registry.handle_mut(id) {
            handle.set_gain(gain);
        }
    }

    pub fn apply_all(&mut self) {
        for id in self.registry.ids() {
            self.apply_volume(&id);
        }
    }
}
