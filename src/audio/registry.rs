//! Track state and playback-handle ownership.

use std::collections::HashMap;

use super::handle::{PlaybackBackend, PlaybackHandle};
use super::types::{TrackDefinition, TrackState};

/// Single source of truth for id → state and id → handle.
///
/// Iteration follows registration order.
#[derive(Default)]
pub(crate) struct TrackRegistry {
    order: Vec<String>,
    tracks: HashMap<String, TrackState>,
    handles: HashMap<String, Box<dyn PlaybackHandle>>,
}

impl TrackRegistry {
    /// Insert a new track or replace the definition of an existing one.
    /// Returns `true` when the track was created.
    pub fn upsert(&mut self, def: TrackDefinition) -> bool {
        if let Some(state) = self.tracks.get_mut(&def.id) {
            state.def = def;
            // Keep the index valid if the playlist shrank.
            if state.current_index >= state.def.files.len() {
                state.current_index = 0;
            }
            return false;
        }
        self.order.push(def.id.clone());
        self.tracks.insert(def.id.clone(), TrackState::new(def));
        true
    }

    /// Remove a track, releasing its handle.
    pub fn remove(&mut self, id: &str) -> Option<TrackState> {
        if let Some(mut handle) = self.handles.remove(id) {
            handle.pause();
            handle.release();
        }
        self.order.retain(|o| o != id);
        self.tracks.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&TrackState> {
        self.tracks.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut TrackState> {
        self.tracks.get_mut(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackState> {
        self.order.iter().filter_map(|id| self.tracks.get(id))
    }

    pub fn handle_mut(&mut self, id: &str) -> Option<&mut (dyn PlaybackHandle + 'static)> {
        self.handles.get_mut(id).map(|h| h.as_mut())
    }

    /// The handle for `id`, created through `backend` on first use.
    pub fn ensure_handle(
        &mut self,
        id: &str,
        backend: &mut dyn PlaybackBackend,
    ) -> &mut (dyn PlaybackHandle + 'static) {
        self.handles
            .entry(id.to_string())
            .or_insert_with(|| backend.open(id))
            .as_mut()
    }

    pub fn handle_ids(&self) -> Vec<String> {
        self.handles.keys().cloned().collect()
    }

    /// Release every handle and forget every track.
    pub fn clear(&mut self) {
        for handle in self.handles.values_mut() {
            handle.pause();
            handle.release();
        }
        self.handles.clear();
        self.tracks.clear();
        self.order.clear();
    }
}
