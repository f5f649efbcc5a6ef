//! Sidebar model: `App` and track label helpers.
//!
//! The `App` struct holds a copy of the engine's board, the selected row and
//! the filter state. Tracks are shown in one collapsible group per kind, in the
//! order the kinds first appear on the board. It never changes playback itself; the runtime turns key
//! presses into engine commands.

use std::collections::HashSet;
use std::time::Duration;

use crate::audio::{BoardHandle, BoardSnapshot, PlayState, TrackState};

/// One-line summary of a track for the sidebar list.
pub fn track_label(track: &TrackState) -> String {
    let icon = match track.play_state {
        PlayState::Playing => "▶",
        PlayState::Paused => "⏸",
        PlayState::Stopped => "■",
    };
    let mut label = format!(
        "{icon} {} [{}] {:>3}%",
        track.def.name,
        track.def.kind,
        (track.volume * 100.0).round() as u32
    );
    if track.def.is_playlist() {
        label.push_str(&format!(
            " ({}/{})",
            track.current_index + 1,
            track.def.files.len()
        ));
    }
    if let Some(err) = &track.error {
        label.push_str(&format!(" ! {err}"));
    }
    label
}

/// A line of the sidebar list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// Header of the group holding every visible track of `kind`.
    Group {
        kind: String,
        count: usize,
        collapsed: bool,
    },
    /// Index into [`App::tracks`].
    Track(usize),
}

/// The sidebar model.
pub struct App {
    pub tracks: Vec<TrackState>,
    /// Selected track, unless a group header holds the selection.
    pub selected: usize,
    /// Kind whose header row is selected.
    pub selected_group: Option<String>,
    pub collapsed: HashSet<String>,
    pub master_volume: f32,
    pub crossfade: Duration,

    pub filter_mode: bool,
    pub filter_query: String,

    pub vault_root: Option<String>,
    /// Last runtime message, e.g. the result of a rescan.
    pub status: Option<String>,

    board: Option<BoardHandle>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            selected: 0,
            selected_group: None,
            collapsed: HashSet::new(),
            master_volume: 1.0,
            crossfade: Duration::ZERO,
            filter_mode: false,
            filter_query: String::new(),
            vault_root: None,
            status: None,
            board: None,
        }
    }

    /// Attach the board the engine publishes to.
    pub fn set_board(&mut self, board: BoardHandle) {
        self.board = Some(board);
    }

    pub fn set_vault_root(&mut self, root: String) {
        self.vault_root = Some(root);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    /// Copy the latest board into the model.
    pub fn sync_from_board(&mut self) {
        let Some(board) = self.board.as_ref() else {
            return;
        };
        let snapshot = match board.lock() {
            Ok(s) => s.clone(),
            Err(_) => return,
        };
        self.apply_snapshot(snapshot);
    }

    /// Replace the track list, keeping the selection on the same track id when
    /// it still exists.
    pub fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        let selected_id = self.selected_track().map(|t| t.def.id.clone());

        self.tracks = snapshot.tracks;
        self.master_volume = snapshot.master_volume;
        self.crossfade = snapshot.crossfade;

        if let Some(id) = selected_id {
            if let Some(pos) = self.tracks.iter().position(|t| t.def.id == id) {
                self.selected = pos;
            }
        }
        if self.selected >= self.tracks.len() {
            self.selected = self.tracks.len().saturating_sub(1);
        }
        self.ensure_selected_visible();
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&TrackState> {
        if self.selected_group.is_some() {
            return None;
        }
        self.tracks.get(self.selected)
    }

    /// Kind of the selected header, or of the selected track.
    pub fn selected_kind(&self) -> Option<String> {
        match &self.selected_group {
            Some(kind) => Some(kind.clone()),
            None => self.selected_track().map(|t| t.def.kind.clone()),
        }
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_track().map(|t| t.def.id.clone())
    }

    /// Apply `delta` to the selected track's volume locally and return the new
    /// value to send to the engine.
    pub fn nudge_track_volume(&mut self, delta: f32) -> Option<(String, f32)> {
        if self.selected_group.is_some() {
            return None;
        }
        let track = self.tracks.get_mut(self.selected)?;
        track.volume = (track.volume + delta).clamp(0.0, 1.0);
        Some((track.def.id.clone(), track.volume))
    }

    /// Step the shown crossfade by `delta_ms`, never below zero. Returns the new value.
    pub fn nudge_crossfade(&mut self, delta_ms: i64) -> u64 {
        let current = self.crossfade.as_millis() as i64;
        let next = (current + delta_ms).max(0) as u64;
        self.crossfade = Duration::from_millis(next);
        next
    }

    /// Apply `delta` to the master volume locally and return the new value.
    pub fn nudge_master_volume(&mut self, delta: f32) -> f32 {
        self.master_volume = (self.master_volume + delta).clamp(0.0, 1.0);
        self.master_volume
    }

    /// Indices of the tracks that pass the filter, in board order.
    pub fn display_indices(&self) -> Vec<usize> {
        let query = self.filter_query.trim();
        (0..self.tracks.len())
            .filter(|&i| {
                query.is_empty()
                    || Self::fuzzy_match_positions(&self.tracks[i].def.name, query).is_some()
            })
            .collect()
    }

    /// Fuzzy/subsequence match: return the character positions in `title`
    /// that match `query`, or `None` if not matched.
    pub fn fuzzy_match_positions(title: &str, query: &str) -> Option<Vec<usize>> {
        if query.is_empty() {
            return Some(Vec::new());
        }

        let mut positions: Vec<usize> = Vec::new();
        let mut title_iter = title.chars().enumerate();

        for qc in query.chars() {
            let qc_low = qc.to_ascii_lowercase();
            loop {
                match title_iter.next() {
                    Some((ti, tc)) if tc.to_ascii_lowercase() == qc_low => {
                        positions.push(ti);
                        break;
                    }
                    Some(_) => continue,
                    None => return None,
                }
            }
        }

        Some(positions)
    }

    /// Sidebar rows: a header per kind with matching tracks, followed by those
    /// tracks unless the group is collapsed.
    pub fn rows(&self) -> Vec<Row> {
        let mut kinds: Vec<&str> = Vec::new();
        let display = self.display_indices();
        for &i in &display {
            let kind = self.tracks[i].def.kind.as_str();
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }

        let mut rows = Vec::new();
        for kind in kinds {
            let members: Vec<usize> = display
                .iter()
                .copied()
                .filter(|&i| self.tracks[i].def.kind == kind)
                .collect();
            let collapsed = self.collapsed.contains(kind);
            rows.push(Row::Group {
                kind: kind.to_string(),
                count: members.len(),
                collapsed,
            });
            if !collapsed {
                rows.extend(members.into_iter().map(Row::Track));
            }
        }
        rows
    }

    fn is_selected(&self, row: &Row) -> bool {
        match (row, &self.selected_group) {
            (Row::Group { kind, .. }, Some(group)) => kind == group,
            (Row::Track(i), None) => *i == self.selected,
            _ => false,
        }
    }

    /// Position of the selected row in [`rows`](Self::rows).
    pub fn cursor(&self) -> Option<usize> {
        self.rows().iter().position(|r| self.is_selected(r))
    }

    fn select_row(&mut self, row: &Row) {
        match row {
            Row::Group { kind, .. } => self.selected_group = Some(kind.clone()),
            Row::Track(i) => {
                self.selected = *i;
                self.selected_group = None;
            }
        }
    }

    /// Move selection to the next row, wrapping to the first.
    pub fn next(&mut self) {
        let rows = self.rows();
        if rows.is_empty() {
            return;
        }
        let next = match self.cursor() {
            Some(p) => (p + 1) % rows.len(),
            None => 0,
        };
        self.select_row(&rows[next]);
    }

    /// Move selection to the previous row, wrapping to the last.
    pub fn prev(&mut self) {
        let rows = self.rows();
        if rows.is_empty() {
            return;
        }
        let prev = match self.cursor() {
            Some(0) | None => rows.len() - 1,
            Some(p) => p - 1,
        };
        self.select_row(&rows[prev]);
    }

    /// Collapse or expand the group of the selected row. Collapsing moves the
    /// selection onto the group header.
    pub fn toggle_group(&mut self) {
        let Some(kind) = self.selected_kind() else {
            return;
        };
        if !self.collapsed.remove(&kind) {
            self.collapsed.insert(kind.clone());
            self.selected_group = Some(kind);
        }
    }

    pub fn enter_filter_mode(&mut self) {
        self.filter_mode = true;
        self.ensure_selected_visible();
    }

    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    /// Clear the active filter and restore selection visibility.
    pub fn clear_filter(&mut self) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible();
    }

    pub fn push_filter_char(&mut self, c: char) {
        self.filter_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_filter_char(&mut self) {
        self.filter_query.pop();
        self.ensure_selected_visible();
    }

    /// Keep the selection on a visible row, falling back to the first one.
    fn ensure_selected_visible(&mut self) {
        let rows = self.rows();
        if rows.iter().any(|r| self.is_selected(r)) {
            return;
        }
        match rows.first() {
            Some(first) => {
                // Prefer a track over the header it sits under.
                let row = rows.get(1).filter(|r| matches!(r, Row::Track(_))).unwrap_or(first);
                let row = row.clone();
                self.select_row(&row);
            }
            None => {
                self.selected = 0;
                self.selected_group = None;
            }
        }
    }
}
