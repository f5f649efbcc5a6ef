//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the sidebar using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Row, track_label};
use crate::audio::PlayState;
use crate::config::UiSettings;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("space/p", "play/pause");
    map.insert("s/S", "stop/stop all");
    map.insert("+/-", "track volume");
    map.insert("[/]", "master volume");
    map.insert("c/C", "crossfade -/+");
    map.insert("f/F", "fade type out/in");
    map.insert("o/O", "fade all out/in");
    map.insert("z", "fold group");
    map.insert("/", "filter");
    map.insert("r", "rescan notes");
    map.insert("q", "quit");
    map
});

/// Render the controls help text.
fn controls_text() -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "space/p", "s/S", "+/-", "[/]", "c/C", "f/F", "o/O", "z", "/", "r", "q",
    ];
    order
        .iter()
        .filter_map(|k| CONTROLS_MAP.get(*k).map(|v| format!("[{}] {}", k, v)))
        .collect::<Vec<String>>()
        .join(" | ")
}

fn percent(v: f32) -> u32 {
    (v.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" rpg-audio ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Status box
    let status = {
        let mut parts: Vec<String> = vec![
            format!("MASTER: {}%", percent(app.master_volume)),
            format!("CROSSFADE: {:.1}s", app.crossfade.as_secs_f32()),
        ];

        let playing = app
            .tracks
            .iter()
            .filter(|t| t.play_state == PlayState::Playing)
            .count();
        parts.push(format!("PLAYING: {}/{}", playing, app.tracks.len()));

        let q = app.filter_query.trim();
        if app.filter_mode || !q.is_empty() {
            let mut filter_part = String::from("FILTER:");
            if !q.is_empty() {
                filter_part.push(' ');
                filter_part.push_str(q);
            }
            parts.push(filter_part);
        }

        if let Some(root) = &app.vault_root {
            parts.push(format!("Vault: {}", root));
        }
        if let Some(msg) = &app.status {
            parts.push(msg.clone());
        }

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    // Track list
    {
        let rows = app.rows();
        let total = rows.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let sel_pos = app.cursor().unwrap_or(0);

        // Center the selected item when possible by rendering only a window.
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = rows[start..end]
            .iter()
            .map(|row| match row {
                Row::Group {
                    kind,
                    count,
                    collapsed,
                } => {
                    let chevron = if *collapsed { "▸" } else { "▾" };
                    ListItem::new(format!("{chevron} {kind} ({count})"))
                        .style(Style::default().add_modifier(Modifier::BOLD))
                }
                Row::Track(i) => {
                    let track = &app.tracks[*i];
                    let style = if track.error.is_some() {
                        Style::default().fg(Color::Red)
                    } else if track.play_state == PlayState::Playing {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default()
                    };
                    ListItem::new(format!("  {}", track_label(track))).style(style)
                }
            })
            .collect();

        let title = if app.has_tracks() {
            " tracks "
        } else {
            " tracks (no rpg-audio blocks found) "
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ratatui::widgets::ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let footer = Paragraph::new(controls_text())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
