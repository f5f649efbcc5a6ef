use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{EngineCmd, EngineService};
use crate::config::{self, UiSettings};
use crate::error::Result;
use crate::ui;

use super::startup::Rescanner;

/// What the runtime should do after a key press.
#[derive(Debug)]
pub enum KeyOutcome {
    /// Local state only (selection, filter).
    Continue,
    Send(Vec<EngineCmd>),
    Rescan,
    Quit,
}

/// Main terminal event loop: handles input, UI drawing and sync with the
/// engine board. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    service: &EngineService,
    rescanner: &mut Rescanner,
) -> Result<()> {
    loop {
        app.sync_from_board();
        terminal.draw(|f| ui::draw(f, app, &settings.ui))?;

        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match handle_key_event(key, app, &settings.ui) {
            KeyOutcome::Continue => {}
            KeyOutcome::Send(cmds) => {
                for cmd in cmds {
                    service.send(cmd)?;
                }
            }
            KeyOutcome::Rescan => {
                let count = rescanner.rescan(service)?;
                app.set_status(format!("rescanned: {count} tracks"));
            }
            KeyOutcome::Quit => {
                service.quit_softly(settings.audio.quit_fade_out());
                return Ok(());
            }
        }
    }
}

const CROSSFADE_STEP_MS: i64 = 250;

/// Turn a key press into local model changes and engine intents.
pub fn handle_key_event(key: KeyEvent, app: &mut App, ui: &UiSettings) -> KeyOutcome {
    if app.filter_mode {
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Enter => app.exit_filter_mode(),
            KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c),
            _ => {}
        }
        return KeyOutcome::Continue;
    }

    let send = |cmd: EngineCmd| KeyOutcome::Send(vec![cmd]);
    let selected = app.selected_id();

    match key.code {
        KeyCode::Char('q') => KeyOutcome::Quit,
        KeyCode::Char('r') => KeyOutcome::Rescan,
        KeyCode::Char('/') => {
            app.enter_filter_mode();
            KeyOutcome::Continue
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.next();
            KeyOutcome::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.prev();
            KeyOutcome::Continue
        }
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Enter => {
            selected.map_or(KeyOutcome::Continue, |id| send(EngineCmd::Toggle(id)))
        }
        KeyCode::Char('s') => selected.map_or(KeyOutcome::Continue, |id| send(EngineCmd::Stop(id))),
        KeyCode::Char('S') => send(EngineCmd::StopAll),
        KeyCode::Char('+') | KeyCode::Char('=') => app
            .nudge_track_volume(ui.volume_step)
            .map_or(KeyOutcome::Continue, |(id, v)| {
                send(EngineCmd::SetTrackVolume(id, v))
            }),
        KeyCode::Char('-') => app
            .nudge_track_volume(-ui.volume_step)
            .map_or(KeyOutcome::Continue, |(id, v)| {
                send(EngineCmd::SetTrackVolume(id, v))
            }),
        KeyCode::Char(']') => send(EngineCmd::SetMasterVolume(
            app.nudge_master_volume(ui.volume_step),
        )),
        KeyCode::Char('[') => send(EngineCmd::SetMasterVolume(
            app.nudge_master_volume(-ui.volume_step),
        )),
        KeyCode::Char('c') => send(EngineCmd::SetCrossfade {
            crossfade_ms: app.nudge_crossfade(-CROSSFADE_STEP_MS),
        }),
        KeyCode::Char('C') => send(EngineCmd::SetCrossfade {
            crossfade_ms: app.nudge_crossfade(CROSSFADE_STEP_MS),
        }),
        KeyCode::Char('z') => {
            app.toggle_group();
            KeyOutcome::Continue
        }
        KeyCode::Char('f') => match app.selected_kind() {
            Some(kind) => send(EngineCmd::FadeOutKind {
                kind,
                fade_ms: ui.fade_ms,
            }),
            None => KeyOutcome::Continue,
        },
        KeyCode::Char('F') => match app.selected_kind() {
            Some(kind) => send(EngineCmd::FadeInKind {
                kind,
                fade_ms: ui.fade_ms,
            }),
            None => KeyOutcome::Continue,
        },
        KeyCode::Char('o') => send(EngineCmd::FadeOutAll {
            fade_ms: ui.fade_ms,
        }),
        KeyCode::Char('O') => send(EngineCmd::FadeInAll {
            fade_ms: ui.fade_ms,
        }),
        _ => KeyOutcome::Continue,
    }
}
