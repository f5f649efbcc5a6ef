use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::{debug, error, info};

use crate::clock::SystemClock;
use crate::vault::VaultIndex;

use super::manager::{AudioManager, EngineOptions};
use super::sink::RodioBackend;
use super::types::{BoardHandle, EngineCmd, EventKind};

/// Longest time a quit waits for its fade-out before tearing down anyway.
const QUIT_GRACE: Duration = Duration::from_secs(5);

pub(super) fn spawn_engine_thread(
    rx: Receiver<EngineCmd>,
    board: BoardHandle,
    options: EngineOptions,
    end_poll: Duration,
    vault: VaultIndex,
    ready: SyncSender<Result<(), String>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let backend = match RodioBackend::open_default() {
            Ok(backend) => backend,
            Err(e) => {
                error!(error = %e, "no audio output device");
                let _ = ready.send(Err(e.to_string()));
                return;
            }
        };

        let frame = options.frame;
        let mut manager = AudioManager::new(
            options,
            Box::new(vault),
            Box::new(backend),
            Box::new(SystemClock),
        );

        // Any notification means the board the UI reads is stale.
        let dirty = Rc::new(Cell::new(true));
        for kind in [
            EventKind::TrackChanged,
            EventKind::TracksUpdated,
            EventKind::MasterVolume,
        ] {
            let dirty = dirty.clone();
            manager.subscribe(kind, move |_| dirty.set(true));
        }

        let _ = ready.send(Ok(()));
        info!("audio engine started");

        loop {
            let received = match manager.next_wakeup() {
                Some(at) => {
                    let due = at.saturating_duration_since(Instant::now());
                    rx.recv_timeout(due.min(end_poll))
                }
                None if manager.has_playing() => rx.recv_timeout(end_poll),
                // Nothing can change without a command.
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(cmd) => {
                    if let ControlFlow::Break(fade_out) = apply_command(&mut manager, cmd) {
                        wind_down(&mut manager, fade_out, frame);
                        publish(&manager, &board);
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    manager.destroy_all();
                    break;
                }
            }

            manager.pump();
            if dirty.replace(false) {
                publish(&manager, &board);
            }
        }
        info!("audio engine stopped");
    })
}

/// Apply one UI intent. `Break` carries the fade-out of a quit request.
pub(super) fn apply_command(manager: &mut AudioManager, cmd: EngineCmd) -> ControlFlow<Duration> {
    match cmd {
        EngineCmd::Register(def) => manager.register(def),
        EngineCmd::Detach(id) => manager.schedule_orphan_check(&id),
        EngineCmd::Toggle(id) => manager.toggle(&id),
        EngineCmd::Stop(id) => manager.stop(&id),
        EngineCmd::StopAll => manager.stop_all(),
        EngineCmd::SetTrackVolume(id, volume) => manager.set_track_volume(&id, volume),
        EngineCmd::SetMasterVolume(value) => manager.set_master_volume(value),
        EngineCmd::FadeOutKind { kind, fade_ms } => {
            manager.fade_out_type(&kind, Duration::from_millis(fade_ms))
        }
        EngineCmd::FadeInKind { kind, fade_ms } => {
            manager.fade_in_type(&kind, Duration::from_millis(fade_ms))
        }
        EngineCmd::FadeOutAll { fade_ms } => manager.fade_out_all(Duration::from_millis(fade_ms)),
        EngineCmd::FadeInAll { fade_ms } => manager.fade_in_all(Duration::from_millis(fade_ms)),
        EngineCmd::SetCrossfade { crossfade_ms } => {
            manager.set_crossfade(Duration::from_millis(crossfade_ms))
        }
        EngineCmd::Reindex(vault) => {
            debug!(files = vault.audio_count(), "file index replaced");
            manager.set_resolver(Box::new(vault));
        }
        EngineCmd::Quit { fade_out_ms } => {
            return ControlFlow::Break(Duration::from_millis(fade_out_ms));
        }
    }
    ControlFlow::Continue(())
}

/// Fade everything out, wait for the fades, then release all audio.
fn wind_down(manager: &mut AudioManager, fade_out: Duration, frame: Duration) {
    manager.fade_out_all(fade_out);
    let deadline = Instant::now() + fade_out + QUIT_GRACE;
    while !manager.is_idle() && Instant::now() < deadline {
        thread::sleep(frame);
        manager.pump();
    }
    manager.destroy_all();
}

fn publish(manager: &AudioManager, board: &BoardHandle) {
    if let Ok(mut snapshot) = board.lock() {
        snapshot.tracks = manager.all_tracks();
        snapshot.master_volume = manager.master_volume();
        snapshot.crossfade = manager.crossfade();
    }
}
