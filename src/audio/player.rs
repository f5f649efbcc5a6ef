use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::vault::VaultIndex;

use super::manager::EngineOptions;
use super::thread::spawn_engine_thread;
use super::types::{BoardHandle, BoardSnapshot, EngineCmd};

/// Owns the engine thread. The UI talks to it through commands and reads the
/// published [`BoardSnapshot`].
pub struct EngineService {
    tx: Sender<EngineCmd>,
    board: BoardHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl EngineService {
    /// Start the engine thread and wait until the audio device is open.
    pub fn spawn(options: EngineOptions, end_poll: Duration, vault: VaultIndex) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<EngineCmd>();
        let board: BoardHandle = Arc::new(Mutex::new(BoardSnapshot {
            tracks: Vec::new(),
            master_volume: options.master_volume.clamp(0.0, 1.0),
            crossfade: options.crossfade,
        }));
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let handle = spawn_engine_thread(rx, board.clone(), options, end_poll, vault, ready_tx);

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(msg)) => {
                let _ = handle.join();
                return Err(Error::AudioOutput(msg));
            }
            Err(_) => return Err(Error::EngineStopped),
        }

        Ok(Self {
            tx,
            board,
            join: Mutex::new(Some(handle)),
        })
    }

    pub fn board_handle(&self) -> BoardHandle {
        self.board.clone()
    }

    pub fn send(&self, cmd: EngineCmd) -> Result<()> {
        self.tx.send(cmd).map_err(|_| Error::EngineStopped)
    }

    /// Fade out, release all audio and wait for the engine thread to exit.
    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(EngineCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
