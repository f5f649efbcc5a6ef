//! `rodio` implementation of the playback capabilities.
//!
//! Each track gets its own `Sink` on the shared output mixer. Sources are
//! decoded lazily on `play` so that the loop flag set after the source is
//! honoured.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};

use crate::error::PlaybackError;

use super::handle::{PlaybackBackend, PlaybackHandle};

/// Owns the output stream; dropping it silences every sink.
pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    pub fn open_default() -> Result<Self, rodio::StreamError> {
        let mut stream = OutputStreamBuilder::open_default_stream()?;
        // rodio logs to stderr when the stream is dropped, which garbles the TUI.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl PlaybackBackend for RodioBackend {
    fn open(&mut self, id: &str) -> Box<dyn PlaybackHandle> {
        tracing::debug!(track = id, "opening sink");
        Box::new(SinkHandle::new(Sink::connect_new(self.stream.mixer())))
    }
}

pub struct SinkHandle {
    sink: Sink,
    source: Option<PathBuf>,
    looping: bool,
    /// The source has been decoded and appended to the sink.
    loaded: bool,
    /// Set by `play`, cleared once end-of-media was reported.
    armed: bool,
}

impl SinkHandle {
    fn new(sink: Sink) -> Self {
        sink.pause();
        Self {
            sink,
            source: None,
            looping: false,
            loaded: false,
            armed: false,
        }
    }

    fn unload(&mut self) {
        self.sink.clear();
        self.loaded = false;
        self.armed = false;
    }
}

fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, PlaybackError> {
    let file = File::open(path).map_err(|source| PlaybackError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Decoder::new(BufReader::new(file)).map_err(|source| PlaybackError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

impl PlaybackHandle for SinkHandle {
    fn set_source(&mut self, path: &Path) {
        self.unload();
        self.source = Some(path.to_path_buf());
    }

    fn has_source(&self) -> bool {
        self.source.is_some()
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if !self.loaded {
            let path = self.source.as_deref().ok_or(PlaybackError::NoSource)?;
            let source = open_source(path)?;
            if self.looping {
                self.sink.append(source.repeat_infinite());
            } else {
                self.sink.append(source);
            }
            self.loaded = true;
        }
        self.sink.play();
        self.armed = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn set_position(&mut self, position: Duration) -> Result<(), PlaybackError> {
        if position.is_zero() {
            // Rewinding is reloading: the next `play` decodes from the start.
            self.unload();
            return Ok(());
        }
        self.sink
            .try_seek(position)
            .map_err(|e| PlaybackError::Seek(e.to_string()))
    }

    fn set_gain(&mut self, gain: f32) {
        self.sink.set_volume(gain);
    }

    fn release(&mut self) {
        self.unload();
        self.source = None;
    }

    fn take_ended(&mut self) -> bool {
        if self.armed && self.loaded && !self.sink.is_paused() && self.sink.empty() {
            self.armed = false;
            self.loaded = false;
            return true;
        }
        false
    }
}
