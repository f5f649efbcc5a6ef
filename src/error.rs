//! Error types shared across the crate.
//!
//! Playback and resolution failures never escape the engine as `Err`; they are
//! rendered into a [`TrackError`] string and stored on the track. The remaining
//! types are for the host shell (config, terminal, audio device).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a playback handle.
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("seek failed: {0}")]
    Seek(String),

    #[error("no source assigned")]
    NoSource,
}

/// Human-readable error recorded on a track's state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Reasons a note block does not describe a track.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block has no id")]
    MissingId,

    #[error("block has no name")]
    MissingName,

    #[error("block lists no files")]
    NoFiles,
}

/// Top-level error for the application shell.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("audio output error: {0}")]
    AudioOutput(String),

    #[error("audio engine is not running")]
    EngineStopped,

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
