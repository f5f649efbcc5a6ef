//! Time-based linear fades.
//!
//! The engine here knows nothing about tracks or audio: it interpolates a value
//! per key over a duration and hands every intermediate value to a callback.
//! Callbacks receive a caller-owned context (`&mut C`) at tick time, which lets
//! them mutate state that also owns other things the caller needs.

mod engine;
mod signal;

pub use engine::*;
pub use signal::*;
