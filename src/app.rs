//! Application module: exposes the sidebar model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and mirrors the engine's board
//! snapshot plus the local selection and filter state.

mod model;

pub use model::*;
