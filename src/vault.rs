//! Index of the files in a vault.
//!
//! Track definitions name their files relative to the vault root or to the
//! configured audio folder. The index is built by scanning the vault once and
//! answers lookups without touching the filesystem again.

mod model;
mod resolve;
mod scan;

pub use model::*;
pub use resolve::normalize;
