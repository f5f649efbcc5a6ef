//! `rpg-audio` note blocks.
//!
//! A block is a fenced code block tagged `rpg-audio` holding `key: value`
//! lines that describe one track.

mod parse;

pub use parse::*;
