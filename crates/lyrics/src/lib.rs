//! Karaoke Lyrics
//!
//! Turns raw lyric text into an ordered display schedule:
//! - **Events:** one timed line per non-blank input line, with timing provenance
//! - **Parser:** `[MM:SS.mm]` tagged lines and an evenly spaced fallback
//!
//! This crate is pure computation with no I/O. All inputs are data; all
//! outputs are data.

pub mod event;
pub mod parser;

pub use event::*;
pub use parser::*;
