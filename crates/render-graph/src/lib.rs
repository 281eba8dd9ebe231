//! Karaoke Render Graph
//!
//! Compiles a lyric schedule plus intro directives into an ordered list of
//! timed text overlays, and serializes that list for the external renderer.
//!
//! # Pipeline
//!
//! ```text
//! LyricSchedule ──┐
//! title, artist ──┼── RenderGraphBuilder ──► RenderGraph ──► filtergraph string
//! include_intro ──┘                          (typed ops)     (escaped, at the
//!                                                             process boundary)
//! ```
//!
//! Draw order is layering order: later operations paint over earlier ones.
//! This crate does no I/O.

pub mod builder;
pub mod filter;
pub mod overlay;

pub use builder::*;
pub use filter::*;
pub use overlay::*;
