//! Karaoke Render Engine
//!
//! Turns a render request and its compiled render graph into a video by
//! driving an external renderer (ffmpeg) to completion.
//!
//! # Pipeline Architecture
//!
//! ```text
//! GenerateRequest ── validate ── parse lyrics ── build graph ──┐
//!                                                              │
//! audio ───────────────────────────────────────────────────────┤
//! background image | color canvas ─────────────────────────────┤
//!                                                              ▼
//!                                           ffmpeg (supervised, cancellable)
//!                                                              │
//!                                                              ▼
//!                                            {output_dir}/karaoke_{id}.mp4
//! ```
//!
//! [`RenderPool`] bounds how many renderer processes run at once.

pub mod backend;
pub mod invocation;
pub mod job;
pub mod orchestrator;
pub mod pool;
pub mod process;

pub use backend::*;
pub use invocation::*;
pub use job::*;
pub use orchestrator::*;
pub use pool::*;
pub use process::*;
