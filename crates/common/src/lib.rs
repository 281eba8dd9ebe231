//! Karaoke Common Utilities
//!
//! Shared infrastructure for all karaoke crates:
//! - Error types and result aliases
//! - Render job identifiers
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod job_id;
pub mod logging;

pub use config::*;
pub use error::*;
pub use job_id::*;
