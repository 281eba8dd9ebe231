//! Render job identifiers.
//!
//! Every render job is named after its id (`karaoke_{id}.mp4`), so ids
//! must never repeat while jobs share an output directory. Generators are
//! injected into the orchestrator:
//! - [`MonotonicMillisIds`] keeps the familiar wall-clock millisecond value
//!   but bumps it whenever two jobs land in the same millisecond
//! - [`SequentialIds`] is a plain counter for tests and reproducible runs

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Unique identifier of one render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl JobId {
    pub fn value(self) -> u64 {
        self.0
    }

    /// File stem of the rendered artifact.
    pub fn output_stem(self) -> String {
        format!("karaoke_{}", self.0)
    }

    /// File name of the rendered artifact.
    pub fn output_filename(self) -> String {
        format!("{}.mp4", self.output_stem())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of job ids. Implementations must never return the same id twice.
pub trait JobIdGenerator: Send + Sync {
    fn next_id(&self) -> JobId;
}

/// Wall-clock milliseconds, strictly increasing across calls.
#[derive(Debug, Default)]
pub struct MonotonicMillisIds {
    last: AtomicU64,
}

impl MonotonicMillisIds {
    pub fn new() -> Self {
        Self::default()
    }

    fn now_millis() -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

impl JobIdGenerator for MonotonicMillisIds {
    fn next_id(&self) -> JobId {
        let now = Self::now_millis();
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(current + 1);
            match self.last.compare_exchange_weak(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return JobId(candidate),
                Err(actual) => current = actual,
            }
        }
    }
}

/// Counter starting at a fixed value.
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl JobIdGenerator for SequentialIds {
    fn next_id(&self) -> JobId {
        JobId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}
