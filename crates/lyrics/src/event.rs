//! Timed lyric events and the schedule that owns them.
//!
//! A schedule keeps the order of the source lines. Times are not re-sorted
//! and need not be monotonic: every line's time is derived on its own.

use serde::{Deserialize, Serialize};

/// How a line's display time was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingSource {
    /// Read from an explicit `[MM:SS.mm]` tag.
    Tagged,
    /// Assigned by the evenly spaced fallback.
    Estimated,
}

/// One lyric line with its display start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricEvent {
    /// Display start in seconds from the start of the song. Never negative.
    #[serde(rename = "time")]
    pub start_time_secs: f64,

    /// Trimmed line text, without any timing tag.
    pub text: String,

    /// Position of the line among the non-blank input lines.
    pub source_index: usize,

    /// Provenance of `start_time_secs`.
    pub timing: TimingSource,
}

impl LyricEvent {
    pub fn tagged(start_time_secs: f64, text: impl Into<String>, source_index: usize) -> Self {
        Self {
            start_time_secs: start_time_secs.max(0.0),
            text: text.into(),
            source_index,
            timing: TimingSource::Tagged,
        }
    }

    pub fn estimated(start_time_secs: f64, text: impl Into<String>, source_index: usize) -> Self {
        Self {
            start_time_secs: start_time_secs.max(0.0),
            text: text.into(),
            source_index,
            timing: TimingSource::Estimated,
        }
    }

    pub fn is_tagged(&self) -> bool {
        self.timing == TimingSource::Tagged
    }
}

/// Ordered, immutable sequence of lyric events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LyricSchedule {
    events: Vec<LyricEvent>,
}

impl LyricSchedule {
    /// Wrap already-timed events, keeping their order.
    pub fn from_events(events: Vec<LyricEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[LyricEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LyricEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&LyricEvent> {
        self.events.get(index)
    }

    pub fn tagged_count(&self) -> usize {
        self.events.iter().filter(|e| e.is_tagged()).count()
    }

    pub fn estimated_count(&self) -> usize {
        self.events.len() - self.tagged_count()
    }

    /// Render every event as a tagged line, estimated ones included.
    ///
    /// Parsing the result gives back the same texts and times, with three
    /// losses: every line comes back tagged, times are rounded to
    /// centiseconds, and times past `99:59.99` are clamped to it. Empty
    /// texts are written as a tag plus one space so the line stays tagged.
    pub fn to_lrc(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            let text = if event.text.is_empty() { " " } else { event.text.as_str() };
            out.push_str(&format!(
                "[{}]{}\n",
                crate::parser::format_timestamp(event.start_time_secs),
                text
            ));
        }
        out
    }
}

impl<'a> IntoIterator for &'a LyricSchedule {
    type Item = &'a LyricEvent;
    type IntoIter = std::slice::Iter<'a, LyricEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
