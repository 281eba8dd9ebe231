//! Lyric timing parser.
//!
//! Each non-blank line becomes one [`LyricEvent`]. A line that starts with
//! an exact `[MM:SS.mm]` tag takes its time from the tag; any other line is
//! placed at `index * 3` seconds. Both kinds may be mixed freely and no
//! attempt is made to reconcile them into one consistent timeline.

use crate::event::{LyricEvent, LyricSchedule};

/// Display time assigned per line to untagged lyrics.
pub const ESTIMATED_SECS_PER_LINE: f64 = 3.0;

/// Length of a `[MM:SS.mm]` tag in bytes.
const TAG_LEN: usize = 10;

/// Errors produced while parsing lyric text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LyricsError {
    #[error("lyric text has no non-blank lines")]
    EmptyInput,
}

/// Parse raw lyric text into a schedule.
///
/// Fails with [`LyricsError::EmptyInput`] when no non-blank line remains.
pub fn parse(raw_text: &str) -> Result<LyricSchedule, LyricsError> {
    let events: Vec<LyricEvent> = raw_text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(index, line)| parse_line(line, index))
        .collect();

    if events.is_empty() {
        return Err(LyricsError::EmptyInput);
    }

    Ok(LyricSchedule::from_events(events))
}

/// Parse one non-blank line at the given position.
pub fn parse_line(line: &str, source_index: usize) -> LyricEvent {
    match parse_tag(line) {
        Some((secs, text)) => LyricEvent::tagged(secs, text.trim(), source_index),
        None => LyricEvent::estimated(
            source_index as f64 * ESTIMATED_SECS_PER_LINE,
            line.trim(),
            source_index,
        ),
    }
}

/// Split a leading `[MM:SS.mm]` tag off `line`.
///
/// Returns the tag time in seconds and the untrimmed remainder. The tag must
/// open the line, use exactly two ASCII digits per field, and be followed by
/// at least one character. Seconds are not range-checked.
pub fn parse_tag(line: &str) -> Option<(f64, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() <= TAG_LEN {
        return None;
    }
    if bytes[0] != b'[' || bytes[3] != b':' || bytes[6] != b'.' || bytes[9] != b']' {
        return None;
    }

    let minutes = two_digits(bytes[1], bytes[2])?;
    let seconds = two_digits(bytes[4], bytes[5])?;
    let hundredths = two_digits(bytes[7], bytes[8])?;

    let secs = minutes as f64 * 60.0 + seconds as f64 + hundredths as f64 / 100.0;
    // The first TAG_LEN bytes are ASCII, so this is a char boundary.
    Some((secs, &line[TAG_LEN..]))
}

fn two_digits(hi: u8, lo: u8) -> Option<u32> {
    if hi.is_ascii_digit() && lo.is_ascii_digit() {
        Some(u32::from(hi - b'0') * 10 + u32::from(lo - b'0'))
    } else {
        None
    }
}

/// Largest time a two-digit-minute tag can carry, in centiseconds.
const MAX_TAG_CENTISECS: u64 = 99 * 6000 + 59 * 100 + 99;

/// Format seconds as a `MM:SS.mm` tag body (centiseconds, rounded).
///
/// Times past `99:59.99` are clamped to it so the result always fits the
/// tag format read by [`parse_tag`].
pub fn format_timestamp(secs: f64) -> String {
    let total_cs = ((secs.max(0.0) * 100.0).round() as u64).min(MAX_TAG_CENTISECS);
    let cs = total_cs % 100;
    let total_s = total_cs / 100;
    let s = total_s % 60;
    let m = total_s / 60;
    format!("{m:02}:{s:02}.{cs:02}")
}
