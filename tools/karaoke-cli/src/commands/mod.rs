pub mod check;
pub mod generate;
pub mod graph;
pub mod init;
pub mod parse;

use std::path::Path;

use anyhow::Context;
use karaoke_lyrics::LyricSchedule;

/// Read and parse a lyrics file.
pub fn load_schedule(path: &Path) -> anyhow::Result<LyricSchedule> {
    let raw = read_lyrics(path)?;
    let schedule = karaoke_lyrics::parse(&raw)
        .with_context(|| format!("Failed to parse lyrics {}", path.display()))?;
    Ok(schedule)
}

/// Read a lyrics file into memory.
pub fn read_lyrics(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read lyrics {}", path.display()))
}
