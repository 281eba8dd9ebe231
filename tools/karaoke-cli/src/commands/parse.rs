//! Parse a lyrics file and print the schedule.

use std::path::PathBuf;

use super::load_schedule;

pub fn run(path: PathBuf, lrc: bool) -> anyhow::Result<()> {
    let schedule = load_schedule(&path)?;

    tracing::debug!(
        lines = schedule.len(),
        tagged = schedule.tagged_count(),
        "Parsed {}",
        path.display()
    );

    if lrc {
        print!("{}", schedule.to_lrc());
    } else {
        println!("{}", serde_json::to_string_pretty(&schedule)?);
    }

    Ok(())
}
