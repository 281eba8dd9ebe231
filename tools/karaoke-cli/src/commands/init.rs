//! Write a default configuration file.

use anyhow::Context;
use karaoke_common::config::{config_file_path, AppConfig};

pub fn run(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        println!("Config already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    AppConfig::default()
        .save()
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    println!("Wrote default config: {}", path.display());

    Ok(())
}
