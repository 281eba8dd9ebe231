//! Check renderer availability.

use karaoke_common::config::{config_file_path, AppConfig};
use karaoke_render_engine::FfmpegBackend;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Karaoke Renderer Check");
    println!("{}", "=".repeat(50));

    let check = FfmpegBackend::new(&config.render).check();
    if check.ffmpeg {
        println!("[OK] Renderer: {}", config.render.ffmpeg_binary);
    } else {
        println!("[FAIL] Renderer not found: {}", config.render.ffmpeg_binary);
    }
    if check.ffprobe {
        println!("[OK] Probe: {}", config.render.ffprobe_binary);
    } else {
        println!(
            "[WARN] Probe not found: {} (canvas length falls back to the lyric timeline)",
            config.render.ffprobe_binary
        );
    }

    println!("     Config file: {}", config_file_path().display());
    println!("     Output directory: {}", config.output_dir.display());
    println!(
        "     Concurrent jobs: {}",
        config.render.max_concurrent_jobs
    );

    println!();
    if check.ffmpeg {
        println!("Renderer is available. Karaoke generation is ready.");
    } else {
        println!("Install ffmpeg or set render.ffmpeg_binary in the config file.");
    }

    Ok(())
}
