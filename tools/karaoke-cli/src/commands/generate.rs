//! Render a karaoke video.

use std::path::PathBuf;
use std::sync::Arc;

use karaoke_common::config::AppConfig;
use karaoke_render_engine::{
    GenerateRequest, ProgressCallback, RenderOrchestrator, RenderPool, RenderProgress,
};

use super::read_lyrics;

#[allow(clippy::too_many_arguments)]
pub async fn run(
    config: &AppConfig,
    audio: PathBuf,
    lyrics: PathBuf,
    background: Option<PathBuf>,
    title: String,
    artist: String,
    include_intro: bool,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    let lyrics_raw_text = read_lyrics(&lyrics)?;
    let output_dir = output_dir.unwrap_or_else(|| config.output_dir.clone());

    println!("Generating karaoke video: {title} by {artist}");
    println!("  Audio: {}", audio.display());
    if let Some(bg) = &background {
        println!("  Background: {}", bg.display());
    }
    println!("  Output directory: {}", output_dir.display());

    let request = GenerateRequest {
        audio_path: audio,
        lyrics_raw_text,
        background_path: background,
        title,
        artist,
        include_intro,
    };

    let orchestrator = Arc::new(RenderOrchestrator::from_config(config));
    let pool = RenderPool::new(
        orchestrator,
        config.render.max_concurrent_jobs,
        output_dir,
    );

    let progress: ProgressCallback = Arc::new(|p: RenderProgress| {
        print!(
            "\r  Progress: {:.1}% ({:.1}s rendered, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.out_time_secs,
            p.eta_secs,
        );
    });

    let ticket = pool.submit(request, Some(progress));
    let job_id = ticket.job_id();
    let cancel = ticket.cancel_handle();
    let wait = ticket.wait();
    tokio::pin!(wait);

    let result = tokio::select! {
        result = &mut wait => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nInterrupted, stopping job {job_id}");
            cancel.cancel();
            wait.await
        }
    };

    match result {
        Ok(outcome) => {
            println!("\nRender complete: {}", outcome.output_path.display());
            println!(
                "{}",
                serde_json::json!({
                    "videoPath": outcome.output_path,
                    "filename": outcome.filename,
                })
            );
            Ok(())
        }
        Err(e) => {
            println!("\nRender failed: {e}");
            if let Some(tail) = e.diagnostic_tail().filter(|t| !t.is_empty()) {
                println!("  Renderer output:");
                for line in tail.lines() {
                    println!("    {line}");
                }
            }
            Err(e.into())
        }
    }
}
