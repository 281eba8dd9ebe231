//! Print the overlay graph for a lyrics file.

use std::path::PathBuf;

use karaoke_common::config::AppConfig;
use karaoke_render_engine::{filter_style, RenderOrchestrator};
use karaoke_render_graph::{to_filtergraph, GraphOptions};

use super::load_schedule;

pub fn run(
    config: &AppConfig,
    path: PathBuf,
    title: String,
    artist: String,
    include_intro: bool,
    has_background: bool,
) -> anyhow::Result<()> {
    let schedule = load_schedule(&path)?;

    let orchestrator = RenderOrchestrator::from_config(config);
    let graph = orchestrator.graph_builder().build(
        &schedule,
        &title,
        &artist,
        GraphOptions {
            include_intro,
            has_background,
        },
    );

    eprintln!(
        "{} operations ({} intro), ends at {:.2}s",
        graph.len(),
        graph.intro_count(),
        graph.end_secs()
    );
    println!(
        "{}",
        to_filtergraph(&graph, &filter_style(orchestrator.settings()))
    );

    Ok(())
}
