//! Render job orchestration.
//!
//! One job is one renderer invocation: make sure the output directory
//! exists, name the artifact after a fresh job id, assemble the command,
//! wait for the renderer, and report the artifact or the captured
//! diagnostics. Nothing is retried and partial output is left in place.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use karaoke_common::config::{AppConfig, LayoutConfig, RenderDefaults};
use karaoke_common::error::{KaraokeError, KaraokeResult};
use karaoke_common::job_id::{JobId, JobIdGenerator, MonotonicMillisIds};
use karaoke_render_graph::{GraphOptions, LineLayout, RenderGraph, RenderGraphBuilder};

use crate::backend::{FfmpegBackend, RenderBackend, RenderContext};
use crate::invocation::{build_invocation, canvas_duration};
use crate::job::{GenerateRequest, RenderJob, RenderOutcome, RenderRequest};

/// Drives render jobs through a backend.
pub struct RenderOrchestrator {
    backend: Arc<dyn RenderBackend>,
    ids: Arc<dyn JobIdGenerator>,
    settings: RenderDefaults,
    builder: RenderGraphBuilder,
}

impl std::fmt::Debug for RenderOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderOrchestrator")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .field("builder", &self.builder)
            .finish()
    }
}

impl RenderOrchestrator {
    pub fn new(
        backend: Arc<dyn RenderBackend>,
        ids: Arc<dyn JobIdGenerator>,
        settings: RenderDefaults,
        layout: &LayoutConfig,
    ) -> Self {
        Self {
            backend,
            ids,
            settings,
            builder: RenderGraphBuilder::new(line_layout(layout)),
        }
    }

    /// ffmpeg backend with wall-clock job ids.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::new(FfmpegBackend::new(&config.render)),
            Arc::new(MonotonicMillisIds::new()),
            config.render.clone(),
            &config.layout,
        )
    }

    pub fn settings(&self) -> &RenderDefaults {
        &self.settings
    }

    pub fn graph_builder(&self) -> &RenderGraphBuilder {
        &self.builder
    }

    /// Reserve the id for a job that will run later.
    pub fn next_job_id(&self) -> JobId {
        self.ids.next_id()
    }

    /// Compile the render graph for a request.
    pub fn build_graph(&self, request: &RenderRequest) -> RenderGraph {
        self.builder.build(
            &request.schedule,
            &request.title,
            &request.artist,
            GraphOptions {
                include_intro: request.include_intro,
                has_background: request.has_background(),
            },
        )
    }

    /// Render `graph` over the request's media into `output_dir`.
    pub async fn run(
        &self,
        request: &RenderRequest,
        graph: &RenderGraph,
        output_dir: &Path,
        ctx: RenderContext,
    ) -> KaraokeResult<RenderOutcome> {
        let id = self.next_job_id();
        self.run_with_id(id, request, graph, output_dir, ctx).await
    }

    /// Same as [`run`](Self::run) with a previously reserved id.
    pub async fn run_with_id(
        &self,
        id: JobId,
        request: &RenderRequest,
        graph: &RenderGraph,
        output_dir: &Path,
        ctx: RenderContext,
    ) -> KaraokeResult<RenderOutcome> {
        request.check_inputs().await?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| KaraokeError::filesystem(output_dir, e))?;

        let mut job = RenderJob::new(id, output_dir);
        tracing::info!(
            job_id = %job.id,
            output = %job.output_path.display(),
            backend = self.backend.name(),
            operations = graph.len(),
            "Starting render"
        );

        let probed = self.backend.probe_duration(&request.audio_path).await;
        let canvas_secs = canvas_duration(probed, graph, self.settings.min_canvas_secs);
        let invocation =
            build_invocation(request, graph, &job.output_path, canvas_secs, &self.settings);

        if ctx.cancel.as_ref().is_some_and(|token| token.is_cancelled()) {
            tracing::info!(job_id = %job.id, "Render cancelled before launch");
            return Err(KaraokeError::Cancelled { job_id: job.id });
        }

        let started = Instant::now();
        job.mark_running();
        let outcome = match self.backend.render(&invocation, ctx).await {
            Ok(outcome) => outcome,
            Err(err) => {
                job.mark_failed(err.diagnostic_tail().unwrap_or_default());
                tracing::error!(job_id = %job.id, error = %err, "Renderer failed to run");
                return Err(err);
            }
        };

        if outcome.cancelled {
            job.mark_failed(outcome.diagnostic_tail);
            tracing::warn!(job_id = %job.id, "Render cancelled");
            return Err(KaraokeError::Cancelled { job_id: job.id });
        }

        if !outcome.success {
            job.mark_failed(outcome.diagnostic_tail.clone());
            let exit = outcome
                .exit_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            tracing::error!(
                job_id = %job.id,
                exit_code = outcome.exit_code,
                diagnostics = %outcome.diagnostic_tail,
                "Renderer exited with failure"
            );
            return Err(KaraokeError::render_process(
                format!("{} exited with {exit}", self.backend.name()),
                outcome.exit_code,
                outcome.diagnostic_tail,
            ));
        }

        job.mark_succeeded();
        tracing::info!(
            job_id = %job.id,
            elapsed_secs = started.elapsed().as_secs_f64(),
            output = %job.output_path.display(),
            "Render finished"
        );

        Ok(RenderOutcome {
            output_path: job.output_path.clone(),
            filename: job.filename(),
            job,
        })
    }

    /// Validate, parse, build, and render one request end to end.
    pub async fn generate(
        &self,
        request: GenerateRequest,
        output_dir: &Path,
        ctx: RenderContext,
    ) -> KaraokeResult<RenderOutcome> {
        let id = self.next_job_id();
        self.generate_with_id(id, request, output_dir, ctx).await
    }

    pub(crate) async fn generate_with_id(
        &self,
        id: JobId,
        request: GenerateRequest,
        output_dir: &Path,
        ctx: RenderContext,
    ) -> KaraokeResult<RenderOutcome> {
        let request = request.into_render_request()?;
        let graph = self.build_graph(&request);
        self.run_with_id(id, &request, &graph, output_dir, ctx).await
    }
}

fn line_layout(layout: &LayoutConfig) -> LineLayout {
    LineLayout {
        line_spacing: layout.line_spacing,
        max_stacked_lines: layout.max_stacked_lines,
    }
}
