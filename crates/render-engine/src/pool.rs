//! Bounded render pool.
//!
//! Jobs are admitted through a semaphore so at most `max_concurrent`
//! renderer processes run at once. Each submission gets a ticket that can
//! cancel the job: before admission the job never starts, after admission
//! the renderer process is killed.

use std::path::PathBuf;
use std::sync::Arc;

use karaoke_common::error::{KaraokeError, KaraokeResult};
use karaoke_common::job_id::JobId;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::backend::RenderContext;
use crate::job::{GenerateRequest, RenderOutcome};
use crate::orchestrator::RenderOrchestrator;
use crate::process::{cancel_pair, CancelHandle, ProgressCallback};

/// Admission-controlled queue in front of an orchestrator.
#[derive(Debug, Clone)]
pub struct RenderPool {
    orchestrator: Arc<RenderOrchestrator>,
    permits: Arc<Semaphore>,
    max_concurrent: usize,
    output_dir: PathBuf,
}

/// Handle to a submitted job.
#[derive(Debug)]
pub struct RenderTicket {
    job_id: JobId,
    cancel: CancelHandle,
    handle: JoinHandle<KaraokeResult<RenderOutcome>>,
}

impl RenderTicket {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Request cancellation. Has no effect once the job has finished.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A handle that can cancel this job after the ticket is consumed.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Wait for the job to finish.
    pub async fn wait(self) -> KaraokeResult<RenderOutcome> {
        match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(KaraokeError::Other(anyhow::anyhow!(
                "render task ended abnormally: {err}"
            ))),
        }
    }
}

impl RenderPool {
    pub fn new(
        orchestrator: Arc<RenderOrchestrator>,
        max_concurrent: usize,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            orchestrator,
            permits: Arc::new(Semaphore::new(max_concurrent)),
            max_concurrent,
            output_dir: output_dir.into(),
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Jobs currently holding a renderer slot.
    pub fn running(&self) -> usize {
        self.max_concurrent - self.permits.available_permits()
    }

    /// Queue a request. Must be called from within a tokio runtime.
    pub fn submit(
        &self,
        request: GenerateRequest,
        progress: Option<ProgressCallback>,
    ) -> RenderTicket {
        let job_id = self.orchestrator.next_job_id();
        let (cancel, token) = cancel_pair();
        let orchestrator = Arc::clone(&self.orchestrator);
        let permits = Arc::clone(&self.permits);
        let output_dir = self.output_dir.clone();

        tracing::debug!(job_id = %job_id, "Render job queued");

        let handle = tokio::spawn(async move {
            let mut waiting = token.clone();
            let _permit = tokio::select! {
                biased;
                _ = waiting.cancelled() => {
                    tracing::info!(job_id = %job_id, "Render job cancelled before admission");
                    return Err(KaraokeError::Cancelled { job_id });
                }
                permit = permits.acquire_owned() => permit.map_err(|_| {
                    KaraokeError::unsupported("render pool has been shut down")
                })?,
            };

            tracing::debug!(job_id = %job_id, "Render job admitted");
            let ctx = RenderContext {
                progress,
                cancel: Some(token),
            };
            orchestrator
                .generate_with_id(job_id, request, &output_dir, ctx)
                .await
        });

        RenderTicket {
            job_id,
            cancel,
            handle,
        }
    }
}
