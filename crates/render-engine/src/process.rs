//! Supervision of the external renderer process.
//!
//! The renderer writes `-progress` key/value pairs to stdout and its
//! diagnostics to stderr. Both pipes are drained concurrently until the
//! process exits; the last few stderr lines are kept for failure reports.

use std::collections::VecDeque;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;

use karaoke_common::error::{KaraokeError, KaraokeResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::watch;

use crate::invocation::RenderInvocation;

/// Progress callback for a running render.
pub type ProgressCallback = Arc<dyn Fn(RenderProgress) + Send + Sync>;

/// Render progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Output timestamp reached by the renderer.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: RenderStage,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Rendering,
    Finalizing,
    Complete,
}

/// How a supervised process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub success: bool,
    /// The process was killed because the job was cancelled.
    pub cancelled: bool,
    /// Most recent stderr lines, oldest first.
    pub diagnostic_tail: String,
}

impl ProcessOutcome {
    fn from_status(status: ExitStatus, diagnostic_tail: String) -> Self {
        Self {
            exit_code: status.code(),
            success: status.success(),
            cancelled: false,
            diagnostic_tail,
        }
    }

    fn cancelled() -> Self {
        Self {
            exit_code: None,
            success: false,
            cancelled: true,
            diagnostic_tail: String::new(),
        }
    }
}

/// Requests cancellation of a job.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

/// Observed by the job to learn about cancellation.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

/// Create a connected cancel handle and token.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx: Arc::new(tx) }, CancelToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Bounded buffer of the most recent diagnostic lines.
#[derive(Debug, Clone)]
pub struct DiagnosticTail {
    lines: VecDeque<String>,
    capacity: usize,
}

impl DiagnosticTail {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line.into());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn render(&self) -> String {
        self.lines.iter().map(String::as_str).collect::<Vec<_>>().join("\n")
    }
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports out_time_ms in microseconds as well.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    fn report(&self, expected_duration_secs: f64, elapsed_secs: f64) -> RenderProgress {
        let progress = if expected_duration_secs <= 0.0 {
            0.0
        } else {
            (self.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
        };

        let eta_secs = if progress > 0.0 {
            (elapsed_secs / progress) - elapsed_secs
        } else {
            0.0
        }
        .max(0.0);

        RenderProgress {
            progress: if self.complete { 1.0 } else { progress },
            out_time_secs: self.out_time_secs,
            eta_secs,
            stage: if self.complete {
                RenderStage::Finalizing
            } else {
                RenderStage::Rendering
            },
        }
    }
}

enum Finish {
    Exited(std::io::Result<ExitStatus>),
    Cancelled,
}

/// Launch the invocation and wait for it to exit.
///
/// A non-zero exit is reported as `Ok` with `success == false`; launch and
/// pipe failures are errors. Cancelling kills the process and reports
/// `cancelled == true`.
pub async fn supervise(
    invocation: &RenderInvocation,
    tail_lines: usize,
    progress: Option<ProgressCallback>,
    cancel: Option<CancelToken>,
) -> KaraokeResult<ProcessOutcome> {
    tracing::debug!(command = %invocation.display_command(), "Launching renderer");

    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            let message = if e.kind() == std::io::ErrorKind::NotFound {
                format!("Renderer executable not found: {}", invocation.program)
            } else {
                format!("Failed to start {}: {e}", invocation.program)
            };
            KaraokeError::render_process(message, None, String::new())
        })?;

    tracing::info!(
        pid = child.id(),
        args_len = invocation.args.len(),
        expected_duration_secs = invocation.expected_duration_secs,
        "Renderer process started"
    );

    let stdout = child.stdout.take().ok_or_else(|| {
        KaraokeError::render_process("Failed to capture renderer stdout", None, "")
    })?;
    let stderr = child.stderr.take().ok_or_else(|| {
        KaraokeError::render_process("Failed to capture renderer stderr", None, "")
    })?;

    let stderr_task = tokio::spawn(collect_tail(stderr, tail_lines));

    let started = Instant::now();
    let expected = invocation.expected_duration_secs;
    let finish = tokio::select! {
        status = drain_and_wait(&mut child, stdout, progress.as_ref(), expected, started) => Finish::Exited(status),
        _ = wait_cancelled(cancel) => Finish::Cancelled,
    };

    match finish {
        Finish::Cancelled => {
            if let Err(err) = child.kill().await {
                tracing::warn!(error = %err, "Failed to kill cancelled renderer");
            }
            stderr_task.abort();
            tracing::info!("Renderer process killed after cancellation");
            Ok(ProcessOutcome::cancelled())
        }
        Finish::Exited(status) => {
            let status = status.map_err(|e| {
                KaraokeError::render_process(format!("Failed to wait on renderer: {e}"), None, "")
            })?;
            let tail = stderr_task
                .await
                .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

            tracing::info!(
                exit_code = status.code(),
                elapsed_secs = started.elapsed().as_secs_f64(),
                "Renderer process exited"
            );

            if status.success() {
                if let Some(cb) = &progress {
                    cb(RenderProgress {
                        progress: 1.0,
                        out_time_secs: expected,
                        eta_secs: 0.0,
                        stage: RenderStage::Complete,
                    });
                }
            }

            Ok(ProcessOutcome::from_status(status, tail))
        }
    }
}

async fn drain_and_wait<R>(
    child: &mut Child,
    stdout: R,
    progress: Option<&ProgressCallback>,
    expected_duration_secs: f64,
    started: Instant,
) -> std::io::Result<ExitStatus>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    let mut state = ProgressState::default();
    let mut last_advance = (0.0f64, Instant::now());

    while let Some(line) = next_lossy_line(&mut reader, &mut buf).await? {
        let trimmed = line.trim();
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        state.update(key, value);
        if key != "progress" {
            continue;
        }

        if state.out_time_secs > last_advance.0 + 0.001 {
            last_advance = (state.out_time_secs, Instant::now());
        } else if last_advance.1.elapsed().as_secs() >= 10 {
            tracing::warn!(
                out_time_secs = state.out_time_secs,
                elapsed_secs = started.elapsed().as_secs_f64(),
                "No renderer progress advancement for 10s"
            );
            last_advance.1 = Instant::now();
        }

        let report = state.report(expected_duration_secs, started.elapsed().as_secs_f64());
        tracing::trace!(
            progress = report.progress,
            out_time_secs = report.out_time_secs,
            "Render progress"
        );
        if let Some(cb) = progress {
            cb(report);
        }
    }

    child.wait().await
}

async fn collect_tail<R>(stderr: R, capacity: usize) -> String
where
    R: AsyncRead + Unpin,
{
    let mut tail = DiagnosticTail::new(capacity);
    let mut reader = BufReader::new(stderr);
    let mut buf = Vec::new();
    loop {
        match next_lossy_line(&mut reader, &mut buf).await {
            Ok(Some(line)) => {
                tracing::debug!(target: "karaoke::renderer", "{line}");
                tail.push(line);
            }
            Ok(None) => break,
            Err(err) => {
                tail.push(format!("<failed to read renderer stderr: {err}>"));
                break;
            }
        }
    }
    tail.render()
}

/// Read one line with the line ending stripped and invalid UTF-8
/// replaced. `None` at end of stream.
async fn next_lossy_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    if reader.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(&buf[..]).into_owned()))
}

async fn wait_cancelled(cancel: Option<CancelToken>) {
    match cancel {
        Some(mut token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}
