//! Renderer backends.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use karaoke_common::config::RenderDefaults;
use karaoke_common::error::KaraokeResult;
use tokio::process::Command;

use crate::invocation::RenderInvocation;
use crate::process::{supervise, CancelToken, ProcessOutcome, ProgressCallback};

/// Per-job hooks passed to a backend.
#[derive(Clone, Default)]
pub struct RenderContext {
    pub progress: Option<ProgressCallback>,
    pub cancel: Option<CancelToken>,
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

/// Trait for render backends.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Run the invocation to completion.
    async fn render(
        &self,
        invocation: &RenderInvocation,
        ctx: RenderContext,
    ) -> KaraokeResult<ProcessOutcome>;

    /// Duration of a media file in seconds, if it can be determined.
    async fn probe_duration(&self, _path: &Path) -> Option<f64> {
        None
    }

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Backend that runs the ffmpeg command line tools.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg_binary: String,
    ffprobe_binary: String,
    tail_lines: usize,
}

impl FfmpegBackend {
    pub fn new(settings: &RenderDefaults) -> Self {
        Self {
            ffmpeg_binary: settings.ffmpeg_binary.clone(),
            ffprobe_binary: settings.ffprobe_binary.clone(),
            tail_lines: settings.diagnostic_tail_lines,
        }
    }

    pub fn probe_available(&self) -> bool {
        command_runs(&self.ffprobe_binary)
    }

    /// Report which of the renderer tools can be executed.
    pub fn check(&self) -> RendererCheck {
        RendererCheck {
            ffmpeg: self.is_available(),
            ffprobe: self.probe_available(),
        }
    }
}

#[async_trait]
impl RenderBackend for FfmpegBackend {
    async fn render(
        &self,
        invocation: &RenderInvocation,
        ctx: RenderContext,
    ) -> KaraokeResult<ProcessOutcome> {
        supervise(invocation, self.tail_lines, ctx.progress, ctx.cancel).await
    }

    async fn probe_duration(&self, path: &Path) -> Option<f64> {
        let output = Command::new(&self.ffprobe_binary)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;

        if !output.status.success() {
            tracing::debug!(path = %path.display(), "ffprobe could not read duration");
            return None;
        }

        parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
    }

    fn is_available(&self) -> bool {
        command_runs(&self.ffmpeg_binary)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Availability of the external tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RendererCheck {
    pub ffmpeg: bool,
    pub ffprobe: bool,
}

/// Whether `binary -version` runs successfully.
fn command_runs(binary: &str) -> bool {
    std::process::Command::new(binary)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn parse_probe_duration(raw: &str) -> Option<f64> {
    let secs = raw.lines().next()?.trim().parse::<f64>().ok()?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_duration() {
        assert_eq!(parse_probe_duration("185.231000\n"), Some(185.231));
        assert_eq!(parse_probe_duration("N/A\n"), None);
        assert_eq!(parse_probe_duration("0.000000"), None);
        assert_eq!(parse_probe_duration(""), None);
    }

    #[test]
    fn test_missing_binaries_are_unavailable() {
        let settings = RenderDefaults {
            ffmpeg_binary: "definitely-not-a-renderer-binary".to_string(),
            ffprobe_binary: "definitely-not-a-probe-binary".to_string(),
            ..RenderDefaults::default()
        };
        let backend = FfmpegBackend::new(&settings);
        assert!(!backend.is_available());
        assert_eq!(
            backend.check(),
            RendererCheck {
                ffmpeg: false,
                ffprobe: false
            }
        );
    }

    #[tokio::test]
    async fn test_probe_failure_yields_no_duration() {
        let settings = RenderDefaults {
            ffprobe_binary: "definitely-not-a-probe-binary".to_string(),
            ..RenderDefaults::default()
        };
        let backend = FfmpegBackend::new(&settings);
        assert_eq!(backend.probe_duration(Path::new("/no/such.mp3")).await, None);
    }
}
