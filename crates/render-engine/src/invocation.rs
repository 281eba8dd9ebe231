//! Assembly of the external renderer command line.
//!
//! ```text
//! input 0: audio ─────────────────────────────────────┐
//! input 1: background image (looped) | color canvas ──┼── filter_complex ── [vout] + 0:a ── H.264/AAC mp4
//! render graph ───────────────────────────────────────┘
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use karaoke_common::config::RenderDefaults;
use karaoke_render_graph::{to_filtergraph, FilterStyle, RenderGraph, OUTPUT_PAD};

use crate::job::RenderRequest;

/// A fully assembled renderer command.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInvocation {
    pub program: String,
    pub args: Vec<OsString>,
    pub output_path: PathBuf,
    /// Expected output length, used for progress reporting.
    pub expected_duration_secs: f64,
}

impl RenderInvocation {
    /// The command line as one string, for logs and debug reports.
    /// Non-UTF-8 arguments are shown lossily.
    pub fn display_command(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

/// Overlay style derived from the render defaults.
pub fn filter_style(settings: &RenderDefaults) -> FilterStyle {
    FilterStyle {
        width: settings.width,
        height: settings.height,
        primary_color: settings.primary_color.clone(),
        accent_color: settings.accent_color.clone(),
        font_file: settings.font_file.clone(),
        video_input: 1,
    }
}

/// Length of the synthetic canvas: the probed audio length when known,
/// otherwise the end of the last overlay, never below `min_secs`.
pub fn canvas_duration(probed_audio_secs: Option<f64>, graph: &RenderGraph, min_secs: f64) -> f64 {
    probed_audio_secs
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .unwrap_or_else(|| graph.end_secs())
        .max(min_secs)
}

/// Build the renderer invocation for one job.
///
/// Paths are passed through as raw OS strings so non-UTF-8 names reach the
/// renderer unchanged.
pub fn build_invocation(
    request: &RenderRequest,
    graph: &RenderGraph,
    output_path: &Path,
    canvas_secs: f64,
    settings: &RenderDefaults,
) -> RenderInvocation {
    let mut args: Vec<OsString> = [
        "-y",
        "-hide_banner",
        "-loglevel",
        "error",
        "-nostats",
        "-progress",
        "pipe:1",
        "-i",
    ]
    .iter()
    .map(OsString::from)
    .collect();
    args.push(request.audio_path.as_os_str().to_owned());

    match &request.background_path {
        Some(background) => {
            args.extend(["-loop", "1", "-i"].map(OsString::from));
            args.push(background.as_os_str().to_owned());
        }
        None => {
            args.extend(["-f", "lavfi", "-i"].map(OsString::from));
            args.push(OsString::from(format!(
                "color={color}:size={w}x{h}:duration={secs:.3}",
                color = settings.canvas_color,
                w = settings.width,
                h = settings.height,
                secs = canvas_secs,
            )));
        }
    }

    args.push("-filter_complex".into());
    args.push(to_filtergraph(graph, &filter_style(settings)).into());
    args.push("-map".into());
    args.push(format!("[{OUTPUT_PAD}]").into());
    args.push("-map".into());
    args.push("0:a".into());
    args.extend(codec_args(settings).into_iter().map(OsString::from));
    args.push("-shortest".into());
    args.push(output_path.as_os_str().to_owned());

    RenderInvocation {
        program: settings.ffmpeg_binary.clone(),
        args,
        output_path: output_path.to_path_buf(),
        expected_duration_secs: canvas_secs,
    }
}

fn codec_args(settings: &RenderDefaults) -> Vec<String> {
    vec![
        "-c:v".to_string(),
        settings.video_codec.clone(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        settings.audio_codec.clone(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ]
}
