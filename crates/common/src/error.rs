//! Error types shared across karaoke crates.

use std::path::PathBuf;

use crate::job_id::JobId;

/// Top-level error type for karaoke operations.
#[derive(Debug, thiserror::Error)]
pub enum KaraokeError {
    #[error("Invalid input: {message}")]
    Input { message: String },

    #[error("Lyrics contain no non-blank lines")]
    EmptyLyrics,

    #[error("Render process error: {message}")]
    RenderProcess {
        message: String,
        exit_code: Option<i32>,
        diagnostic_tail: String,
    },

    #[error("Filesystem error at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Render job {job_id} was cancelled")]
    Cancelled { job_id: JobId },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using KaraokeError.
pub type KaraokeResult<T> = Result<T, KaraokeError>;

/// Coarse classification used by callers to decide how to report a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected before any external process was launched.
    Input,
    /// The renderer failed to launch or exited non-zero.
    RenderProcess,
    /// Output directory or file could not be created.
    Filesystem,
    /// The job was cancelled by its submitter.
    Cancelled,
    Internal,
}

impl KaraokeError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn render_process(
        msg: impl Into<String>,
        exit_code: Option<i32>,
        diagnostic_tail: impl Into<String>,
    ) -> Self {
        Self::RenderProcess {
            message: msg.into(),
            exit_code,
            diagnostic_tail: diagnostic_tail.into(),
        }
    }

    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input { .. } | Self::EmptyLyrics => ErrorKind::Input,
            Self::RenderProcess { .. } => ErrorKind::RenderProcess,
            Self::Filesystem { .. } | Self::Io(_) => ErrorKind::Filesystem,
            Self::Cancelled { .. } => ErrorKind::Cancelled,
            Self::Unsupported { .. } | Self::Config { .. } | Self::Json(_) | Self::Other(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Captured renderer diagnostics, when the failure came from the renderer.
    pub fn diagnostic_tail(&self) -> Option<&str> {
        match self {
            Self::RenderProcess {
                diagnostic_tail, ..
            } => Some(diagnostic_tail.as_str()),
            _ => None,
        }
    }
}
