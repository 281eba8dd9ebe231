//! Render requests, jobs, and outcomes.

use std::path::{Path, PathBuf};

use karaoke_common::error::{KaraokeError, KaraokeResult};
use karaoke_common::job_id::JobId;
use karaoke_lyrics::{parse, LyricSchedule, LyricsError};
use serde::{Deserialize, Serialize};

/// Raw request handed over by the outer request layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub audio_path: PathBuf,
    #[serde(alias = "lyrics")]
    pub lyrics_raw_text: String,
    #[serde(default)]
    pub background_path: Option<PathBuf>,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub include_intro: bool,
}

impl GenerateRequest {
    /// Reject requests with missing required fields.
    pub fn validate(&self) -> KaraokeResult<()> {
        let mut missing = Vec::new();
        if self.audio_path.as_os_str().is_empty() {
            missing.push("audioPath");
        }
        if self.lyrics_raw_text.is_empty() {
            missing.push("lyricsRawText");
        }
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.artist.trim().is_empty() {
            missing.push("artist");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(KaraokeError::input(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Validate, parse the lyrics, and produce a render request.
    pub fn into_render_request(self) -> KaraokeResult<RenderRequest> {
        self.validate()?;
        let schedule = parse(&self.lyrics_raw_text).map_err(|e| match e {
            LyricsError::EmptyInput => KaraokeError::EmptyLyrics,
        })?;

        tracing::debug!(
            lines = schedule.len(),
            tagged = schedule.tagged_count(),
            estimated = schedule.estimated_count(),
            "Lyrics parsed"
        );

        Ok(RenderRequest {
            audio_path: self.audio_path,
            background_path: self.background_path,
            title: self.title,
            artist: self.artist,
            include_intro: self.include_intro,
            schedule,
        })
    }
}

/// Everything needed to render one video.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub audio_path: PathBuf,
    pub background_path: Option<PathBuf>,
    pub title: String,
    pub artist: String,
    pub include_intro: bool,
    pub schedule: LyricSchedule,
}

impl RenderRequest {
    pub fn has_background(&self) -> bool {
        self.background_path.is_some()
    }

    /// Check that the media inputs exist before any process is launched.
    pub async fn check_inputs(&self) -> KaraokeResult<()> {
        require_file(&self.audio_path, "audio").await?;
        if let Some(background) = &self.background_path {
            require_file(background, "background").await?;
        }
        Ok(())
    }
}

async fn require_file(path: &Path, what: &str) -> KaraokeResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(KaraokeError::input(format!(
            "{what} input is not a file: {}",
            path.display()
        ))),
        Err(_) => Err(KaraokeError::input(format!(
            "{what} input not found: {}",
            path.display()
        ))),
    }
}

/// Lifecycle state of a render job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// One invocation of the external renderer.
#[derive(Debug, Clone, Serialize)]
pub struct RenderJob {
    pub id: JobId,
    pub status: JobStatus,
    pub output_path: PathBuf,
    /// Most recent renderer diagnostics, filled on failure.
    pub diagnostic_tail: String,
}

impl RenderJob {
    pub(crate) fn new(id: JobId, output_dir: &Path) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            output_path: output_dir.join(id.output_filename()),
            diagnostic_tail: String::new(),
        }
    }

    pub fn filename(&self) -> String {
        self.id.output_filename()
    }

    pub(crate) fn mark_running(&mut self) {
        self.status = JobStatus::Running;
    }

    pub(crate) fn mark_succeeded(&mut self) {
        self.status = JobStatus::Succeeded;
    }

    pub(crate) fn mark_failed(&mut self, diagnostic_tail: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.diagnostic_tail = diagnostic_tail.into();
    }
}

/// Result of a successful render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOutcome {
    pub output_path: PathBuf,
    pub filename: String,
    #[serde(skip)]
    pub job: RenderJob,
}

#[cfg(test)]
mod tests {
    use super::*;
    use karaoke_common::error::ErrorKind;

    fn request() -> GenerateRequest {
        GenerateRequest {
            audio_path: PathBuf::from("song.mp3"),
            lyrics_raw_text: "Hello\nWorld".to_string(),
            background_path: None,
            title: "Song".to_string(),
            artist: "Band".to_string(),
            include_intro: true,
        }
    }

    #[test]
    fn test_valid_request_parses_lyrics() {
        let render = request().into_render_request().unwrap();
        assert_eq!(render.schedule.len(), 2);
        assert!(render.include_intro);
        assert!(!render.has_background());
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let mut req = request();
        req.title = "  ".to_string();
        req.artist.clear();
        let err = req.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.to_string().contains("title, artist"));
    }

    #[test]
    fn test_whitespace_lyrics_are_empty_input() {
        let mut req = request();
        req.lyrics_raw_text = " \n\t\n".to_string();
        let err = req.into_render_request().unwrap_err();
        assert!(matches!(err, KaraokeError::EmptyLyrics));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[test]
    fn test_request_json_contract() {
        let raw = r#"{
            "audioPath": "uploads/music_1.mp3",
            "lyrics": "[00:01.00]hi",
            "title": "T",
            "artist": "A",
            "includeIntro": true
        }"#;
        let req: GenerateRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.audio_path, PathBuf::from("uploads/music_1.mp3"));
        assert!(req.background_path.is_none());
        assert!(req.include_intro);
    }

    #[test]
    fn test_job_output_path() {
        let job = RenderJob::new(JobId(1234), Path::new("/out"));
        assert_eq!(job.output_path, PathBuf::from("/out/karaoke_1234.mp4"));
        assert_eq!(job.filename(), "karaoke_1234.mp4");
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_missing_audio_is_input_error() {
        let render = request().into_render_request().unwrap();
        let err = render.check_inputs().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Input);
        assert!(err.to_string().contains("audio input not found"));
    }
}
