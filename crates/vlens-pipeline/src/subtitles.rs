//! Transcript and subtitle persistence.

use std::path::Path;

use tracing::{debug, warn};
use vlens_models::{build_subtitles, render_srt, Subtitle, TranscriptFragment};

use crate::error::PipelineResult;

/// Write the plain-text transcript.
pub async fn write_transcript(path: &Path, transcript: &str) -> PipelineResult<()> {
    tokio::fs::write(path, transcript).await?;
    debug!(path = %path.display(), "Transcript saved");
    Ok(())
}

/// Write the ordered word timings as a JSON array of `{word, start, end}`.
pub async fn write_timings(path: &Path, fragments: &[TranscriptFragment]) -> PipelineResult<()> {
    let json = serde_json::to_vec_pretty(fragments)?;
    tokio::fs::write(path, json).await?;
    debug!(path = %path.display(), entries = fragments.len(), "Word timings saved");
    Ok(())
}

/// Build subtitles from `fragments` and write them as SubRip.
pub async fn write_srt(path: &Path, fragments: &[TranscriptFragment]) -> PipelineResult<Vec<Subtitle>> {
    let subtitles = build_subtitles(fragments);
    tokio::fs::write(path, render_srt(&subtitles)).await?;
    debug!(path = %path.display(), cues = subtitles.len(), "SRT file saved");
    Ok(subtitles)
}

/// Best-effort timings dump; failures are logged only.
pub async fn persist_timings(path: &Path, fragments: &[TranscriptFragment]) {
    if let Err(e) = write_timings(path, fragments).await {
        warn!(
            path = %path.display(),
            error = %e,
            "Failed to persist word timings"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn fragments() -> Vec<TranscriptFragment> {
        vec![
            TranscriptFragment::new("hi", 0.0, 1.0),
            TranscriptFragment::new("there", 1.0, 2.0),
            TranscriptFragment::open_ended("world", 2.0),
        ]
    }

    #[tokio::test]
    async fn test_write_srt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("subtitles.srt");

        let subtitles = write_srt(&path, &fragments()).await.unwrap();
        assert_eq!(subtitles.len(), 3);

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.starts_with("1\n00:00:00,000 --> 00:00:01,000\nhi\n\n"));
        assert!(content.ends_with("3\n00:00:02,000 --> 00:00:04,000\nworld\n\n"));
    }

    #[tokio::test]
    async fn test_write_timings() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transcription.json");

        write_timings(&path, &fragments()).await.unwrap();

        let value: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(
            value,
            json!([
                {"word": "hi", "start": 0.0, "end": 1.0},
                {"word": "there", "start": 1.0, "end": 2.0},
                {"word": "world", "start": 2.0, "end": null}
            ])
        );
    }

    #[tokio::test]
    async fn test_write_srt_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("subtitles.srt");
        assert!(write_srt(&path, &fragments()).await.is_err());
    }
}
