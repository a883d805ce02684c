//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Video file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unable to open video file: {0}")]
    Unreadable(String),

    #[error("Audio extraction failed: {0}")]
    AudioExtractionFailed(String),

    #[error("Speech recognizer unavailable: {0}")]
    RecognizerUnavailable(String),

    #[error("{detector} detector failed: {message}")]
    DetectorFailure { detector: &'static str, message: String },

    #[error("Media error: {0}")]
    Media(#[from] vlens_media::MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PipelineError {
    pub fn unreadable(msg: impl Into<String>) -> Self {
        Self::Unreadable(msg.into())
    }

    pub fn audio_extraction_failed(msg: impl Into<String>) -> Self {
        Self::AudioExtractionFailed(msg.into())
    }

    pub fn recognizer_unavailable(msg: impl Into<String>) -> Self {
        Self::RecognizerUnavailable(msg.into())
    }

    pub fn detector_failure(detector: &'static str, msg: impl Into<String>) -> Self {
        Self::DetectorFailure {
            detector,
            message: msg.into(),
        }
    }

    /// Whether the error aborts a run instead of degrading to a sentinel.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Unreadable(_))
    }

    /// Message reported in the top-level `{"error": ...}` payload.
    pub fn report_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Video file not found!".to_string(),
            Self::Unreadable(_) => "Unable to open video file.".to_string(),
            other => other.to_string(),
        }
    }
}
