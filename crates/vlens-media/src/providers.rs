//! Provider traits wrapping the external analysis capabilities.
//!
//! The pipeline only talks to these traits. Production implementations live
//! in this crate (FFmpeg decoding, histogram scene cuts) and in
//! `vlens-ml-client` (speech, objects, emotions); tests substitute fakes.

use std::path::Path;

use async_trait::async_trait;
use image::RgbImage;
use serde::{Deserialize, Serialize};
use vlens_models::{LabelTree, Scene, TranscriptFragment, VideoSource};

use crate::error::MediaResult;

/// Opens videos for sequential decoding.
#[async_trait]
pub trait FrameDecoder: Send + Sync {
    /// Open a video. Fails with `FileNotFound` when the path is missing and
    /// with another error when the container cannot be decoded.
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn FrameSource>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// A finite, forward-only sequence of decoded RGB frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Metadata reported when the source was opened.
    fn info(&self) -> &VideoSource;

    /// Next frame, or `None` at end of stream.
    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>>;
}

/// Extracts a mono 16 kHz PCM WAV track from a video.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    /// Write the audio track of `video` to `output`, overwriting it.
    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<()>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// One finalized utterance from a recognizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecognizedSegment {
    /// Utterance text
    #[serde(default)]
    pub text: String,
    /// Word-level fragments with timings
    #[serde(default, rename = "result")]
    pub words: Vec<TranscriptFragment>,
}

impl RecognizedSegment {
    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.text.trim().is_empty()
    }
}

/// Streaming speech-to-text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Fail fast when the model or service is not usable.
    async fn ensure_ready(&self) -> MediaResult<()>;

    /// Start a recognition session for PCM at `sample_rate`.
    async fn start(&self, sample_rate: u32) -> MediaResult<Box<dyn RecognitionSession>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// A single streaming recognition session.
#[async_trait]
pub trait RecognitionSession: Send {
    /// Feed one chunk of 16-bit mono PCM. Returns a segment when the
    /// recognizer finalizes an utterance.
    async fn accept_chunk(&mut self, pcm: &[i16]) -> MediaResult<Option<RecognizedSegment>>;

    /// Flush the trailing partial utterance.
    async fn finish(&mut self) -> MediaResult<Option<RecognizedSegment>>;
}

/// Object detection on a single frame.
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Labels found in the frame, possibly nested.
    async fn detect(&self, frame: &RgbImage) -> MediaResult<LabelTree>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Facial emotion classification on a single frame.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Dominant emotion per detected face, in detection order. Empty when no
    /// face is present.
    async fn classify(&self, frame: &RgbImage) -> MediaResult<Vec<String>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Shot boundary detection over a whole video.
#[async_trait]
pub trait SceneDetector: Send + Sync {
    /// Scenes in order. Empty when the video has no cuts.
    async fn detect_scenes(&self, video: &Path) -> MediaResult<Vec<Scene>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Extractive summarization.
pub trait Summarizer: Send + Sync {
    /// Up to `sentences` sentences of `text`, in ranking order.
    fn summarize(&self, text: &str, sentences: usize) -> Vec<String>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_deserializes_recognizer_payload() {
        let json = r#"{
            "text": "hi there",
            "result": [
                {"word": "hi", "start": 0.0, "end": 0.4, "conf": 1.0},
                {"word": "there", "start": 0.5, "end": 0.9, "conf": 0.9}
            ]
        }"#;

        let segment: RecognizedSegment = serde_json::from_str(json).unwrap();
        assert_eq!(segment.text, "hi there");
        assert_eq!(segment.words.len(), 2);
        assert_eq!(segment.words[1].text, "there");
        assert!(!segment.is_empty());
    }

    #[test]
    fn test_empty_segment() {
        let segment: RecognizedSegment = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert!(segment.is_empty());
    }
}
