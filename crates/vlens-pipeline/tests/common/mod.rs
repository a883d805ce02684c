//! In-process fakes for the pipeline's providers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use tempfile::TempDir;
use vlens_media::{
    AudioTranscoder, EmotionClassifier, FrameDecoder, FrameSource, MediaError, MediaResult,
    ObjectDetector, RecognitionSession, RecognizedSegment, SceneDetector, SpeechRecognizer,
};
use vlens_models::{LabelTree, Scene, TranscriptFragment, VideoSource};
use vlens_pipeline::{LsaSummarizer, PipelineConfig, Providers, VideoAnalyzer};

/// Decoder yielding solid-colour frames at a fixed rate.
pub struct SyntheticDecoder {
    pub fps: u32,
    pub frames: u64,
    pub unreadable: bool,
}

impl SyntheticDecoder {
    pub fn new(fps: u32, frames: u64) -> Self {
        Self {
            fps,
            frames,
            unreadable: false,
        }
    }

    pub fn unreadable() -> Self {
        Self {
            fps: 0,
            frames: 0,
            unreadable: true,
        }
    }
}

#[async_trait]
impl FrameDecoder for SyntheticDecoder {
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn FrameSource>> {
        if self.unreadable {
            return Err(MediaError::invalid_video("no video stream"));
        }
        Ok(Box::new(SyntheticSource {
            info: VideoSource {
                path: path.to_path_buf(),
                frame_rate: self.fps,
                total_frames: self.frames,
                width: 32,
                height: 24,
            },
            next: 0,
        }))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

struct SyntheticSource {
    info: VideoSource,
    next: u64,
}

#[async_trait]
impl FrameSource for SyntheticSource {
    fn info(&self) -> &VideoSource {
        &self.info
    }

    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if self.next >= self.info.total_frames {
            return Ok(None);
        }
        let shade = (self.next % 256) as u8;
        self.next += 1;
        Ok(Some(RgbImage::from_pixel(
            self.info.width,
            self.info.height,
            Rgb([shade, 64, 128]),
        )))
    }
}

/// Writes a silent mono WAV, or an empty file for the first
/// `empty_attempts` calls.
pub struct WavTranscoder {
    pub samples: u32,
    pub empty_attempts: usize,
    pub calls: AtomicUsize,
}

impl WavTranscoder {
    pub fn new(samples: u32) -> Self {
        Self {
            samples,
            empty_attempts: 0,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty_first(samples: u32, empty_attempts: usize) -> Self {
        Self {
            empty_attempts,
            ..Self::new(samples)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioTranscoder for WavTranscoder {
    async fn extract_audio(&self, _video: &Path, output: &Path) -> MediaResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.empty_attempts {
            std::fs::write(output, b"")?;
            return Ok(());
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(output, spec)?;
        for _ in 0..self.samples {
            writer.write_sample(0i16)?;
        }
        writer.finalize()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "wav"
    }
}

/// Recognizer replaying scripted segments, one per accepted chunk; whatever
/// is left is merged into the final result.
pub struct ScriptedRecognizer {
    pub ready: bool,
    pub segments: Vec<RecognizedSegment>,
    pub chunks_seen: Arc<AtomicUsize>,
}

impl ScriptedRecognizer {
    pub fn silent() -> Self {
        Self::with_segments(Vec::new())
    }

    pub fn with_segments(segments: Vec<RecognizedSegment>) -> Self {
        Self {
            ready: true,
            segments,
            chunks_seen: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            ready: false,
            ..Self::silent()
        }
    }
}

#[async_trait]
impl SpeechRecognizer for ScriptedRecognizer {
    async fn ensure_ready(&self) -> MediaResult<()> {
        if self.ready {
            Ok(())
        } else {
            Err(MediaError::provider_unavailable("model not loaded"))
        }
    }

    async fn start(&self, _sample_rate: u32) -> MediaResult<Box<dyn RecognitionSession>> {
        Ok(Box::new(ScriptedSession {
            pending: self.segments.iter().cloned().collect(),
            chunks_seen: self.chunks_seen.clone(),
        }))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

struct ScriptedSession {
    pending: VecDeque<RecognizedSegment>,
    chunks_seen: Arc<AtomicUsize>,
}

#[async_trait]
impl RecognitionSession for ScriptedSession {
    async fn accept_chunk(&mut self, pcm: &[i16]) -> MediaResult<Option<RecognizedSegment>> {
        assert!(!pcm.is_empty());
        self.chunks_seen.fetch_add(1, Ordering::SeqCst);
        Ok(self.pending.pop_front())
    }

    async fn finish(&mut self) -> MediaResult<Option<RecognizedSegment>> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let mut merged = RecognizedSegment::default();
        let mut texts = Vec::new();
        for segment in self.pending.drain(..) {
            texts.push(segment.text);
            merged.words.extend(segment.words);
        }
        merged.text = texts.join(" ");
        Ok(Some(merged))
    }
}

pub fn segment(text: &str, words: Vec<TranscriptFragment>) -> RecognizedSegment {
    RecognizedSegment {
        text: text.to_string(),
        words,
    }
}

/// Object detector returning fixed labels, failing on selected calls.
pub struct FixedObjects {
    pub labels: LabelTree,
    pub fail_on: Vec<usize>,
    pub calls: AtomicUsize,
}

impl FixedObjects {
    pub fn new(labels: LabelTree) -> Self {
        Self {
            labels,
            fail_on: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_on(mut self, calls: Vec<usize>) -> Self {
        self.fail_on = calls;
        self
    }
}

#[async_trait]
impl ObjectDetector for FixedObjects {
    async fn detect(&self, _frame: &RgbImage) -> MediaResult<LabelTree> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(MediaError::detection_failed("model crashed"));
        }
        Ok(self.labels.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Emotion classifier returning fixed per-face labels, failing on selected calls.
pub struct FixedEmotions {
    pub faces: Vec<String>,
    pub fail_on: Vec<usize>,
    pub calls: AtomicUsize,
}

impl FixedEmotions {
    pub fn new(faces: &[&str]) -> Self {
        Self {
            faces: faces.iter().map(|f| f.to_string()).collect(),
            fail_on: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn no_faces() -> Self {
        Self::new(&[])
    }

    pub fn failing_on(mut self, calls: Vec<usize>) -> Self {
        self.fail_on = calls;
        self
    }
}

#[async_trait]
impl EmotionClassifier for FixedEmotions {
    async fn classify(&self, _frame: &RgbImage) -> MediaResult<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            return Err(MediaError::detection_failed("face model crashed"));
        }
        Ok(self.faces.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Scene detector with a canned answer; `None` fails.
pub struct FixedScenes(pub Option<Vec<Scene>>);

#[async_trait]
impl SceneDetector for FixedScenes {
    async fn detect_scenes(&self, _video: &Path) -> MediaResult<Vec<Scene>> {
        self.0
            .clone()
            .ok_or_else(|| MediaError::detection_failed("scene decoder crashed"))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Providers for a silent, empty 10 second clip at 20 fps.
pub fn quiet_providers() -> Providers {
    Providers {
        frame_decoder: Arc::new(SyntheticDecoder::new(20, 200)),
        audio_transcoder: Arc::new(WavTranscoder::new(16_000)),
        speech_recognizer: Arc::new(ScriptedRecognizer::silent()),
        object_detector: Arc::new(FixedObjects::new(LabelTree::empty())),
        emotion_classifier: Arc::new(FixedEmotions::no_faces()),
        scene_detector: Arc::new(FixedScenes(Some(Vec::new()))),
        summarizer: Arc::new(LsaSummarizer::default()),
    }
}

/// Scratch workspace holding a placeholder video and the artifact layout.
pub struct Workspace {
    pub dir: TempDir,
    pub video: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"not really a video").unwrap();
        Self { dir, video }
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> PipelineConfig {
        PipelineConfig {
            overlay_font: self.base().join("missing-font.ttf"),
            ..PipelineConfig::default().with_base_dir(self.base())
        }
    }

    pub fn analyzer(&self, providers: Providers) -> VideoAnalyzer {
        VideoAnalyzer::new(self.config(), providers)
    }
}
