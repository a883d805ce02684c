//! Structured logging for one analysis run.
//!
//! A run gets a span carrying its run ID and video path; every stage logs
//! typed events inside it, so fields can be filtered in JSON output without
//! parsing messages.

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;
use vlens_models::{AnalysisResult, SceneChanges, VideoSource};

use crate::error::PipelineError;
use crate::frames::FrameStats;
use crate::speech::SpeechOutcome;

/// Pipeline stages, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Open,
    Speech,
    Scenes,
    Frames,
    Summary,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Open => "open",
            Stage::Speech => "speech",
            Stage::Scenes => "scenes",
            Stage::Frames => "frames",
            Stage::Summary => "summary",
        }
    }
}

/// Logger bound to one run of one video.
#[derive(Debug, Clone)]
pub struct RunLogger {
    run_id: String,
    video: PathBuf,
    started: Instant,
}

impl RunLogger {
    /// Create a logger with a fresh run ID.
    pub fn new(video: &Path) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            video: video.to_path_buf(),
            started: Instant::now(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    /// Span for the whole run. Events logged inside inherit its fields.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "analyze_video",
            run_id = %self.run_id,
            video = %self.video.display()
        )
    }

    pub fn started(&self) {
        info!("Run started");
    }

    /// Start timing a stage.
    pub fn stage(&self, stage: Stage) -> StageTimer {
        debug!(stage = stage.as_str(), "Stage started");
        StageTimer {
            stage,
            started: Instant::now(),
        }
    }

    pub fn video_opened(&self, info: &VideoSource) {
        info!(
            stage = Stage::Open.as_str(),
            fps = info.frame_rate,
            total_frames = info.total_frames,
            width = info.width,
            height = info.height,
            "Video opened"
        );
    }

    pub fn speech_extracted(&self, outcome: &SpeechOutcome) {
        info!(
            stage = Stage::Speech.as_str(),
            transcript_chars = outcome.transcript.chars().count(),
            audio = outcome.audio_path.is_some(),
            subtitles = outcome.srt_path.is_some(),
            "Speech extracted"
        );
    }

    pub fn scenes_segmented(&self, changes: &SceneChanges) {
        if changes.is_failed() {
            warn!(stage = Stage::Scenes.as_str(), "Scene segmentation failed");
        } else {
            info!(
                stage = Stage::Scenes.as_str(),
                scenes = changes.scenes().len(),
                "Scenes segmented"
            );
        }
    }

    /// Input errors are warnings; anything else is an error.
    pub fn failed(&self, err: &PipelineError) {
        let elapsed_ms = self.elapsed_ms();
        if err.is_fatal() {
            warn!(elapsed_ms, error = %err, "Run rejected video");
        } else {
            error!(elapsed_ms, error = %err, "Run failed");
        }
    }

    pub fn completed(&self, result: &AnalysisResult, frames: &FrameStats) {
        info!(
            elapsed_ms = self.elapsed_ms(),
            rows = result.frame_analysis.len(),
            frames_decoded = frames.decoded,
            detector_failures = frames.detector_failures(),
            speech = result.has_speech(),
            "Run completed"
        );
    }

    fn elapsed_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }
}

/// Times one stage; logs its duration on `finish`.
#[derive(Debug)]
pub struct StageTimer {
    stage: Stage,
    started: Instant,
}

impl StageTimer {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn finish(self) -> u64 {
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        info!(stage = self.stage.as_str(), elapsed_ms, "Stage finished");
        elapsed_ms
    }
}
