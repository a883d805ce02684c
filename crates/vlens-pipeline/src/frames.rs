//! Per-frame analysis fan-out.
//!
//! Sampled frames go through the object detector and the emotion classifier,
//! get the results drawn onto them, and are saved under `debug_frames/`.
//! Detector failures degrade only the affected column of that frame.

use std::sync::Arc;

use image::RgbImage;
use tracing::{debug, info, warn};
use vlens_media::{save_jpeg, EmotionClassifier, FrameOverlay, FrameSource, ObjectDetector};
use vlens_models::sentinel::{EMOTION_ERROR, NO_OBJECTS};
use vlens_models::{emotion_label, join_labels, FrameAnnotation, SamplingPolicy};

use crate::error::PipelineError;
use crate::layout::DebugLayout;

/// Per-run tallies of the frame pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames read from the source.
    pub decoded: u64,
    /// Frames that produced an analysis row.
    pub sampled: u64,
    pub object_failures: u64,
    pub emotion_failures: u64,
}

impl FrameStats {
    pub fn detector_failures(&self) -> u64 {
        self.object_failures + self.emotion_failures
    }

    fn record_failure(&mut self, error: PipelineError) {
        if let PipelineError::DetectorFailure { detector, .. } = &error {
            match *detector {
                OBJECTS => self.object_failures += 1,
                _ => self.emotion_failures += 1,
            }
        }
        warn!(error = %error, "Detector failed for frame");
    }
}

const OBJECTS: &str = "objects";
const EMOTION: &str = "emotion";

/// Samples frames and annotates them.
pub struct FrameAnalyzer {
    object_detector: Arc<dyn ObjectDetector>,
    emotion_classifier: Arc<dyn EmotionClassifier>,
    overlay: FrameOverlay,
    layout: DebugLayout,
}

impl FrameAnalyzer {
    pub fn new(
        object_detector: Arc<dyn ObjectDetector>,
        emotion_classifier: Arc<dyn EmotionClassifier>,
        overlay: FrameOverlay,
        layout: DebugLayout,
    ) -> Self {
        Self {
            object_detector,
            emotion_classifier,
            overlay,
            layout,
        }
    }

    /// Iterate the source to the end, annotating every sampled frame.
    ///
    /// A decode error ends iteration; rows produced so far are kept.
    pub async fn annotate_all(
        &self,
        source: &mut dyn FrameSource,
        policy: SamplingPolicy,
    ) -> (Vec<FrameAnnotation>, FrameStats) {
        let mut annotations = Vec::new();
        let mut stats = FrameStats::default();
        let mut index: u64 = 0;

        loop {
            let mut frame = match source.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    warn!(frame = index, error = %e, "Frame decoding failed, stopping sampling");
                    break;
                }
            };

            if policy.is_sampled(index) {
                let timestamp = policy.timestamp_secs(index);
                annotations.push(self.annotate_frame(&mut frame, timestamp, &mut stats).await);
            }
            index += 1;
        }
        stats.decoded = index;

        info!(
            frames = stats.decoded,
            sampled = stats.sampled,
            interval = policy.interval(),
            object_failures = stats.object_failures,
            emotion_failures = stats.emotion_failures,
            "Frame analysis complete"
        );
        (annotations, stats)
    }

    /// Analyze one sampled frame and save its annotated image.
    pub async fn annotate_frame(
        &self,
        frame: &mut RgbImage,
        timestamp_secs: u64,
        stats: &mut FrameStats,
    ) -> FrameAnnotation {
        stats.sampled += 1;

        let objects = self.detect_objects(frame, stats).await;
        let emotion = self.classify_emotion(frame, stats).await;

        self.overlay.annotate(frame, &objects, &emotion);

        let frame_image = self.layout.frame_image(timestamp_secs);
        if let Err(e) = save_jpeg(frame, &frame_image) {
            warn!(path = %frame_image.display(), error = %e, "Failed to save annotated frame");
        }

        debug!(
            timestamp_secs,
            objects = %objects,
            emotion = %emotion,
            "Frame annotated"
        );

        FrameAnnotation {
            frame_time_sec: timestamp_secs,
            objects_detected: objects,
            facial_emotion: emotion,
            frame_image,
        }
    }

    async fn detect_objects(&self, frame: &RgbImage, stats: &mut FrameStats) -> String {
        match self.object_detector.detect(frame).await {
            Ok(labels) => join_labels(&labels.flatten()),
            Err(e) => {
                stats.record_failure(PipelineError::detector_failure(OBJECTS, e.to_string()));
                NO_OBJECTS.to_string()
            }
        }
    }

    async fn classify_emotion(&self, frame: &RgbImage, stats: &mut FrameStats) -> String {
        match self.emotion_classifier.classify(frame).await {
            Ok(faces) => emotion_label(&faces),
            Err(e) => {
                stats.record_failure(PipelineError::detector_failure(EMOTION, e.to_string()));
                EMOTION_ERROR.to_string()
            }
        }
    }
}
