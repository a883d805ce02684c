//! Video source metadata, frame sampling policy and per-frame annotations.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An opened input video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSource {
    /// Path of the input file
    pub path: PathBuf,
    /// Integer frame rate (frames/second, truncated)
    pub frame_rate: u32,
    /// Total frame count as reported by the container
    pub total_frames: u64,
    /// Decoded frame width in pixels
    pub width: u32,
    /// Decoded frame height in pixels
    pub height: u32,
}

/// Selects which frames get per-frame analysis.
///
/// Frame `i` is sampled iff `i % max(fps / 2, 1) == 0`, giving roughly two
/// samples per second. A frame rate of zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    frame_rate: u32,
    interval: u64,
}

impl SamplingPolicy {
    /// Build the policy for a video's integer frame rate.
    pub fn from_frame_rate(frame_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        Self {
            frame_rate,
            interval: u64::from((frame_rate / 2).max(1)),
        }
    }

    /// Frame-index stride between samples.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Effective frame rate used for timestamp math.
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Whether frame `index` is selected.
    pub fn is_sampled(&self, index: u64) -> bool {
        index % self.interval == 0
    }

    /// Whole-second timestamp of frame `index`: `floor(index / fps)`.
    pub fn timestamp_secs(&self, index: u64) -> u64 {
        index / u64::from(self.frame_rate)
    }
}

/// One row of the per-frame analysis table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FrameAnnotation {
    /// Frame timestamp in whole seconds
    pub frame_time_sec: u64,
    /// Comma-joined object labels, or "None"
    pub objects_detected: String,
    /// Dominant emotion, "No face detected" or "Error"
    pub facial_emotion: String,
    /// Path of the annotated frame image
    pub frame_image: PathBuf,
}

/// File name of the annotated image for a given timestamp.
pub fn frame_image_name(timestamp_secs: u64) -> String {
    format!("frame_{}s.jpg", timestamp_secs)
}
