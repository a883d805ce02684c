//! Shot boundary detection by color histogram comparison.
//!
//! # Algorithm
//! 1. Compute an RGB histogram per frame (8 bins per channel = 512 bins)
//! 2. Compare consecutive histograms using histogram intersection
//! 3. If similarity drops below the threshold, declare a cut, subject to a
//!    minimum scene length
//!
//! Cuts partition `[0, total_frames)` into contiguous scenes. A video without
//! any cut yields no scenes at all.

use std::path::Path;

use async_trait::async_trait;
use image::RgbImage;
use tracing::{debug, info};
use vlens_models::Scene;

use crate::error::MediaResult;
use crate::frame_source::FfmpegFrameDecoder;
use crate::providers::{FrameDecoder, SceneDetector};

/// Configuration for scene cut detection.
#[derive(Debug, Clone)]
pub struct SceneCutConfig {
    /// Similarity threshold (0.0-1.0). Below this = scene cut
    pub threshold: f64,

    /// Number of histogram bins per channel
    pub bins_per_channel: u32,

    /// Minimum frames between cuts
    pub min_scene_len: u64,

    /// Width frames are decoded at for histogramming
    pub analysis_width: u32,
}

impl Default for SceneCutConfig {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            bins_per_channel: 8,
            min_scene_len: 15,
            analysis_width: 160,
        }
    }
}

/// Incremental cut detector fed one frame at a time.
pub struct SceneCutDetector {
    config: SceneCutConfig,
    /// Previous frame histogram (flattened)
    prev_histogram: Option<Vec<f32>>,
    /// Frame count since last cut (or since the first frame)
    frames_since_cut: u64,
    /// Frame index of each detected cut
    cuts: Vec<u64>,
    /// Frames seen so far
    frame_index: u64,
}

impl SceneCutDetector {
    /// Create with full configuration.
    pub fn with_config(config: SceneCutConfig) -> Self {
        Self {
            config,
            prev_histogram: None,
            frames_since_cut: 0,
            cuts: Vec::new(),
            frame_index: 0,
        }
    }

    /// Check if the frame starts a new scene.
    pub fn check_frame(&mut self, frame: &RgbImage) -> bool {
        let histogram = compute_histogram(frame, self.config.bins_per_channel);
        self.check_histogram(histogram)
    }

    fn check_histogram(&mut self, histogram: Vec<f32>) -> bool {
        let index = self.frame_index;
        self.frame_index += 1;

        // First frame - no comparison possible
        let Some(prev) = self.prev_histogram.replace(histogram) else {
            self.frames_since_cut = 1;
            return false;
        };

        let similarity = self
            .prev_histogram
            .as_deref()
            .map_or(1.0, |current| histogram_intersection(&prev, current));

        let is_cut =
            similarity < self.config.threshold && self.frames_since_cut >= self.config.min_scene_len;

        if is_cut {
            debug!(
                frame = index,
                similarity = format!("{:.3}", similarity),
                threshold = self.config.threshold,
                "Scene cut detected"
            );
            self.cuts.push(index);
            self.frames_since_cut = 1;
        } else {
            self.frames_since_cut += 1;
        }

        is_cut
    }

    /// Frame indices where cuts were detected.
    pub fn cuts(&self) -> &[u64] {
        &self.cuts
    }

    /// Frames processed so far.
    pub fn frames_seen(&self) -> u64 {
        self.frame_index
    }

    /// Get total cuts detected.
    pub fn cut_count(&self) -> usize {
        self.cuts.len()
    }
}

/// Compute a normalized RGB histogram (sums to 1).
fn compute_histogram(frame: &RgbImage, bins_per_channel: u32) -> Vec<f32> {
    let bins = bins_per_channel.clamp(1, 256) as usize;
    let mut histogram = vec![0.0f32; bins * bins * bins];

    let pixel_count = frame.width() as usize * frame.height() as usize;
    if pixel_count == 0 {
        return histogram;
    }

    let bucket = |v: u8| (v as usize * bins) / 256;
    for pixel in frame.pixels() {
        let [r, g, b] = pixel.0;
        histogram[(bucket(r) * bins + bucket(g)) * bins + bucket(b)] += 1.0;
    }

    let total = pixel_count as f32;
    histogram.iter_mut().for_each(|v| *v /= total);
    histogram
}

/// Compute histogram intersection (similarity measure).
///
/// Returns value in [0, 1] where 1 = identical histograms.
fn histogram_intersection(h1: &[f32], h2: &[f32]) -> f64 {
    if h1.len() != h2.len() || h1.is_empty() {
        return 0.0;
    }

    let mut intersection = 0.0f64;
    let mut sum1 = 0.0f64;
    let mut sum2 = 0.0f64;

    for (a, b) in h1.iter().zip(h2.iter()) {
        intersection += (*a as f64).min(*b as f64);
        sum1 += *a as f64;
        sum2 += *b as f64;
    }

    let denominator = sum1.min(sum2);
    if denominator > 0.0 {
        intersection / denominator
    } else {
        0.0
    }
}

/// Turn cut positions into contiguous scenes covering `[0, total_frames)`.
pub fn scenes_from_cuts(cuts: &[u64], total_frames: u64, fps: u32) -> Vec<Scene> {
    if cuts.is_empty() {
        return Vec::new();
    }

    let mut boundaries = Vec::with_capacity(cuts.len() + 2);
    boundaries.push(0);
    boundaries.extend(cuts.iter().copied().filter(|&c| c > 0 && c < total_frames));
    boundaries.push(total_frames);
    boundaries.dedup();

    boundaries
        .windows(2)
        .map(|w| Scene::from_frames(w[0], w[1], fps))
        .collect()
}

/// Scene detector decoding through FFmpeg at reduced resolution.
#[derive(Debug, Clone, Default)]
pub struct HistogramSceneDetector {
    config: SceneCutConfig,
}

impl HistogramSceneDetector {
    pub fn new(config: SceneCutConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SceneDetector for HistogramSceneDetector {
    async fn detect_scenes(&self, video: &Path) -> MediaResult<Vec<Scene>> {
        let decoder = FfmpegFrameDecoder::with_scale_width(self.config.analysis_width);
        let mut source = decoder.open(video).await?;
        let fps = source.info().frame_rate;

        let mut detector = SceneCutDetector::with_config(self.config.clone());
        while let Some(frame) = source.next_frame().await? {
            detector.check_frame(&frame);
        }

        let scenes = scenes_from_cuts(detector.cuts(), detector.frames_seen(), fps);
        info!(
            frames = detector.frames_seen(),
            cuts = detector.cut_count(),
            scenes = scenes.len(),
            "Scene detection complete"
        );
        Ok(scenes)
    }

    fn name(&self) -> &'static str {
        "histogram"
    }
}
