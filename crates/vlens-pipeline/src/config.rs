//! Pipeline configuration.

use std::path::PathBuf;
use std::str::FromStr;

use vlens_media::{SceneCutConfig, DEFAULT_CHUNK_FRAMES};

use crate::layout::DebugLayout;

const DEFAULT_OVERLAY_FONT: &str = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf";

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of the debug/output layout
    pub base_dir: PathBuf,
    /// Timeout for a single FFmpeg invocation
    pub ffmpeg_timeout_secs: u64,
    /// PCM frames per recognizer call
    pub audio_chunk_frames: usize,
    /// Sentences kept in the summary
    pub summary_sentences: usize,
    /// TrueType font used for frame overlays
    pub overlay_font: PathBuf,
    /// Histogram similarity below which a cut is declared
    pub scene_threshold: f64,
    /// Minimum frames between cuts
    pub scene_min_len: u64,
    /// Width frames are decoded at for scene detection
    pub scene_downscale_width: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let scene = SceneCutConfig::default();
        Self {
            base_dir: PathBuf::from("."),
            ffmpeg_timeout_secs: 600,
            audio_chunk_frames: DEFAULT_CHUNK_FRAMES,
            summary_sentences: 3,
            overlay_font: PathBuf::from(DEFAULT_OVERLAY_FONT),
            scene_threshold: scene.threshold,
            scene_min_len: scene.min_scene_len,
            scene_downscale_width: scene.analysis_width,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_dir: env_or("VLENS_BASE_DIR", defaults.base_dir),
            ffmpeg_timeout_secs: env_or("VLENS_FFMPEG_TIMEOUT_SECS", defaults.ffmpeg_timeout_secs),
            audio_chunk_frames: env_or("VLENS_AUDIO_CHUNK_FRAMES", defaults.audio_chunk_frames)
                .max(1),
            summary_sentences: env_or("VLENS_SUMMARY_SENTENCES", defaults.summary_sentences),
            overlay_font: env_or("VLENS_OVERLAY_FONT", defaults.overlay_font),
            scene_threshold: env_or("VLENS_SCENE_THRESHOLD", defaults.scene_threshold),
            scene_min_len: env_or("VLENS_SCENE_MIN_LEN", defaults.scene_min_len),
            scene_downscale_width: env_or(
                "VLENS_SCENE_DOWNSCALE_WIDTH",
                defaults.scene_downscale_width,
            ),
        }
    }

    /// Override the base directory.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Scene detector settings.
    pub fn scene_config(&self) -> SceneCutConfig {
        SceneCutConfig {
            threshold: self.scene_threshold,
            min_scene_len: self.scene_min_len,
            analysis_width: self.scene_downscale_width,
            ..SceneCutConfig::default()
        }
    }

    /// Artifact layout rooted at `base_dir`.
    pub fn layout(&self) -> DebugLayout {
        DebugLayout::new(&self.base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.audio_chunk_frames, 4000);
        assert_eq!(config.summary_sentences, 3);
        assert_eq!(config.scene_min_len, 15);
        assert!((config.scene_threshold - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scene_config_carries_overrides() {
        let config = PipelineConfig {
            scene_threshold: 0.5,
            scene_min_len: 4,
            ..PipelineConfig::default()
        };
        let scene = config.scene_config();
        assert_eq!(scene.min_scene_len, 4);
        assert!((scene.threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(scene.bins_per_channel, 8);
    }
}
