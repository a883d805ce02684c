//! Fixed debug/output artifact layout.

use std::path::{Path, PathBuf};

use vlens_models::frame_image_name;

use crate::error::PipelineResult;

pub const DEBUG_OUTPUTS_DIR: &str = "debug_outputs";
pub const DEBUG_FRAMES_DIR: &str = "debug_frames";
pub const OUTPUT_DIR: &str = "output";

/// Artifact paths of a run, relative to a base directory.
///
/// A base of `.` yields bare relative paths such as
/// `debug_frames/frame_0s.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugLayout {
    base_dir: PathBuf,
}

impl DebugLayout {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref();
        let base_dir = if base_dir == Path::new(".") {
            PathBuf::new()
        } else {
            base_dir.to_path_buf()
        };
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn debug_outputs_dir(&self) -> PathBuf {
        self.base_dir.join(DEBUG_OUTPUTS_DIR)
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.base_dir.join(DEBUG_FRAMES_DIR)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(OUTPUT_DIR)
    }

    /// `debug_outputs/extracted_audio.wav`
    pub fn extracted_audio(&self) -> PathBuf {
        self.debug_outputs_dir().join("extracted_audio.wav")
    }

    /// `debug_outputs/transcription.txt`
    pub fn transcript_text(&self) -> PathBuf {
        self.debug_outputs_dir().join("transcription.txt")
    }

    /// `debug_outputs/transcription.json`
    pub fn transcript_json(&self) -> PathBuf {
        self.debug_outputs_dir().join("transcription.json")
    }

    /// `debug_outputs/subtitles.srt`
    pub fn subtitles(&self) -> PathBuf {
        self.debug_outputs_dir().join("subtitles.srt")
    }

    /// `output/final_extracted_audio.wav`
    pub fn final_audio(&self) -> PathBuf {
        self.output_dir().join("final_extracted_audio.wav")
    }

    /// `debug_frames/frame_<N>s.jpg`
    pub fn frame_image(&self, timestamp_secs: u64) -> PathBuf {
        self.frames_dir().join(frame_image_name(timestamp_secs))
    }

    /// Create the artifact directories.
    pub async fn prepare(&self) -> PipelineResult<()> {
        for dir in [self.debug_outputs_dir(), self.frames_dir(), self.output_dir()] {
            tokio::fs::create_dir_all(&dir).await?;
        }
        Ok(())
    }
}
