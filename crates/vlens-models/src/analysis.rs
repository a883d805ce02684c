//! The aggregate analysis result.
//!
//! `AnalysisResult` is the single terminal artifact of a pipeline run. Every
//! key is always present: failed or empty stages carry sentinel values and
//! nullable paths serialize as explicit `null`.

use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::frame::FrameAnnotation;
use crate::scene::SceneChanges;
use crate::sentinel;

/// Consolidated, time-indexed analysis of one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    /// Extractive summary of the transcript, or "No speech detected."
    pub speech_summary: String,

    /// Full transcript text or a speech sentinel
    pub transcription: String,

    /// SubRip subtitle file, when speech was recognized
    pub srt_file: Option<PathBuf>,

    /// Scene boundaries or a scene sentinel
    pub scene_changes: SceneChanges,

    /// One row per sampled frame, in frame order
    pub frame_analysis: Vec<FrameAnnotation>,

    /// Extracted audio track, when extraction succeeded
    pub audio_debug_file: Option<PathBuf>,
}

impl AnalysisResult {
    /// Whether any speech was recognized.
    pub fn has_speech(&self) -> bool {
        !sentinel::is_no_speech(&self.transcription) && self.transcription != sentinel::SPEECH_ERROR
    }
}

/// Top-level error payload for runs that could not start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorReport {
    pub error: String,
}

impl ErrorReport {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// What a run hands to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Completed(AnalysisResult),
    Failed(ErrorReport),
}

impl AnalysisOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;
    use serde_json::json;

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            speech_summary: "No speech detected.".to_string(),
            transcription: "No speech detected.".to_string(),
            srt_file: None,
            scene_changes: SceneChanges::NoneDetected,
            frame_analysis: vec![FrameAnnotation {
                frame_time_sec: 0,
                objects_detected: "None".to_string(),
                facial_emotion: "No face detected".to_string(),
                frame_image: PathBuf::from("debug_frames/frame_0s.jpg"),
            }],
            audio_debug_file: None,
        }
    }

    #[test]
    fn test_all_keys_present() {
        let value = serde_json::to_value(sample_result()).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "speech_summary",
            "transcription",
            "srt_file",
            "scene_changes",
            "frame_analysis",
            "audio_debug_file",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert_eq!(object["srt_file"], json!(null));
        assert_eq!(object["audio_debug_file"], json!(null));
        assert_eq!(
            object["frame_analysis"][0],
            json!({
                "frame_time_sec": 0,
                "objects_detected": "None",
                "facial_emotion": "No face detected",
                "frame_image": "debug_frames/frame_0s.jpg",
            })
        );
    }

    #[test]
    fn test_has_speech() {
        let mut result = sample_result();
        assert!(!result.has_speech());

        result.transcription = "Error processing speech.".to_string();
        assert!(!result.has_speech());

        result.transcription = "hello there".to_string();
        result.scene_changes = SceneChanges::from_scenes(vec![Scene::new("00:00:00.000", "00:00:02.000")]);
        assert!(result.has_speech());
    }

    #[test]
    fn test_outcome_serialization() {
        let failed = AnalysisOutcome::Failed(ErrorReport::new("Video file not found"));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"error": "Video file not found"})
        );
        assert!(!failed.is_completed());

        let completed = AnalysisOutcome::Completed(sample_result());
        let value = serde_json::to_value(&completed).unwrap();
        assert!(value.get("speech_summary").is_some());
    }

    #[test]
    fn test_schema_lists_required_keys() {
        let schema = schemars::schema_for!(AnalysisResult);
        let value = serde_json::to_value(&schema).unwrap();
        let properties = value["properties"].as_object().unwrap();
        assert!(properties.contains_key("scene_changes"));
        assert!(properties.contains_key("frame_analysis"));
    }
}
