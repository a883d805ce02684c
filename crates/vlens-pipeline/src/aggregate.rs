//! Result aggregation.

use std::path::PathBuf;

use vlens_models::sentinel::{self, NO_SPEECH};
use vlens_models::{AnalysisResult, FrameAnnotation, SceneChanges};

/// Package stage outputs into the final result.
///
/// A blank transcript becomes the no-speech sentinel and drops the subtitle
/// path; an empty summary becomes the no-speech sentinel.
pub fn aggregate(
    transcript: String,
    audio_debug_file: Option<PathBuf>,
    srt_file: Option<PathBuf>,
    scene_changes: SceneChanges,
    frame_analysis: Vec<FrameAnnotation>,
    summary: String,
) -> AnalysisResult {
    let (transcription, srt_file) = if sentinel::is_no_speech(&transcript) {
        (NO_SPEECH.to_string(), None)
    } else {
        (transcript, srt_file)
    };

    let speech_summary = if summary.trim().is_empty() {
        NO_SPEECH.to_string()
    } else {
        summary
    };

    AnalysisResult {
        speech_summary,
        transcription,
        srt_file,
        scene_changes,
        frame_analysis,
        audio_debug_file,
    }
}
