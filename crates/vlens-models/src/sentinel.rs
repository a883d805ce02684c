//! Fixed placeholder values for degraded-but-non-fatal outcomes.
//!
//! Consumers branch on these values, never on field absence.

/// Transcript and summary value when no speech was recognized.
pub const NO_SPEECH: &str = "No speech detected.";

/// Transcript value when the speech stage failed internally.
pub const SPEECH_ERROR: &str = "Error processing speech.";

/// Object column value when the detector found nothing (or failed).
pub const NO_OBJECTS: &str = "None";

/// Emotion column value when no face was found.
pub const NO_FACE: &str = "No face detected";

/// Emotion column value when the classifier failed.
pub const EMOTION_ERROR: &str = "Error";

/// Scene outcome when the detector ran but found no boundaries.
pub const NO_SCENE_CHANGES: &str = "No scene changes detected";

/// Returns true if `text` carries no usable speech.
///
/// Blank text and the [`NO_SPEECH`] sentinel both count as "no speech".
pub fn is_no_speech(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed == NO_SPEECH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_no_speech() {
        assert!(is_no_speech(""));
        assert!(is_no_speech("   \n"));
        assert!(is_no_speech(NO_SPEECH));
        assert!(is_no_speech(" No speech detected."));
        assert!(!is_no_speech("hello world"));
        assert!(!is_no_speech(SPEECH_ERROR));
    }
}
