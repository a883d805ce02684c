//! Transcript fragments and SubRip subtitle generation.
//!
//! Subtitles are derived one-to-one from recognizer word timings: cue `n`
//! covers fragment `n`, indices start at 1, and a fragment without an end
//! time gets a fixed display duration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::timestamp::format_srt_timestamp;

/// Display duration used when the recognizer supplies no end time.
pub const DEFAULT_CUE_DURATION_SECS: f64 = 2.0;

/// One recognized word or phrase with timing in seconds.
///
/// Serialized as `{word, start, end}`; a missing end is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TranscriptFragment {
    /// Recognized text
    #[serde(rename = "word")]
    pub text: String,
    /// Start time in seconds
    #[serde(default)]
    pub start: f64,
    /// End time in seconds, if the recognizer reported one
    #[serde(default)]
    pub end: Option<f64>,
}

impl TranscriptFragment {
    /// Create a fragment with an explicit end time.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end: Some(end),
        }
    }

    /// Create a fragment without an end time.
    pub fn open_ended(text: impl Into<String>, start: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end: None,
        }
    }

    /// End time, falling back to `start + DEFAULT_CUE_DURATION_SECS`.
    pub fn end_or_default(&self) -> f64 {
        self.end.unwrap_or(self.start + DEFAULT_CUE_DURATION_SECS)
    }
}

/// A single SubRip cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Subtitle {
    /// 1-based sequence index
    pub index: u32,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Cue text
    pub text: String,
}

impl Subtitle {
    /// Render this cue as a SubRip block, including the trailing blank line.
    pub fn to_srt_block(&self) -> String {
        format!(
            "{}\n{} --> {}\n{}\n\n",
            self.index,
            format_srt_timestamp(self.start),
            format_srt_timestamp(self.end),
            self.text
        )
    }
}

/// Build one subtitle per fragment, preserving fragment order.
pub fn build_subtitles(fragments: &[TranscriptFragment]) -> Vec<Subtitle> {
    fragments
        .iter()
        .zip(1u32..)
        .map(|(fragment, index)| Subtitle {
            index,
            start: fragment.start,
            end: fragment.end_or_default(),
            text: fragment.text.clone(),
        })
        .collect()
}

/// Render subtitles as a complete SubRip document.
pub fn render_srt(subtitles: &[Subtitle]) -> String {
    subtitles.iter().map(Subtitle::to_srt_block).collect()
}
