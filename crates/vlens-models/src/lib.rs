//! Shared data models for the VLens analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Transcript fragments and SubRip subtitles
//! - Scene boundaries and the scene-change outcome
//! - Frame sampling policy and per-frame annotations
//! - Object label trees and dominant-emotion reduction
//! - The aggregate analysis result handed to the presentation layer

pub mod analysis;
pub mod emotion;
pub mod frame;
pub mod labels;
pub mod scene;
pub mod sentinel;
pub mod timestamp;
pub mod transcript;

// Re-export common types
pub use analysis::{AnalysisOutcome, AnalysisResult, ErrorReport};
pub use emotion::{dominant_emotion, emotion_label};
pub use frame::{frame_image_name, FrameAnnotation, SamplingPolicy, VideoSource};
pub use labels::{join_labels, LabelScalar, LabelTree};
pub use scene::{Scene, SceneChanges};
pub use timestamp::{format_srt_timestamp, format_timecode};
pub use transcript::{build_subtitles, render_srt, Subtitle, TranscriptFragment};
