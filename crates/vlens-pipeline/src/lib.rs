//! Single-video analysis pipeline.
//!
//! This crate provides:
//! - Speech extraction with transcript and subtitle artifacts
//! - Scene segmentation
//! - Sampled per-frame object and emotion annotation
//! - Extractive transcript summarization
//! - The orchestrator that aggregates all of it into one result

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod frames;
pub mod layout;
pub mod logging;
pub mod scenes;
pub mod speech;
pub mod subtitles;
pub mod summarize;

pub use aggregate::aggregate;
pub use analyzer::{Providers, VideoAnalyzer};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use frames::{FrameAnalyzer, FrameStats};
pub use layout::DebugLayout;
pub use logging::{RunLogger, Stage, StageTimer};
pub use speech::{SpeechOutcome, SpeechStage};
pub use summarize::{summarize_transcript, LsaSummarizer};
