#![deny(unreachable_patterns)]
//! Media plumbing for the VLens analysis pipeline.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and execution
//! - FFprobe metadata and raw RGB frame decoding
//! - Audio track extraction and chunked WAV reading
//! - Histogram-based scene cut detection
//! - Annotated frame rendering
//! - The provider traits the pipeline is written against

pub mod audio;
pub mod command;
pub mod error;
pub mod frame_source;
pub mod fs_utils;
pub mod overlay;
pub mod probe;
pub mod providers;
pub mod scene;

pub use audio::{FfmpegAudioTranscoder, WavChunkReader, DEFAULT_CHUNK_FRAMES, SPEECH_SAMPLE_RATE};
pub use command::{check_ffmpeg, check_ffprobe, create_ffmpeg_command, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use frame_source::{FfmpegFrameDecoder, FfmpegFrameSource};
pub use fs_utils::{copy_file, file_len};
pub use overlay::{encode_jpeg, save_jpeg, FrameOverlay};
pub use probe::{probe_video, VideoInfo};
pub use providers::{
    AudioTranscoder, EmotionClassifier, FrameDecoder, FrameSource, ObjectDetector,
    RecognitionSession, RecognizedSegment, SceneDetector, SpeechRecognizer, Summarizer,
};
pub use scene::{scenes_from_cuts, HistogramSceneDetector, SceneCutConfig, SceneCutDetector};
