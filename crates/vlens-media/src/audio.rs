//! Audio extraction and PCM chunk reading.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use async_trait::async_trait;
use hound::{SampleFormat, WavReader};
use tracing::{debug, info};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::providers::AudioTranscoder;

/// Sample rate expected by speech recognition.
pub const SPEECH_SAMPLE_RATE: u32 = 16_000;

/// Frames handed to the recognizer per call.
pub const DEFAULT_CHUNK_FRAMES: usize = 4000;

/// Extracts mono 16 kHz PCM WAV with `ffmpeg -vn -ac 1 -ar 16000`.
#[derive(Debug, Clone)]
pub struct FfmpegAudioTranscoder {
    runner: FfmpegRunner,
}

impl FfmpegAudioTranscoder {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(timeout_secs),
        }
    }

    fn build_command(video: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(video, output)
            .input_arg("-nostdin")
            .no_video()
            .audio_channels(1)
            .audio_sample_rate(SPEECH_SAMPLE_RATE)
            .audio_codec("pcm_s16le")
    }
}

impl Default for FfmpegAudioTranscoder {
    fn default() -> Self {
        Self::new(600)
    }
}

#[async_trait]
impl AudioTranscoder for FfmpegAudioTranscoder {
    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<()> {
        if !video.exists() {
            return Err(MediaError::FileNotFound(video.to_path_buf()));
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(video = %video.display(), output = %output.display(), "Extracting audio");
        self.runner.run(&Self::build_command(video, output)).await
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Sequential reader over a 16-bit mono WAV file.
pub struct WavChunkReader {
    reader: WavReader<BufReader<File>>,
    chunk_frames: usize,
}

impl WavChunkReader {
    /// Open `path` and validate it is 16-bit integer PCM, mono.
    pub fn open(path: &Path, chunk_frames: usize) -> MediaResult<Self> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();

        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
            return Err(MediaError::internal(format!(
                "expected 16-bit PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }
        if spec.channels != 1 {
            return Err(MediaError::internal(format!(
                "expected mono audio, got {} channels",
                spec.channels
            )));
        }

        debug!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            frames = reader.duration(),
            "Opened WAV"
        );

        Ok(Self {
            reader,
            chunk_frames: chunk_frames.max(1),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }

    /// Total frames in the file.
    pub fn total_frames(&self) -> u32 {
        self.reader.duration()
    }

    /// Next chunk of up to `chunk_frames` samples; `None` once exhausted.
    pub fn next_chunk(&mut self) -> MediaResult<Option<Vec<i16>>> {
        let chunk = self
            .reader
            .samples::<i16>()
            .take(self.chunk_frames)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((!chunk.is_empty()).then_some(chunk))
    }
}
