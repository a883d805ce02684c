//! Building and running one-shot `ffmpeg` processes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// One `ffmpeg` invocation: `-y -v <level> [input args] -i <input> [output args] <output>`.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    pre_input: Vec<String>,
    post_input: Vec<String>,
    log_level: String,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            pre_input: Vec::new(),
            post_input: Vec::new(),
            log_level: "error".to_string(),
        }
    }

    /// Argument placed before `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.pre_input.push(arg.into());
        self
    }

    /// Argument placed between the input and the output path.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.post_input.push(arg.into());
        self
    }

    fn output_pair(self, flag: &str, value: impl ToString) -> Self {
        self.output_arg(flag).output_arg(value.to_string())
    }

    /// `-vn`
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    pub fn audio_channels(self, channels: u16) -> Self {
        self.output_pair("-ac", channels)
    }

    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.output_pair("-ar", rate)
    }

    pub fn audio_codec(self, codec: &str) -> Self {
        self.output_pair("-c:a", codec)
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn build_args(&self) -> Vec<String> {
        ["-y".to_string(), "-v".to_string(), self.log_level.clone()]
            .into_iter()
            .chain(self.pre_input.iter().cloned())
            .chain(["-i".to_string(), self.input.to_string_lossy().into_owned()])
            .chain(self.post_input.iter().cloned())
            .chain(std::iter::once(self.output.to_string_lossy().into_owned()))
            .collect()
    }
}

/// Runs an [`FfmpegCommand`], optionally bounded by a timeout.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    timeout: Option<Duration>,
}

impl FfmpegRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Some(Duration::from_secs(secs));
        self
    }

    /// Run to completion; a non-zero exit carries ffmpeg's stderr.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!(output = %cmd.output().display(), "ffmpeg {}", args.join(" "));

        let child = create_ffmpeg_command()
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout {
            // the child is killed when the timed-out future is dropped
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    warn!(secs = limit.as_secs(), "ffmpeg timed out, killing process");
                    MediaError::Timeout(limit.as_secs())
                })??,
            None => child.wait_with_output().await?,
        };

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(MediaError::ffmpeg_failed(
            format!("ffmpeg exited with {}", output.status),
            (!stderr.is_empty()).then_some(stderr),
            output.status.code(),
        ))
    }
}

/// Base `ffmpeg` process with banner output suppressed.
pub fn create_ffmpeg_command() -> Command {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-hide_banner");
    cmd
}

/// Locate `ffmpeg` on `PATH`.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Locate `ffprobe` on `PATH`.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}
