//! FFmpeg-backed frame decoding.
//!
//! Frames are read as raw `rgb24` from an `ffmpeg` child process piping to
//! stdout, one fixed-size buffer per frame.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use image::RgbImage;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout};
use tracing::{debug, warn};
use vlens_models::VideoSource;

use crate::command::{check_ffmpeg, create_ffmpeg_command};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;
use crate::providers::{FrameDecoder, FrameSource};

/// Opens videos through `ffprobe` + `ffmpeg`.
#[derive(Debug, Clone, Default)]
pub struct FfmpegFrameDecoder {
    /// Downscale frames to this width (aspect preserved)
    scale_width: Option<u32>,
}

impl FfmpegFrameDecoder {
    pub fn new() -> Self {
        Self { scale_width: None }
    }

    /// Decode at reduced width. Sources narrower than `width` are left as is.
    pub fn with_scale_width(width: u32) -> Self {
        Self {
            scale_width: Some(width.max(2)),
        }
    }
}

/// Output dimensions for a source size and an optional target width.
/// Dimensions are kept even for rawvideo scaling.
fn scaled_dimensions(width: u32, height: u32, scale_width: Option<u32>) -> (u32, u32) {
    match scale_width {
        Some(target) if target < width && width > 0 => {
            let scaled_height = (u64::from(height) * u64::from(target) / u64::from(width)) as u32;
            (target & !1, (scaled_height & !1).max(2))
        }
        _ => (width, height),
    }
}

#[async_trait]
impl FrameDecoder for FfmpegFrameDecoder {
    async fn open(&self, path: &Path) -> MediaResult<Box<dyn FrameSource>> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        check_ffmpeg()?;

        let probe = probe_video(path).await?;
        if probe.width == 0 || probe.height == 0 {
            return Err(MediaError::invalid_video("video stream has no dimensions"));
        }

        let (width, height) = scaled_dimensions(probe.width, probe.height, self.scale_width);

        let mut cmd = create_ffmpeg_command();
        cmd.args(["-v", "error", "-nostdin", "-i"]).arg(path);
        if (width, height) != (probe.width, probe.height) {
            cmd.args(["-vf", &format!("scale={}:{}", width, height)]);
        }
        cmd.args(["-an", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]);

        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MediaError::internal("ffmpeg stdout was not captured"))?;

        let info = VideoSource {
            path: path.to_path_buf(),
            frame_rate: probe.frame_rate(),
            total_frames: probe.frame_count,
            width,
            height,
        };

        debug!(
            path = %path.display(),
            fps = info.frame_rate,
            total_frames = info.total_frames,
            width,
            height,
            "Opened video for decoding"
        );

        Ok(Box::new(FfmpegFrameSource {
            info,
            child,
            stdout,
            frame_len: width as usize * height as usize * 3,
            frames_read: 0,
            finished: false,
        }))
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

/// Live decoding session.
pub struct FfmpegFrameSource {
    info: VideoSource,
    child: Child,
    stdout: ChildStdout,
    frame_len: usize,
    frames_read: u64,
    finished: bool,
}

impl FfmpegFrameSource {
    async fn finish(&mut self) {
        self.finished = true;
        match self.child.wait().await {
            Ok(status) if !status.success() => {
                warn!(
                    path = %self.info.path.display(),
                    frames = self.frames_read,
                    "FFmpeg decoder exited with {}",
                    status
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to reap FFmpeg decoder: {}", e),
        }
    }

    /// Stop a decoder that may still be writing, then reap it.
    async fn abort(&mut self) {
        if let Err(e) = self.child.start_kill() {
            debug!("FFmpeg decoder already exited: {}", e);
        }
        self.finish().await;
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> &VideoSource {
        &self.info
    }

    async fn next_frame(&mut self) -> MediaResult<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; self.frame_len];
        match self.stdout.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish().await;
                return Ok(None);
            }
            Err(e) => {
                self.abort().await;
                return Err(e.into());
            }
        }

        self.frames_read += 1;
        RgbImage::from_raw(self.info.width, self.info.height, buf)
            .map(Some)
            .ok_or_else(|| MediaError::internal("decoded frame has wrong size"))
    }
}
