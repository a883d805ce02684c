//! Annotated frame rendering.
//!
//! Draws the object and emotion labels onto a frame and writes it as JPEG.
//! Text origins follow the baseline convention: the `y` coordinates are
//! baselines, not the top of the glyphs.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use tracing::{debug, warn};

use crate::error::MediaResult;

const TEXT_X: i32 = 10;
const OBJECTS_BASELINE: i32 = 30;
const EMOTION_BASELINE: i32 = 60;
const TEXT_PX: f32 = 24.0;
const JPEG_QUALITY: u8 = 90;

const OBJECTS_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const EMOTION_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Draws per-frame labels. Without a font, frames are saved unlabelled.
pub struct FrameOverlay {
    font: Option<Font<'static>>,
    scale: Scale,
}

impl FrameOverlay {
    /// Load a TrueType font. A missing or unparsable font disables text.
    pub fn from_font_file(path: &Path) -> Self {
        let font = match std::fs::read(path) {
            Ok(bytes) => {
                let font = Font::try_from_vec(bytes);
                if font.is_none() {
                    warn!(path = %path.display(), "Overlay font could not be parsed, frames will be unlabelled");
                }
                font
            }
            Err(e) => {
                warn!(path = %path.display(), "Overlay font unavailable ({}), frames will be unlabelled", e);
                None
            }
        };

        Self {
            font,
            scale: Scale::uniform(TEXT_PX),
        }
    }

    /// Overlay that never draws text.
    pub fn unlabelled() -> Self {
        Self {
            font: None,
            scale: Scale::uniform(TEXT_PX),
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draw "Objects: …" in green and "Emotion: …" in blue.
    pub fn annotate(&self, frame: &mut RgbImage, objects: &str, emotion: &str) {
        let Some(font) = &self.font else {
            return;
        };

        let ascent = font.v_metrics(self.scale).ascent.round() as i32;
        draw_text_mut(
            frame,
            OBJECTS_COLOR,
            TEXT_X,
            OBJECTS_BASELINE - ascent,
            self.scale,
            font,
            &format!("Objects: {}", objects),
        );
        draw_text_mut(
            frame,
            EMOTION_COLOR,
            TEXT_X,
            EMOTION_BASELINE - ascent,
            self.scale,
            font,
            &format!("Emotion: {}", emotion),
        );
    }
}

/// Encode a frame as JPEG bytes.
pub fn encode_jpeg(frame: &RgbImage) -> MediaResult<Vec<u8>> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(frame)?;
    Ok(buf)
}

/// Write a frame as JPEG, replacing any existing file.
pub fn save_jpeg(frame: &RgbImage, path: &Path) -> MediaResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(frame)?;
    debug!(path = %path.display(), "Saved frame");
    Ok(())
}
