//! Timestamp formatting for subtitles and scene timecodes.
//!
//! Two renderings are used across the pipeline:
//! - SubRip cue times, `HH:MM:SS,000` (whole seconds only)
//! - Scene timecodes, `HH:MM:SS.mmm`, derived from a frame position

/// Format seconds as a SubRip cue timestamp.
///
/// Hours, minutes and seconds are floored; the millisecond field is always
/// `000` because sub-second cue precision is not modeled.
///
/// # Examples
/// ```
/// use vlens_models::timestamp::format_srt_timestamp;
/// assert_eq!(format_srt_timestamp(3661.0), "01:01:01,000");
/// assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
/// ```
pub fn format_srt_timestamp(total_secs: f64) -> String {
    let total_secs = if total_secs.is_finite() {
        total_secs.max(0.0)
    } else {
        0.0
    };
    let hours = (total_secs / 3600.0).floor() as u64;
    let mins = ((total_secs % 3600.0) / 60.0).floor() as u64;
    let secs = (total_secs % 60.0).floor() as u64;

    format!("{:02}:{:02}:{:02},000", hours, mins, secs)
}

/// Format a frame position as an `HH:MM:SS.mmm` timecode.
///
/// A frame rate of zero is treated as one frame per second.
///
/// # Examples
/// ```
/// use vlens_models::timestamp::format_timecode;
/// assert_eq!(format_timecode(0, 25), "00:00:00.000");
/// assert_eq!(format_timecode(90, 30), "00:00:03.000");
/// assert_eq!(format_timecode(45, 30), "00:00:01.500");
/// ```
pub fn format_timecode(frame: u64, fps: u32) -> String {
    let fps = u64::from(fps.max(1));
    let total_ms = (frame * 1000 + fps / 2) / fps;

    let hours = total_ms / 3_600_000;
    let mins = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_timestamp() {
        assert_eq!(format_srt_timestamp(0.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(3661.0), "01:01:01,000");
        assert_eq!(format_srt_timestamp(59.999), "00:00:59,000");
        assert_eq!(format_srt_timestamp(12.0), "00:00:12,000");
        assert_eq!(format_srt_timestamp(36000.5), "10:00:00,000");
    }

    #[test]
    fn test_format_srt_timestamp_clamps_invalid() {
        assert_eq!(format_srt_timestamp(-3.0), "00:00:00,000");
        assert_eq!(format_srt_timestamp(f64::NAN), "00:00:00,000");
    }

    #[test]
    fn test_format_timecode() {
        assert_eq!(format_timecode(0, 30), "00:00:00.000");
        assert_eq!(format_timecode(30, 30), "00:00:01.000");
        assert_eq!(format_timecode(1, 3), "00:00:00.333");
        assert_eq!(format_timecode(2, 3), "00:00:00.667");
        assert_eq!(format_timecode(108_000, 30), "01:00:00.000");
    }

    #[test]
    fn test_format_timecode_zero_fps() {
        assert_eq!(format_timecode(61, 0), "00:01:01.000");
    }
}
