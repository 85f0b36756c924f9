// SPDX-License-Identifier: MPL-2.0
//! FFmpeg initialization and container probing.

use crate::error::{Result, VideoError};
use std::sync::Once;

/// Static flag to ensure FFmpeg is initialized only once.
static FFMPEG_INIT: Once = Once::new();

/// Initialize FFmpeg with appropriate log level.
///
/// Safe to call multiple times thanks to `std::sync::Once`. The log level is
/// set to ERROR so FFmpeg does not spam stderr with container warnings while
/// streaming.
pub fn init_ffmpeg() -> Result<()> {
    let mut init_result: Result<()> = Ok(());

    FFMPEG_INIT.call_once(|| {
        if let Err(e) = ffmpeg_next::init() {
            init_result = Err(VideoError::Other(format!("FFmpeg initialization failed: {e}")).into());
            return;
        }

        // SAFETY: av_log_set_level is thread-safe and only affects logging
        unsafe {
            ffmpeg_next::ffi::av_log_set_level(ffmpeg_next::ffi::AV_LOG_ERROR);
        }
    });

    init_result
}

/// Container metadata read without decoding any frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaInfo {
    /// Video width in pixels
    pub width: u32,
    /// Video height in pixels
    pub height: u32,
    /// Duration in seconds, 0.0 when the container does not report one
    pub duration_secs: f64,
    /// Whether the container carries an audio track
    pub has_audio: bool,
}

/// Probes a media source for dimensions, duration and audio presence.
///
/// `source` may be a local path or an http(s) URL; FFmpeg's protocol layer
/// handles both. Only container metadata is read, no frame is decoded.
pub fn probe(source: &str) -> Result<MediaInfo> {
    init_ffmpeg()?;

    let ictx = ffmpeg_next::format::input(&source)
        .map_err(|e| VideoError::OpenFailed(format!("{e}")))?;

    let video_stream = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Video)
        .ok_or(VideoError::NoVideoStream)?;

    let context_decoder =
        ffmpeg_next::codec::context::Context::from_parameters(video_stream.parameters())
            .map_err(|e| VideoError::from_message(&format!("Failed to create codec context: {e}")))?;
    let decoder = context_decoder
        .decoder()
        .video()
        .map_err(|e| VideoError::from_message(&format!("Failed to create video decoder: {e}")))?;

    let width = decoder.width();
    let height = decoder.height();
    if width == 0 || height == 0 {
        return Err(VideoError::OpenFailed(format!(
            "invalid video dimensions: {width}x{height}"
        ))
        .into());
    }

    // Stream duration is in stream time_base units; fall back to the
    // container duration (AV_TIME_BASE units) when the stream has none.
    let duration_secs = if video_stream.duration() > 0 {
        let time_base = video_stream.time_base();
        video_stream.duration() as f64 * f64::from(time_base.numerator())
            / f64::from(time_base.denominator())
    } else if ictx.duration() > 0 {
        ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
    } else {
        0.0
    };

    let has_audio = ictx
        .streams()
        .best(ffmpeg_next::media::Type::Audio)
        .is_some();

    Ok(MediaInfo {
        width,
        height,
        duration_secs,
        has_audio,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_ffmpeg_is_idempotent() {
        assert!(init_ffmpeg().is_ok());
        assert!(init_ffmpeg().is_ok());
    }

    #[test]
    fn probe_missing_file_fails() {
        let result = probe("/definitely/not/here.mp4");
        assert!(result.is_err());
    }
}
