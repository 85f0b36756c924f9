// SPDX-License-Identifier: MPL-2.0
//! Media probing built on FFmpeg.
//!
//! Playback itself lives in [`crate::video_player`]; this module only
//! initializes FFmpeg and reads container metadata before a session starts.

pub mod video;

pub use video::{init_ffmpeg, probe, MediaInfo};

/// Extensions offered by the local-file picker.
///
/// Looser than the resolver's allow-list for remote URLs; anything FFmpeg
/// demuxes locally is fair game.
pub const MEDIA_PICKER_EXTENSIONS: &[&str] = &["mp4", "m4s", "mkv", "mov", "avi", "webm", "flv"];
