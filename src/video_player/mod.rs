// SPDX-License-Identifier: MPL-2.0
//! Video playback engine for practice sessions.
//!
//! Decoding runs on blocking threads (ffmpeg contexts are not `Send`), the
//! [`subscription`] module bridges them into iced's message loop, and
//! [`VideoPlayer`] is the state machine the UI talks to. The pieces:
//!
//! - [`decoder`](self::AsyncDecoder): video decode thread, paced by frame PTS
//! - [`audio`]: audio decode thread feeding resampled f32 buffers
//! - [`audio_output`]: cpal output stream with volume and mute applied in
//!   the render callback
//! - [`subscription`]: one playback session as an iced subscription
//! - [`state`](self::VideoPlayer): playback state machine and command facade
//!
//! Position reporting rides on decoded video frames; whoever owns the
//! session watches those timestamps and issues seeks to keep playback
//! inside a practice window.

pub mod audio;
pub mod audio_output;
mod decoder;
mod state;
pub mod subscription;
pub mod volume;

pub use decoder::{AsyncDecoder, DecodedFrame, DecoderCommand, DecoderEvent};
pub use state::{PlaybackState, VideoPlayer};
pub use subscription::{
    video_playback, AudioControl, DecoderCommandSender, PlaybackMessage, PlaybackSessionId,
};
pub use volume::Volume;
