// SPDX-License-Identifier: MPL-2.0
//! Async video frame decoder using FFmpeg.
//!
//! This module provides asynchronous video frame decoding via Tokio tasks,
//! delivering frames through channels for non-blocking UI updates.

use crate::error::{Result, VideoError};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Represents a decoded video frame ready for display.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// RGBA pixel data (width × height × 4 bytes).
    pub rgba_data: Arc<Vec<u8>>,

    /// Frame width in pixels.
    pub width: u32,

    /// Frame height in pixels.
    pub height: u32,

    /// Presentation timestamp in seconds.
    /// Indicates when this frame should be displayed.
    pub pts_secs: f64,
}

impl DecodedFrame {
    /// Returns the total size in bytes.
    pub fn size_bytes(&self) -> usize {
        self.rgba_data.len()
    }
}

/// Commands sent to the decoder task.
#[derive(Debug, Clone)]
pub enum DecoderCommand {
    /// Start or resume decoding from the current position.
    Play,

    /// Pause decoding (stop sending frames).
    Pause,

    /// Seek to a specific timestamp.
    /// Playing continues uninterrupted; when paused, one frame is decoded
    /// so the seek result becomes visible.
    Seek { target_secs: f64 },

    /// Stop decoding and clean up resources.
    Stop,
}

/// Events sent from the decoder to the UI.
#[derive(Debug, Clone)]
pub enum DecoderEvent {
    /// A new frame is ready for display.
    FrameReady(DecodedFrame),

    /// Decoder is buffering (opening the source or starting playback).
    Buffering,

    /// Playback reached the end of the stream.
    EndOfStream,

    /// An error occurred during decoding.
    Error(String),
}

/// Async video decoder that runs in a Tokio task.
///
/// The source may be a local file path or an http(s) URL; FFmpeg's protocol
/// layer handles both transparently.
pub struct AsyncDecoder {
    /// Channel for sending commands to the decoder task.
    command_tx: mpsc::UnboundedSender<DecoderCommand>,

    /// Channel for receiving events from the decoder task.
    /// Bounded to prevent memory accumulation during rapid seeks.
    event_rx: mpsc::Receiver<DecoderEvent>,
}

impl AsyncDecoder {
    /// Creates a new async decoder for the given media source.
    ///
    /// Spawns a blocking task that handles decoding in the background and
    /// returns the decoder handle with channels for communication. Sources
    /// that fail to open report the failure through a [`DecoderEvent::Error`].
    pub fn new(source: &str) -> Result<Self> {
        // Local paths can be validated cheaply; URLs are only verified when
        // FFmpeg opens them on the decoder thread.
        if !source.contains("://") && !std::path::Path::new(source).exists() {
            return Err(VideoError::IoError(format!("Media not found: {source}")).into());
        }

        // Commands: unbounded (UI needs to send without blocking)
        // Events: bounded to two frames for backpressure with a little slack
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(2);

        // FFmpeg contexts are not Send, so the whole loop lives on one
        // blocking thread.
        let source = source.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = Self::decoder_loop_blocking(&source, command_rx, &event_tx) {
                let _ = event_tx.blocking_send(DecoderEvent::Error(e.to_string()));
            }
        });

        Ok(Self {
            command_tx,
            event_rx,
        })
    }

    /// Sends a command to the decoder task.
    pub fn send_command(&self, command: DecoderCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| VideoError::Other("Decoder task is not running".into()).into())
    }

    /// Receives the next event from the decoder (non-blocking).
    ///
    /// Returns `None` if no events are available.
    pub fn try_recv_event(&mut self) -> Option<DecoderEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Receives the next event from the decoder (blocking).
    ///
    /// Returns `None` if the decoder task has terminated.
    pub async fn recv_event(&mut self) -> Option<DecoderEvent> {
        self.event_rx.recv().await
    }

    /// Main decoder loop running in a blocking thread.
    ///
    /// Maintains playback state, responds to commands and paces frames to
    /// their presentation timestamps against a wall-clock anchor.
    fn decoder_loop_blocking(
        source: &str,
        mut command_rx: mpsc::UnboundedReceiver<DecoderCommand>,
        event_tx: &mpsc::Sender<DecoderEvent>,
    ) -> Result<()> {
        crate::media::init_ffmpeg()?;

        let _ = event_tx.blocking_send(DecoderEvent::Buffering);

        let mut ictx = ffmpeg_next::format::input(&source)
            .map_err(|e| VideoError::OpenFailed(format!("{e}")))?;

        let input = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or(VideoError::NoVideoStream)?;
        let video_stream_index = input.index();

        let context_decoder =
            ffmpeg_next::codec::context::Context::from_parameters(input.parameters())
                .map_err(|e| {
                    VideoError::from_message(&format!("Failed to create codec context: {e}"))
                })?;
        let mut decoder = context_decoder.decoder().video().map_err(|e| {
            VideoError::from_message(&format!("Failed to create video decoder: {e}"))
        })?;

        let width = decoder.width();
        let height = decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(|e| VideoError::from_message(&format!("Failed to create scaler: {e}")))?;

        // Time base for converting packet timestamps into seconds.
        let time_base = input.time_base();
        let time_base_f64 = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

        // Playback state
        let mut is_playing = false;
        let mut playback_start_time: Option<std::time::Instant> = None;
        let mut first_pts: Option<f64> = None;
        let mut current_pts_secs: f64 = 0.0;
        let mut decode_single_frame = false;

        loop {
            // Check for commands (non-blocking)
            match command_rx.try_recv() {
                Ok(DecoderCommand::Play) => {
                    // Resuming from pause re-seeks the demuxer to the pause
                    // position so playback continues where it stopped.
                    if !is_playing && current_pts_secs > 0.0 {
                        let timestamp = (current_pts_secs * 1_000_000.0) as i64;
                        // RangeTo lets FFmpeg land on the keyframe before the target
                        if let Err(e) = ictx.seek(timestamp, ..timestamp) {
                            let _ = event_tx.blocking_send(DecoderEvent::Error(format!(
                                "Resume seek failed: {e}"
                            )));
                        } else {
                            decoder.flush();
                        }
                    }
                    is_playing = true;
                    playback_start_time = Some(std::time::Instant::now());
                    first_pts = None;
                }
                Ok(DecoderCommand::Pause) => {
                    // current_pts_secs is kept for resume
                    is_playing = false;
                    playback_start_time = None;
                    first_pts = None;
                }
                Ok(DecoderCommand::Seek { target_secs }) => {
                    let timestamp = (target_secs * 1_000_000.0) as i64;
                    if let Err(e) = ictx.seek(timestamp, ..timestamp) {
                        let _ = event_tx
                            .blocking_send(DecoderEvent::Error(format!("Seek failed: {e}")));
                    } else {
                        decoder.flush();
                        current_pts_secs = target_secs;
                        playback_start_time = Some(std::time::Instant::now());
                        first_pts = None;
                        // A seek during playback stays silent so repeated
                        // jump-backs do not flash a loading state. When
                        // paused, decode one frame to show the seek result.
                        if !is_playing {
                            decode_single_frame = true;
                        }
                    }
                }
                Ok(DecoderCommand::Stop) => {
                    break;
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
            }

            // If not playing and no single frame needed, yield to avoid busy-waiting
            if !is_playing && !decode_single_frame {
                std::thread::sleep(std::time::Duration::from_millis(10));
                continue;
            }

            // Decode next frame
            let mut frame_decoded = false;
            for (stream, packet) in ictx.packets() {
                if stream.index() != video_stream_index {
                    continue;
                }

                if let Err(e) = decoder.send_packet(&packet) {
                    let _ = event_tx
                        .blocking_send(DecoderEvent::Error(format!("Packet send failed: {e}")));
                    continue;
                }

                let mut decoded_frame = ffmpeg_next::frame::Video::empty();
                if decoder.receive_frame(&mut decoded_frame).is_ok() {
                    let mut rgb_frame = ffmpeg_next::frame::Video::empty();
                    if let Err(e) = scaler.run(&decoded_frame, &mut rgb_frame) {
                        let _ = event_tx
                            .blocking_send(DecoderEvent::Error(format!("Scaling failed: {e}")));
                        continue;
                    }

                    let rgba_data = Self::extract_rgba_data(&rgb_frame);

                    let pts_secs = if let Some(pts) = decoded_frame.timestamp() {
                        pts as f64 * time_base_f64
                    } else {
                        0.0
                    };

                    // Frame pacing: wait until the frame should be displayed
                    if let Some(start_time) = playback_start_time {
                        if first_pts.is_none() {
                            first_pts = Some(pts_secs);
                        }

                        if let Some(first) = first_pts {
                            let frame_delay = pts_secs - first;
                            let target_time =
                                start_time + std::time::Duration::from_secs_f64(frame_delay);
                            let now = std::time::Instant::now();

                            if target_time > now {
                                std::thread::sleep(target_time - now);
                            }
                        }
                    }

                    current_pts_secs = pts_secs;

                    let decoded = DecodedFrame {
                        rgba_data: Arc::new(rgba_data),
                        width,
                        height,
                        pts_secs,
                    };

                    if event_tx
                        .blocking_send(DecoderEvent::FrameReady(decoded))
                        .is_err()
                    {
                        // Event channel closed
                        break;
                    }

                    frame_decoded = true;
                    decode_single_frame = false;
                    break;
                }
            }

            // If no frame was decoded, we've reached end of stream
            if !frame_decoded {
                let _ = event_tx.blocking_send(DecoderEvent::EndOfStream);
                is_playing = false;
                playback_start_time = None;
                first_pts = None;
                decode_single_frame = false;
            }
        }

        Ok(())
    }

    /// Extracts RGBA data from a decoded frame, handling stride correctly.
    fn extract_rgba_data(frame: &ffmpeg_next::frame::Video) -> Vec<u8> {
        let width = frame.width();
        let height = frame.height();
        let data = frame.data(0);
        let stride = frame.stride(0);

        let mut rgba_bytes = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            let row_start = (y * stride as u32) as usize;
            let row_end = row_start + (width * 4) as usize;
            rgba_bytes.extend_from_slice(&data[row_start..row_end]);
        }

        rgba_bytes
    }
}
