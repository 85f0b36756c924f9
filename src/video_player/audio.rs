// SPDX-License-Identifier: MPL-2.0
//! Audio extraction from the practice media.
//!
//! Decodes the audio track with FFmpeg and resamples it to the output
//! device's format. Volume and mute are applied downstream by
//! [`crate::video_player::audio_output`], so this decoder only handles
//! transport commands mirrored from the video decoder.

use crate::error::{Result, VideoError};
use crate::video_player::audio_output::{AudioOutputConfig, AudioSamples};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Maximum number of audio frames to skip during precise seeking.
/// Prevents infinite loops on corrupted files or seeks beyond EOF.
const MAX_SEEK_FRAMES: u32 = 1000;

/// Audio look-ahead buffer time in seconds.
/// Buffers are queued ~200ms before they play to keep the output fed.
const AUDIO_LOOKAHEAD_SECS: f64 = 0.2;

/// Transport commands mirrored from the video decoder.
#[derive(Debug, Clone)]
pub enum AudioDecoderCommand {
    /// Start or resume decoding.
    Play,

    /// Pause decoding.
    Pause,

    /// Seek to a specific timestamp.
    Seek { target_secs: f64 },

    /// Stop decoding and clean up.
    Stop,
}

/// Events sent from the audio decoder.
#[derive(Debug, Clone)]
pub enum AudioDecoderEvent {
    /// A decoded buffer of interleaved f32 samples is ready.
    BufferReady(AudioSamples),

    /// End of audio stream reached.
    EndOfStream,

    /// An error occurred during decoding.
    Error(String),
}

/// Holds mutable state for the audio decoder loop.
struct AudioDecoderState {
    /// Whether playback is currently active.
    is_playing: bool,
    /// Wall-clock reference for buffer timing.
    playback_start_time: Option<std::time::Instant>,
    /// Reference PTS for timing calculation.
    first_pts: Option<f64>,
    /// Target PTS for precise seeking.
    seek_target_secs: Option<f64>,
    /// Counter for frames skipped during seeking.
    seek_frames_skipped: u32,
}

impl AudioDecoderState {
    fn new() -> Self {
        Self {
            is_playing: false,
            playback_start_time: None,
            first_pts: None,
            seek_target_secs: None,
            seek_frames_skipped: 0,
        }
    }

    fn reset_timing(&mut self) {
        self.playback_start_time = Some(std::time::Instant::now());
        self.first_pts = None;
    }
}

/// Result of processing an audio decoder command.
enum AudioCommandResult {
    /// Continue the main loop.
    Continue,
    /// Break from the main loop.
    Break,
}

/// Processes a single audio decoder command.
fn handle_audio_command(
    command: &AudioDecoderCommand,
    state: &mut AudioDecoderState,
    ictx: &mut ffmpeg_next::format::context::Input,
    decoder: &mut ffmpeg_next::decoder::Audio,
    event_tx: &mpsc::Sender<AudioDecoderEvent>,
) -> AudioCommandResult {
    match command {
        AudioDecoderCommand::Play => {
            state.is_playing = true;
            state.playback_start_time = Some(std::time::Instant::now());
        }
        AudioDecoderCommand::Pause => {
            state.is_playing = false;
            state.playback_start_time = None;
            state.first_pts = None;
            state.seek_target_secs = None;
        }
        AudioDecoderCommand::Seek { target_secs } => {
            let timestamp = (*target_secs * 1_000_000.0) as i64;
            if let Err(e) = ictx.seek(timestamp, ..timestamp) {
                let _ = event_tx
                    .blocking_send(AudioDecoderEvent::Error(format!("Audio seek failed: {e}")));
                state.seek_target_secs = None;
            } else {
                decoder.flush();
                state.reset_timing();
                // The demuxer lands on a keyframe before the target; frames
                // up to the target are skipped so loop passes start cleanly.
                state.seek_target_secs = Some(*target_secs);
                state.seek_frames_skipped = 0;
            }
        }
        AudioDecoderCommand::Stop => {
            return AudioCommandResult::Break;
        }
    }
    AudioCommandResult::Continue
}

/// Async audio decoder that extracts and decodes the audio track.
///
/// Runs in a separate blocking thread since FFmpeg operations are not `Send`.
/// Decode problems are reported through events and never abort the practice
/// session; the video simply continues without sound.
pub struct AudioDecoder {
    /// Channel for sending commands to the decoder task.
    command_tx: mpsc::UnboundedSender<AudioDecoderCommand>,

    /// Channel for receiving events from the decoder task.
    /// Bounded to prevent memory accumulation during rapid seeks.
    event_rx: mpsc::Receiver<AudioDecoderEvent>,
}

impl AudioDecoder {
    /// Creates a new audio decoder for the given media source.
    ///
    /// `output_config` describes the output device; decoded audio is
    /// resampled to that rate and channel count so it plays at the correct
    /// speed.
    pub fn new(source: &str, output_config: AudioOutputConfig) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(4);

        let source = source.to_string();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = Self::decoder_loop(&source, command_rx, &event_tx, output_config) {
                let _ = event_tx.blocking_send(AudioDecoderEvent::Error(e.to_string()));
            }
        });

        Self {
            command_tx,
            event_rx,
        }
    }

    /// Sends a command to the decoder task.
    pub fn send_command(&self, command: AudioDecoderCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| VideoError::Other("Audio decoder task is not running".into()).into())
    }

    /// Receives the next event from the decoder (blocking).
    pub async fn recv_event(&mut self) -> Option<AudioDecoderEvent> {
        self.event_rx.recv().await
    }

    /// Main audio decoder loop running in a blocking thread.
    fn decoder_loop(
        source: &str,
        mut command_rx: mpsc::UnboundedReceiver<AudioDecoderCommand>,
        event_tx: &mpsc::Sender<AudioDecoderEvent>,
        output_config: AudioOutputConfig,
    ) -> Result<()> {
        crate::media::init_ffmpeg()?;

        let mut ictx = ffmpeg_next::format::input(&source)
            .map_err(|e| VideoError::OpenFailed(format!("{e}")))?;

        let input = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .ok_or_else(|| VideoError::Other("No audio stream found".to_string()))?;
        let audio_stream_index = input.index();

        let time_base = input.time_base();
        let time_base_f64 = f64::from(time_base.numerator()) / f64::from(time_base.denominator());

        let context_decoder =
            ffmpeg_next::codec::context::Context::from_parameters(input.parameters())
                .map_err(|e| {
                    VideoError::from_message(&format!("Failed to create codec context: {e}"))
                })?;
        let mut decoder = context_decoder.decoder().audio().map_err(|e| {
            VideoError::from_message(&format!("Failed to create audio decoder: {e}"))
        })?;

        // Resample to f32 interleaved at the device rate and channel count.
        // Without this, audio plays at the wrong speed on devices whose
        // native rate differs from the stream.
        let output_channel_layout = match output_config.channels {
            1 => ffmpeg_next::ChannelLayout::MONO,
            _ => ffmpeg_next::ChannelLayout::STEREO,
        };

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Packed),
            output_channel_layout,
            output_config.sample_rate,
        )
        .map_err(|e| VideoError::from_message(&format!("Failed to create resampler: {e}")))?;

        let output_sample_rate = output_config.sample_rate;
        let output_channels = output_config.channels;

        let mut state = AudioDecoderState::new();

        loop {
            match command_rx.try_recv() {
                Ok(ref cmd) => {
                    match handle_audio_command(cmd, &mut state, &mut ictx, &mut decoder, event_tx) {
                        AudioCommandResult::Break => break,
                        AudioCommandResult::Continue => {}
                    }
                }
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    break;
                }
                Err(mpsc::error::TryRecvError::Empty) => {}
            }

            // If not playing, sleep to avoid busy-waiting
            if !state.is_playing {
                std::thread::sleep(std::time::Duration::from_millis(10));
                continue;
            }

            // Decode next audio frame
            let mut frame_decoded = false;
            for (stream, packet) in ictx.packets() {
                if stream.index() != audio_stream_index {
                    continue;
                }

                if let Err(e) = decoder.send_packet(&packet) {
                    let _ = event_tx.blocking_send(AudioDecoderEvent::Error(format!(
                        "Audio packet failed: {e}"
                    )));
                    continue;
                }

                let mut decoded_frame = ffmpeg_next::frame::Audio::empty();
                if decoder.receive_frame(&mut decoded_frame).is_ok() {
                    let mut output_audio = ffmpeg_next::frame::Audio::empty();
                    if let Err(e) = resampler.run(&decoded_frame, &mut output_audio) {
                        let _ = event_tx.blocking_send(AudioDecoderEvent::Error(format!(
                            "Resampling failed: {e}"
                        )));
                        continue;
                    }

                    let samples = Self::extract_samples(&output_audio, output_channels);

                    let pts_secs = if let Some(pts) = decoded_frame.timestamp() {
                        pts as f64 * time_base_f64
                    } else {
                        0.0
                    };

                    let frame_duration = samples.len() as f64
                        / (f64::from(output_sample_rate) * f64::from(output_channels));

                    // Precise seeking: skip audio frames before target PTS
                    if let Some(target) = state.seek_target_secs {
                        let frame_end_pts = pts_secs + frame_duration;
                        if frame_end_pts < target {
                            state.seek_frames_skipped += 1;
                            if state.seek_frames_skipped >= MAX_SEEK_FRAMES {
                                let _ = event_tx.blocking_send(AudioDecoderEvent::Error(
                                    "Audio seek timeout: target may be beyond end of file"
                                        .to_string(),
                                ));
                                state.seek_target_secs = None;
                                continue;
                            }
                            continue;
                        }
                        state.first_pts = Some(target);
                        state.seek_target_secs = None;
                    }

                    // Buffer pacing against the wall clock, minus look-ahead
                    if let Some(start_time) = state.playback_start_time {
                        if state.first_pts.is_none() {
                            state.first_pts = Some(pts_secs);
                        }
                        if let Some(first) = state.first_pts {
                            let frame_delay = (pts_secs - first) - AUDIO_LOOKAHEAD_SECS;
                            if frame_delay > 0.0 {
                                let target_time =
                                    start_time + std::time::Duration::from_secs_f64(frame_delay);
                                let now = std::time::Instant::now();
                                if target_time > now {
                                    std::thread::sleep(target_time - now);
                                }
                            }
                        }
                    }

                    if event_tx
                        .blocking_send(AudioDecoderEvent::BufferReady(Arc::new(samples)))
                        .is_err()
                    {
                        break;
                    }

                    frame_decoded = true;
                    break;
                }
            }

            // If no frame decoded, we've reached end of stream
            if !frame_decoded {
                let _ = event_tx.blocking_send(AudioDecoderEvent::EndOfStream);
                state.is_playing = false;
            }
        }

        Ok(())
    }

    /// Extracts f32 samples from a resampled audio frame.
    fn extract_samples(frame: &ffmpeg_next::frame::Audio, channels: u16) -> Vec<f32> {
        let data = frame.data(0);
        let sample_count = frame.samples() * channels as usize;

        let mut samples = Vec::with_capacity(sample_count);
        for i in 0..sample_count {
            let offset = i * 4; // f32 = 4 bytes
            if offset + 4 <= data.len() {
                let bytes = [
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                ];
                samples.push(f32::from_le_bytes(bytes));
            }
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn audio_decoder_command_variants() {
        let play = AudioDecoderCommand::Play;
        assert!(matches!(play.clone(), AudioDecoderCommand::Play));

        let pause = AudioDecoderCommand::Pause;
        assert!(matches!(pause.clone(), AudioDecoderCommand::Pause));

        let seek = AudioDecoderCommand::Seek { target_secs: 30.5 };
        assert!(matches!(
            seek.clone(),
            AudioDecoderCommand::Seek { target_secs } if (target_secs - 30.5).abs() < 0.001
        ));

        let stop = AudioDecoderCommand::Stop;
        assert!(matches!(stop.clone(), AudioDecoderCommand::Stop));
    }

    #[test]
    fn audio_decoder_event_variants() {
        let buffer_event = AudioDecoderEvent::BufferReady(Arc::new(vec![0.0f32; 4]));
        assert!(matches!(buffer_event, AudioDecoderEvent::BufferReady(_)));

        let eos_event = AudioDecoderEvent::EndOfStream;
        assert!(matches!(eos_event, AudioDecoderEvent::EndOfStream));

        let error_event = AudioDecoderEvent::Error("test error".to_string());
        assert!(matches!(error_event, AudioDecoderEvent::Error(_)));
    }

    #[tokio::test]
    async fn audio_decoder_accepts_commands() {
        let temp_dir = tempfile::tempdir().unwrap();
        let media_path = temp_dir.path().join("clip.mp4");
        std::fs::write(&media_path, b"fake media data").unwrap();

        let config = AudioOutputConfig {
            sample_rate: 48_000,
            channels: 2,
        };
        let decoder = AudioDecoder::new(media_path.to_str().unwrap(), config);

        assert!(decoder.send_command(AudioDecoderCommand::Play).is_ok());
        assert!(decoder.send_command(AudioDecoderCommand::Stop).is_ok());
    }

    #[tokio::test]
    async fn unreadable_source_surfaces_as_error_event() {
        let temp_dir = tempfile::tempdir().unwrap();
        let media_path = temp_dir.path().join("garbage.mp4");
        std::fs::write(&media_path, b"not a container").unwrap();

        let config = AudioOutputConfig {
            sample_rate: 48_000,
            channels: 2,
        };
        let mut decoder = AudioDecoder::new(media_path.to_str().unwrap(), config);

        let event = tokio::time::timeout(Duration::from_secs(5), decoder.recv_event()).await;
        assert!(matches!(event, Ok(Some(AudioDecoderEvent::Error(_)))));
    }
}
