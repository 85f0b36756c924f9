// SPDX-License-Identifier: MPL-2.0
//! iced subscription bridging the decoder threads to application messages.
//!
//! One subscription is one playback session: it owns the video decoder, the
//! audio decoder and the audio output for a single source. The subscription
//! is keyed on a [`PlaybackSessionId`]; when the application changes the id
//! (or stops returning the subscription), iced drops the stream, the decoder
//! handles drop with it, and every thread behind them shuts down. That drop
//! is the only teardown path and it covers mid-session replacement too.

use std::fmt;
use std::sync::Arc;

use iced::futures::{SinkExt, Stream};
use iced::{stream, Subscription};
use tokio::sync::mpsc;

use super::audio::{AudioDecoder, AudioDecoderCommand, AudioDecoderEvent};
use super::audio_output::AudioOutput;
use super::decoder::{AsyncDecoder, DecoderCommand, DecoderEvent};
use super::volume::Volume;

/// Capacity of the subscription's outgoing message channel.
const MESSAGE_CHANNEL_CAPACITY: usize = 100;

/// Identity of one playback session.
///
/// Two sessions with the same source but different ids are different
/// sessions; bumping the id is how the application forces a full restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackSessionId(pub u64);

/// Audio adjustments that bypass the decoders and go straight to the
/// output stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AudioControl {
    SetVolume(Volume),
    SetMuted(bool),
}

/// Handle for controlling an active playback session.
///
/// Cloneable; all clones drive the same session. Sending on a finished
/// session is harmless and reports an error the caller may ignore.
#[derive(Clone)]
pub struct DecoderCommandSender {
    video_tx: mpsc::UnboundedSender<DecoderCommand>,
    audio_tx: Option<mpsc::UnboundedSender<AudioControl>>,
}

impl DecoderCommandSender {
    pub(crate) fn new(
        video_tx: mpsc::UnboundedSender<DecoderCommand>,
        audio_tx: Option<mpsc::UnboundedSender<AudioControl>>,
    ) -> Self {
        Self { video_tx, audio_tx }
    }

    /// Sends a transport command to the session.
    ///
    /// The subscription mirrors transport commands onto the audio half, so
    /// callers only ever talk to this one entry point.
    pub fn send(
        &self,
        command: DecoderCommand,
    ) -> Result<(), mpsc::error::SendError<DecoderCommand>> {
        self.video_tx.send(command)
    }

    /// Adjusts playback volume. A no-op for sessions without audio.
    pub fn set_volume(
        &self,
        volume: Volume,
    ) -> Result<(), mpsc::error::SendError<AudioControl>> {
        match &self.audio_tx {
            Some(tx) => tx.send(AudioControl::SetVolume(volume)),
            None => Ok(()),
        }
    }

    /// Mutes or unmutes playback. A no-op for sessions without audio.
    pub fn set_muted(
        &self,
        muted: bool,
    ) -> Result<(), mpsc::error::SendError<AudioControl>> {
        match &self.audio_tx {
            Some(tx) => tx.send(AudioControl::SetMuted(muted)),
            None => Ok(()),
        }
    }

    /// Returns true if the session has an audio pipeline.
    pub fn has_audio(&self) -> bool {
        self.audio_tx.is_some()
    }
}

impl fmt::Debug for DecoderCommandSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderCommandSender")
            .field("has_audio", &self.audio_tx.is_some())
            .finish()
    }
}

/// Messages emitted by a playback session.
#[derive(Clone)]
pub enum PlaybackMessage {
    /// The session is up; carries the handle for sending commands to it.
    Started(DecoderCommandSender),

    /// A decoded frame is ready for display.
    FrameReady {
        rgba_data: Arc<Vec<u8>>,
        width: u32,
        height: u32,
        pts_secs: f64,
    },

    /// The decoder is busy opening or refilling; no frames for a moment.
    Buffering,

    /// The stream ran out of packets.
    EndOfStream,

    /// The session failed. Terminal; only a restart recovers.
    Error(String),
}

impl fmt::Debug for PlaybackMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started(sender) => f.debug_tuple("Started").field(sender).finish(),
            Self::FrameReady {
                rgba_data,
                width,
                height,
                pts_secs,
            } => f
                .debug_struct("FrameReady")
                .field("bytes", &rgba_data.len())
                .field("width", width)
                .field("height", height)
                .field("pts_secs", pts_secs)
                .finish(),
            Self::Buffering => write!(f, "Buffering"),
            Self::EndOfStream => write!(f, "EndOfStream"),
            Self::Error(message) => f.debug_tuple("Error").field(message).finish(),
        }
    }
}

/// The audio half of a session. Dropping it silences the output stream and
/// stops the audio decode thread.
struct AudioPipeline {
    output: AudioOutput,
    decoder: AudioDecoder,
}

impl AudioPipeline {
    /// Mirrors a video transport command onto the audio side.
    fn apply_transport(&self, command: &DecoderCommand) {
        let mirrored = match command {
            DecoderCommand::Play => {
                let _ = self.output.resume();
                AudioDecoderCommand::Play
            }
            DecoderCommand::Pause => {
                let _ = self.output.pause();
                AudioDecoderCommand::Pause
            }
            DecoderCommand::Seek { target_secs } => {
                // Buffered samples from before the jump must not play after it.
                let _ = self.output.stop();
                AudioDecoderCommand::Seek {
                    target_secs: *target_secs,
                }
            }
            DecoderCommand::Stop => {
                let _ = self.output.stop();
                AudioDecoderCommand::Stop
            }
        };

        if let Err(e) = self.decoder.send_command(mirrored) {
            eprintln!("Audio decoder unreachable: {e}");
        }
    }

    fn apply_control(&self, control: AudioControl) {
        let result = match control {
            AudioControl::SetVolume(volume) => self.output.set_volume(volume),
            AudioControl::SetMuted(muted) => self.output.set_muted(muted),
        };

        if let Err(e) = result {
            eprintln!("Audio output unreachable: {e}");
        }
    }
}

enum State {
    Starting,
    Running {
        command_rx: mpsc::UnboundedReceiver<DecoderCommand>,
        audio_control_rx: Option<mpsc::UnboundedReceiver<AudioControl>>,
        video: AsyncDecoder,
        audio: Option<AudioPipeline>,
    },
}

/// Creates a playback subscription for the given source.
///
/// `volume` and `muted` seed the audio output; later adjustments arrive
/// through the [`DecoderCommandSender`] and do not restart the session.
/// `has_audio` comes from probing the source up front and decides whether
/// an audio pipeline is built at all.
pub fn video_playback(
    source: String,
    session_id: PlaybackSessionId,
    volume: Volume,
    muted: bool,
    has_audio: bool,
) -> Subscription<PlaybackMessage> {
    Subscription::run_with_id(
        session_id,
        playback_stream(source, volume, muted, has_audio),
    )
}

fn playback_stream(
    source: String,
    volume: Volume,
    muted: bool,
    has_audio: bool,
) -> impl Stream<Item = PlaybackMessage> {
    stream::channel(MESSAGE_CHANNEL_CAPACITY, move |mut output| async move {
        let mut state = State::Starting;

        loop {
            match &mut state {
                State::Starting => {
                    let video = match AsyncDecoder::new(&source) {
                        Ok(decoder) => decoder,
                        Err(e) => {
                            let _ = output.send(PlaybackMessage::Error(e.to_string())).await;
                            break;
                        }
                    };

                    let (command_tx, command_rx) = mpsc::unbounded_channel();

                    // Audio failures never kill the session; the practice
                    // loop still works silently.
                    let (audio, audio_control_tx, audio_control_rx) = if has_audio {
                        match AudioOutput::new(volume, muted) {
                            Ok(audio_output) => {
                                let decoder =
                                    AudioDecoder::new(&source, audio_output.config());
                                let (control_tx, control_rx) = mpsc::unbounded_channel();
                                (
                                    Some(AudioPipeline {
                                        output: audio_output,
                                        decoder,
                                    }),
                                    Some(control_tx),
                                    Some(control_rx),
                                )
                            }
                            Err(e) => {
                                eprintln!(
                                    "Audio output unavailable, playing without sound: {e}"
                                );
                                (None, None, None)
                            }
                        }
                    } else {
                        (None, None, None)
                    };

                    let sender = DecoderCommandSender::new(command_tx, audio_control_tx);

                    if output.send(PlaybackMessage::Started(sender)).await.is_err() {
                        break;
                    }

                    state = State::Running {
                        command_rx,
                        audio_control_rx,
                        video,
                        audio,
                    };
                }

                State::Running {
                    command_rx,
                    audio_control_rx,
                    video,
                    audio,
                } => {
                    tokio::select! {
                        command = command_rx.recv() => match command {
                            Some(command) => {
                                if let Some(pipeline) = audio.as_ref() {
                                    pipeline.apply_transport(&command);
                                }
                                if let Err(e) = video.send_command(command) {
                                    eprintln!("Video decoder unreachable: {e}");
                                }
                            }
                            // All command senders dropped; session is orphaned.
                            None => break,
                        },

                        control = next_audio_control(audio_control_rx) => {
                            if let (Some(control), Some(pipeline)) = (control, audio.as_ref()) {
                                pipeline.apply_control(control);
                            }
                        }

                        event = video.recv_event() => match event {
                            Some(DecoderEvent::FrameReady(frame)) => {
                                let message = PlaybackMessage::FrameReady {
                                    rgba_data: frame.rgba_data,
                                    width: frame.width,
                                    height: frame.height,
                                    pts_secs: frame.pts_secs,
                                };
                                if output.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Some(DecoderEvent::Buffering) => {
                                let _ = output.send(PlaybackMessage::Buffering).await;
                            }
                            Some(DecoderEvent::EndOfStream) => {
                                let _ = output.send(PlaybackMessage::EndOfStream).await;
                            }
                            Some(DecoderEvent::Error(message)) => {
                                let _ = output.send(PlaybackMessage::Error(message)).await;
                            }
                            None => break,
                        },

                        audio_event = next_audio_event(audio) => match audio_event {
                            Some(AudioDecoderEvent::BufferReady(samples)) => {
                                if let Some(pipeline) = audio.as_ref() {
                                    let _ = pipeline.output.play(samples);
                                }
                            }
                            // Video decides when the session ends.
                            Some(AudioDecoderEvent::EndOfStream) => {}
                            Some(AudioDecoderEvent::Error(message)) => {
                                eprintln!("Audio decoding stopped: {message}");
                                *audio = None;
                            }
                            None => *audio = None,
                        },
                    }
                }
            }
        }

        // Park until iced drops the subscription; ending the stream early
        // would recreate the session under the same id.
        std::future::pending::<()>().await
    })
}

async fn next_audio_control(
    rx: &mut Option<mpsc::UnboundedReceiver<AudioControl>>,
) -> Option<AudioControl> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_audio_event(audio: &mut Option<AudioPipeline>) -> Option<AudioDecoderEvent> {
    match audio {
        Some(pipeline) => pipeline.decoder.recv_event().await,
        None => std::future::pending().await,
    }
}
