// SPDX-License-Identifier: MPL-2.0
//! Audio output using cpal for low-latency playback.
//!
//! The cpal stream is not `Send`, so it is created and kept alive on a
//! dedicated blocking thread. The rest of the player talks to that thread
//! through a command channel; dropping [`AudioOutput`] closes the channel,
//! which ends the thread and with it the stream.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::error::{Result, VideoError};
use crate::video_player::Volume;

/// Audio samples to be played.
/// Interleaved f32 samples normalized to [-1.0, 1.0].
pub type AudioSamples = Arc<Vec<f32>>;

/// Output device format the decoder must resample to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioOutputConfig {
    /// Sample rate in Hz (e.g., 44100, 48000).
    pub sample_rate: u32,

    /// Number of interleaved channels.
    pub channels: u16,
}

/// Commands for controlling audio output.
#[derive(Debug)]
pub enum AudioOutputCommand {
    /// Queue audio samples for playback.
    Play(AudioSamples),

    /// Pause playback (output silence, keep the buffer).
    Pause,

    /// Resume playback.
    Resume,

    /// Stop playback and clear the buffer.
    Stop,

    /// Set volume.
    SetVolume(Volume),

    /// Set mute state.
    SetMuted(bool),
}

/// Shared state between the cpal callback and the rest of the player.
struct SharedState {
    /// Current volume (stored as u32 bits of f32 for atomic access).
    volume_bits: AtomicU32,

    /// Mute state.
    muted: AtomicBool,

    /// Pause state.
    paused: AtomicBool,
}

impl SharedState {
    fn new(initial_volume: f32, muted: bool) -> Self {
        Self {
            volume_bits: AtomicU32::new(initial_volume.to_bits()),
            muted: AtomicBool::new(muted),
            paused: AtomicBool::new(false),
        }
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    fn set_volume(&self, volume: f32) {
        self.volume_bits.store(volume.to_bits(), Ordering::Relaxed);
    }

    fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }
}

/// Handle for audio playback through the system's default output device.
pub struct AudioOutput {
    /// Channel for sending commands to the audio thread.
    command_tx: mpsc::UnboundedSender<AudioOutputCommand>,

    /// Shared state for volume/mute control.
    shared_state: Arc<SharedState>,

    /// Format of the output device.
    config: AudioOutputConfig,
}

impl AudioOutput {
    /// Creates a new audio output on a dedicated blocking thread.
    ///
    /// # Errors
    ///
    /// Returns an error if no audio output device is found or the device
    /// configuration cannot be retrieved. Failures while building the stream
    /// on the audio thread only disable sound; they are reported on stderr.
    pub fn new(volume: Volume, muted: bool) -> Result<Self> {
        // The device is queried here only to learn its format; the audio
        // thread opens its own handle because cpal types must stay on the
        // thread that drives the stream.
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VideoError::Other("No audio output device found".to_string()))?;
        let supported_config = device
            .default_output_config()
            .map_err(|e| VideoError::Other(format!("Failed to get audio config: {e}")))?;

        let config = AudioOutputConfig {
            sample_rate: supported_config.sample_rate().0,
            channels: supported_config.channels(),
        };

        let shared_state = Arc::new(SharedState::new(volume.value(), muted));
        let (command_tx, command_rx) = mpsc::unbounded_channel::<AudioOutputCommand>();

        let thread_state = Arc::clone(&shared_state);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = Self::audio_thread(command_rx, thread_state, config) {
                eprintln!("Audio output failed: {e}");
            }
        });

        Ok(Self {
            command_tx,
            shared_state,
            config,
        })
    }

    /// Owns the cpal stream and processes commands until the channel closes.
    fn audio_thread(
        mut command_rx: mpsc::UnboundedReceiver<AudioOutputCommand>,
        shared_state: Arc<SharedState>,
        config: AudioOutputConfig,
    ) -> Result<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| VideoError::Other("No audio output device found".to_string()))?;
        let supported_config = device
            .default_output_config()
            .map_err(|e| VideoError::Other(format!("Failed to get audio config: {e}")))?;

        // Sample buffer shared with the cpal callback.
        // Capped at about one second to prevent unbounded growth.
        let max_buffer_size = (config.sample_rate as usize) * (config.channels as usize);
        let buffer: Arc<Mutex<Vec<f32>>> =
            Arc::new(Mutex::new(Vec::with_capacity(max_buffer_size)));

        let stream = match supported_config.sample_format() {
            cpal::SampleFormat::F32 => Self::build_stream::<f32>(
                &device,
                &supported_config.into(),
                Arc::clone(&buffer),
                Arc::clone(&shared_state),
            )?,
            cpal::SampleFormat::I16 => Self::build_stream::<i16>(
                &device,
                &supported_config.into(),
                Arc::clone(&buffer),
                Arc::clone(&shared_state),
            )?,
            cpal::SampleFormat::U16 => Self::build_stream::<u16>(
                &device,
                &supported_config.into(),
                Arc::clone(&buffer),
                Arc::clone(&shared_state),
            )?,
            _ => {
                return Err(
                    VideoError::Other("Unsupported audio sample format".to_string()).into(),
                )
            }
        };

        stream
            .play()
            .map_err(|e| VideoError::Other(format!("Failed to start audio stream: {e}")))?;

        // Channel closure means the handle was dropped; the stream is
        // dropped with this frame, which stops playback.
        while let Some(cmd) = command_rx.blocking_recv() {
            match cmd {
                AudioOutputCommand::Play(samples) => {
                    if let Ok(mut buf) = buffer.lock() {
                        let available_space = max_buffer_size.saturating_sub(buf.len());
                        if available_space >= samples.len() {
                            buf.extend_from_slice(&samples);
                        } else if available_space > 0 {
                            buf.extend_from_slice(&samples[..available_space]);
                        }
                        // A full buffer drops samples rather than growing
                    }
                }
                AudioOutputCommand::Pause => {
                    shared_state.set_paused(true);
                }
                AudioOutputCommand::Resume => {
                    shared_state.set_paused(false);
                }
                AudioOutputCommand::Stop => {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.clear();
                    }
                    shared_state.set_paused(true);
                }
                AudioOutputCommand::SetVolume(volume) => {
                    shared_state.set_volume(volume.value());
                }
                AudioOutputCommand::SetMuted(muted) => {
                    shared_state.set_muted(muted);
                }
            }
        }

        Ok(())
    }

    /// Builds an audio output stream for a specific sample format.
    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        buffer: Arc<Mutex<Vec<f32>>>,
        shared_state: Arc<SharedState>,
    ) -> Result<cpal::Stream> {
        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    let volume = shared_state.volume();
                    let muted = shared_state.is_muted();
                    let paused = shared_state.is_paused();

                    if muted || paused {
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    }

                    let Ok(mut buf) = buffer.lock() else {
                        // Mutex poisoned, output silence
                        for sample in data.iter_mut() {
                            *sample = T::from_sample(0.0f32);
                        }
                        return;
                    };

                    // Human hearing is logarithmic; squaring the slider value
                    // makes the volume control feel perceptually linear.
                    let perceptual_volume = volume * volume;

                    for (i, sample) in data.iter_mut().enumerate() {
                        if i < buf.len() {
                            // Clamping slightly below 1.0 prevents i16
                            // overflow in from_sample.
                            let scaled = (buf[i] * perceptual_volume).clamp(-1.0, 0.999_999_9);
                            *sample = T::from_sample(scaled);
                        } else {
                            *sample = T::from_sample(0.0f32);
                        }
                    }

                    let consumed = data.len().min(buf.len());
                    buf.drain(..consumed);
                },
                |err| {
                    eprintln!("Audio output error: {err}");
                },
                None,
            )
            .map_err(|e| VideoError::Other(format!("Failed to build audio stream: {e}")))?;

        Ok(stream)
    }

    /// Sends a command to the audio thread.
    pub fn send_command(&self, command: AudioOutputCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| VideoError::Other("Audio output channel closed".into()).into())
    }

    /// Queues audio samples for playback.
    pub fn play(&self, samples: AudioSamples) -> Result<()> {
        self.send_command(AudioOutputCommand::Play(samples))
    }

    /// Pauses audio playback.
    pub fn pause(&self) -> Result<()> {
        self.send_command(AudioOutputCommand::Pause)
    }

    /// Resumes audio playback.
    pub fn resume(&self) -> Result<()> {
        self.send_command(AudioOutputCommand::Resume)
    }

    /// Stops playback and clears the buffer.
    pub fn stop(&self) -> Result<()> {
        self.send_command(AudioOutputCommand::Stop)
    }

    /// Sets the volume.
    pub fn set_volume(&self, volume: Volume) -> Result<()> {
        self.send_command(AudioOutputCommand::SetVolume(volume))
    }

    /// Sets the mute state.
    pub fn set_muted(&self, muted: bool) -> Result<()> {
        self.send_command(AudioOutputCommand::SetMuted(muted))
    }

    /// Returns the current volume.
    #[must_use]
    pub fn volume(&self) -> f32 {
        self.shared_state.volume()
    }

    /// Returns whether audio is muted.
    #[must_use]
    pub fn is_muted(&self) -> bool {
        self.shared_state.is_muted()
    }

    /// Returns the output device format for the resampler.
    #[must_use]
    pub fn config(&self) -> AudioOutputConfig {
        self.config
    }
}
