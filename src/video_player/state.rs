// SPDX-License-Identifier: MPL-2.0
//! Playback state machine for the practice player.
//!
//! Manages the lifecycle of video playback with clear state transitions:
//! - Stopped: No playback yet
//! - Playing: Actively decoding and displaying frames
//! - Paused: Playback paused at current position
//! - Seeking: Jumping to a specific timestamp
//! - Buffering: Waiting for frames to be decoded
//! - Error: Playback failed, showing error state

use super::subscription::DecoderCommandSender;
use super::{DecoderCommand, Volume};

/// Playback state machine.
///
/// This enum represents all possible states of the video player,
/// ensuring type-safe state transitions via pattern matching.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackState {
    /// No playback yet. Initial state before the first frame.
    Stopped,

    /// Video is currently playing.
    /// Contains current playback position in seconds.
    Playing { position_secs: f64 },

    /// Video is paused at a specific position.
    Paused { position_secs: f64 },

    /// Video is seeking to a new position.
    /// Contains target position in seconds and whether to resume playing after seek.
    Seeking {
        target_secs: f64,
        resume_playing: bool,
    },

    /// Video is buffering (loading frames).
    Buffering { position_secs: f64 },

    /// Playback error occurred.
    /// Contains error message for display.
    Error { message: String },
}

impl PlaybackState {
    /// Returns the current playback position in seconds, if available.
    pub fn position(&self) -> Option<f64> {
        match self {
            Self::Stopped => Some(0.0),
            Self::Playing { position_secs } => Some(*position_secs),
            Self::Paused { position_secs } => Some(*position_secs),
            Self::Seeking { target_secs, .. } => Some(*target_secs),
            Self::Buffering { position_secs } => Some(*position_secs),
            Self::Error { .. } => None,
        }
    }

    /// Returns true if the video is currently playing.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing { .. })
    }

    /// Returns true if the video is paused.
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    /// Returns true if the video is in an error state.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// Returns the error message if in error state.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }

    /// Returns true if the video is playing or will resume playing after a
    /// seek or buffering pause.
    pub fn is_playing_or_will_resume(&self) -> bool {
        match self {
            Self::Playing { .. } => true,
            Self::Seeking { resume_playing, .. } => *resume_playing,
            Self::Buffering { .. } => true,
            _ => false,
        }
    }
}

/// Video player facade that manages playback state and decoder commands.
///
/// Loop enforcement is not handled here; the session owning this player
/// reacts to position updates and calls [`VideoPlayer::seek`] when the
/// window requires it.
pub struct VideoPlayer {
    /// Current playback state.
    state: PlaybackState,

    /// Media duration in seconds, 0.0 when unknown.
    duration_secs: f64,

    /// Audio volume, forwarded to the session on attach.
    volume: Volume,

    /// Mute state, forwarded to the session on attach.
    muted: bool,

    /// Command sender to control the decoder (provided by subscription).
    command_sender: Option<DecoderCommandSender>,
}

impl VideoPlayer {
    /// Creates a new video player.
    ///
    /// The player starts in the Stopped state. The command sender is set
    /// when the playback subscription reports in.
    pub fn new(duration_secs: f64, volume: Volume, muted: bool) -> Self {
        Self {
            state: PlaybackState::Stopped,
            duration_secs,
            volume,
            muted,
            command_sender: None,
        }
    }

    /// Sets the command sender for controlling the decoder.
    ///
    /// Called when the subscription sends the Started message. The stored
    /// volume and mute state are pushed immediately so a fresh session
    /// starts with the user's audio settings.
    pub fn set_command_sender(&mut self, sender: DecoderCommandSender) {
        let _ = sender.set_volume(self.volume);
        let _ = sender.set_muted(self.muted);
        self.command_sender = Some(sender);
    }

    /// Returns true if the player has a command sender (subscription is active).
    pub fn has_command_sender(&self) -> bool {
        self.command_sender.is_some()
    }

    /// Returns the current playback state.
    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// Returns the media duration in seconds, 0.0 when unknown.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Returns the current volume.
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Returns whether audio is muted.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Sets the audio volume and forwards it to the active session.
    pub fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
        if let Some(sender) = &self.command_sender {
            let _ = sender.set_volume(volume);
        }
    }

    /// Sets the mute state and forwards it to the active session.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if let Some(sender) = &self.command_sender {
            let _ = sender.set_muted(muted);
        }
    }

    /// Flips the mute state.
    pub fn toggle_mute(&mut self) {
        self.set_muted(!self.muted);
    }

    /// Returns true if the active session carries audio.
    pub fn has_audio(&self) -> bool {
        self.command_sender
            .as_ref()
            .map(|s| s.has_audio())
            .unwrap_or(false)
    }

    /// Starts or resumes playback.
    ///
    /// State transitions:
    /// - Stopped → Playing (from the beginning)
    /// - Paused → Playing (from the paused position)
    /// - Playing → No change (idempotent)
    pub fn play(&mut self) {
        match &self.state {
            PlaybackState::Stopped => {
                self.state = PlaybackState::Playing { position_secs: 0.0 };
            }
            PlaybackState::Paused { position_secs } => {
                self.state = PlaybackState::Playing {
                    position_secs: *position_secs,
                };
            }
            _ => return,
        }

        if let Some(sender) = &self.command_sender {
            let _ = sender.send(DecoderCommand::Play);
        }
    }

    /// Pauses playback at the current position.
    ///
    /// State transitions:
    /// - Playing → Paused (at current position)
    /// - Paused → No change (idempotent)
    pub fn pause(&mut self) {
        if let PlaybackState::Playing { position_secs } = &self.state {
            self.state = PlaybackState::Paused {
                position_secs: *position_secs,
            };

            if let Some(sender) = &self.command_sender {
                let _ = sender.send(DecoderCommand::Pause);
            }
        }
    }

    /// Toggles between playing and paused.
    pub fn toggle_playback(&mut self) {
        if self.state.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Stops playback.
    ///
    /// State transitions: any state → Stopped.
    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;

        if let Some(sender) = &self.command_sender {
            let _ = sender.send(DecoderCommand::Stop);
        }
    }

    /// Pauses playback at a specific position.
    ///
    /// Used when the stream ends before the loop window does, to hold the
    /// last frame instead of stopping.
    pub fn pause_at(&mut self, position_secs: f64) {
        self.state = PlaybackState::Paused { position_secs };

        if let Some(sender) = &self.command_sender {
            let _ = sender.send(DecoderCommand::Pause);
        }
    }

    /// Seeks to a specific position.
    ///
    /// The target is clamped to `[0, duration]` when the duration is known.
    /// Playback continues after the seek if it was playing or about to.
    pub fn seek(&mut self, target_secs: f64) {
        let clamped_target = self.clamp_target(target_secs);

        // Chained seeks keep the original resume intent.
        let should_resume = self.state.is_playing_or_will_resume();

        self.state = PlaybackState::Seeking {
            target_secs: clamped_target,
            resume_playing: should_resume,
        };

        if let Some(sender) = &self.command_sender {
            let _ = sender.send(DecoderCommand::Seek {
                target_secs: clamped_target,
            });

            if should_resume {
                let _ = sender.send(DecoderCommand::Play);
            }
        }
    }

    /// Seeks to a specific position and starts playback.
    ///
    /// Unlike [`VideoPlayer::seek`], playback always resumes after the seek.
    /// This is how a session enters its loop window.
    pub fn seek_and_play(&mut self, target_secs: f64) {
        let clamped_target = self.clamp_target(target_secs);

        self.state = PlaybackState::Seeking {
            target_secs: clamped_target,
            resume_playing: true,
        };

        if let Some(sender) = &self.command_sender {
            let _ = sender.send(DecoderCommand::Seek {
                target_secs: clamped_target,
            });
            let _ = sender.send(DecoderCommand::Play);
        }
    }

    /// Updates playback position from a decoded frame timestamp.
    ///
    /// Completes an in-flight seek and transitions Buffering back to
    /// Playing. Position updates while paused are ignored; the decoder does
    /// not produce frames in that state.
    pub fn update_position(&mut self, position_secs: f64) {
        match &self.state {
            PlaybackState::Playing { .. } | PlaybackState::Buffering { .. } => {
                self.state = PlaybackState::Playing { position_secs };
            }
            PlaybackState::Seeking { resume_playing, .. } => {
                if *resume_playing {
                    self.state = PlaybackState::Playing { position_secs };
                } else {
                    self.state = PlaybackState::Paused { position_secs };
                }
            }
            _ => {}
        }
    }

    /// Transitions to buffering state.
    pub fn set_buffering(&mut self, position_secs: f64) {
        self.state = PlaybackState::Buffering { position_secs };
    }

    /// Transitions to error state with the given message.
    pub fn set_error(&mut self, message: String) {
        self.state = PlaybackState::Error { message };
    }

    /// Completes seeking and transitions to Playing or Paused.
    pub fn complete_seek(&mut self) {
        if let PlaybackState::Seeking {
            target_secs,
            resume_playing,
        } = &self.state
        {
            if *resume_playing {
                self.state = PlaybackState::Playing {
                    position_secs: *target_secs,
                };
            } else {
                self.state = PlaybackState::Paused {
                    position_secs: *target_secs,
                };
            }
        }
    }

    fn clamp_target(&self, target_secs: f64) -> f64 {
        let target = target_secs.max(0.0);
        if self.duration_secs > 0.0 {
            target.min(self.duration_secs)
        } else {
            target
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> VideoPlayer {
        VideoPlayer::new(120.0, Volume::default(), false)
    }

    #[test]
    fn new_player_starts_in_stopped_state() {
        let player = player();

        assert_eq!(player.state(), &PlaybackState::Stopped);
        assert_eq!(player.state().position(), Some(0.0));
        assert!(!player.has_command_sender());
    }

    #[test]
    fn play_from_stopped_starts_at_beginning() {
        let mut player = player();

        player.play();

        assert!(player.state().is_playing());
        assert_eq!(player.state().position(), Some(0.0));
    }

    #[test]
    fn pause_from_playing_preserves_position() {
        let mut player = player();

        player.play();
        player.update_position(30.5);
        player.pause();

        assert!(player.state().is_paused());
        assert_eq!(player.state().position(), Some(30.5));
    }

    #[test]
    fn play_from_paused_resumes_at_current_position() {
        let mut player = player();

        player.play();
        player.update_position(45.0);
        player.pause();
        player.play();

        assert!(player.state().is_playing());
        assert_eq!(player.state().position(), Some(45.0));
    }

    #[test]
    fn toggle_playback_flips_between_states() {
        let mut player = player();

        player.toggle_playback();
        assert!(player.state().is_playing());

        player.update_position(10.0);
        player.toggle_playback();
        assert!(player.state().is_paused());

        player.toggle_playback();
        assert!(player.state().is_playing());
        assert_eq!(player.state().position(), Some(10.0));
    }

    #[test]
    fn stop_returns_to_stopped() {
        let mut player = player();

        player.play();
        player.update_position(60.0);
        player.stop();

        assert_eq!(player.state(), &PlaybackState::Stopped);
        assert_eq!(player.state().position(), Some(0.0));
    }

    #[test]
    fn seek_clamps_to_media_duration() {
        let mut player = player();

        player.seek(200.0);
        assert_eq!(player.state().position(), Some(120.0));

        player.seek(-10.0);
        assert_eq!(player.state().position(), Some(0.0));

        player.seek(75.5);
        assert_eq!(player.state().position(), Some(75.5));
    }

    #[test]
    fn seek_with_unknown_duration_only_clamps_below_zero() {
        let mut player = VideoPlayer::new(0.0, Volume::default(), false);

        player.seek(500.0);
        assert_eq!(player.state().position(), Some(500.0));

        player.seek(-1.0);
        assert_eq!(player.state().position(), Some(0.0));
    }

    #[test]
    fn complete_seek_transitions_to_paused() {
        let mut player = player();

        player.seek(30.0);
        player.complete_seek();

        assert!(player.state().is_paused());
        assert_eq!(player.state().position(), Some(30.0));
    }

    #[test]
    fn error_state_clears_position() {
        let mut player = player();

        player.play();
        player.set_error("Decoding failed".to_string());

        assert!(player.state().is_error());
        assert_eq!(player.state().position(), None);
        assert_eq!(player.state().error_message(), Some("Decoding failed"));
    }

    #[test]
    fn buffering_state_preserves_position() {
        let mut player = player();

        player.play();
        player.update_position(25.0);
        player.set_buffering(25.0);

        assert_eq!(
            player.state(),
            &PlaybackState::Buffering {
                position_secs: 25.0
            }
        );

        // Next frame resumes playing
        player.update_position(25.1);
        assert!(player.state().is_playing());
    }

    #[test]
    fn play_is_idempotent_when_already_playing() {
        let mut player = player();

        player.play();
        player.update_position(5.0);
        let state_before = player.state().clone();

        player.play();

        assert_eq!(player.state(), &state_before);
    }

    #[test]
    fn pause_is_idempotent_when_already_paused() {
        let mut player = player();

        player.play();
        player.update_position(10.0);
        player.pause();
        let state_before = player.state().clone();

        player.pause();

        assert_eq!(player.state(), &state_before);
    }

    #[test]
    fn update_position_ignored_while_paused() {
        let mut player = player();

        player.play();
        player.update_position(25.0);
        player.pause();

        player.update_position(99.0);

        assert_eq!(player.state().position(), Some(25.0));
    }

    #[test]
    fn is_playing_or_will_resume_reflects_playback_intent() {
        assert!(!PlaybackState::Stopped.is_playing_or_will_resume());

        assert!(PlaybackState::Playing {
            position_secs: 10.0
        }
        .is_playing_or_will_resume());

        assert!(!PlaybackState::Paused {
            position_secs: 10.0
        }
        .is_playing_or_will_resume());

        assert!(PlaybackState::Seeking {
            target_secs: 20.0,
            resume_playing: true
        }
        .is_playing_or_will_resume());

        assert!(!PlaybackState::Seeking {
            target_secs: 20.0,
            resume_playing: false
        }
        .is_playing_or_will_resume());

        assert!(PlaybackState::Buffering {
            position_secs: 15.0
        }
        .is_playing_or_will_resume());

        assert!(!PlaybackState::Error {
            message: "error".to_string()
        }
        .is_playing_or_will_resume());
    }

    #[test]
    fn seek_during_playback_resumes_when_frame_arrives() {
        let mut player = player();

        player.play();
        player.update_position(44.0);

        // The loop window sends playback back to its start bound
        player.seek(30.0);
        assert!(matches!(
            player.state(),
            PlaybackState::Seeking {
                resume_playing: true,
                ..
            }
        ));

        player.update_position(30.0);
        assert!(player.state().is_playing());
        assert_eq!(player.state().position(), Some(30.0));
    }

    #[test]
    fn chained_seeks_preserve_resume_playing_intent() {
        let mut player = player();

        player.play();
        player.seek(30.0);
        player.seek(45.0);

        assert!(matches!(
            player.state(),
            &PlaybackState::Seeking {
                resume_playing: true,
                ..
            }
        ));

        player.update_position(45.0);
        assert!(player.state().is_playing());
    }

    #[test]
    fn chained_seeks_from_paused_stay_paused() {
        let mut player = player();

        player.seek(10.0);
        player.update_position(10.0);
        assert!(player.state().is_paused());

        player.seek(30.0);
        player.seek(45.0);
        assert!(matches!(
            player.state(),
            &PlaybackState::Seeking {
                resume_playing: false,
                ..
            }
        ));

        player.update_position(45.0);
        assert!(player.state().is_paused());
    }

    #[test]
    fn seek_and_play_always_resumes() {
        let mut player = player();

        // From stopped, entering the loop window
        player.seek_and_play(30.0);
        assert!(matches!(
            player.state(),
            &PlaybackState::Seeking {
                target_secs,
                resume_playing: true,
            } if (target_secs - 30.0).abs() < 0.001
        ));

        player.update_position(30.0);
        assert!(player.state().is_playing());
        assert_eq!(player.state().position(), Some(30.0));
    }

    #[test]
    fn pause_at_holds_the_given_position() {
        let mut player = player();

        player.play();
        player.update_position(119.9);
        player.pause_at(120.0);

        assert!(player.state().is_paused());
        assert_eq!(player.state().position(), Some(120.0));
    }

    #[test]
    fn volume_and_mute_are_stored_without_a_session() {
        let mut player = player();

        player.set_volume(Volume::new(0.3));
        assert!((player.volume().value() - 0.3).abs() < 0.001);

        player.set_muted(true);
        assert!(player.is_muted());

        player.toggle_mute();
        assert!(!player.is_muted());

        assert!(!player.has_audio());
    }
}
