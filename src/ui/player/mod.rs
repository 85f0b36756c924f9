// SPDX-License-Identifier: MPL-2.0
//! Looping player screen.
//!
//! This module follows a "state down, messages up" pattern like the settings
//! form. One `State` is one practice session: it owns the loop window, the
//! playback state machine, and the frame canvas, and reacts to the playback
//! subscription keyed by its session id. Replacing the state (new submit) or
//! dropping it (back to the form) changes the subscription identity, which
//! tears the running decode session down.
//!
//! The loop window is enforced here, on frame position updates only: when a
//! frame's timestamp reaches or passes the end bound, the player seeks back
//! to the start bound and playback continues.

use iced::Subscription;

use crate::error::VideoError;
use crate::media::MediaInfo;
use crate::practice::{LoopWindow, PracticeSettings};
use crate::ui::widgets::VideoCanvas;
use crate::video_player::{
    video_playback, PlaybackMessage, PlaybackSessionId, VideoPlayer, Volume,
};

mod component;
mod controls;

pub use component::ViewContext;

/// Messages emitted by the player screen widgets and subscription.
#[derive(Debug, Clone)]
pub enum Message {
    /// Event from the playback subscription.
    Playback(PlaybackMessage),
    /// Play/pause button pressed.
    TogglePlayback,
    /// Timeline slider dragged; visual preview only, no seek yet.
    SeekPreview(f64),
    /// Timeline slider released; seek to the previewed position.
    SeekCommit,
    /// Mute button pressed.
    ToggleMute,
    /// Volume slider moved (0.0 to 1.0).
    VolumeChanged(f32),
    /// Back button pressed.
    BackPressed,
}

/// Events propagated to the parent application for side effects.
#[derive(Debug, Clone)]
pub enum Event {
    None,
    /// Leave the session and return to the settings form.
    ExitToForm,
    /// Volume or mute changed; the parent persists them.
    AudioSettingsChanged { volume: Volume, muted: bool },
}

/// Local UI state for one practice session.
pub struct State {
    /// The submitted settings this session plays.
    settings: PracticeSettings,
    /// Loop window derived from the settings.
    window: LoopWindow,
    /// Identity of this session's playback subscription.
    session_id: u64,
    /// Playback state machine. Created once the probe reports a duration.
    player: Option<VideoPlayer>,
    /// Frame display surface.
    canvas: VideoCanvas<Message>,
    /// Container metadata from the pre-session probe.
    media_info: Option<MediaInfo>,
    /// Timeline position while the slider is being dragged.
    seek_preview: Option<f64>,
    /// Probe failure. Playback failures live in the player state instead.
    error: Option<VideoError>,
    /// Audio settings applied when the player is created.
    initial_volume: Volume,
    initial_muted: bool,
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("settings", &self.settings)
            .field("session_id", &self.session_id)
            .field("media_info", &self.media_info)
            .field("error", &self.error)
            .finish()
    }
}

impl State {
    /// Returns the settings this session was started with.
    pub fn settings(&self) -> &PracticeSettings {
        &self.settings
    }

    /// Returns the identity of this session.
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Container metadata from the probe, once it has arrived.
    pub fn media_info(&self) -> Option<MediaInfo> {
        self.media_info
    }

    /// Stores the probe result, creating the player on success.
    pub fn media_probed(&mut self, result: Result<MediaInfo, VideoError>) {
        match result {
            Ok(info) => {
                self.media_info = Some(info);
                self.player = Some(VideoPlayer::new(
                    info.duration_secs,
                    self.initial_volume,
                    self.initial_muted,
                ));
            }
            Err(error) => {
                self.error = Some(error);
            }
        }
    }

    /// The playback subscription for this session.
    ///
    /// Returns no subscription until the probe has succeeded, and drops it
    /// again after a playback error so the decode threads wind down. The
    /// volume arguments only seed the audio output; later changes ride the
    /// session's control channel without restarting it.
    pub fn subscription(&self) -> Subscription<Message> {
        match (&self.media_info, &self.player) {
            (Some(info), Some(player)) if !player.is_error() => video_playback(
                self.settings.media_url.clone(),
                PlaybackSessionId(self.session_id),
                player.volume(),
                player.is_muted(),
                info.has_audio,
            )
            .map(Message::Playback),
            _ => Subscription::none(),
        }
    }

    /// Update the state and emit an [`Event`] for the parent when needed.
    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::Playback(playback) => {
                self.handle_playback(playback);
                Event::None
            }
            Message::TogglePlayback => {
                self.toggle_playback();
                Event::None
            }
            Message::SeekPreview(position) => {
                self.seek_preview = Some(position);
                Event::None
            }
            Message::SeekCommit => {
                if let Some(target) = self.seek_preview.take() {
                    if let Some(player) = &mut self.player {
                        player.seek(target);
                    }
                }
                Event::None
            }
            Message::ToggleMute => {
                if let Some(player) = &mut self.player {
                    player.toggle_mute();
                    return Event::AudioSettingsChanged {
                        volume: player.volume(),
                        muted: player.is_muted(),
                    };
                }
                Event::None
            }
            Message::VolumeChanged(value) => {
                if let Some(player) = &mut self.player {
                    player.set_volume(Volume::new(value));
                    return Event::AudioSettingsChanged {
                        volume: player.volume(),
                        muted: player.is_muted(),
                    };
                }
                Event::None
            }
            Message::BackPressed => Event::ExitToForm,
        }
    }

    fn handle_playback(&mut self, message: PlaybackMessage) {
        let Some(player) = &mut self.player else {
            return;
        };

        match message {
            PlaybackMessage::Started(sender) => {
                player.set_command_sender(sender);
                // Every session begins at the window start, playing
                player.seek_and_play(self.window.start_position());
            }
            PlaybackMessage::FrameReady {
                rgba_data,
                width,
                height,
                pts_secs,
            } => {
                self.canvas.set_frame(rgba_data, width, height);
                player.update_position(pts_secs);
                if let Some(target) = self.window.seek_back_target(pts_secs) {
                    player.seek(target);
                }
            }
            PlaybackMessage::Buffering => {
                let position = player
                    .state()
                    .position()
                    .unwrap_or_else(|| self.window.start_position());
                player.set_buffering(position);
            }
            PlaybackMessage::EndOfStream => {
                // The stream ran out before a frame at or past the end bound
                // arrived. When the media end lies inside the window rule,
                // restart; otherwise the window reaches beyond the media and
                // playback parks at its end.
                let end_guess = if player.duration_secs() > 0.0 {
                    player.duration_secs()
                } else {
                    player
                        .state()
                        .position()
                        .unwrap_or_else(|| self.window.start_position())
                };

                if self.window.seek_back_target(end_guess).is_some() {
                    player.seek_and_play(self.window.start_position());
                } else {
                    player.pause_at(end_guess);
                }
            }
            PlaybackMessage::Error(message) => {
                // The error view replaces the stage; drop the stale frame
                self.canvas.clear();
                player.set_error(message);
            }
        }
    }

    fn toggle_playback(&mut self) {
        let Some(player) = &mut self.player else {
            return;
        };

        // Resuming from a stop at the media's end restarts the window
        // instead of bouncing off the end of the stream again.
        let position = player.state().position();
        let past_window_end =
            position.is_some_and(|p| self.window.seek_back_target(p).is_some());
        let at_media_end = position
            .is_some_and(|p| player.duration_secs() > 0.0 && p >= player.duration_secs());

        if player.is_paused() && (past_window_end || at_media_end) {
            player.seek_and_play(self.window.start_position());
        } else {
            player.toggle_playback();
        }
    }

    /// The i18n key describing the current failure, if any.
    fn error_i18n_key(&self) -> Option<&'static str> {
        if let Some(error) = &self.error {
            return Some(error.i18n_key());
        }
        if let Some(player) = &self.player {
            if let Some(message) = player.state().error_message() {
                return Some(VideoError::from_message(message).i18n_key());
            }
        }
        None
    }
}
