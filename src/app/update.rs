// SPDX-License-Identifier: MPL-2.0
//! Update logic and message handlers for the application.
//!
//! Screen messages are forwarded to the owning screen state; the events
//! those states hand back (submit, browse, exit, audio changes) are the
//! side effects handled here because they cross screens or touch the
//! config, the resolver, or the probe.

use iced::{window, Task};

use super::{App, Message, Screen};
use crate::config;
use crate::error::{Error, ResolveError, VideoError};
use crate::media;
use crate::practice::PracticeSettings;
use crate::resolver::{self, Resolver};
use crate::ui::notifications::Notification;
use crate::ui::{player, practice_form};
use crate::video_player::Volume;

pub fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::Form(message) => {
            let Screen::Form(form) = &mut app.screen else {
                return Task::none();
            };
            match form.update(message) {
                practice_form::Event::None => Task::none(),
                practice_form::Event::SubmitRequested {
                    media_reference,
                    start_secs,
                    end_secs,
                } => handle_submit(app, media_reference, start_secs, end_secs),
                practice_form::Event::BrowseRequested => open_media_picker(),
            }
        }
        Message::Player(message) => {
            let Screen::Player(player) = &mut app.screen else {
                return Task::none();
            };
            match player.update(message) {
                player::Event::None => Task::none(),
                player::Event::ExitToForm => {
                    app.screen = Screen::Form(prefilled_form(app));
                    Task::none()
                }
                player::Event::AudioSettingsChanged { volume, muted } => {
                    persist_audio_settings(app, volume, muted)
                }
            }
        }
        Message::MediaResolved { generation, result } => handle_resolved(app, generation, result),
        Message::MediaProbed { session_id, result } => {
            // A result for a torn-down session is dropped on the floor
            if let Screen::Player(player) = &mut app.screen {
                if player.session_id() == session_id {
                    player.media_probed(result);
                }
            }
            Task::none()
        }
        Message::MediaPicked(path) => {
            if let Screen::Form(form) = &mut app.screen {
                form.update(practice_form::Message::MediaPicked(path));
            }
            Task::none()
        }
        Message::Notification(message) => {
            app.notifications.handle_message(&message);
            Task::none()
        }
        Message::WindowCloseRequested(id) => {
            // Dropping the player releases its playback subscription, so
            // the decode threads wind down before the process exits.
            if matches!(app.screen, Screen::Player(_)) {
                app.screen = Screen::Form(prefilled_form(app));
            }
            window::close(id)
        }
    }
}

/// A validated submit. Platform references take a detour through the
/// resolver; everything else binds a session directly.
fn handle_submit(
    app: &mut App,
    media_reference: String,
    start_secs: u32,
    end_secs: u32,
) -> Task<Message> {
    // Retained as typed, pre-resolution, for form pre-population
    app.last_settings = Some(PracticeSettings::new(
        media_reference.clone(),
        start_secs,
        end_secs,
    ));

    if resolver::requires_resolution(&media_reference) {
        app.session_counter += 1;
        let generation = app.session_counter;
        app.pending_resolve = Some(generation);
        if let Screen::Form(form) = &mut app.screen {
            form.set_resolving(true);
        }

        let resolver = Resolver::new(
            app.config.resolver.endpoint_or_default(),
            app.config.resolver.allowed_extensions_or_default(),
        );
        Task::perform(
            async move { resolver.resolve(&media_reference).await },
            move |result| Message::MediaResolved { generation, result },
        )
    } else {
        bind_session(app, media_reference, start_secs, end_secs)
    }
}

/// Applies a resolver completion, unless a newer submit has superseded it.
fn handle_resolved(
    app: &mut App,
    generation: u64,
    result: Result<String, ResolveError>,
) -> Task<Message> {
    if app.pending_resolve != Some(generation) {
        return Task::none();
    }
    app.pending_resolve = None;

    if let Screen::Form(form) = &mut app.screen {
        form.set_resolving(false);
    }

    match result {
        Ok(media_url) => {
            let Some(settings) = app.last_settings.clone() else {
                return Task::none();
            };
            bind_session(app, media_url, settings.start_secs, settings.end_secs)
        }
        Err(error) => {
            app.notifications.push(Notification::error(error.i18n_key()));
            Task::none()
        }
    }
}

/// Switches to the player screen and kicks off the media probe.
///
/// The fresh session id changes the playback subscription identity, which
/// is what tears down a previous session when settings are replaced.
fn bind_session(app: &mut App, media_url: String, start_secs: u32, end_secs: u32) -> Task<Message> {
    app.session_counter += 1;
    let session_id = app.session_counter;

    let settings = PracticeSettings::new(media_url.clone(), start_secs, end_secs);
    let volume = Volume::new(app.config.playback.volume.unwrap_or(config::DEFAULT_VOLUME));
    let muted = app.config.playback.muted.unwrap_or(false);

    // Stale failure toasts from attempts the user has since retried
    app.notifications.clear_errors();
    app.screen = Screen::Player(player::State::new(settings, session_id, volume, muted));

    Task::perform(
        async move {
            // ffmpeg probing blocks, sometimes on the network
            match tokio::task::spawn_blocking(move || media::probe(&media_url)).await {
                Ok(result) => result.map_err(probe_error),
                Err(join_error) => Err(VideoError::Other(join_error.to_string())),
            }
        },
        move |result| Message::MediaProbed { session_id, result },
    )
}

/// The form state to show when returning from the player.
fn prefilled_form(app: &App) -> practice_form::State {
    match &app.last_settings {
        Some(settings) => practice_form::State::prefill(settings),
        None => practice_form::State::new(),
    }
}

/// Writes the changed audio settings back to `settings.toml`.
///
/// Guarded during tests to keep isolation; unit tests assert on the config
/// value instead of the file.
fn persist_audio_settings(app: &mut App, volume: Volume, muted: bool) -> Task<Message> {
    app.config.playback.volume = Some(volume.value());
    app.config.playback.muted = Some(muted);

    if cfg!(test) {
        return Task::none();
    }

    if let Err(error) = config::save(&app.config) {
        eprintln!("Failed to save config: {:?}", error);
    }
    Task::none()
}

/// Opens the native file picker for a local practice video.
fn open_media_picker() -> Task<Message> {
    Task::perform(
        async move {
            rfd::AsyncFileDialog::new()
                .add_filter("Video", media::MEDIA_PICKER_EXTENSIONS)
                .pick_file()
                .await
                .map(|handle| handle.path().to_path_buf())
        },
        Message::MediaPicked,
    )
}

/// Narrows a crate error from the probe down to its video cause.
fn probe_error(error: Error) -> VideoError {
    match error {
        Error::Video(video) => video,
        other => VideoError::Other(other.to_string()),
    }
}
