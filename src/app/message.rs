// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use std::path::PathBuf;

use crate::error::{ResolveError, VideoError};
use crate::media::MediaInfo;
use crate::ui::notifications::NotificationMessage;
use crate::ui::{player, practice_form};

/// Top-level messages consumed by `App::update`. The variants forward
/// screen messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    Form(practice_form::Message),
    Player(player::Message),
    Notification(NotificationMessage),
    /// Result of resolving a platform reference, tagged with the submit
    /// generation so a late completion cannot bind over a newer one.
    MediaResolved {
        generation: u64,
        result: Result<String, ResolveError>,
    },
    /// Result of probing the media source for a session.
    MediaProbed {
        session_id: u64,
        result: Result<MediaInfo, VideoError>,
    },
    /// Result from the open file dialog. `None` means cancelled.
    MediaPicked(Option<PathBuf>),
    /// Window close was requested; playback tears down before exit.
    WindowCloseRequested(iced::window::Id),
}

/// Runtime flags passed in from the CLI to tweak startup behavior.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `zh-CN`, `en-US`).
    pub lang: Option<String>,
    /// Optional media reference pre-filled into the form on startup.
    pub media: Option<String>,
    /// Optional directory containing Fluent `.ftl` files for custom builds.
    pub i18n_dir: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `ICED_REFRAIN_CONFIG_DIR` environment variable.
    pub config_dir: Option<String>,
}
