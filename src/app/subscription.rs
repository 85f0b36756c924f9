// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.

use std::time::Duration;

use iced::{event, time, Subscription};

use super::{Message, Screen};
use crate::ui::notifications::NotificationMessage;

/// The playback subscription of the active session, if one is running.
///
/// The player keys its subscription by session id, so replacing the player
/// state (or leaving the screen) tears the running decode session down.
pub fn playback(screen: &Screen) -> Subscription<Message> {
    match screen {
        Screen::Player(player) => player.subscription().map(Message::Player),
        Screen::Form(_) => Subscription::none(),
    }
}

/// Periodic tick driving notification auto-dismiss.
///
/// Only runs while something is showing, so an idle application performs
/// no timer work.
pub fn notification_tick(has_notifications: bool) -> Subscription<Message> {
    if has_notifications {
        time::every(Duration::from_millis(100))
            .map(|_| Message::Notification(NotificationMessage::Tick))
    } else {
        Subscription::none()
    }
}

/// Intercepts window close requests so playback tears down before exit.
pub fn window_events() -> Subscription<Message> {
    event::listen_with(|event, _status, window_id| match event {
        event::Event::Window(iced::window::Event::CloseRequested) => {
            Some(Message::WindowCloseRequested(window_id))
        }
        _ => None,
    })
}
