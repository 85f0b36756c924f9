// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.
//!
//! Renders the active screen and stacks the toast overlay on top of it.

use iced::widget::Stack;
use iced::Element;

use super::{Message, Screen};
use crate::i18n::fluent::I18n;
use crate::ui::notifications::{Manager, Toast};
use crate::ui::{player, practice_form};

/// Context required to render the application view.
pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub screen: &'a Screen,
    pub notifications: &'a Manager,
}

/// Renders the current application view based on the active screen.
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let screen: Element<'_, Message> = match ctx.screen {
        Screen::Form(form) => form
            .view(practice_form::ViewContext { i18n: ctx.i18n })
            .map(Message::Form),
        Screen::Player(player) => player
            .view(player::ViewContext { i18n: ctx.i18n })
            .map(Message::Player),
    };

    if ctx.notifications.has_notifications() {
        Stack::new()
            .push(screen)
            .push(Toast::view_overlay(ctx.notifications, ctx.i18n).map(Message::Notification))
            .into()
    } else {
        screen
    }
}
