// SPDX-License-Identifier: MPL-2.0
//! Shared UI color helpers for the form and player screens.

use crate::ui::design_tokens::palette::{self, BLACK, GRAY_400, GRAY_900, WHITE};
use iced::Color;

/// Background color of the video stage, independent of the app theme.
pub fn stage_background() -> Color {
    BLACK
}

/// Background color of the playback controls bar.
pub fn controls_bar_background() -> Color {
    GRAY_900
}

/// Text and icon color on the controls bar.
pub fn controls_text_color() -> Color {
    WHITE
}

/// Standard color for error text.
pub fn error_text_color() -> Color {
    palette::ERROR_500
}

/// Standard color for muted/secondary text.
pub fn muted_text_color() -> Color {
    GRAY_400
}
