// SPDX-License-Identifier: MPL-2.0
//! Top-level screens.

use crate::ui::{player, practice_form};

/// The screen currently shown. Each variant owns its screen's state, so
/// switching away drops the old screen and everything hanging off it,
/// including the player's playback subscription.
#[derive(Debug)]
pub enum Screen {
    /// Practice settings form.
    Form(practice_form::State),
    /// Looping playback session.
    Player(player::State),
}
