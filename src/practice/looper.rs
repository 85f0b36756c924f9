// SPDX-License-Identifier: MPL-2.0
//! Loop window enforcement.
//!
//! The window is enforced purely by reacting to position-update
//! notifications: whenever the reported position reaches or passes the end
//! bound, playback is sent back to the start bound. There is no polling and
//! no timer; a degenerate window (start == end) therefore re-seeks on every
//! update past the bound without ever busy-looping.
//!
//! `LoopWindow` only makes the decision. The player session owns the
//! subscription to position updates and performs the actual seeks, so
//! releasing that subscription is what stops enforcement.

use super::settings::PracticeSettings;

/// The [start, end) window one session is confined to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopWindow {
    start_secs: u32,
    end_secs: u32,
}

impl LoopWindow {
    pub fn new(settings: &PracticeSettings) -> Self {
        Self {
            start_secs: settings.start_secs,
            end_secs: settings.end_secs,
        }
    }

    pub fn from_bounds(start_secs: u32, end_secs: u32) -> Self {
        Self {
            start_secs,
            end_secs,
        }
    }

    pub fn start_secs(&self) -> u32 {
        self.start_secs
    }

    pub fn end_secs(&self) -> u32 {
        self.end_secs
    }

    /// Position a fresh session seeks to before playback begins.
    pub fn start_position(&self) -> f64 {
        f64::from(self.start_secs)
    }

    /// Decides whether a position update requires a corrective seek.
    ///
    /// Returns the seek target (the start bound) when `position_secs` has
    /// reached or passed the end bound, `None` otherwise. Seeking during
    /// active playback does not stop it, so the caller issues the seek and
    /// nothing else.
    pub fn seek_back_target(&self, position_secs: f64) -> Option<f64> {
        if position_secs >= f64::from(self.end_secs) {
            Some(self.start_position())
        } else {
            None
        }
    }
}
