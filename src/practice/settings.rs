// SPDX-License-Identifier: MPL-2.0
//! Immutable practice settings and minute/second field arithmetic.
//!
//! A `PracticeSettings` value is created on each form submit and handed by
//! value to the playback session. The helpers here implement the rules the
//! form fields follow: two-digit numeric text, empty counts as zero,
//! total = minutes * 60 + seconds, and the 60-modulo split used both for
//! pre-population and for displaying totals like `65` as `1:05`.

/// Maximum characters accepted by a minute/second text field.
pub const TIME_COMPONENT_MAX_LEN: usize = 2;

/// One practice session's worth of settings.
///
/// `media_url` is always directly playable here; platform references are
/// resolved before a session starts. The window bounds are whole seconds,
/// `start_secs <= end_secs` is validated by the form, and the degenerate
/// `start_secs == end_secs` window is allowed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeSettings {
    /// Direct URL or local path of the media to play.
    pub media_url: String,
    /// Inclusive lower bound of the loop window, in seconds.
    pub start_secs: u32,
    /// Upper bound of the loop window, in seconds. The loop triggers at or
    /// after this position.
    pub end_secs: u32,
}

impl PracticeSettings {
    pub fn new(media_url: impl Into<String>, start_secs: u32, end_secs: u32) -> Self {
        Self {
            media_url: media_url.into(),
            start_secs,
            end_secs,
        }
    }
}

/// Applies the time-field input rule: up to two characters, digits only.
///
/// Returns the accepted text. Edits that would leave anything else in the
/// field are ignored and the previous value is kept, matching an input that
/// simply refuses the keystroke.
pub fn sanitize_time_component(previous: &str, proposed: &str) -> String {
    if proposed.len() <= TIME_COMPONENT_MAX_LEN && proposed.chars().all(|c| c.is_ascii_digit()) {
        proposed.to_string()
    } else {
        previous.to_string()
    }
}

/// Parses a sanitized time component. Empty text counts as zero.
pub fn parse_time_component(text: &str) -> u32 {
    text.parse().unwrap_or(0)
}

/// Returns true when a seconds component is usable in a minute/second pair.
pub fn seconds_component_valid(seconds: u32) -> bool {
    seconds < 60
}

/// Combines a minute/second pair into total seconds.
pub fn combine_minutes_seconds(minutes: u32, seconds: u32) -> u32 {
    minutes * 60 + seconds
}

/// Splits total seconds back into the minute/second pair shown in the form.
pub fn split_secs(total: u32) -> (u32, u32) {
    (total / 60, total % 60)
}

/// Formats total seconds as `M:SS` (`65` becomes `1:05`).
pub fn format_secs(total: u32) -> String {
    let (minutes, seconds) = split_secs(total);
    format!("{}:{:02}", minutes, seconds)
}
