// SPDX-License-Identifier: MPL-2.0
//! Practice session domain types.
//!
//! A practice session confines playback of one media source to a
//! [start, end) window so a passage can be repeated indefinitely.
//! [`settings`] holds the immutable per-session values and the
//! minute/second arithmetic behind the form fields; [`looper`] holds the
//! window-enforcement decision applied on every position update.

pub mod looper;
pub mod settings;

pub use looper::LoopWindow;
pub use settings::PracticeSettings;
