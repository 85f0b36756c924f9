// SPDX-License-Identifier: MPL-2.0
//! `iced_refrain` is a loop-practice video player built with the Iced GUI
//! framework.
//!
//! A practice session confines playback of one media source to a repeating
//! [start, end) window so a passage can be drilled until it sits. The crate
//! also resolves Bilibili video references to playable stream URLs and
//! demonstrates internationalization with Fluent, user preference
//! management, and modular UI design.

#![doc(html_root_url = "https://docs.rs/iced_refrain/0.1.0")]

pub mod app;
pub mod config;
pub mod error;
pub mod i18n;
pub mod media;
pub mod practice;
pub mod resolver;
pub mod ui;
pub mod video_player;
