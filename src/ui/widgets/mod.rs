// SPDX-License-Identifier: MPL-2.0
//! Custom Iced widgets.

pub mod video_canvas;

pub use video_canvas::VideoCanvas;
