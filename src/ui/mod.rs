// SPDX-License-Identifier: MPL-2.0
//! User interface components and state management.
//!
//! This module organizes all UI-related code following a component-based
//! architecture with the Elm-style "state down, messages up" pattern.
//!
//! # Screens
//!
//! - [`practice_form`] - Settings form: media reference and loop window
//! - [`player`] - Looping video player for one practice session
//!
//! # Shared Infrastructure
//!
//! - [`widgets`] - Custom Iced widgets (video canvas)
//! - [`styles`] - Centralized styling (buttons, containers)
//! - [`design_tokens`] - Design system constants (colors, spacing, sizing)
//! - [`theme`] - Theme colors and styling helpers
//! - [`theming`] - Light/Dark/System theme mode management
//! - [`icons`] - SVG icon loading and rendering
//! - [`notifications`] - Toast notification system for user feedback

pub mod design_tokens;
pub mod icons;
pub mod notifications;
pub mod player;
pub mod practice_form;
pub mod styles;
pub mod theme;
pub mod theming;
pub mod widgets;
