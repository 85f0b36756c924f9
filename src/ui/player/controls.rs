// SPDX-License-Identifier: MPL-2.0
//! Playback controls bar.
//!
//! A dark toolbar under the video stage with back navigation, play/pause,
//! the timeline, the position readout, the loop window indicator, and
//! volume controls.

use iced::widget::svg::Svg;
use iced::widget::{button, container, slider, text, tooltip, Row, Text};
use iced::{alignment, Element, Length};

use super::{Message, ViewContext};
use crate::practice::settings::format_secs;
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::{icons, styles, theme};

/// Fine enough that dragging feels continuous.
const TIMELINE_STEP_SECS: f64 = 0.001;

/// Playback facts the bar renders. Built fresh on every view call.
#[derive(Debug, Clone)]
pub struct ControlsState {
    pub is_playing: bool,
    pub position_secs: f64,
    pub duration_secs: f64,
    /// Drag position shown on the timeline instead of the real one.
    pub seek_preview_position: Option<f64>,
    /// Current volume (0.0 to 1.0).
    pub volume: f32,
    pub muted: bool,
    /// Volume controls are hidden for silent media.
    pub has_audio: bool,
    pub loop_start_secs: u32,
    pub loop_end_secs: u32,
}

/// Renders the controls bar.
pub fn view<'a>(state: &ControlsState, ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let icon_size = sizing::ICON_SM;
    let button_height = sizing::BUTTON_HEIGHT;

    let back_button = control_button(
        icons::arrow_left(),
        ctx.i18n.tr("player-back"),
        Message::BackPressed,
        icon_size,
        button_height,
    );

    let (play_icon, play_key) = if state.is_playing {
        (icons::pause(), "player-pause")
    } else {
        (icons::play(), "player-play")
    };
    let play_button = control_button(
        play_icon,
        ctx.i18n.tr(play_key),
        Message::TogglePlayback,
        icon_size,
        button_height,
    );

    // Dragging previews without seeking; the release commits
    let timeline_position = state.seek_preview_position.unwrap_or(state.position_secs);
    let timeline = slider(
        0.0..=state.duration_secs,
        timeline_position,
        Message::SeekPreview,
    )
    .on_release(Message::SeekCommit)
    .width(Length::FillPortion(1))
    .step(TIMELINE_STEP_SECS);

    let time_display = text(format!(
        "{} / {}",
        format_time(state.position_secs),
        format_time(state.duration_secs)
    ))
    .size(typography::BODY_SM);

    // The window bounds use the same M:SS shape as the form fields
    let loop_text = {
        let start = format_secs(state.loop_start_secs);
        let end = format_secs(state.loop_end_secs);
        ctx.i18n.tr_with_args(
            "player-loop-range",
            &[("start", start.as_str()), ("end", end.as_str())],
        )
    };
    let loop_indicator = Row::new()
        .spacing(spacing::XXS)
        .align_y(alignment::Vertical::Center)
        .push(icons::tinted(
            icons::sized(icons::loop_arrows(), icon_size),
            theme::muted_text_color(),
        ))
        .push(
            text(loop_text)
                .size(typography::BODY_SM)
                .style(|_theme| iced::widget::text::Style {
                    color: Some(theme::muted_text_color()),
                }),
        );

    let mut bar = Row::new()
        .spacing(spacing::XS)
        .padding(spacing::XS)
        .align_y(alignment::Vertical::Center)
        .push(back_button)
        .push(play_button)
        .push(timeline)
        .push(time_display)
        .push(loop_indicator);

    if state.has_audio {
        let (volume_icon, volume_key) = if state.muted || state.volume == 0.0 {
            (icons::volume_mute(), "player-unmute")
        } else {
            (icons::volume(), "player-mute")
        };
        let mute_button = control_button(
            volume_icon,
            ctx.i18n.tr(volume_key),
            Message::ToggleMute,
            icon_size,
            button_height,
        );
        let volume_slider = slider(0.0..=1.0, state.volume, Message::VolumeChanged)
            .width(Length::Fixed(sizing::VOLUME_SLIDER_WIDTH))
            .step(0.01);

        bar = bar.push(mute_button).push(volume_slider);
    }

    container(bar)
        .width(Length::Fill)
        .style(styles::container::controls_bar)
        .into()
}

/// One icon button with a tooltip, styled for the dark bar.
fn control_button<'a>(
    icon: Svg<'static>,
    tip: String,
    message: Message,
    icon_size: f32,
    button_height: f32,
) -> Element<'a, Message> {
    let content: Element<'_, Message> = button(icons::tinted(
        icons::sized(icon, icon_size),
        theme::controls_text_color(),
    ))
    .on_press(message)
    .padding(spacing::XS)
    .width(Length::Shrink)
    .height(Length::Fixed(button_height))
    .style(styles::button::control)
    .into();

    tooltip(content, Text::new(tip), tooltip::Position::Top)
        .gap(4)
        .into()
}

/// Formats duration in MM:SS or HH:MM:SS format.
fn format_time(seconds: f64) -> String {
    let total_secs = seconds.max(0.0) as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::fluent::I18n;

    fn controls() -> ControlsState {
        ControlsState {
            is_playing: true,
            position_secs: 32.5,
            duration_secs: 120.0,
            seek_preview_position: None,
            volume: 0.8,
            muted: false,
            has_audio: true,
            loop_start_secs: 30,
            loop_end_secs: 45,
        }
    }

    #[test]
    fn format_time_handles_zero() {
        assert_eq!(format_time(0.0), "00:00");
    }

    #[test]
    fn format_time_handles_minutes() {
        assert_eq!(format_time(125.0), "02:05");
    }

    #[test]
    fn format_time_handles_hours() {
        assert_eq!(format_time(3665.0), "01:01:05");
    }

    #[test]
    fn format_time_clamps_negative_to_zero() {
        assert_eq!(format_time(-10.0), "00:00");
    }

    #[test]
    fn view_renders_with_audio() {
        let i18n = I18n::default();
        let ctx = ViewContext { i18n: &i18n };
        let _element = view(&controls(), &ctx);
    }

    #[test]
    fn view_renders_without_audio() {
        let i18n = I18n::default();
        let ctx = ViewContext { i18n: &i18n };
        let state = ControlsState {
            has_audio: false,
            ..controls()
        };
        let _element = view(&state, &ctx);
    }

    #[test]
    fn view_renders_during_a_seek_drag() {
        let i18n = I18n::default();
        let ctx = ViewContext { i18n: &i18n };
        let state = ControlsState {
            seek_preview_position: Some(70.0),
            ..controls()
        };
        let _element = view(&state, &ctx);
    }
}
