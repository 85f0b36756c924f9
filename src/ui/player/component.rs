// SPDX-License-Identifier: MPL-2.0
//! Constructor and view for the player screen.

use iced::widget::{button, text, Column, Container};
use iced::{alignment, Element, Length};

use super::{controls, Message, State};
use crate::practice::{LoopWindow, PracticeSettings};
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::widgets::VideoCanvas;
use crate::ui::{icons, styles, theme};
use crate::video_player::Volume;

/// Contextual data needed to render the player view.
pub struct ViewContext<'a> {
    pub i18n: &'a crate::i18n::fluent::I18n,
}

impl State {
    /// Creates the state for a fresh practice session.
    ///
    /// The player itself appears later, when the probe result arrives
    /// through [`State::media_probed`].
    pub fn new(settings: PracticeSettings, session_id: u64, volume: Volume, muted: bool) -> Self {
        let window = LoopWindow::new(&settings);
        Self {
            settings,
            window,
            session_id,
            player: None,
            canvas: VideoCanvas::new(),
            media_info: None,
            seek_preview: None,
            error: None,
            initial_volume: volume,
            initial_muted: muted,
        }
    }

    /// Render the player view.
    pub fn view<'a>(&'a self, ctx: ViewContext<'a>) -> Element<'a, Message> {
        if let Some(key) = self.error_i18n_key() {
            return error_view(ctx.i18n.tr(key), &ctx);
        }

        let Some(player) = &self.player else {
            return loading_view(&ctx);
        };

        let stage = Container::new(self.canvas.view())
            .width(Length::Fill)
            .height(Length::Fill)
            .style(styles::container::stage);

        let bar_state = controls::ControlsState {
            is_playing: player.is_playing(),
            position_secs: player.state().position().unwrap_or(0.0),
            duration_secs: player.duration_secs(),
            seek_preview_position: self.seek_preview,
            volume: player.volume().value(),
            muted: player.is_muted(),
            has_audio: self.media_info.is_some_and(|info| info.has_audio),
            loop_start_secs: self.window.start_secs(),
            loop_end_secs: self.window.end_secs(),
        };

        Column::new()
            .push(stage)
            .push(controls::view(&bar_state, &ctx))
            .into()
    }
}

/// Full-screen holding view shown while the probe runs.
fn loading_view<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let content = Column::new()
        .spacing(spacing::MD)
        .align_x(alignment::Horizontal::Center)
        .push(
            text(ctx.i18n.tr("player-loading"))
                .size(typography::BODY_LG)
                .style(|_theme| iced::widget::text::Style {
                    color: Some(theme::controls_text_color()),
                }),
        )
        .push(back_button(ctx));

    centered_stage(content)
}

/// Full-screen failure view with a way back to the form.
fn error_view<'a>(message: String, ctx: &ViewContext<'a>) -> Element<'a, Message> {
    let content = Column::new()
        .spacing(spacing::MD)
        .align_x(alignment::Horizontal::Center)
        .push(icons::tinted(
            icons::sized(icons::warning(), sizing::ICON_LG),
            theme::error_text_color(),
        ))
        .push(
            text(message)
                .size(typography::BODY_LG)
                .style(|_theme| iced::widget::text::Style {
                    color: Some(theme::error_text_color()),
                }),
        )
        .push(back_button(ctx));

    centered_stage(content)
}

fn back_button<'a>(ctx: &ViewContext<'a>) -> Element<'a, Message> {
    button(text(ctx.i18n.tr("player-back")).size(typography::BODY))
        .on_press(Message::BackPressed)
        .padding([8, 16])
        .style(styles::button::primary)
        .into()
}

fn centered_stage<'a>(content: Column<'a, Message>) -> Element<'a, Message> {
    Container::new(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Center)
        .align_y(alignment::Vertical::Center)
        .style(styles::container::stage)
        .into()
}
