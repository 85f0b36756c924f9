// SPDX-License-Identifier: MPL-2.0
//! Practice settings form.
//!
//! This module follows a "state down, messages up" pattern like the player
//! screen. The form collects a media reference (URL, platform link, or local
//! path) and the loop window as minute/second pairs, validates on submit,
//! and emits an [`Event`] for the parent to act on. The parent owns media
//! resolution; while it runs the form shows a busy submit button.

use std::path::PathBuf;

use iced::widget::{button, text, text_input, Column, Container, Row};
use iced::{alignment, Element, Length, Theme};

use crate::practice::settings::{
    combine_minutes_seconds, parse_time_component, sanitize_time_component,
    seconds_component_valid, split_secs, PracticeSettings,
};
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::{styles, theme};

/// Validation failures surfaced inside the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    /// The media field is empty.
    MediaMissing,
    /// A seconds field holds 60 or more.
    SecondsTooLarge,
    /// The start of the window lies after its end.
    RangeReversed,
}

impl FormError {
    /// Returns the i18n key for this error's message.
    pub fn i18n_key(&self) -> &'static str {
        match self {
            FormError::MediaMissing => "error-media-required",
            FormError::SecondsTooLarge => "error-seconds-too-large",
            FormError::RangeReversed => "error-range-reversed",
        }
    }
}

/// Messages emitted by the form widgets.
#[derive(Debug, Clone)]
pub enum Message {
    MediaInputChanged(String),
    StartMinutesChanged(String),
    StartSecondsChanged(String),
    EndMinutesChanged(String),
    EndSecondsChanged(String),
    BrowsePressed,
    /// Result of the file picker. `None` means the dialog was cancelled.
    MediaPicked(Option<PathBuf>),
    Submit,
}

/// Events propagated to the parent application for side effects.
#[derive(Debug, Clone)]
pub enum Event {
    None,
    /// The form validated; resolve the reference and start a session.
    SubmitRequested {
        media_reference: String,
        start_secs: u32,
        end_secs: u32,
    },
    /// Open the native file picker.
    BrowseRequested,
}

/// Contextual data needed to render the form.
pub struct ViewContext<'a> {
    pub i18n: &'a crate::i18n::fluent::I18n,
}

/// Local UI state for the settings form.
#[derive(Debug, Clone, Default)]
pub struct State {
    /// Raw media reference as typed. Trimmed on submit.
    media_input: String,
    start_minutes: String,
    start_seconds: String,
    end_minutes: String,
    end_seconds: String,
    /// Last validation failure, cleared by any edit.
    error: Option<FormError>,
    /// True while the parent resolves a platform reference.
    resolving: bool,
}

impl State {
    /// Creates a blank form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a form pre-populated from an earlier session's settings.
    ///
    /// Seconds render zero-padded to two digits so 65 comes back as 1:05.
    pub fn prefill(settings: &PracticeSettings) -> Self {
        let (start_minutes, start_seconds) = split_secs(settings.start_secs);
        let (end_minutes, end_seconds) = split_secs(settings.end_secs);

        Self {
            media_input: settings.media_url.clone(),
            start_minutes: start_minutes.to_string(),
            start_seconds: format!("{start_seconds:02}"),
            end_minutes: end_minutes.to_string(),
            end_seconds: format!("{end_seconds:02}"),
            error: None,
            resolving: false,
        }
    }

    /// Marks the form busy (or idle again) while the parent resolves.
    pub fn set_resolving(&mut self, resolving: bool) {
        self.resolving = resolving;
        if resolving {
            self.error = None;
        }
    }

    /// Returns the current validation failure, if any.
    pub fn error(&self) -> Option<FormError> {
        self.error
    }

    /// Returns true while a resolution is in flight.
    pub fn is_resolving(&self) -> bool {
        self.resolving
    }

    /// Update the state and emit an [`Event`] for the parent when needed.
    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::MediaInputChanged(value) => {
                self.media_input = value;
                self.error = None;
                Event::None
            }
            Message::StartMinutesChanged(value) => {
                self.start_minutes = sanitize_time_component(&self.start_minutes, &value);
                self.error = None;
                Event::None
            }
            Message::StartSecondsChanged(value) => {
                self.start_seconds = sanitize_time_component(&self.start_seconds, &value);
                self.error = None;
                Event::None
            }
            Message::EndMinutesChanged(value) => {
                self.end_minutes = sanitize_time_component(&self.end_minutes, &value);
                self.error = None;
                Event::None
            }
            Message::EndSecondsChanged(value) => {
                self.end_seconds = sanitize_time_component(&self.end_seconds, &value);
                self.error = None;
                Event::None
            }
            Message::BrowsePressed => Event::BrowseRequested,
            Message::MediaPicked(Some(path)) => {
                self.media_input = path.display().to_string();
                self.error = None;
                Event::None
            }
            Message::MediaPicked(None) => Event::None,
            Message::Submit => self.submit(),
        }
    }

    /// Validates the fields and emits a submit event when they pass.
    fn submit(&mut self) -> Event {
        if self.resolving {
            return Event::None;
        }

        let media_reference = self.media_input.trim().to_string();
        if media_reference.is_empty() {
            self.error = Some(FormError::MediaMissing);
            return Event::None;
        }

        let start_seconds = parse_time_component(&self.start_seconds);
        let end_seconds = parse_time_component(&self.end_seconds);
        if !seconds_component_valid(start_seconds) || !seconds_component_valid(end_seconds) {
            self.error = Some(FormError::SecondsTooLarge);
            return Event::None;
        }

        let start_secs =
            combine_minutes_seconds(parse_time_component(&self.start_minutes), start_seconds);
        let end_secs =
            combine_minutes_seconds(parse_time_component(&self.end_minutes), end_seconds);
        if start_secs > end_secs {
            self.error = Some(FormError::RangeReversed);
            return Event::None;
        }

        self.error = None;
        Event::SubmitRequested {
            media_reference,
            start_secs,
            end_secs,
        }
    }

    /// Render the form, centered in the available space.
    pub fn view<'a>(&'a self, ctx: ViewContext<'a>) -> Element<'a, Message> {
        let title = text(ctx.i18n.tr("form-title")).size(typography::TITLE_MD);

        let media_label = text(ctx.i18n.tr("form-media-label")).size(typography::BODY_SM);
        let media_field = text_input(
            ctx.i18n.tr("form-media-placeholder").as_str(),
            &self.media_input,
        )
        .on_input(Message::MediaInputChanged)
        .on_submit(Message::Submit)
        .padding(8)
        .size(typography::BODY)
        .width(Length::Fill);

        let mut browse = button(text(ctx.i18n.tr("form-browse")).size(typography::BODY))
            .padding([8, 12])
            .style(iced::widget::button::secondary);
        if !self.resolving {
            browse = browse.on_press(Message::BrowsePressed);
        }

        let media_row = Row::new()
            .spacing(spacing::XS)
            .align_y(alignment::Vertical::Center)
            .push(media_field)
            .push(browse);

        let media_section = Column::new()
            .spacing(spacing::XXS)
            .push(media_label)
            .push(media_row);

        let start_row = time_row(
            ctx.i18n.tr("form-start-label"),
            &self.start_minutes,
            &self.start_seconds,
            Message::StartMinutesChanged,
            Message::StartSecondsChanged,
            &ctx,
        );
        let end_row = time_row(
            ctx.i18n.tr("form-end-label"),
            &self.end_minutes,
            &self.end_seconds,
            Message::EndMinutesChanged,
            Message::EndSecondsChanged,
            &ctx,
        );

        let submit_key = if self.resolving {
            "form-resolving"
        } else {
            "form-submit"
        };
        let mut submit = button(text(ctx.i18n.tr(submit_key)).size(typography::BODY_LG))
            .padding(10)
            .width(Length::Fill)
            .style(styles::button::primary);
        if !self.resolving {
            submit = submit.on_press(Message::Submit);
        }

        let mut form = Column::new()
            .spacing(spacing::MD)
            .push(title)
            .push(media_section)
            .push(start_row)
            .push(end_row);

        if let Some(error) = self.error {
            form = form.push(
                text(ctx.i18n.tr(error.i18n_key()))
                    .size(typography::BODY_SM)
                    .style(|_theme: &Theme| iced::widget::text::Style {
                        color: Some(theme::error_text_color()),
                    }),
            );
        }

        form = form.push(submit);

        let card = Container::new(form)
            .width(Length::Fixed(sizing::FORM_WIDTH))
            .padding(spacing::LG)
            .style(styles::container::panel);

        Container::new(card)
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(alignment::Horizontal::Center)
            .align_y(alignment::Vertical::Center)
            .into()
    }
}

/// One labeled minute/second pair.
fn time_row<'a>(
    label: String,
    minutes_value: &str,
    seconds_value: &str,
    on_minutes: fn(String) -> Message,
    on_seconds: fn(String) -> Message,
    ctx: &ViewContext<'a>,
) -> Element<'a, Message> {
    let minutes_input = text_input(
        ctx.i18n.tr("form-minutes-placeholder").as_str(),
        minutes_value,
    )
    .on_input(on_minutes)
    .padding(6)
    .size(typography::BODY)
    .width(Length::Fixed(sizing::TIME_FIELD_WIDTH));

    let seconds_input = text_input(
        ctx.i18n.tr("form-seconds-placeholder").as_str(),
        seconds_value,
    )
    .on_input(on_seconds)
    .padding(6)
    .size(typography::BODY)
    .width(Length::Fixed(sizing::TIME_FIELD_WIDTH));

    Row::new()
        .spacing(spacing::XS)
        .align_y(alignment::Vertical::Center)
        .push(
            Container::new(text(label).size(typography::BODY)).width(Length::Fill),
        )
        .push(minutes_input)
        .push(text(":").size(typography::BODY_LG))
        .push(seconds_input)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_form() -> State {
        let mut form = State::new();
        form.update(Message::MediaInputChanged("video.mp4".into()));
        form
    }

    #[test]
    fn new_form_is_blank() {
        let form = State::new();
        assert!(form.media_input.is_empty());
        assert!(form.start_minutes.is_empty());
        assert!(form.end_seconds.is_empty());
        assert_eq!(form.error(), None);
        assert!(!form.is_resolving());
    }

    #[test]
    fn media_field_accepts_any_text() {
        let mut form = State::new();
        form.update(Message::MediaInputChanged("BV1xx411c7mD".into()));
        assert_eq!(form.media_input, "BV1xx411c7mD");
    }

    #[test]
    fn time_fields_reject_letters() {
        let mut form = State::new();
        form.update(Message::StartMinutesChanged("1".into()));
        form.update(Message::StartMinutesChanged("1a".into()));
        assert_eq!(form.start_minutes, "1");
    }

    #[test]
    fn time_fields_cap_at_two_digits() {
        let mut form = State::new();
        form.update(Message::EndSecondsChanged("59".into()));
        form.update(Message::EndSecondsChanged("599".into()));
        assert_eq!(form.end_seconds, "59");
    }

    #[test]
    fn submit_with_empty_media_reports_missing() {
        let mut form = State::new();
        let event = form.update(Message::Submit);
        assert!(matches!(event, Event::None));
        assert_eq!(form.error(), Some(FormError::MediaMissing));
    }

    #[test]
    fn whitespace_media_counts_as_missing() {
        let mut form = State::new();
        form.update(Message::MediaInputChanged("   ".into()));
        form.update(Message::Submit);
        assert_eq!(form.error(), Some(FormError::MediaMissing));
    }

    #[test]
    fn sixty_seconds_is_rejected() {
        let mut form = filled_form();
        form.update(Message::StartSecondsChanged("60".into()));
        let event = form.update(Message::Submit);
        assert!(matches!(event, Event::None));
        assert_eq!(form.error(), Some(FormError::SecondsTooLarge));
    }

    #[test]
    fn reversed_range_is_rejected() {
        let mut form = filled_form();
        form.update(Message::StartMinutesChanged("2".into()));
        form.update(Message::EndMinutesChanged("1".into()));
        form.update(Message::Submit);
        assert_eq!(form.error(), Some(FormError::RangeReversed));
    }

    #[test]
    fn equal_start_and_end_is_accepted() {
        let mut form = filled_form();
        form.update(Message::StartMinutesChanged("1".into()));
        form.update(Message::EndMinutesChanged("1".into()));

        match form.update(Message::Submit) {
            Event::SubmitRequested {
                start_secs,
                end_secs,
                ..
            } => {
                assert_eq!(start_secs, 60);
                assert_eq!(end_secs, 60);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn submit_combines_minutes_and_seconds() {
        let mut form = filled_form();
        form.update(Message::StartMinutesChanged("1".into()));
        form.update(Message::StartSecondsChanged("5".into()));
        form.update(Message::EndMinutesChanged("2".into()));
        form.update(Message::EndSecondsChanged("10".into()));

        match form.update(Message::Submit) {
            Event::SubmitRequested {
                media_reference,
                start_secs,
                end_secs,
            } => {
                assert_eq!(media_reference, "video.mp4");
                assert_eq!(start_secs, 65);
                assert_eq!(end_secs, 130);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn empty_time_fields_submit_as_zero() {
        let mut form = filled_form();

        match form.update(Message::Submit) {
            Event::SubmitRequested {
                start_secs,
                end_secs,
                ..
            } => {
                assert_eq!(start_secs, 0);
                assert_eq!(end_secs, 0);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn submit_trims_the_media_reference() {
        let mut form = State::new();
        form.update(Message::MediaInputChanged("  video.mp4  ".into()));

        match form.update(Message::Submit) {
            Event::SubmitRequested {
                media_reference, ..
            } => assert_eq!(media_reference, "video.mp4"),
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn editing_a_field_clears_the_error() {
        let mut form = State::new();
        form.update(Message::Submit);
        assert!(form.error().is_some());

        form.update(Message::MediaInputChanged("v".into()));
        assert_eq!(form.error(), None);
    }

    #[test]
    fn browse_press_requests_the_picker() {
        let mut form = State::new();
        let event = form.update(Message::BrowsePressed);
        assert!(matches!(event, Event::BrowseRequested));
    }

    #[test]
    fn picked_file_fills_the_media_field() {
        let mut form = State::new();
        form.update(Message::MediaPicked(Some(PathBuf::from("/tmp/song.mp4"))));
        assert_eq!(form.media_input, "/tmp/song.mp4");
    }

    #[test]
    fn cancelled_picker_keeps_existing_text() {
        let mut form = State::new();
        form.update(Message::MediaInputChanged("typed".into()));
        form.update(Message::MediaPicked(None));
        assert_eq!(form.media_input, "typed");
    }

    #[test]
    fn prefill_splits_the_window_bounds() {
        let settings = PracticeSettings::new("v.mp4", 65, 130);
        let form = State::prefill(&settings);

        assert_eq!(form.media_input, "v.mp4");
        assert_eq!(form.start_minutes, "1");
        assert_eq!(form.start_seconds, "05");
        assert_eq!(form.end_minutes, "2");
        assert_eq!(form.end_seconds, "10");
    }

    #[test]
    fn prefilled_padded_seconds_submit_unchanged() {
        let settings = PracticeSettings::new("v.mp4", 65, 130);
        let mut form = State::prefill(&settings);

        match form.update(Message::Submit) {
            Event::SubmitRequested {
                start_secs,
                end_secs,
                ..
            } => {
                assert_eq!(start_secs, 65);
                assert_eq!(end_secs, 130);
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn submit_is_ignored_while_resolving() {
        let mut form = filled_form();
        form.set_resolving(true);

        let event = form.update(Message::Submit);
        assert!(matches!(event, Event::None));
        assert_eq!(form.error(), None);
    }

    #[test]
    fn resolving_resets_when_resolution_fails() {
        let mut form = filled_form();
        form.set_resolving(true);
        assert!(form.is_resolving());

        form.set_resolving(false);
        assert!(!form.is_resolving());

        assert!(matches!(
            form.update(Message::Submit),
            Event::SubmitRequested { .. }
        ));
    }
}
