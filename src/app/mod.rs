// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration between the two screens.
//!
//! `App` wires the practice form, the resolver, and the looping player
//! together and owns what outlives a screen switch: the loaded config,
//! localization, toast notifications, and the last submitted settings used
//! to pre-populate the form. Session identity (the counter behind
//! subscription teardown) lives here so it is easy to audit which submit
//! owns which playback stream.

mod message;
pub mod paths;
mod screen;
mod subscription;
mod update;
mod view;

pub use message::{Flags, Message};
pub use screen::Screen;

use std::fmt;

use iced::{window, Element, Subscription, Task, Theme};

use crate::config::{self, Config};
use crate::i18n::fluent::I18n;
use crate::practice::PracticeSettings;
use crate::ui::notifications;
use crate::ui::practice_form;

pub const MIN_WINDOW_WIDTH: f32 = 640.0;
pub const MIN_WINDOW_HEIGHT: f32 = 480.0;

/// Root Iced application state bridging the form and player screens,
/// localization, and persisted preferences.
pub struct App {
    pub i18n: I18n,
    screen: Screen,
    config: Config,
    /// Toast notification manager for user feedback.
    notifications: notifications::Manager,
    /// Monotonic counter behind resolve generations and session ids.
    session_counter: u64,
    /// Generation of the in-flight resolver call, if any.
    pending_resolve: Option<u64>,
    /// Last submitted settings, pre-resolution, for form pre-population.
    last_settings: Option<PracticeSettings>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("session_counter", &self.session_counter)
            .finish()
    }
}

/// Builds the window settings from the configured size.
///
/// Close requests are intercepted instead of auto-exiting so playback can
/// tear down first.
pub fn window_settings(size: (f32, f32)) -> window::Settings {
    window::Settings {
        size: iced::Size::new(size.0, size.1),
        min_size: Some(iced::Size::new(MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT)),
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    paths::init_cli_overrides(flags.config_dir.clone());

    // The window is sized before boot, so peek at the config here
    let (config, _) = config::load();

    // Wrap flags in RefCell<Option<_>> to satisfy Fn trait requirement
    // while only consuming flags once (iced 0.14 requires Fn, not FnOnce)
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state
            .borrow_mut()
            .take()
            .expect("Boot function called more than once");
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings(config.window_size()))
        .subscription(App::subscription)
        .run()
}

impl Default for App {
    fn default() -> Self {
        Self {
            i18n: I18n::default(),
            screen: Screen::Form(practice_form::State::new()),
            config: Config::default(),
            notifications: notifications::Manager::new(),
            session_counter: 0,
            pending_resolve: None,
            last_settings: None,
        }
    }
}

impl App {
    /// Initializes application state from `Flags` received from the CLI.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let (config, config_warning) = config::load();
        let i18n = I18n::new(flags.lang.clone(), flags.i18n_dir.clone(), &config);

        let mut app = App {
            i18n,
            config,
            ..Self::default()
        };

        if let Some(key) = config_warning {
            app.notifications
                .push(notifications::Notification::warning(&key));
        }

        // A reference on the command line lands in the form, ready to submit
        if let Some(reference) = flags.media {
            if let Screen::Form(form) = &mut app.screen {
                form.update(practice_form::Message::MediaInputChanged(reference));
            }
        }

        (app, Task::none())
    }

    fn title(&self) -> String {
        self.i18n.tr("window-title")
    }

    fn theme(&self) -> Theme {
        self.config.general.theme_mode.iced_theme()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            subscription::playback(&self.screen),
            subscription::notification_tick(self.notifications.has_notifications()),
            subscription::window_events(),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        update::update(self, message)
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(view::ViewContext {
            i18n: &self.i18n,
            screen: &self.screen,
            notifications: &self.notifications,
        })
    }
}
