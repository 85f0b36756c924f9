// SPDX-License-Identifier: MPL-2.0
//! Integration tests to validate style and design token coherence.

#[cfg(test)]
mod tests {
    use iced::Theme;
    use iced_refrain::ui::design_tokens::{opacity, palette, sizing, spacing};
    use iced_refrain::ui::styles::{button, container};
    use iced_refrain::ui::theme;
    use iced_refrain::ui::theming::ThemeMode;

    #[test]
    fn all_button_styles_compile() {
        let theme = Theme::Dark;

        // Smoke-test all button styles compile and are callable
        let _ = button::primary(&theme, iced::widget::button::Status::Active);
        let _ = button::control(&theme, iced::widget::button::Status::Hovered);
        let style_fn = button::overlay(palette::WHITE, 0.5, 0.8);
        let _ = style_fn(&theme, iced::widget::button::Status::Active);
    }

    #[test]
    fn all_container_styles_compile() {
        let theme = Theme::Light;

        let _ = container::panel(&theme);
        let _ = container::stage(&theme);
        let _ = container::controls_bar(&theme);
    }

    #[test]
    fn design_tokens_are_accessible() {
        // Palette
        let _ = palette::PRIMARY_500;
        let _ = palette::WHITE;

        // Spacing
        let _ = spacing::MD;

        // Opacity
        let _ = opacity::OVERLAY_STRONG;

        // Sizing
        let _ = sizing::TIME_FIELD_WIDTH;
    }

    #[test]
    fn theme_modes_map_to_iced_themes() {
        assert!(matches!(ThemeMode::Light.iced_theme(), Theme::Light));
        assert!(matches!(ThemeMode::Dark.iced_theme(), Theme::Dark));
        // System resolves to whichever the OS reports; both are acceptable
        let _ = ThemeMode::System.iced_theme();
    }

    #[test]
    fn stage_colors_keep_text_readable() {
        // The controls bar is dark regardless of theme, so its text color
        // must stay light
        let bar = theme::controls_bar_background();
        let text = theme::controls_text_color();
        assert!(text.r > bar.r);
        assert!(text.g > bar.g);
        assert!(text.b > bar.b);
    }
}
