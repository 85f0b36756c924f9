// SPDX-License-Identifier: MPL-2.0
use iced_refrain::config::{self, Config, DEFAULT_VOLUME};
use iced_refrain::i18n::fluent::I18n;
use iced_refrain::ui::theming::ThemeMode;
use tempfile::tempdir;

#[test]
fn test_config_round_trip_preserves_settings() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("settings.toml");

    let mut config = Config::default();
    config.general.language = Some("zh-CN".to_string());
    config.general.theme_mode = ThemeMode::Dark;
    config.window.width = Some(1280.0);
    config.window.height = Some(720.0);
    config.playback.volume = Some(0.35);
    config.playback.muted = Some(true);
    config.resolver.endpoint = Some("http://localhost:9000/api".to_string());
    config.resolver.allowed_extensions = Some(vec!["mp4".to_string()]);

    config::save_to_path(&config, &path).expect("Failed to write config file");
    let loaded = config::load_from_path(&path).expect("Failed to load config from path");

    assert_eq!(loaded, config);

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn test_language_change_via_config() {
    // Create a temporary directory for the config file
    let dir = tempdir().expect("Failed to create temporary directory");
    let temp_config_file_path = dir.path().join("settings.toml");

    // 1. Initial config: en-US
    let mut initial_config = Config::default();
    initial_config.general.language = Some("en-US".to_string());
    config::save_to_path(&initial_config, &temp_config_file_path)
        .expect("Failed to write initial config file");

    // Load i18n with initial config
    let loaded_initial_config = config::load_from_path(&temp_config_file_path)
        .expect("Failed to load initial config from path");
    let i18n_en = I18n::new(None, None, &loaded_initial_config);
    assert_eq!(i18n_en.current_locale().to_string(), "en-US");

    // 2. Change config to zh-CN
    let mut chinese_config = Config::default();
    chinese_config.general.language = Some("zh-CN".to_string());
    config::save_to_path(&chinese_config, &temp_config_file_path)
        .expect("Failed to write chinese config file");

    // Load i18n with chinese config
    let loaded_chinese_config = config::load_from_path(&temp_config_file_path)
        .expect("Failed to load chinese config from path");
    let i18n_zh = I18n::new(None, None, &loaded_chinese_config);
    assert_eq!(i18n_zh.current_locale().to_string(), "zh-CN");
    assert_eq!(i18n_zh.tr("form-submit"), "开始练习");

    // Clean up temporary directory
    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn test_cli_language_beats_config_language() {
    let mut config = Config::default();
    config.general.language = Some("en-US".to_string());

    let i18n = I18n::new(Some("zh-CN".to_string()), None, &config);
    assert_eq!(i18n.current_locale().to_string(), "zh-CN");
}

#[test]
fn test_partial_config_file_fills_defaults() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("settings.toml");

    std::fs::write(&path, "[general]\nlanguage = \"zh-CN\"\n")
        .expect("Failed to write partial config file");

    let loaded = config::load_from_path(&path).expect("Failed to load partial config");
    assert_eq!(loaded.general.language.as_deref(), Some("zh-CN"));
    assert_eq!(loaded.playback.volume, Some(DEFAULT_VOLUME));
    assert_eq!(
        loaded.window_size(),
        (config::DEFAULT_WINDOW_WIDTH, config::DEFAULT_WINDOW_HEIGHT)
    );
    assert_eq!(
        loaded.resolver.endpoint_or_default(),
        config::DEFAULT_RESOLVER_ENDPOINT
    );

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn test_malformed_config_reports_a_warning() {
    let dir = tempdir().expect("Failed to create temporary directory");
    std::fs::write(dir.path().join("settings.toml"), "not valid toml [[[")
        .expect("Failed to write malformed config file");

    let (config, warning) = config::load_with_override(Some(dir.path().to_path_buf()));

    assert_eq!(config, Config::default());
    assert_eq!(warning.as_deref(), Some("notification-config-load-error"));

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn test_missing_config_file_is_not_a_warning() {
    let dir = tempdir().expect("Failed to create temporary directory");

    let (config, warning) = config::load_with_override(Some(dir.path().to_path_buf()));

    assert_eq!(config, Config::default());
    assert_eq!(warning, None);

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn test_save_with_override_round_trips() {
    let dir = tempdir().expect("Failed to create temporary directory");

    let mut config = Config::default();
    config.playback.volume = Some(0.5);
    config.playback.muted = Some(true);
    config::save_with_override(&config, Some(dir.path().to_path_buf()))
        .expect("Failed to save config with override");

    let (loaded, warning) = config::load_with_override(Some(dir.path().to_path_buf()));
    assert_eq!(warning, None);
    assert_eq!(loaded.playback.volume, Some(0.5));
    assert_eq!(loaded.playback.muted, Some(true));

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn test_i18n_dir_override_loads_external_catalogue() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let locale_dir = dir.path().join("eo");
    std::fs::create_dir_all(&locale_dir).expect("Failed to create locale directory");
    std::fs::write(locale_dir.join("main.ftl"), "window-title = Refrena Ekzercilo\n")
        .expect("Failed to write external FTL file");

    let i18n = I18n::new(
        Some("eo".to_string()),
        Some(dir.path().to_string_lossy().into_owned()),
        &Config::default(),
    );

    assert_eq!(i18n.current_locale().to_string(), "eo");
    assert_eq!(i18n.tr("window-title"), "Refrena Ekzercilo");

    dir.close().expect("Failed to close temporary directory");
}
