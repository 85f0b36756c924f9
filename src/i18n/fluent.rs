// SPDX-License-Identifier: MPL-2.0
use crate::config::Config;
use fluent_bundle::{FluentArgs, FluentBundle, FluentResource};
use rust_embed::RustEmbed;
use std::collections::HashMap;
use std::path::Path;
use unic_langid::LanguageIdentifier;

#[derive(RustEmbed)]
#[folder = "assets/i18n/"]
struct Asset;

/// Translation resources live in one directory per locale
/// (`assets/i18n/en-US/main.ftl`); the directory name is the locale.
const RESOURCE_FILE: &str = "main.ftl";

pub struct I18n {
    bundles: HashMap<LanguageIdentifier, FluentBundle<FluentResource>>,
    pub available_locales: Vec<LanguageIdentifier>,
    current_locale: LanguageIdentifier,
}

impl Default for I18n {
    fn default() -> Self {
        Self::new(None, None, &Config::default())
    }
}

impl I18n {
    /// Loads all bundles and picks the current locale.
    ///
    /// When `i18n_dir` is given, `.ftl` files are read from that directory
    /// instead of the embedded assets, so translations can be iterated on
    /// without rebuilding.
    pub fn new(cli_lang: Option<String>, i18n_dir: Option<String>, config: &Config) -> Self {
        let (bundles, available_locales) = match i18n_dir {
            Some(dir) => load_bundles_from_dir(Path::new(&dir)),
            None => load_embedded_bundles(),
        };

        let default_locale: LanguageIdentifier = "en-US".parse().unwrap();
        let current_locale =
            resolve_locale(cli_lang, config, &available_locales).unwrap_or(default_locale);

        Self {
            bundles,
            available_locales,
            current_locale,
        }
    }

    pub fn current_locale(&self) -> &LanguageIdentifier {
        &self.current_locale
    }

    pub fn set_locale(&mut self, locale: LanguageIdentifier) {
        if self.bundles.contains_key(&locale) {
            self.current_locale = locale;
        }
    }

    /// Translates a message key for the current locale.
    pub fn tr(&self, key: &str) -> String {
        self.format(key, None)
    }

    /// Translates a message key with interpolation arguments.
    pub fn tr_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let mut fluent_args = FluentArgs::new();
        for (name, value) in args {
            fluent_args.set(*name, *value);
        }
        self.format(key, Some(&fluent_args))
    }

    fn format(&self, key: &str, args: Option<&FluentArgs>) -> String {
        if let Some(bundle) = self.bundles.get(&self.current_locale) {
            if let Some(msg) = bundle.get_message(key) {
                if let Some(pattern) = msg.value() {
                    let mut errors = vec![];
                    let value = bundle.format_pattern(pattern, args, &mut errors);
                    if errors.is_empty() {
                        return value.to_string();
                    }
                }
            }
        }
        format!("MISSING: {}", key)
    }
}

type Bundles = HashMap<LanguageIdentifier, FluentBundle<FluentResource>>;

fn load_embedded_bundles() -> (Bundles, Vec<LanguageIdentifier>) {
    let mut bundles = HashMap::new();
    let mut available_locales = Vec::new();

    for file in Asset::iter() {
        let path = file.as_ref();
        let Some(locale_str) = path.strip_suffix(&format!("/{}", RESOURCE_FILE)) else {
            continue;
        };
        let Ok(locale) = locale_str.parse::<LanguageIdentifier>() else {
            continue;
        };
        if let Some(content) = Asset::get(path) {
            let source = String::from_utf8_lossy(content.data.as_ref()).to_string();
            // Embedded resources are validated by the bundle tests below.
            let res = FluentResource::try_new(source).expect("Failed to parse embedded FTL file.");
            let mut bundle = FluentBundle::new(vec![locale.clone()]);
            bundle.add_resource(res).expect("Failed to add resource.");
            bundles.insert(locale.clone(), bundle);
            available_locales.push(locale);
        }
    }

    available_locales.sort();
    (bundles, available_locales)
}

fn load_bundles_from_dir(dir: &Path) -> (Bundles, Vec<LanguageIdentifier>) {
    let mut bundles = HashMap::new();
    let mut available_locales = Vec::new();

    let Ok(entries) = std::fs::read_dir(dir) else {
        eprintln!("i18n directory not readable: {}", dir.display());
        return (bundles, available_locales);
    };

    for entry in entries.flatten() {
        let locale_dir = entry.path();
        if !locale_dir.is_dir() {
            continue;
        }
        let Some(name) = locale_dir.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Ok(locale) = name.parse::<LanguageIdentifier>() else {
            continue;
        };
        let resource_path = locale_dir.join(RESOURCE_FILE);
        let Ok(source) = std::fs::read_to_string(&resource_path) else {
            continue;
        };
        match FluentResource::try_new(source) {
            Ok(res) => {
                let mut bundle = FluentBundle::new(vec![locale.clone()]);
                if bundle.add_resource(res).is_ok() {
                    bundles.insert(locale.clone(), bundle);
                    available_locales.push(locale);
                }
            }
            Err(_) => {
                eprintln!("Skipping malformed FTL file: {}", resource_path.display());
            }
        }
    }

    available_locales.sort();
    (bundles, available_locales)
}

fn resolve_locale(
    cli_lang: Option<String>,
    config: &Config,
    available: &[LanguageIdentifier],
) -> Option<LanguageIdentifier> {
    // 1. Check CLI args
    if let Some(lang_str) = cli_lang {
        if let Ok(lang) = lang_str.parse::<LanguageIdentifier>() {
            if available.contains(&lang) {
                return Some(lang);
            }
        }
    }

    // 2. Check config file
    if let Some(lang_str) = &config.general.language {
        if let Ok(lang) = lang_str.parse::<LanguageIdentifier>() {
            if available.contains(&lang) {
                return Some(lang);
            }
        }
    }

    // 3. Check OS locale
    if let Some(os_locale_str) = sys_locale::get_locale() {
        if let Ok(os_lang) = os_locale_str.parse::<LanguageIdentifier>() {
            if available.contains(&os_lang) {
                return Some(os_lang);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use unic_langid::LanguageIdentifier;

    #[test]
    fn resolve_locale_prefers_cli() {
        let mut config = Config::default();
        config.general.language = Some("en-US".to_string());
        let available: Vec<LanguageIdentifier> =
            vec!["en-US".parse().unwrap(), "zh-CN".parse().unwrap()];
        let lang = resolve_locale(Some("zh-CN".to_string()), &config, &available);
        assert_eq!(lang, Some("zh-CN".parse().unwrap()));
    }

    #[test]
    fn resolve_locale_reads_config() {
        let mut config = Config::default();
        config.general.language = Some("zh-CN".to_string());
        let available: Vec<LanguageIdentifier> =
            vec!["en-US".parse().unwrap(), "zh-CN".parse().unwrap()];
        let lang = resolve_locale(None, &config, &available);
        assert_eq!(lang, Some("zh-CN".parse().unwrap()));
    }

    #[test]
    fn resolve_locale_ignores_unavailable_cli_lang() {
        let config = Config::default();
        let available: Vec<LanguageIdentifier> = vec!["en-US".parse().unwrap()];
        let lang = resolve_locale(Some("fr".to_string()), &config, &available);
        // Falls through to config/system, both absent or unavailable here.
        if let Some(l) = lang {
            assert!(available.contains(&l));
        }
    }

    #[test]
    fn embedded_locales_are_present() {
        let i18n = I18n::default();
        assert!(i18n
            .available_locales
            .contains(&"en-US".parse::<LanguageIdentifier>().unwrap()));
        assert!(i18n
            .available_locales
            .contains(&"zh-CN".parse::<LanguageIdentifier>().unwrap()));
    }

    #[test]
    fn tr_returns_translation_for_known_key() {
        let i18n = I18n::default();
        let title = i18n.tr("window-title");
        assert!(!title.starts_with("MISSING:"));
    }

    #[test]
    fn tr_marks_missing_keys() {
        let i18n = I18n::default();
        assert_eq!(
            i18n.tr("definitely-not-a-key"),
            "MISSING: definitely-not-a-key"
        );
    }

    #[test]
    fn tr_with_args_interpolates() {
        let i18n = I18n::default();
        let text = i18n.tr_with_args("player-loop-range", &[("start", "30"), ("end", "45")]);
        assert!(text.contains("30"));
        assert!(text.contains("45"));
    }

    #[test]
    fn set_locale_switches_translations() {
        let mut i18n = I18n::default();
        i18n.set_locale("zh-CN".parse().unwrap());
        assert_eq!(i18n.current_locale().to_string(), "zh-CN");
        let submit = i18n.tr("form-submit");
        assert!(!submit.starts_with("MISSING:"));
    }

    #[test]
    fn set_locale_ignores_unknown_locale() {
        let mut i18n = I18n::default();
        let before = i18n.current_locale().clone();
        i18n.set_locale("xx-XX".parse().unwrap());
        assert_eq!(i18n.current_locale(), &before);
    }

    #[test]
    fn all_locales_share_the_same_key_set() {
        // Every key present in the fallback locale must exist everywhere,
        // so no locale ever shows a MISSING marker the fallback would not.
        let mut i18n = I18n::default();
        let keys = [
            "window-title",
            "form-title",
            "form-media-label",
            "form-media-placeholder",
            "form-browse",
            "form-start-label",
            "form-end-label",
            "form-minutes-placeholder",
            "form-seconds-placeholder",
            "form-submit",
            "form-resolving",
            "error-media-required",
            "error-seconds-too-large",
            "error-range-reversed",
            "player-back",
            "player-play",
            "player-pause",
            "player-mute",
            "player-unmute",
            "player-loading",
            "notification-config-load-error",
            "error-resolve-missing-video-id",
            "error-resolve-request",
            "error-resolve-bad-status",
            "error-resolve-disallowed-extension",
            "error-video-open-failed",
            "error-video-unsupported-codec",
            "error-video-no-video-stream",
            "error-video-decoding-failed",
            "error-video-io",
            "error-video-general",
        ];
        for locale in i18n.available_locales.clone() {
            i18n.set_locale(locale.clone());
            for key in keys {
                assert!(
                    !i18n.tr(key).starts_with("MISSING:"),
                    "key {} missing in {}",
                    key,
                    locale
                );
            }
        }
    }
}
