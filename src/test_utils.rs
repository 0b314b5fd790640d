//! Helpers shared by unit tests.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::{
    Value,
    json,
};

use crate::config::I18nSettings;
use crate::document::MemoryDocument;
use crate::engine::LocalizationContext;
use crate::input::source::StaticSource;
use crate::input::translation::TranslationTree;
use crate::location::PageLocation;
use crate::types::Locale;

/// Context for `locale` at `url` with default settings and `translations` as
/// the tree.
///
/// # Panics
/// Invalid URL, locale or translations.
pub(crate) fn context_for(url: &str, locale: &str, translations: Value) -> LocalizationContext {
    context_with_settings(I18nSettings::default(), url, locale, translations)
}

/// # Panics
/// Invalid settings, URL, locale or translations.
pub(crate) fn context_with_settings(
    settings: I18nSettings,
    url: &str,
    locale: &str,
    translations: Value,
) -> LocalizationContext {
    let supported = settings.supported().unwrap();
    let tree = TranslationTree::from_value(translations)
        .unwrap()
        .with_separator(&settings.key_separator);
    LocalizationContext::new(
        Arc::new(settings),
        supported,
        PageLocation::parse(url).unwrap(),
        Locale::parse(locale).unwrap(),
    )
    .with_tree(tree)
}

/// English and Turkish translations for [`sample_document`].
pub(crate) fn sample_source() -> StaticSource {
    StaticSource::new()
        .with_locale(
            Locale::parse("en").unwrap(),
            json!({
                "nav": { "title": "Hello", "languageSwitch": "TR" },
                "meta": { "site": { "title": "Example", "description": "An example site" } }
            }),
        )
        .with_locale(
            Locale::parse("tr").unwrap(),
            json!({
                "nav": { "title": "Merhaba", "languageSwitch": "EN" },
                "meta": { "site": { "title": "Örnek", "description": "Örnek bir site" } }
            }),
        )
}

/// Page with one marked heading, a language switch button and a selector.
pub(crate) fn sample_document() -> MemoryDocument {
    let mut document = MemoryDocument::new().with_title("Example");
    document.push_head("meta", &[("name", "description"), ("content", "Markup default")]);
    document.push_body("h1", &[("data-lang-key", "nav.title")], "Welcome");
    document.push_body("button", &[("class", "nav__lang-switch")], "TR");
    document.push_body("select", &[("class", "nav__lang-select")], "");
    document
}
