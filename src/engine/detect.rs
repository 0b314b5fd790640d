//! Initial locale detection.

use std::fmt;

use crate::config::{
    I18nSettings,
    SupportedLocales,
};
use crate::location::PageLocation;
use crate::storage::PreferenceStore;
use crate::types::{
    Locale,
    primary_subtag,
};

/// Which rule decided the locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionRule {
    QueryParameter,
    StoredPreference,
    BrowserLanguage,
    Default,
}

impl fmt::Display for DetectionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::QueryParameter => "query parameter",
            Self::StoredPreference => "stored preference",
            Self::BrowserLanguage => "browser language",
            Self::Default => "default",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub locale: Locale,
    pub rule: DetectionRule,
}

/// Decide the initial locale. Never fails.
///
/// Precedence:
/// 1. query parameter, when supported (also persisted)
/// 2. stored preference, when supported
/// 3. browser language primary subtag, when supported
/// 4. configured default
pub fn detect_locale(
    settings: &I18nSettings,
    supported: &SupportedLocales,
    location: &PageLocation,
    preferences: &mut dyn PreferenceStore,
    browser_language: Option<&str>,
) -> Detection {
    if let Some(requested) = location.query_value(&settings.query_parameter)
        && let Some(locale) = supported.find(&requested)
    {
        if let Err(e) = preferences.set(&settings.storage_key, locale.as_str()) {
            tracing::warn!("Failed to persist locale '{}': {}", locale, e);
        }
        return detected(locale.clone(), DetectionRule::QueryParameter);
    }

    if let Some(stored) = preferences.get(&settings.storage_key)
        && let Some(locale) = supported.find(&stored)
    {
        return detected(locale.clone(), DetectionRule::StoredPreference);
    }

    if let Some(language) = browser_language
        && let Some(locale) = supported.find_by_primary_subtag(&primary_subtag(language))
    {
        return detected(locale.clone(), DetectionRule::BrowserLanguage);
    }

    detected(supported.default_locale().clone(), DetectionRule::Default)
}

fn detected(locale: Locale, rule: DetectionRule) -> Detection {
    tracing::debug!(locale = %locale, rule = %rule, "Detected locale");
    Detection { locale, rule }
}
