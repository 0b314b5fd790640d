use std::collections::{
    BTreeMap,
    HashSet,
};

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::types::Locale;

/// Placeholder substituted with the locale code in `translationPath`.
pub const LOCALE_PLACEHOLDER: &str = "{locale}";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "supportedLocales[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct I18nSettings {
    /// Locales the site ships translations for.
    pub supported_locales: Vec<String>,
    /// Used when no query parameter, stored preference or browser language matches.
    pub default_locale: String,

    /// URL query parameter that forces a locale (`?lang=tr`).
    pub query_parameter: String,
    /// Key under which the chosen locale is persisted.
    pub storage_key: String,
    /// Attribute whose value is the translation key of an element.
    pub marker_attribute: String,
    pub key_separator: String,

    /// Per-locale translation resource, relative to the site root or base URL.
    pub translation_path: String,
    pub translation_files: TranslationFilesConfig,

    pub controls: ControlsConfig,
    pub structured_data: StructuredDataConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationFilesConfig {
    /// Glob used to discover translation files under the site root.
    pub file_pattern: String,
}

impl Default for TranslationFilesConfig {
    fn default() -> Self {
        Self { file_pattern: "lang/*.json".to_string() }
    }
}

/// Language switch widgets kept in sync with the current locale.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlsConfig {
    pub switch_button_class: String,
    /// Translation key for the switch button label.
    pub switch_label_key: String,
    pub select_class: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            switch_button_class: "nav__lang-switch".to_string(),
            switch_label_key: "nav.languageSwitch".to_string(),
            select_class: "nav__lang-select".to_string(),
        }
    }
}

/// Site identity used for JSON-LD emission.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredDataConfig {
    pub enabled: bool,
    pub organization: OrganizationConfig,
    /// Locale code → `inLanguage` tag (e.g. `tr` → `tr-TR`).
    pub language_tags: BTreeMap<String, String>,
    /// Path (with `{search_term_string}`) targeted by the site search action.
    pub search_path: String,
    pub product: Option<ProductConfig>,
    pub blog_topics: Vec<String>,
    pub articles: Vec<ArticleConfig>,
    /// Publication date used for articles without one.
    pub fallback_article_date: String,
}

impl Default for StructuredDataConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            organization: OrganizationConfig::default(),
            language_tags: BTreeMap::from([
                ("en".to_string(), "en-US".to_string()),
                ("tr".to_string(), "tr-TR".to_string()),
            ]),
            search_path: "/articles.html?search={search_term_string}".to_string(),
            product: None,
            blog_topics: Vec::new(),
            articles: Vec::new(),
            fallback_article_date: "2024-12-01".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationConfig {
    pub name: String,
    pub alternate_name: Option<String>,
    pub logo_path: String,
    pub founding_date: Option<String>,
    pub founders: Vec<PersonConfig>,
    pub contact_email: Option<String>,
    pub contact_type: String,
    pub available_languages: Vec<String>,
    pub same_as: Vec<String>,
    pub industry: Option<String>,
    pub speciality: Option<String>,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            alternate_name: None,
            logo_path: "/images/logo.svg".to_string(),
            founding_date: None,
            founders: Vec::new(),
            contact_email: None,
            contact_type: "customer service".to_string(),
            available_languages: Vec::new(),
            same_as: Vec::new(),
            industry: None,
            speciality: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonConfig {
    pub name: String,
    pub same_as: Vec<String>,
}

/// Software product advertised on the home page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductConfig {
    /// Segment of `products.<id>.description` in the translation tree.
    pub id: String,
    pub name: String,
    pub application_category: String,
    pub operating_systems: Vec<String>,
    pub download_url: Option<String>,
    pub code_repository: Option<String>,
    pub programming_language: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    pub features: Vec<String>,
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArticleConfig {
    pub slug: String,
    pub date_published: Option<String>,
    pub date_modified: Option<String>,
    pub about: Vec<String>,
}

/// Validated locale configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLocales {
    locales: Vec<Locale>,
    default: Locale,
}

impl SupportedLocales {
    /// # Errors
    /// Returns the validation error when the default is not in `locales`.
    pub fn new(locales: Vec<Locale>, default: Locale) -> Result<Self, ValidationError> {
        if !locales.contains(&default) {
            return Err(ValidationError::new(
                "defaultLocale",
                format!("Default locale '{default}' must be one of the supported locales"),
            ));
        }
        Ok(Self { locales, default })
    }

    #[must_use]
    pub fn contains(&self, locale: &Locale) -> bool {
        self.locales.contains(locale)
    }

    /// Looks up a supported locale by its exact code.
    #[must_use]
    pub fn find(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| locale.as_str() == code.trim())
    }

    /// Looks up a supported locale whose code equals the primary subtag.
    #[must_use]
    pub fn find_by_primary_subtag(&self, subtag: &str) -> Option<&Locale> {
        if subtag.is_empty() {
            return None;
        }
        self.locales.iter().find(|locale| locale.as_str().eq_ignore_ascii_case(subtag))
    }

    #[must_use]
    pub const fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn iter(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.locales.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}

impl I18nSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid locale code
    /// - Default locale not supported
    /// - Invalid glob pattern
    /// - Translation path without `{locale}`
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.supported_locales.is_empty() {
            errors.push(ValidationError::new(
                "supportedLocales",
                "At least one locale is required. Example: [\"en\", \"tr\"]",
            ));
        }

        let mut seen = HashSet::new();
        for (index, code) in self.supported_locales.iter().enumerate() {
            if let Err(e) = Locale::parse(code) {
                errors.push(ValidationError::new(
                    format!("supportedLocales[{index}]"),
                    format!("Invalid locale code: {e}"),
                ));
            } else if !seen.insert(code.trim()) {
                errors.push(ValidationError::new(
                    format!("supportedLocales[{index}]"),
                    format!("Locale '{code}' is listed more than once"),
                ));
            }
        }

        match Locale::parse(&self.default_locale) {
            Err(e) => {
                errors.push(ValidationError::new(
                    "defaultLocale",
                    format!("Invalid locale code: {e}"),
                ));
            }
            Ok(default) => {
                if !self.supported_locales.iter().any(|code| code.trim() == default.as_str()) {
                    errors.push(ValidationError::new(
                        "defaultLocale",
                        format!("Default locale '{default}' must be one of the supported locales"),
                    ));
                }
            }
        }

        for (field, value) in [
            ("queryParameter", &self.query_parameter),
            ("storageKey", &self.storage_key),
            ("markerAttribute", &self.marker_attribute),
        ] {
            if value.trim().is_empty() {
                errors.push(ValidationError::new(field, "The value cannot be empty"));
            } else if value.chars().any(char::is_whitespace) {
                errors.push(ValidationError::new(field, "The value cannot contain whitespace"));
            }
        }

        if self.key_separator.is_empty() {
            errors.push(ValidationError::new(
                "keySeparator",
                "The separator cannot be empty. Please specify a separator, for example: \".\" (dot)",
            ));
        }

        if !self.translation_path.contains(LOCALE_PLACEHOLDER) {
            errors.push(ValidationError::new(
                "translationPath",
                format!(
                    "The path must contain the {LOCALE_PLACEHOLDER} placeholder. Example: \"lang/{LOCALE_PLACEHOLDER}.json\""
                ),
            ));
        }

        if self.translation_files.file_pattern.is_empty() {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                "The pattern cannot be empty. Example: \"lang/*.json\"",
            ));
        } else if let Err(e) = globset::Glob::new(&self.translation_files.file_pattern) {
            errors.push(ValidationError::new(
                "translationFiles.filePattern",
                format!("Invalid glob pattern '{}': {e}", self.translation_files.file_pattern),
            ));
        }

        if self.structured_data.enabled && self.structured_data.organization.name.trim().is_empty()
        {
            errors.push(ValidationError::new(
                "structuredData.organization.name",
                "An organization name is required when structured data is enabled",
            ));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Parses the locale fields into a [`SupportedLocales`].
    ///
    /// # Errors
    /// Same conditions as [`I18nSettings::validate`] for the locale fields.
    pub fn supported(&self) -> Result<SupportedLocales, ConfigError> {
        let mut errors = Vec::new();
        let mut locales = Vec::new();
        for (index, code) in self.supported_locales.iter().enumerate() {
            match Locale::parse(code) {
                Ok(locale) if !locales.contains(&locale) => locales.push(locale),
                Ok(_) => {}
                Err(e) => errors.push(ValidationError::new(
                    format!("supportedLocales[{index}]"),
                    format!("Invalid locale code: {e}"),
                )),
            }
        }
        let default = Locale::parse(&self.default_locale).map_err(|e| {
            ValidationError::new("defaultLocale", format!("Invalid locale code: {e}"))
        });

        match default {
            Ok(default) if errors.is_empty() => SupportedLocales::new(locales, default)
                .map_err(|e| ConfigError::ValidationErrors(vec![e])),
            Ok(_) => Err(ConfigError::ValidationErrors(errors)),
            Err(e) => {
                errors.push(e);
                Err(ConfigError::ValidationErrors(errors))
            }
        }
    }

    /// Resolves the translation resource path for a locale.
    #[must_use]
    pub fn translation_path_for(&self, locale: &Locale) -> String {
        self.translation_path.replace(LOCALE_PLACEHOLDER, locale.as_str())
    }
}

impl Default for I18nSettings {
    fn default() -> Self {
        Self {
            supported_locales: vec!["en".to_string(), "tr".to_string()],
            default_locale: "en".to_string(),
            query_parameter: "lang".to_string(),
            storage_key: "site-language".to_string(),
            marker_attribute: "data-lang-key".to_string(),
            key_separator: ".".to_string(),
            translation_path: format!("lang/{LOCALE_PLACEHOLDER}.json"),
            translation_files: TranslationFilesConfig::default(),
            controls: ControlsConfig::default(),
            structured_data: StructuredDataConfig::default(),
        }
    }
}
