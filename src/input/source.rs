//! Where translation trees come from.
//!
//! The engine only knows the [`TranslationSource`] trait; the site decides
//! whether translations are read from disk, fetched over HTTP or embedded.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::translation::{
    InvalidRootError,
    TranslationTree,
};
use crate::config::I18nSettings;
use crate::types::Locale;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read translation file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to build translation URL for '{locale}': {source}")]
    Url {
        locale: Locale,
        #[source]
        source: url::ParseError,
    },

    #[error("Request for '{url}' failed: {source}")]
    Http {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request for '{url}' returned status {status}")]
    Status { url: Url, status: reqwest::StatusCode },

    #[error("Failed to parse translations for '{locale}': {source}")]
    Parse {
        locale: Locale,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid translations for '{locale}': {source}")]
    InvalidRoot {
        locale: Locale,
        #[source]
        source: InvalidRootError,
    },

    #[error("No translations registered for '{0}'")]
    UnknownLocale(Locale),
}

/// Produces the translation tree for a locale.
///
/// Each call loads afresh; nothing is cached between calls.
#[async_trait]
pub trait TranslationSource: Send + Sync {
    /// # Errors
    /// Transport failure or a body that is not a JSON object.
    async fn load(&self, locale: &Locale) -> Result<TranslationTree, LoadError>;
}

/// Parse a translation document and apply the key separator.
///
/// # Errors
/// Invalid JSON or a root that is not an object.
pub fn parse_translations(
    locale: &Locale,
    text: &str,
    separator: &str,
) -> Result<TranslationTree, LoadError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|source| LoadError::Parse { locale: locale.clone(), source })?;
    let tree = TranslationTree::from_value(value)
        .map_err(|source| LoadError::InvalidRoot { locale: locale.clone(), source })?;
    Ok(tree.with_separator(separator))
}

/// Reads `<root>/<translationPath>` from disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    settings: Arc<I18nSettings>,
}

impl FileSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, settings: &I18nSettings) -> Self {
        Self { root: root.into(), settings: Arc::new(settings.clone()) }
    }

    #[must_use]
    pub fn path_for(&self, locale: &Locale) -> PathBuf {
        self.root.join(self.settings.translation_path_for(locale))
    }
}

#[async_trait]
impl TranslationSource for FileSource {
    async fn load(&self, locale: &Locale) -> Result<TranslationTree, LoadError> {
        let path = self.path_for(locale);
        tracing::debug!(locale = %locale, path = %path.display(), "Loading translations");

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| LoadError::Io { path: path.clone(), source })?;

        parse_translations(locale, &text, &self.settings.key_separator)
    }
}

/// Fetches `<base>/<translationPath>` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base_url: Url,
    settings: Arc<I18nSettings>,
}

impl HttpSource {
    /// `base_url` should end with `/` when it points at a directory.
    #[must_use]
    pub fn new(base_url: Url, settings: &I18nSettings) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, settings)
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: Url, settings: &I18nSettings) -> Self {
        Self { client, base_url, settings: Arc::new(settings.clone()) }
    }

    /// # Errors
    /// The resolved path is not a valid URL reference.
    pub fn url_for(&self, locale: &Locale) -> Result<Url, LoadError> {
        let path = self.settings.translation_path_for(locale);
        self.base_url.join(&path).map_err(|source| LoadError::Url { locale: locale.clone(), source })
    }
}

#[async_trait]
impl TranslationSource for HttpSource {
    async fn load(&self, locale: &Locale) -> Result<TranslationTree, LoadError> {
        let url = self.url_for(locale)?;
        tracing::debug!(locale = %locale, url = %url, "Fetching translations");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| LoadError::Http { url: url.clone(), source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status { url, status });
        }

        let text =
            response.text().await.map_err(|source| LoadError::Http { url: url.clone(), source })?;

        parse_translations(locale, &text, &self.settings.key_separator)
    }
}

/// Translations held in memory, keyed by locale.
///
/// Trees use the `.` separator unless one is configured through
/// [`StaticSource::from_settings`] or [`StaticSource::with_separator`].
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: HashMap<Locale, Value>,
    separator: Option<String>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty source whose trees use the configured key separator.
    #[must_use]
    pub fn from_settings(settings: &I18nSettings) -> Self {
        Self::new().with_separator(&settings.key_separator)
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale, document: Value) -> Self {
        self.documents.insert(locale, document);
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: &str) -> Self {
        self.separator = Some(separator.to_string());
        self
    }
}

#[async_trait]
impl TranslationSource for StaticSource {
    async fn load(&self, locale: &Locale) -> Result<TranslationTree, LoadError> {
        let document =
            self.documents.get(locale).ok_or_else(|| LoadError::UnknownLocale(locale.clone()))?;
        let tree = TranslationTree::from_value(document.clone())
            .map_err(|source| LoadError::InvalidRoot { locale: locale.clone(), source })?;
        Ok(match &self.separator {
            Some(separator) => tree.with_separator(separator),
            None => tree,
        })
    }
}
