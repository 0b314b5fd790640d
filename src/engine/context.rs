//! The active locale and its translations.

use std::sync::Arc;

use super::page::{
    self,
    PageType,
};
use crate::config::{
    I18nSettings,
    SupportedLocales,
};
use crate::input::translation::TranslationTree;
use crate::location::PageLocation;
use crate::types::Locale;

/// Owned localization state, passed by reference to anything that needs the
/// active locale or translations.
///
/// Exactly one locale is current at any time. The tree is replaced wholesale
/// when a switch completes.
#[derive(Debug, Clone)]
pub struct LocalizationContext {
    settings: Arc<I18nSettings>,
    supported: SupportedLocales,
    location: PageLocation,
    current: Locale,
    tree: Arc<TranslationTree>,
}

impl LocalizationContext {
    /// Context for `current` with an empty tree.
    #[must_use]
    pub fn new(
        settings: Arc<I18nSettings>,
        supported: SupportedLocales,
        location: PageLocation,
        current: Locale,
    ) -> Self {
        let tree = Arc::new(TranslationTree::empty().with_separator(&settings.key_separator));
        Self { settings, supported, location, current, tree }
    }

    #[must_use]
    pub fn with_tree(mut self, tree: TranslationTree) -> Self {
        self.tree = Arc::new(tree);
        self
    }

    #[must_use]
    pub fn settings(&self) -> &I18nSettings {
        &self.settings
    }

    #[must_use]
    pub const fn supported(&self) -> &SupportedLocales {
        &self.supported
    }

    #[must_use]
    pub const fn location(&self) -> &PageLocation {
        &self.location
    }

    #[must_use]
    pub const fn current_locale(&self) -> &Locale {
        &self.current
    }

    #[must_use]
    pub fn tree(&self) -> &TranslationTree {
        &self.tree
    }

    /// Shared handle to the current tree.
    #[must_use]
    pub fn shared_tree(&self) -> Arc<TranslationTree> {
        Arc::clone(&self.tree)
    }

    /// Look up `key` in the current tree.
    #[must_use]
    pub fn translate(&self, key: &str) -> Option<&str> {
        self.tree.lookup(key)
    }

    /// Look up a key given as separate segments, joined with the configured
    /// separator.
    #[must_use]
    pub fn translate_path(&self, segments: &[&str]) -> Option<&str> {
        self.tree.lookup(&segments.join(self.tree.separator()))
    }

    /// Page classification for the current location and tree.
    #[must_use]
    pub fn page_type(&self) -> PageType {
        page::classify(&self.location, &self.tree)
    }

    pub(crate) fn replace(&mut self, locale: Locale, tree: TranslationTree) {
        self.current = locale;
        self.tree = Arc::new(tree);
    }
}
