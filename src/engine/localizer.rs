//! Locale state machine: initialization and switching.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{
    Mutex,
    MutexGuard,
};

use super::content::{
    apply_content,
    sync_language_controls,
};
use super::context::LocalizationContext;
use super::detect::{
    Detection,
    detect_locale,
};
use super::meta::{
    regenerate_hreflang,
    sync_metadata,
};
use crate::config::{
    ConfigError,
    I18nSettings,
};
use crate::document::Document;
use crate::input::source::{
    LoadError,
    TranslationSource,
};
use crate::input::translation::TranslationTree;
use crate::location::PageLocation;
use crate::storage::{
    MemoryPreferences,
    PreferenceStore,
};
use crate::types::Locale;

/// Collaborator notified after translations have been applied.
pub trait LocaleObserver: Send {
    fn locale_applied(&mut self, context: &LocalizationContext, document: &mut dyn Document);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchPhase {
    Idle,
    Switching { target: Locale, generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The target is now current.
    Applied(Locale),
    /// The target is not a supported locale.
    Unsupported(String),
    /// The target was already current.
    AlreadyActive,
    /// A newer request started while this load was in flight.
    Superseded(Locale),
}

/// A started switch, to be passed back to [`Localizer::complete_switch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchTicket {
    locale: Locale,
    generation: u64,
}

impl SwitchTicket {
    #[must_use]
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Result of [`Localizer::begin_switch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchStart {
    /// Load translations for the ticket's locale, then complete the switch.
    Load(SwitchTicket),
    /// Nothing to load.
    Done(SwitchOutcome),
}

/// Owns the document and the localization state.
pub struct Localizer<D> {
    context: LocalizationContext,
    document: D,
    source: Arc<dyn TranslationSource>,
    preferences: Box<dyn PreferenceStore>,
    observers: Vec<Box<dyn LocaleObserver>>,
    phase: SwitchPhase,
    generation: u64,
    detection: Detection,
}

impl<D> fmt::Debug for Localizer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Localizer")
            .field("context", &self.context)
            .field("document", &"<Document>")
            .field("source", &"<TranslationSource>")
            .field("preferences", &"<PreferenceStore>")
            .field("observers", &self.observers.len())
            .field("phase", &self.phase)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// Inputs for [`Localizer::initialize`].
pub struct LocalizerBuilder<D> {
    settings: I18nSettings,
    location: PageLocation,
    document: D,
    source: Arc<dyn TranslationSource>,
    preferences: Box<dyn PreferenceStore>,
    browser_language: Option<String>,
    observers: Vec<Box<dyn LocaleObserver>>,
}

impl<D> fmt::Debug for LocalizerBuilder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizerBuilder")
            .field("settings", &self.settings)
            .field("location", &self.location)
            .field("document", &"<Document>")
            .field("browser_language", &self.browser_language)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl<D: Document> LocalizerBuilder<D> {
    /// Store for the persisted preference. Defaults to an in-memory store.
    #[must_use]
    pub fn preferences(mut self, preferences: impl PreferenceStore + 'static) -> Self {
        self.preferences = Box::new(preferences);
        self
    }

    /// Language reported by the user agent, e.g. `tr-TR`.
    #[must_use]
    pub fn browser_language(mut self, language: impl Into<String>) -> Self {
        self.browser_language = Some(language.into());
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: impl LocaleObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Detect the locale, load its translations and apply them.
    ///
    /// A failed load is logged and leaves the document as it was; the
    /// localizer keeps the detected locale with an empty tree.
    ///
    /// # Errors
    /// The settings are invalid.
    pub async fn initialize(self) -> Result<Localizer<D>, ConfigError> {
        let Self {
            settings,
            location,
            document,
            source,
            mut preferences,
            browser_language,
            observers,
        } = self;

        settings.validate().map_err(ConfigError::ValidationErrors)?;
        let supported = settings.supported()?;

        let detection = detect_locale(
            &settings,
            &supported,
            &location,
            preferences.as_mut(),
            browser_language.as_deref(),
        );
        let context = LocalizationContext::new(
            Arc::new(settings),
            supported,
            location,
            detection.locale.clone(),
        );

        let mut localizer = Localizer {
            context,
            document,
            source,
            preferences,
            observers,
            phase: SwitchPhase::Idle,
            generation: 0,
            detection,
        };

        let locale = localizer.context.current_locale().clone();
        match localizer.source.load(&locale).await {
            Ok(tree) => {
                localizer.context.replace(locale, tree);
                localizer.apply();
            }
            Err(e) => {
                tracing::error!("Failed to load translations for '{}': {}", locale, e);
            }
        }

        Ok(localizer)
    }
}

impl<D: Document> Localizer<D> {
    /// Start building a localizer for `document` at `location`.
    pub fn builder(
        settings: I18nSettings,
        location: PageLocation,
        document: D,
        source: impl TranslationSource + 'static,
    ) -> LocalizerBuilder<D> {
        Self::builder_with_shared_source(settings, location, document, Arc::new(source))
    }

    /// Like [`Localizer::builder`] with a source shared between localizers.
    pub fn builder_with_shared_source(
        settings: I18nSettings,
        location: PageLocation,
        document: D,
        source: Arc<dyn TranslationSource>,
    ) -> LocalizerBuilder<D> {
        LocalizerBuilder {
            settings,
            location,
            document,
            source,
            preferences: Box::new(MemoryPreferences::new()),
            browser_language: None,
            observers: Vec::new(),
        }
    }

    #[must_use]
    pub const fn context(&self) -> &LocalizationContext {
        &self.context
    }

    #[must_use]
    pub const fn current_locale(&self) -> &Locale {
        self.context.current_locale()
    }

    #[must_use]
    pub fn translate(&self, key: &str) -> Option<&str> {
        self.context.translate(key)
    }

    /// How the initial locale was chosen.
    #[must_use]
    pub const fn detection(&self) -> &Detection {
        &self.detection
    }

    #[must_use]
    pub const fn phase(&self) -> &SwitchPhase {
        &self.phase
    }

    #[must_use]
    pub const fn document(&self) -> &D {
        &self.document
    }

    pub const fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    #[must_use]
    pub fn into_document(self) -> D {
        self.document
    }

    /// Register an observer and bring it up to date with the current locale.
    pub fn add_observer(&mut self, mut observer: impl LocaleObserver + 'static) {
        if !self.context.tree().is_empty() {
            observer.locale_applied(&self.context, &mut self.document);
        }
        self.observers.push(Box::new(observer));
    }

    /// Re-apply the current translations to the document and notify
    /// observers.
    pub fn apply(&mut self) {
        let document: &mut dyn Document = &mut self.document;
        apply_content(document, &self.context);
        sync_language_controls(document, &self.context);
        sync_metadata(document, &self.context);
        regenerate_hreflang(document, &self.context);

        for observer in &mut self.observers {
            observer.locale_applied(&self.context, document);
        }
    }

    /// Begin a switch to `target`.
    ///
    /// Every request that needs a load takes a new generation, which
    /// invalidates any load still in flight.
    pub fn begin_switch(&mut self, target: &str) -> SwitchStart {
        let Some(locale) = self.context.supported().find(target).cloned() else {
            tracing::debug!("Ignoring switch to unsupported locale '{}'", target);
            return SwitchStart::Done(SwitchOutcome::Unsupported(target.to_string()));
        };

        if &locale == self.context.current_locale() {
            if let SwitchPhase::Switching { target: pending, .. } = &self.phase {
                tracing::debug!("Cancelled pending switch to '{}'", pending);
                self.generation += 1;
                self.phase = SwitchPhase::Idle;
            }
            return SwitchStart::Done(SwitchOutcome::AlreadyActive);
        }

        self.generation += 1;
        self.phase = SwitchPhase::Switching { target: locale.clone(), generation: self.generation };
        tracing::debug!(locale = %locale, generation = self.generation, "Switching locale");
        SwitchStart::Load(SwitchTicket { locale, generation: self.generation })
    }

    /// Finish a switch with the result of loading the ticket's locale.
    ///
    /// # Errors
    /// The load failed. The previous locale and tree stay current.
    pub fn complete_switch(
        &mut self,
        ticket: SwitchTicket,
        loaded: Result<TranslationTree, LoadError>,
    ) -> Result<SwitchOutcome, LoadError> {
        if ticket.generation != self.generation {
            match loaded {
                Ok(_) => tracing::debug!("Discarding superseded load for '{}'", ticket.locale),
                Err(e) => {
                    tracing::debug!("Ignoring failed superseded load for '{}': {}", ticket.locale, e);
                }
            }
            return Ok(SwitchOutcome::Superseded(ticket.locale));
        }

        self.phase = SwitchPhase::Idle;
        let tree = loaded?;

        let locale = ticket.locale;
        self.context.replace(locale.clone(), tree);
        let storage_key = &self.context.settings().storage_key;
        if let Err(e) = self.preferences.set(storage_key, locale.as_str()) {
            tracing::warn!("Failed to persist locale '{}': {}", locale, e);
        }
        self.apply();

        tracing::info!("Switched locale to '{}'", locale);
        Ok(SwitchOutcome::Applied(locale))
    }

    /// Switch to `target` and apply it.
    ///
    /// # Errors
    /// Loading translations for `target` failed.
    pub async fn switch_locale(&mut self, target: &str) -> Result<SwitchOutcome, LoadError> {
        match self.begin_switch(target) {
            SwitchStart::Done(outcome) => Ok(outcome),
            SwitchStart::Load(ticket) => {
                let loaded = self.source.load(ticket.locale()).await;
                self.complete_switch(ticket, loaded)
            }
        }
    }
}

/// Shared, lockable localizer.
///
/// The lock is released while translations load, so several switches can be
/// in flight; the most recently requested one wins.
pub struct LocalizerHandle<D> {
    inner: Arc<Mutex<Localizer<D>>>,
}

impl<D> Clone for LocalizerHandle<D> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<D> fmt::Debug for LocalizerHandle<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalizerHandle").field("inner", &"<Localizer>").finish()
    }
}

impl<D: Document + Send> LocalizerHandle<D> {
    #[must_use]
    pub fn new(localizer: Localizer<D>) -> Self {
        Self { inner: Arc::new(Mutex::new(localizer)) }
    }

    pub async fn lock(&self) -> MutexGuard<'_, Localizer<D>> {
        self.inner.lock().await
    }

    /// Switch to `target` without holding the lock during the load.
    ///
    /// # Errors
    /// Loading translations for `target` failed.
    pub async fn switch_locale(&self, target: &str) -> Result<SwitchOutcome, LoadError> {
        let (ticket, source) = {
            let mut localizer = self.inner.lock().await;
            match localizer.begin_switch(target) {
                SwitchStart::Done(outcome) => return Ok(outcome),
                SwitchStart::Load(ticket) => (ticket, Arc::clone(&localizer.source)),
            }
        };

        let loaded = source.load(ticket.locale()).await;
        self.inner.lock().await.complete_switch(ticket, loaded)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;
    use crate::document::{
        MemoryDocument,
        Selector,
    };
    use crate::engine::detect::DetectionRule;
    use crate::input::source::StaticSource;
    use crate::test_utils::{
        sample_document,
        sample_source,
    };

    /// Records the locale of every notification.
    #[derive(Clone, Default)]
    struct Recorder {
        seen: Arc<StdMutex<Vec<String>>>,
    }

    impl LocaleObserver for Recorder {
        fn locale_applied(&mut self, context: &LocalizationContext, _document: &mut dyn Document) {
            self.seen.lock().unwrap().push(context.current_locale().to_string());
        }
    }

    impl Recorder {
        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    fn location(url: &str) -> PageLocation {
        PageLocation::parse(url).unwrap()
    }

    #[fixture]
    fn localizer() -> Localizer<MemoryDocument> {
        tokio_test::block_on(
            Localizer::builder(
                I18nSettings::default(),
                location("https://example.com/index.html"),
                sample_document(),
                sample_source(),
            )
            .initialize(),
        )
        .unwrap()
    }

    fn title_text(localizer: &Localizer<MemoryDocument>) -> Option<String> {
        let document = localizer.document();
        let node = document.query(&Selector::any().with_attribute_value("data-lang-key", "nav.title"))?;
        document.text(node)
    }

    #[rstest]
    fn initialize_applies_detected_locale(localizer: Localizer<MemoryDocument>) {
        assert_that!(localizer.current_locale().as_str(), eq("en"));
        assert_that!(localizer.detection().rule, eq(DetectionRule::Default));
        assert_that!(title_text(&localizer), some(eq("Hello")));
        assert_that!(localizer.document().language(), some(eq("en")));
        assert_that!(localizer.phase(), eq(&SwitchPhase::Idle));
    }

    #[tokio::test]
    async fn initialize_uses_query_parameter() {
        let recorder = Recorder::default();
        let localizer = Localizer::builder(
            I18nSettings::default(),
            location("https://example.com/index.html?lang=tr"),
            sample_document(),
            sample_source(),
        )
        .browser_language("en-US")
        .observer(recorder.clone())
        .initialize()
        .await
        .unwrap();

        assert_that!(localizer.current_locale().as_str(), eq("tr"));
        assert_that!(title_text(&localizer), some(eq("Merhaba")));
        assert_that!(recorder.seen(), eq(&vec!["tr".to_string()]));
    }

    #[rstest]
    fn builder_debug_hides_document() {
        let builder = Localizer::builder(
            I18nSettings::default(),
            location("https://example.com/"),
            sample_document(),
            sample_source(),
        )
        .browser_language("tr-TR");

        let debug = format!("{builder:?}");

        assert_that!(debug, starts_with("LocalizerBuilder"));
        assert_that!(debug, contains_substring("\"<Document>\""));
        assert_that!(debug, contains_substring("Some(\"tr-TR\")"));
    }

    #[tokio::test]
    async fn initialize_uses_browser_language() {
        let localizer = Localizer::builder(
            I18nSettings::default(),
            location("https://example.com/"),
            sample_document(),
            sample_source(),
        )
        .browser_language("tr-TR")
        .initialize()
        .await
        .unwrap();

        assert_that!(localizer.detection().rule, eq(DetectionRule::BrowserLanguage));
        assert_that!(title_text(&localizer), some(eq("Merhaba")));
        assert_that!(localizer.document().title(), some(eq("Örnek")));
    }

    #[tokio::test]
    async fn initialize_survives_load_failure() {
        let recorder = Recorder::default();
        let source = StaticSource::new()
            .with_locale(Locale::parse("en").unwrap(), json!({"nav": {"title": "Hello"}}));

        let localizer = Localizer::builder(
            I18nSettings::default(),
            location("https://example.com/?lang=tr"),
            sample_document(),
            source,
        )
        .observer(recorder.clone())
        .initialize()
        .await
        .unwrap();

        assert_that!(localizer.current_locale().as_str(), eq("tr"));
        assert_that!(localizer.context().tree().is_empty(), eq(true));
        assert_that!(title_text(&localizer), some(eq("Welcome")));
        assert_that!(recorder.seen().len(), eq(0));
    }

    #[tokio::test]
    async fn initialize_rejects_invalid_settings() {
        let settings = I18nSettings { default_locale: "de".to_string(), ..I18nSettings::default() };

        let result = Localizer::builder(
            settings,
            location("https://example.com/"),
            MemoryDocument::new(),
            sample_source(),
        )
        .initialize()
        .await;

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
    }

    #[tokio::test]
    async fn switch_locale_applies_and_persists() {
        let recorder = Recorder::default();
        let preferences = MemoryPreferences::new();
        let mut localizer = Localizer::builder(
            I18nSettings::default(),
            location("https://example.com/index.html"),
            sample_document(),
            sample_source(),
        )
        .preferences(preferences)
        .observer(recorder.clone())
        .initialize()
        .await
        .unwrap();

        let outcome = localizer.switch_locale("tr").await.unwrap();

        assert_that!(outcome, eq(&SwitchOutcome::Applied(Locale::parse("tr").unwrap())));
        assert_that!(title_text(&localizer), some(eq("Merhaba")));
        assert_that!(localizer.document().language(), some(eq("tr")));
        assert_that!(localizer.preferences.get("site-language"), some(eq("tr")));
        assert_that!(recorder.seen(), eq(&vec!["en".to_string(), "tr".to_string()]));
    }

    #[rstest]
    #[case("en", SwitchOutcome::AlreadyActive)]
    #[case("fr", SwitchOutcome::Unsupported("fr".to_string()))]
    fn begin_switch_noops(
        mut localizer: Localizer<MemoryDocument>,
        #[case] target: &str,
        #[case] expected: SwitchOutcome,
    ) {
        assert_that!(localizer.begin_switch(target), eq(&SwitchStart::Done(expected)));
        assert_that!(localizer.phase(), eq(&SwitchPhase::Idle));
    }

    #[rstest]
    fn failed_load_keeps_previous_state(mut localizer: Localizer<MemoryDocument>) {
        let SwitchStart::Load(ticket) = localizer.begin_switch("tr") else {
            panic!("expected a load");
        };
        let failure = LoadError::UnknownLocale(ticket.locale().clone());

        let result = localizer.complete_switch(ticket, Err(failure));

        assert!(matches!(result, Err(LoadError::UnknownLocale(_))));
        assert_that!(localizer.current_locale().as_str(), eq("en"));
        assert_that!(title_text(&localizer), some(eq("Hello")));
        assert_that!(localizer.phase(), eq(&SwitchPhase::Idle));
    }

    #[rstest]
    fn latest_request_wins() {
        let settings = I18nSettings {
            supported_locales: vec!["en".to_string(), "tr".to_string(), "de".to_string()],
            ..I18nSettings::default()
        };
        let mut localizer = tokio_test::block_on(
            Localizer::builder(
                settings,
                location("https://example.com/index.html"),
                sample_document(),
                sample_source(),
            )
            .initialize(),
        )
        .unwrap();

        let SwitchStart::Load(first) = localizer.begin_switch("tr") else {
            panic!("expected a load");
        };
        let SwitchStart::Load(second) = localizer.begin_switch("de") else {
            panic!("expected a load");
        };

        let tree = |title: &str| TranslationTree::from_value(json!({"nav": {"title": title}})).unwrap();
        let late = localizer.complete_switch(second, Ok(tree("Hallo"))).unwrap();
        let stale = localizer.complete_switch(first, Ok(tree("Merhaba"))).unwrap();

        assert_that!(late, eq(&SwitchOutcome::Applied(Locale::parse("de").unwrap())));
        assert_that!(stale, eq(&SwitchOutcome::Superseded(Locale::parse("tr").unwrap())));
        assert_that!(localizer.current_locale().as_str(), eq("de"));
        assert_that!(title_text(&localizer), some(eq("Hallo")));
    }

    #[rstest]
    fn returning_to_current_locale_cancels_pending_switch(
        mut localizer: Localizer<MemoryDocument>,
    ) {
        let SwitchStart::Load(pending) = localizer.begin_switch("tr") else {
            panic!("expected a load");
        };

        let back = localizer.begin_switch("en");
        let tree = TranslationTree::from_value(json!({"nav": {"title": "Merhaba"}})).unwrap();
        let outcome = localizer.complete_switch(pending, Ok(tree)).unwrap();

        assert_that!(back, eq(&SwitchStart::Done(SwitchOutcome::AlreadyActive)));
        assert_that!(outcome, eq(&SwitchOutcome::Superseded(Locale::parse("tr").unwrap())));
        assert_that!(localizer.current_locale().as_str(), eq("en"));
    }

    #[tokio::test]
    async fn handle_switch_applies_through_lock() {
        let localizer = Localizer::builder(
            I18nSettings::default(),
            location("https://example.com/index.html"),
            sample_document(),
            sample_source(),
        )
        .initialize()
        .await
        .unwrap();
        let handle = LocalizerHandle::new(localizer);

        let outcome = handle.clone().switch_locale("tr").await.unwrap();

        assert_that!(outcome, eq(&SwitchOutcome::Applied(Locale::parse("tr").unwrap())));
        assert_that!(title_text(&*handle.lock().await), some(eq("Merhaba")));
    }
}
