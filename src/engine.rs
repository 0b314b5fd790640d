//! Localization engine.
//!
//! Detects the initial locale, applies translations to marked elements and
//! head metadata, and switches locales on request.

pub mod content;
pub mod context;
pub mod detect;
pub mod localizer;
pub mod meta;
pub mod page;

pub use context::LocalizationContext;
pub use detect::{
    Detection,
    DetectionRule,
    detect_locale,
};
pub use localizer::{
    LocaleObserver,
    Localizer,
    LocalizerBuilder,
    LocalizerHandle,
    SwitchOutcome,
    SwitchPhase,
    SwitchStart,
    SwitchTicket,
};
pub use page::PageType;
