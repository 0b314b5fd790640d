//! site-i18n
//!
//! Client-side localization for static marketing sites: picks the visitor's
//! locale, fills marked elements from per-locale JSON translations and keeps
//! SEO metadata, hreflang alternates and JSON-LD in step with the locale.

pub mod config;
pub mod coverage;
pub mod discovery;
pub mod document;
pub mod engine;
pub mod input;
pub mod location;
pub mod storage;
pub mod structured_data;
pub mod types;

mod test_utils;

pub use engine::{
    Localizer,
    LocalizerHandle,
};
