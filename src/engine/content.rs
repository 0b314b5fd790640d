//! Marked-element text and language controls.

use super::context::LocalizationContext;
use crate::document::{
    Document,
    Selector,
};

/// Overwrite the text of every element carrying the marker attribute.
///
/// Elements whose key does not resolve keep their current text. Also sets the
/// document `lang` attribute. Returns the number of elements updated.
pub fn apply_content(document: &mut dyn Document, context: &LocalizationContext) -> usize {
    let marker = &context.settings().marker_attribute;
    document.set_language(context.current_locale().as_str());

    let mut updated = 0;
    for node in document.query_all(&Selector::any().with_attribute(marker)) {
        let Some(key) = document.attribute(node, marker) else {
            continue;
        };
        if let Some(text) = context.translate(&key) {
            document.set_text(node, text);
            updated += 1;
        } else {
            tracing::trace!("No translation for key '{}'", key);
        }
    }

    tracing::debug!(locale = %context.current_locale(), updated, "Applied translations");
    updated
}

/// Point the switch button label and the locale selector at the current
/// locale.
pub fn sync_language_controls(document: &mut dyn Document, context: &LocalizationContext) {
    let controls = &context.settings().controls;

    if let Some(label) = context.translate(&controls.switch_label_key) {
        for node in document.query_all(&Selector::class(&controls.switch_button_class)) {
            document.set_text(node, label);
        }
    }

    for node in document.query_all(&Selector::class(&controls.select_class)) {
        document.set_value(node, context.current_locale().as_str());
    }
}
