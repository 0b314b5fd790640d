//! Head metadata and hreflang alternates.

use super::context::LocalizationContext;
use super::page::PageType;
use crate::document::{
    Document,
    Selector,
};
use crate::input::translation::TranslationTree;

/// Where a resolved metadata value is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelTarget {
    /// The document title.
    Title,
    /// `<meta {attribute}="{name}" content="...">`
    Meta { attribute: &'static str, name: &'static str },
    /// `<link rel="{rel}" href="...">`
    Link { rel: &'static str },
}

/// A metadata key path under `meta.{pages,articles,site}` and its tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaChannel {
    pub path: &'static [&'static str],
    pub target: ChannelTarget,
}

const fn meta_name(path: &'static [&'static str], name: &'static str) -> MetaChannel {
    MetaChannel { path, target: ChannelTarget::Meta { attribute: "name", name } }
}

const fn meta_property(path: &'static [&'static str], name: &'static str) -> MetaChannel {
    MetaChannel { path, target: ChannelTarget::Meta { attribute: "property", name } }
}

/// Channels in application order.
pub const CHANNELS: &[MetaChannel] = &[
    MetaChannel { path: &["title"], target: ChannelTarget::Title },
    meta_name(&["description"], "description"),
    meta_name(&["keywords"], "keywords"),
    MetaChannel { path: &["canonical"], target: ChannelTarget::Link { rel: "canonical" } },
    meta_name(&["robots"], "robots"),
    meta_property(&["openGraph", "title"], "og:title"),
    meta_property(&["openGraph", "description"], "og:description"),
    meta_property(&["openGraph", "url"], "og:url"),
    meta_property(&["openGraph", "image"], "og:image"),
    meta_property(&["openGraph", "type"], "og:type"),
    meta_property(&["openGraph", "siteName"], "og:site_name"),
    meta_name(&["twitter", "card"], "twitter:card"),
    meta_name(&["twitter", "site"], "twitter:site"),
    meta_name(&["twitter", "title"], "twitter:title"),
    meta_name(&["twitter", "description"], "twitter:description"),
    meta_name(&["twitter", "image"], "twitter:image"),
];

/// Resolve one channel: page-specific, then article-specific, then site-wide.
#[must_use]
pub fn resolve_channel<'a>(
    tree: &'a TranslationTree,
    page: &PageType,
    path: &[&str],
) -> Option<&'a str> {
    let separator = tree.separator();
    let rest = path.join(separator);
    let candidates = [
        ["meta", "pages", page.key(), &rest].join(separator),
        ["meta", "articles", page.key(), &rest].join(separator),
        ["meta", "site", &rest].join(separator),
    ];
    candidates.iter().find_map(|key| tree.lookup(key))
}

/// Write every resolvable channel into the head. Returns the number applied.
pub fn sync_metadata(document: &mut dyn Document, context: &LocalizationContext) -> usize {
    let page = context.page_type();
    let mut applied = 0;

    for channel in CHANNELS {
        let Some(value) = resolve_channel(context.tree(), &page, channel.path) else {
            continue;
        };
        upsert(document, channel.target, value);
        applied += 1;
    }

    tracing::debug!(page = %page, applied, "Synchronized metadata");
    applied
}

fn upsert(document: &mut dyn Document, target: ChannelTarget, value: &str) {
    let (selector, value_attribute, attributes) = match target {
        ChannelTarget::Title => {
            document.set_title(value);
            return;
        }
        ChannelTarget::Meta { attribute, name } => (
            Selector::tag("meta").with_attribute_value(attribute, name),
            "content",
            [(attribute, name), ("content", value)],
        ),
        ChannelTarget::Link { rel } => (
            Selector::tag("link").with_attribute_value("rel", rel),
            "href",
            [("rel", rel), ("href", value)],
        ),
    };

    if let Some(node) = document.query(&selector) {
        document.set_attribute(node, value_attribute, value);
    } else {
        let tag = if matches!(target, ChannelTarget::Link { .. }) { "link" } else { "meta" };
        document.append_to_head(tag, &attributes);
    }
}

/// Replace all hreflang alternates with one per supported locale plus
/// `x-default`.
pub fn regenerate_hreflang(document: &mut dyn Document, context: &LocalizationContext) {
    let existing =
        Selector::tag("link").with_attribute_value("rel", "alternate").with_attribute("hreflang");
    for node in document.query_all(&existing) {
        document.remove(node);
    }

    let base = context.location().base_url();
    let parameter = &context.settings().query_parameter;
    let supported = context.supported();

    for locale in supported.iter() {
        let href = if locale == supported.default_locale() {
            base.to_string()
        } else {
            format!("{base}?{parameter}={locale}")
        };
        document.append_to_head(
            "link",
            &[("rel", "alternate"), ("hreflang", locale.as_str()), ("href", &href)],
        );
    }
    document.append_to_head("link", &[("rel", "alternate"), ("hreflang", "x-default"), ("href", base)]);
}
