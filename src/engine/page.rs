//! Page classification from the document location.

use std::fmt;

use serde_json::Value;

use crate::input::translation::TranslationTree;
use crate::location::PageLocation;

/// What kind of page is being localized; selects the `meta.pages.*` or
/// `meta.articles.*` branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PageType {
    Home,
    Articles,
    About,
    Contact,
    /// A single article, identified by its slug.
    Article(String),
}

impl PageType {
    /// Segment used in metadata keys (`home`, `articles`, or the slug).
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Home => "home",
            Self::Articles => "articles",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Article(slug) => slug,
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Classify the page at `location`.
///
/// Exact file names win, then `about`/`contact` substrings. Anything else
/// that looks like an HTML page is an article when `meta.articles.<slug>` is
/// an object in the tree, even an empty one. Everything else is the home page.
#[must_use]
pub fn classify(location: &PageLocation, tree: &TranslationTree) -> PageType {
    let file_name = match location.file_name() {
        "" => "index.html",
        name => name,
    };

    match file_name {
        "index.html" => return PageType::Home,
        "articles.html" => return PageType::Articles,
        name if name.contains("about") => return PageType::About,
        name if name.contains("contact") => return PageType::Contact,
        _ => {}
    }

    if location.path().contains("/articles/") || file_name.contains(".html") {
        let slug = file_name.replacen(".html", "", 1);
        let separator = tree.separator();
        let entry = ["meta", "articles", &slug].join(separator);
        if !slug.is_empty() && tree.node(&entry).is_some_and(Value::is_object) {
            return PageType::Article(slug);
        }
    }

    PageType::Home
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[fixture]
    fn tree() -> TranslationTree {
        TranslationTree::from_value(json!({
            "meta": {
                "articles": {
                    "green-algorithms": { "title": "Green algorithms" },
                    "case-study": { "title": "Case study" },
                    "draft": {},
                    "retired": "gone"
                }
            }
        }))
        .unwrap()
    }

    #[rstest]
    #[case("https://example.com/", PageType::Home)]
    #[case("https://example.com/index.html", PageType::Home)]
    #[case("https://example.com/articles.html", PageType::Articles)]
    #[case("https://example.com/about.html", PageType::About)]
    #[case("https://example.com/about-us.html", PageType::About)]
    #[case("https://example.com/contact.html?lang=tr", PageType::Contact)]
    #[case("https://example.com/articles/green-algorithms.html", PageType::Article("green-algorithms".to_string()))]
    #[case("https://example.com/case-study.html", PageType::Article("case-study".to_string()))]
    #[case("https://example.com/articles/draft.html", PageType::Article("draft".to_string()))]
    #[case("https://example.com/articles/retired.html", PageType::Home)]
    #[case("https://example.com/articles/unknown.html", PageType::Home)]
    #[case("https://example.com/privacy.html", PageType::Home)]
    #[case("https://example.com/docs/", PageType::Home)]
    fn classify_cases(tree: TranslationTree, #[case] url: &str, #[case] expected: PageType) {
        let location = PageLocation::parse(url).unwrap();

        assert_that!(classify(&location, &tree), eq(&expected));
    }

    #[rstest]
    fn classify_respects_tree_separator() {
        let tree = TranslationTree::from_value(json!({
            "meta": { "articles": { "green-algorithms": { "title": "Green" } } }
        }))
        .unwrap()
        .with_separator("/");
        let location = PageLocation::parse("https://example.com/articles/green-algorithms.html").unwrap();

        assert_that!(classify(&location, &tree), eq(&PageType::Article("green-algorithms".to_string())));
    }

    #[rstest]
    #[case(PageType::Home, "home")]
    #[case(PageType::Article("green".to_string()), "green")]
    fn key_matches_metadata_segment(#[case] page: PageType, #[case] expected: &str) {
        assert_that!(page.key(), eq(expected));
    }
}
