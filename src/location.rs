//! The address of the page being localized.

use std::fmt;

use url::{
    Position,
    Url,
};

/// Current document location: supplies the locale query parameter, the path
/// used for page classification and the base URL for hreflang alternates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    url: Url,
}

impl PageLocation {
    #[must_use]
    pub const fn new(url: Url) -> Self {
        Self { url }
    }

    /// # Errors
    /// The input is not an absolute URL.
    pub fn parse(input: &str) -> Result<Self, url::ParseError> {
        Url::parse(input).map(Self::new)
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// First value of the query parameter `name`, if present and non-empty.
    #[must_use]
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty())
    }

    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Last path segment; empty for directory URLs such as `/blog/`.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.url.path().rsplit('/').next().unwrap_or_default()
    }

    /// Scheme and authority, e.g. `https://example.com`.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.url[..Position::BeforePath]
    }

    /// Scheme, authority and path without query or fragment.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.url[..Position::AfterPath]
    }
}

impl fmt::Display for PageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.url, f)
    }
}

impl From<Url> for PageLocation {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("https://example.com/articles.html?lang=tr", Some("tr"))]
    #[case("https://example.com/?x=1&lang=en&lang=tr", Some("en"))]
    #[case("https://example.com/?lang=", None)]
    #[case("https://example.com/", None)]
    fn query_value_returns_first_match(#[case] url: &str, #[case] expected: Option<&str>) {
        let location = PageLocation::parse(url).unwrap();

        assert_that!(location.query_value("lang").as_deref(), eq(expected));
    }

    #[rstest]
    #[case("https://example.com/", "")]
    #[case("https://example.com/index.html", "index.html")]
    #[case("https://example.com/articles/green.html?lang=tr", "green.html")]
    #[case("https://example.com/blog/", "")]
    fn file_name_is_last_segment(#[case] url: &str, #[case] expected: &str) {
        let location = PageLocation::parse(url).unwrap();

        assert_that!(location.file_name(), eq(expected));
    }

    #[rstest]
    fn origin_and_base_url_drop_query_and_fragment() {
        let location = PageLocation::parse("https://example.com:8080/about.html?lang=tr#team").unwrap();

        assert_that!(location.origin(), eq("https://example.com:8080"));
        assert_that!(location.base_url(), eq("https://example.com:8080/about.html"));
        assert_that!(location.path(), eq("/about.html"));
    }
}
