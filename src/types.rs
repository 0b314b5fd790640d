//! Core types used throughout the project.

use std::fmt;
use std::str::FromStr;

use serde::{
    Deserialize,
    Deserializer,
    Serialize,
    Serializer,
};
use thiserror::Error;

/// Longest accepted locale code (BCP 47 tags rarely exceed this).
const MAX_LOCALE_LEN: usize = 35;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("Locale code cannot be empty")]
    Empty,

    #[error("Locale code '{0}' is longer than 35 characters")]
    TooLong(String),

    #[error("Locale code '{code}' contains invalid character '{character}'")]
    InvalidCharacter { code: String, character: char },
}

/// A short language code such as `en`, `tr` or `pt-BR`.
///
/// Only the shape of the code is validated; whether a locale is usable is
/// decided by the configured supported set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    /// # Errors
    /// - Empty code
    /// - Code longer than 35 characters
    /// - Characters other than ASCII alphanumerics, `-` and `_`
    pub fn parse(code: &str) -> Result<Self, LocaleError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(LocaleError::Empty);
        }
        if code.len() > MAX_LOCALE_LEN {
            return Err(LocaleError::TooLong(code.to_string()));
        }
        if let Some(character) =
            code.chars().find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(LocaleError::InvalidCharacter { code: code.to_string(), character });
        }
        Ok(Self(code.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased primary language subtag (`pt-BR` → `pt`).
    #[must_use]
    pub fn primary_subtag(&self) -> String {
        primary_subtag(&self.0)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Locale {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Locale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Locale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Self::parse(&code).map_err(serde::de::Error::custom)
    }
}

/// Extract the primary language subtag from a language tag.
///
/// Browsers report tags like `tr-TR` or `en_US`; only the part before the
/// first `-` or `_` is kept, lowercased.
#[must_use]
pub fn primary_subtag(tag: &str) -> String {
    tag.trim().split(['-', '_']).next().unwrap_or_default().to_ascii_lowercase()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("en")]
    #[case("tr")]
    #[case("pt-BR")]
    #[case("zh_Hant")]
    fn parse_accepts_language_codes(#[case] code: &str) {
        assert_that!(Locale::parse(code).map(|locale| locale.to_string()), ok(eq(code)));
    }

    #[rstest]
    fn parse_trims_whitespace() {
        assert_that!(Locale::parse("  tr ").unwrap().as_str(), eq("tr"));
    }

    #[rstest]
    fn parse_rejects_empty() {
        assert_eq!(Locale::parse("   "), Err(LocaleError::Empty));
    }

    #[rstest]
    #[case("en US", ' ')]
    #[case("../en", '.')]
    #[case("tr?", '?')]
    fn parse_rejects_invalid_characters(#[case] code: &str, #[case] bad: char) {
        assert_eq!(
            Locale::parse(code),
            Err(LocaleError::InvalidCharacter { code: code.to_string(), character: bad })
        );
    }

    #[rstest]
    fn parse_rejects_overlong_codes() {
        let code = "a".repeat(36);
        assert_eq!(Locale::parse(&code), Err(LocaleError::TooLong(code.clone())));
    }

    #[rstest]
    #[case("tr-TR", "tr")]
    #[case("en_US", "en")]
    #[case("DE", "de")]
    #[case("", "")]
    fn primary_subtag_cases(#[case] tag: &str, #[case] expected: &str) {
        assert_that!(primary_subtag(tag), eq(expected));
    }

    #[rstest]
    fn deserialize_validates() {
        let locale: Locale = serde_json::from_str(r#""tr""#).unwrap();
        assert_that!(locale.as_str(), eq("tr"));

        let bad = serde_json::from_str::<Locale>(r#""t r""#);
        assert_that!(bad.is_err(), eq(true));
    }
}
