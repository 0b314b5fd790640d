//! Missing-translation report across locales.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::input::source::{
    LoadError,
    TranslationSource,
};
use crate::input::translation::TranslationTree;
use crate::types::Locale;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleCoverage {
    pub locale: Locale,
    /// Keys with a non-empty value in this locale.
    pub translated: usize,
    /// Keys present in another locale but missing or empty here, sorted.
    pub missing: Vec<String>,
}

impl LocaleCoverage {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    /// Number of distinct keys across every locale.
    pub total_keys: usize,
    pub locales: Vec<LocaleCoverage>,
}

impl CoverageReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.locales.iter().all(LocaleCoverage::is_complete)
    }
}

/// Compare flattened keys between locales.
///
/// Keys are joined with each tree's own separator. Array items appear as
/// `key[0]`, `key[1]`, and so on.
#[must_use]
pub fn coverage_report(trees: &[(Locale, TranslationTree)]) -> CoverageReport {
    let keyed: Vec<(&Locale, BTreeSet<String>)> = trees
        .iter()
        .map(|(locale, tree)| {
            let keys = tree
                .flatten()
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, _)| key)
                .collect();
            (locale, keys)
        })
        .collect();

    let all_keys: BTreeSet<&String> = keyed.iter().flat_map(|(_, keys)| keys).collect();

    let locales = keyed
        .iter()
        .map(|(locale, keys)| LocaleCoverage {
            locale: (*locale).clone(),
            translated: keys.len(),
            missing: all_keys
                .iter()
                .filter(|key| !keys.contains(key.as_str()))
                .map(|key| (*key).clone())
                .collect(),
        })
        .collect();

    CoverageReport { total_keys: all_keys.len(), locales }
}

/// Load every locale concurrently.
///
/// Results keep the order of `locales`.
pub async fn load_all(
    source: &dyn TranslationSource,
    locales: &[Locale],
) -> Vec<(Locale, Result<TranslationTree, LoadError>)> {
    let loads = locales.iter().map(|locale| async move { (locale.clone(), source.load(locale).await) });
    futures::future::join_all(loads).await
}
