//! Find the locales a site ships translation files for.

use std::path::{
    Path,
    PathBuf,
};

use ignore::WalkBuilder;
use thiserror::Error;

use crate::config::FileMatcher;
use crate::types::Locale;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Site root '{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// A translation file and the locale named by its stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLocale {
    pub locale: Locale,
    pub path: PathBuf,
}

/// Walk the site root and collect files matching the translation pattern.
///
/// Stems that are not valid locale codes are skipped. The result is sorted
/// by locale; when several files share a stem the first path in walk order
/// is kept.
pub fn discover_locales(matcher: &FileMatcher) -> Result<Vec<DiscoveredLocale>, DiscoveryError> {
    let site_root = matcher.site_root();
    if !site_root.is_dir() {
        return Err(DiscoveryError::NotADirectory(site_root.to_path_buf()));
    }

    let mut found: Vec<DiscoveredLocale> = Vec::new();
    for result in WalkBuilder::new(site_root)
        .hidden(false)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .follow_links(false)
        .sort_by_file_path(Path::cmp)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        let path = entry.path();
        if !matcher.is_translation_file(path) {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let locale = match Locale::parse(stem) {
            Ok(locale) => locale,
            Err(e) => {
                tracing::debug!("Skipping {:?}: {}", path, e);
                continue;
            }
        };

        if found.iter().any(|existing| existing.locale == locale) {
            tracing::warn!("Duplicate translation file for '{}': {:?}", locale, path);
            continue;
        }
        found.push(DiscoveredLocale { locale, path: path.to_path_buf() });
    }

    found.sort_by(|a, b| a.locale.as_str().cmp(b.locale.as_str()));
    tracing::debug!(count = found.len(), "Discovered locales");
    Ok(found)
}
