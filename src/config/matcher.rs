//! File pattern matcher for translation files.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    GlobBuilder,
    GlobSet,
    GlobSetBuilder,
};

use super::I18nSettings;

#[derive(Debug, thiserror::Error)]
pub enum MatcherError {
    #[error("Invalid translation file pattern '{pattern}': {source}")]
    InvalidTranslationPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Failed to build glob set: {0}")]
    GlobSetBuild(#[from] globset::Error),
}

/// Matches paths under a site root against `translationFiles.filePattern`.
///
/// `*` does not cross directory boundaries, so `lang/*.json` only matches
/// files directly inside `lang/`.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    site_root: PathBuf,
    translation_set: GlobSet,
}

impl FileMatcher {
    /// Creates a new matcher from settings.
    pub fn new(site_root: PathBuf, settings: &I18nSettings) -> Result<Self, MatcherError> {
        let pattern = &settings.translation_files.file_pattern;
        let glob = GlobBuilder::new(pattern).literal_separator(true).build().map_err(|source| {
            MatcherError::InvalidTranslationPattern { pattern: pattern.clone(), source }
        })?;

        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let translation_set = builder.build()?;

        Ok(Self { site_root, translation_set })
    }

    #[must_use]
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Returns true if the path matches the translation file pattern.
    ///
    /// The path must be absolute and under the site root.
    #[must_use]
    pub fn is_translation_file(&self, absolute_path: &Path) -> bool {
        let Some(relative_path) = absolute_path.strip_prefix(&self.site_root).ok() else {
            return false;
        };

        self.is_translation_file_relative(relative_path)
    }

    /// Returns true if the path matches the translation file pattern.
    ///
    /// The path must be relative to the site root.
    #[must_use]
    pub fn is_translation_file_relative(&self, relative_path: &Path) -> bool {
        self.translation_set.is_match(relative_path)
    }
}
