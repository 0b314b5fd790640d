//! Holds the active settings for a site.

use std::path::PathBuf;

use super::{
    ConfigError,
    I18nSettings,
    loader,
};

/// Loads, validates and hands out the active settings.
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// Settings currently in effect.
    current_settings: I18nSettings,

    /// Directory the settings were loaded from.
    site_root: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: I18nSettings::default(), site_root: None }
    }

    /// Load settings from `site_root`, falling back to defaults when the
    /// directory has no configuration file.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_settings(&mut self, site_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for site root: {:?}", site_root);

        let settings = if let Some(root) = &site_root {
            loader::load_from_site_root(root)?.map_or_else(I18nSettings::default, |loaded| {
                tracing::debug!("Loaded site settings: {:?}", loaded);
                loaded
            })
        } else {
            I18nSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.site_root = site_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &I18nSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn site_root(&self) -> Option<&PathBuf> {
        self.site_root.as_ref()
    }
}
