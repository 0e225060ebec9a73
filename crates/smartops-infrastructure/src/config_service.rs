//! Configuration service.
//!
//! Loads [`ConsoleConfig`] from `~/.config/smartops/config.toml` (or an
//! explicit file), applies environment overrides and caches the result.

use crate::paths::SmartOpsPaths;
use smartops_core::config::ConsoleConfig;
use smartops_core::{Result, SmartOpsError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

pub const ENV_API_URL: &str = "SMARTOPS_API_URL";
pub const ENV_LOG_LEVEL: &str = "SMARTOPS_LOG_LEVEL";

/// Values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_base_url: Option<String>,
    pub log_level: Option<String>,
    pub voice: Option<bool>,
}

impl ConfigOverrides {
    /// Reads `SMARTOPS_API_URL` and `SMARTOPS_LOG_LEVEL`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            api_base_url: non_empty(ENV_API_URL),
            log_level: non_empty(ENV_LOG_LEVEL),
            voice: None,
        }
    }

    /// Layers `other` on top of `self`; set fields in `other` win.
    pub fn merge(self, other: ConfigOverrides) -> Self {
        Self {
            api_base_url: other.api_base_url.or(self.api_base_url),
            log_level: other.log_level.or(self.log_level),
            voice: other.voice.or(self.voice),
        }
    }

    pub fn apply(&self, config: &mut ConsoleConfig) {
        if let Some(url) = &self.api_base_url {
            config.api_base_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(voice) = self.voice {
            config.speech.enabled = voice;
        }
    }
}

/// Loads and caches the console configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    config_file: PathBuf,
    overrides: ConfigOverrides,
    config: Arc<RwLock<Option<ConsoleConfig>>>,
}

impl ConfigService {
    /// Uses `config_file` when given, else the default location.
    pub fn new(config_file: Option<PathBuf>, overrides: ConfigOverrides) -> Result<Self> {
        let config_file = match config_file {
            Some(path) => path,
            None => SmartOpsPaths::default().config_file()?,
        };
        Ok(Self {
            config_file,
            overrides,
            config: Arc::new(RwLock::new(None)),
        })
    }

    pub fn config_file(&self) -> &Path {
        &self.config_file
    }

    /// Gets the configuration, loading it from file if not cached.
    ///
    /// A missing file is created with the defaults.
    pub fn get_config(&self) -> Result<ConsoleConfig> {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return Ok(config.clone());
            }
        }

        let mut loaded = self.load_config()?;
        self.overrides.apply(&mut loaded);

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn load_config(&self) -> Result<ConsoleConfig> {
        if !self.config_file.exists() {
            let defaults = ConsoleConfig::default();
            if let Err(err) = self.write_defaults(&defaults) {
                tracing::warn!(
                    path = %self.config_file.display(),
                    "could not create default config: {err}"
                );
            }
            return Ok(defaults);
        }

        let content = std::fs::read_to_string(&self.config_file)?;
        toml::from_str(&content).map_err(|err| {
            SmartOpsError::config(format!(
                "failed to parse {}: {err}",
                self.config_file.display()
            ))
        })
    }

    fn write_defaults(&self, defaults: &ConsoleConfig) -> Result<()> {
        if let Some(parent) = self.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(defaults).map_err(|err| SmartOpsError::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        })?;
        std::fs::write(&self.config_file, content)?;
        tracing::info!(path = %self.config_file.display(), "created default config");
        Ok(())
    }
}
