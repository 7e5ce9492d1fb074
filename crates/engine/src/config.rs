//! Translator configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use surn_core::FormatOptions;

use crate::cache::DEFAULT_MAX_ENTRIES;
use crate::error::{EngineError, Result};

/// Settings for a [`crate::Translator`].
///
/// Every field has a default, so a configuration file only needs to name
/// what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Upper bound on concurrent transform calls.
    pub max_parallelism: usize,

    /// Reuse fragments from previous runs.
    pub use_cache: bool,

    /// Directory holding the fragment cache.
    pub cache_dir: PathBuf,

    /// Maximum number of cached fragments kept on disk.
    pub cache_max_entries: usize,

    /// How fragments are joined into a program.
    pub format: FormatOptions,
}

/// Returns the per-user cache directory, or `.surn/cache` when there is none.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("surn"))
        .unwrap_or_else(|| PathBuf::from(".surn").join("cache"))
}

impl TranslatorConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum parallelism (at least 1).
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max.max(1);
        self
    }

    /// Enables or disables the fragment cache.
    pub fn with_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }

    /// Sets the cache directory.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Sets the cache entry limit (at least 1).
    pub fn with_cache_max_entries(mut self, max: usize) -> Self {
        self.cache_max_entries = max.max(1);
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: FormatOptions) -> Self {
        self.format = format;
        self
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))?;

        if config.max_parallelism == 0 {
            return Err(EngineError::Config(
                "max_parallelism must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            max_parallelism: num_cpus::get(),
            use_cache: false,
            cache_dir: default_cache_dir(),
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            format: FormatOptions::default(),
        }
    }
}
