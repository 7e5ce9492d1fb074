//! Fragment cache for skipping repeated transforms.
//!
//! Transforms are deterministic, so a fragment produced once for a given
//! module and node can be reused as long as neither changes.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use surn_core::{AstNode, RegistrationDescriptor};

use crate::error::{EngineError, Result};

const CACHE_FILE: &str = "fragments.json";

/// Default upper bound on stored fragments.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Persistent map from (module, node) hashes to generated fragments.
pub struct FragmentCache {
    /// Directory where the cache file is stored.
    cache_dir: PathBuf,

    /// In-memory entries keyed by hash.
    entries: HashMap<String, CacheEntry>,

    /// Oldest entries are evicted beyond this count.
    max_entries: usize,
}

/// A cached fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Language of the module that produced the fragment.
    pub module: String,

    /// Generated text.
    pub fragment: String,

    /// When the fragment was recorded, in seconds since the epoch.
    pub timestamp: u64,
}

impl FragmentCache {
    /// Opens the cache in `cache_dir`, creating the directory if needed.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let cache_dir = cache_dir.into();

        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir).map_err(|e| EngineError::Cache {
                path: cache_dir.clone(),
                source: e,
            })?;
        }

        let entries = Self::load_entries(&cache_dir)?;

        Ok(Self {
            cache_dir,
            entries,
            max_entries: DEFAULT_MAX_ENTRIES,
        })
    }

    /// Sets the entry limit (at least 1), evicting the oldest entries if
    /// the loaded cache already exceeds it.
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max.max(1);
        while self.entries.len() > self.max_entries {
            self.evict_oldest();
        }
        self
    }

    /// Loads entries from disk. An unreadable cache file counts as empty.
    fn load_entries(cache_dir: &Path) -> Result<HashMap<String, CacheEntry>> {
        let cache_file = cache_dir.join(CACHE_FILE);

        if !cache_file.exists() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(&cache_file).map_err(|e| EngineError::Cache {
            path: cache_file.clone(),
            source: e,
        })?;

        let entries = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(path = %cache_file.display(), error = %e, "discarding corrupt cache");
                HashMap::new()
            }
        };

        Ok(entries)
    }

    /// Writes all entries to disk.
    pub fn save(&self) -> Result<()> {
        let cache_file = self.cache_dir.join(CACHE_FILE);
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| EngineError::Serialization(e.to_string()))?;

        fs::write(&cache_file, content).map_err(|e| EngineError::Cache {
            path: cache_file,
            source: e,
        })
    }

    /// Computes the cache key for a node rendered by a module.
    pub fn key(
        descriptor: &RegistrationDescriptor,
        node: &AstNode,
        qualified: bool,
    ) -> Result<String> {
        let node_json =
            serde_json::to_vec(node).map_err(|e| EngineError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(descriptor.lang_name.as_bytes());
        hasher.update(&[0]);
        hasher.update(descriptor.lang_version.to_string().as_bytes());
        hasher.update(&descriptor.api_version.to_le_bytes());
        hasher.update(&[u8::from(qualified)]);
        hasher.update(&node_json);

        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Returns the cached fragment for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.fragment.as_str())
    }

    /// Records a fragment in memory. Call [`FragmentCache::save`] to persist.
    pub fn insert(&mut self, key: String, module: &str, fragment: &str) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        self.insert_at(key, module, fragment, timestamp);
    }

    fn insert_at(&mut self, key: String, module: &str, fragment: &str, timestamp: u64) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }

        self.entries.insert(
            key,
            CacheEntry {
                module: module.to_string(),
                fragment: fragment.to_string(),
                timestamp,
            },
        );
    }

    /// Removes the entry with the oldest timestamp, ties broken by key.
    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by(|(ka, a), (kb, b)| a.timestamp.cmp(&b.timestamp).then_with(|| ka.cmp(kb)))
            .map(|(key, _)| key.clone());

        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }

    /// Clears all entries.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.save()
    }

    /// Removes a single entry.
    pub fn invalidate(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.save()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Directory the cache lives in.
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }
}
