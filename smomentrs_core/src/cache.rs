//! Key/value caches for results of external lookups
//!
//! Lookups against rate limited services (taxonomy, protein masses) are cached so a project
//! run twice never repeats a query. Entries never expire. Keys are normalised by trimming and
//! collapsing internal whitespace.
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Cache of values keyed by a normalised identifier
pub trait KeyValueCache<V> {
    /// Cached value for `key`, if any
    fn get(&self, key: &str) -> Option<V>;

    /// Store `value` under `key`
    fn put(&mut self, key: &str, value: V) -> Result<(), CacheError>;
}

/// Normalise a cache key, e.g. `" Escherichia  coli "` becomes `"Escherichia coli"`
pub fn normalize_key(key: &str) -> String {
    key.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Cache held in memory for the lifetime of the process
#[derive(Debug, Clone)]
pub struct MemoryCache<V> {
    entries: IndexMap<String, V>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        MemoryCache {
            entries: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        MemoryCache::new()
    }
}

impl<V: Clone> KeyValueCache<V> for MemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(&normalize_key(key)).cloned()
    }

    fn put(&mut self, key: &str, value: V) -> Result<(), CacheError> {
        self.entries.insert(normalize_key(key), value);
        Ok(())
    }
}

/// Cache persisted as a single JSON object on disk
///
/// The file is loaded when the cache is opened and rewritten after every `put`, so entries
/// survive between runs.
#[derive(Debug, Clone)]
pub struct JsonFileCache<V> {
    path: PathBuf,
    entries: IndexMap<String, V>,
}

impl<V: Serialize + DeserializeOwned> JsonFileCache<V> {
    /// Open the cache stored at `path`, starting empty if the file does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let data = fs::read_to_string(&path).map_err(|source| CacheError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&data).map_err(|source| CacheError::Corrupt {
                path: path.display().to_string(),
                source,
            })?
        } else {
            IndexMap::new()
        };
        log::debug!("Opened cache {} with {} entries", path.display(), entries.len());
        Ok(JsonFileCache { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|source| CacheError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
        }
        let data = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, data).map_err(|source| CacheError::Io {
            path: self.path.display().to_string(),
            source,
        })
    }
}

impl<V: Clone + Serialize + DeserializeOwned> KeyValueCache<V> for JsonFileCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        self.entries.get(&normalize_key(key)).cloned()
    }

    fn put(&mut self, key: &str, value: V) -> Result<(), CacheError> {
        self.entries.insert(normalize_key(key), value);
        self.persist()
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Unable to access cache file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Cache file {path} is not valid JSON: {source}")]
    Corrupt {
        path: String,
        source: serde_json::Error,
    },
    #[error("Unable to serialize cache entries")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_normalised() {
        assert_eq!(normalize_key("  Escherichia   coli\t"), "Escherichia coli");
        let mut cache = MemoryCache::new();
        cache.put("Escherichia  coli", 1).unwrap();
        assert_eq!(cache.get(" Escherichia coli "), Some(1));
        assert_eq!(cache.get("Bacillus subtilis"), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn file_cache_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taxonomy").join("cache.json");
        {
            let mut cache: JsonFileCache<Vec<String>> = JsonFileCache::open(&path).unwrap();
            assert!(cache.is_empty());
            cache
                .put("Escherichia coli", vec!["Escherichia".to_string()])
                .unwrap();
        }
        let reopened: JsonFileCache<Vec<String>> = JsonFileCache::open(&path).unwrap();
        assert_eq!(
            reopened.get("Escherichia coli"),
            Some(vec!["Escherichia".to_string()])
        );
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            JsonFileCache::<f64>::open(&path),
            Err(CacheError::Corrupt { .. })
        ));
    }
}
