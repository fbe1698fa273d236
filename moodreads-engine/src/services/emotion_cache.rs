//! Content-addressed analysis cache
//!
//! Keys are SHA-256 digests of the prompt template version, the analysis
//! kind and the exact input text. Values are the parsed JSON documents
//! returned by the analysis service. Entries never expire and are never
//! partially updated.
//!
//! The cache is an explicit object handed to the extractor; the backing
//! store decides persistence. `JsonFileCacheStore` keeps a flat key→JSON
//! mapping on disk, loaded whole at open and rewritten on every write.
//! Concurrent writers to the same file are not supported.

use super::emotion_extractor::PROMPT_TEMPLATE_VERSION;
use moodreads_common::{Error, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// What kind of analysis an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    Description,
    Reviews,
    Query,
    Axis,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKind::Description => "description",
            CacheKind::Reviews => "reviews",
            CacheKind::Query => "query",
            CacheKind::Axis => "axis",
        }
    }
}

/// Deterministic cache key for one analysis input
pub fn cache_key(kind: CacheKind, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(PROMPT_TEMPLATE_VERSION.as_bytes());
    hasher.update(b":");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Cache store contract: flat key→JSON mapping
pub trait CacheStore: Send {
    fn get(&self, key: &str) -> Option<Value>;

    fn put(&mut self, key: &str, value: Value) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process store, nothing persisted
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// JSON file store, flushed on every write
#[derive(Debug)]
pub struct JsonFileCacheStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileCacheStore {
    /// Open (or create on first write) the cache file at `path`
    ///
    /// A corrupt file is logged and replaced on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, Value>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cache file unreadable, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        info!(path = %path.display(), count = entries.len(), "Loaded analysis cache");

        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write atomically: temp file then rename
    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl CacheStore for JsonFileCacheStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Analysis cache shared by the extractor
pub struct EmotionCache {
    store: Mutex<Box<dyn CacheStore>>,
}

impl EmotionCache {
    pub fn new(store: Box<dyn CacheStore>) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryCacheStore::new()))
    }

    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Box::new(JsonFileCacheStore::open(path)?)))
    }

    pub fn get(&self, kind: CacheKind, text: &str) -> Option<Value> {
        let key = cache_key(kind, text);
        let hit = self.lock().get(&key);
        if hit.is_some() {
            debug!(kind = kind.as_str(), "Analysis cache hit");
        }
        hit
    }

    pub fn put(&self, kind: CacheKind, text: &str, value: Value) -> Result<()> {
        let key = cache_key(kind, text);
        self.lock()
            .put(&key, value)
            .map_err(|e| Error::Internal(format!("Cache write failed: {}", e)))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn CacheStore>> {
        // A panic while holding the lock leaves the map intact
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cache_key_deterministic_and_kind_sensitive() {
        let a = cache_key(CacheKind::Description, "a quiet book");
        let b = cache_key(CacheKind::Description, "a quiet book");
        let c = cache_key(CacheKind::Reviews, "a quiet book");
        let d = cache_key(CacheKind::Description, "a quiet book ");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_memory_cache_get_put() {
        let cache = EmotionCache::in_memory();
        assert!(cache.get(CacheKind::Query, "calm").is_none());

        cache.put(CacheKind::Query, "calm", json!({"primary_emotions": []})).unwrap();
        assert_eq!(cache.get(CacheKind::Query, "calm"), Some(json!({"primary_emotions": []})));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_file_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("emotion_cache.json");

        {
            let cache = EmotionCache::open_file(&path).unwrap();
            cache
                .put(CacheKind::Description, "desc", json!({"overall_emotional_profile": "x"}))
                .unwrap();
        }

        let reopened = EmotionCache::open_file(&path).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(
            reopened.get(CacheKind::Description, "desc"),
            Some(json!({"overall_emotional_profile": "x"}))
        );
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("emotion_cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = JsonFileCacheStore::open(&path).unwrap();
        assert!(store.is_empty());
    }
}
