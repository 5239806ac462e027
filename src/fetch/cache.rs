//! Content-addressed response cache
//!
//! Responses are stored one file per key under a configured directory. Keys
//! are derived from the fully resolved request: the URL string plus the
//! canonically ordered query parameters supplied alongside it, so two
//! requests that differ only in their parameter set never collide. Entries
//! older than the TTL are treated as absent; nothing evicts stale files,
//! they simply stay on disk until overwritten.

use crate::fetch::FetchResult;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Content address of one cached response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Computes the key for a request
    ///
    /// Hashes the exact URL string followed by each `key=value` parameter
    /// pair. The parameter map is ordered, so the same parameter set always
    /// produces the same key regardless of how it was assembled.
    pub fn for_request(url: &Url, params: &BTreeMap<String, String>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        for (key, value) in params {
            hasher.update([0]);
            hasher.update(key.as_bytes());
            hasher.update([b'=']);
            hasher.update(value.as_bytes());
        }
        CacheKey(hex::encode(hasher.finalize()))
    }

    /// Hex digest backing this key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Persisted form of one cached response
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    url: String,
    status_code: u16,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    text: String,
    /// Write time in epoch seconds
    #[serde(default)]
    timestamp: i64,
}

/// TTL-bounded, file-per-key store of fetch results
#[derive(Debug)]
pub struct ResponseCache {
    dir: PathBuf,
    ttl_seconds: i64,
}

impl ResponseCache {
    /// Opens a cache under `dir`, creating the directory if absent
    pub fn new(dir: &Path, ttl_seconds: i64) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            ttl_seconds,
        })
    }

    fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }

    /// Looks up a response by key
    ///
    /// Misses when no entry exists, the entry is older than the TTL, or the
    /// file cannot be read back. A miss never mutates the store.
    pub fn get(&self, key: &CacheKey) -> Option<FetchResult> {
        let path = self.entry_path(key);
        let raw = std::fs::read_to_string(&path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("ignoring unreadable cache entry {}: {}", path.display(), e);
                return None;
            }
        };

        let age = chrono::Utc::now().timestamp() - entry.timestamp;
        if age > self.ttl_seconds {
            return None;
        }

        Some(FetchResult {
            url: entry.url,
            status_code: entry.status_code,
            headers: entry.headers,
            body: entry.text,
            from_cache: true,
        })
    }

    /// Stores a response under `key`, overwriting any existing entry
    pub fn set(&self, key: &CacheKey, result: &FetchResult) -> std::io::Result<()> {
        let entry = CacheEntry {
            url: result.url.clone(),
            status_code: result.status_code,
            headers: result.headers.clone(),
            text: result.body.clone(),
            timestamp: chrono::Utc::now().timestamp(),
        };

        let payload = serde_json::to_string(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(self.entry_path(key), payload)
    }
}
