//! Disk-backed response cache
//!
//! Stores raw JSON payloads keyed by request signature. Freshness is derived
//! from the file's modification time and judged against a TTL supplied by
//! each caller, so the same entry can be fresh for one operation and stale
//! for another. Every failure degrades to a miss or a dropped write.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::RequestSignature;

/// A key/value store for raw API responses
///
/// Neither method can fail from the caller's point of view: a read error is a
/// miss and a write error is a no-op.
pub trait CacheStore: Send + Sync {
    /// Returns the payload stored for `signature` if it is younger than `ttl`
    ///
    /// A zero `ttl` always misses.
    fn get(&self, signature: &RequestSignature, ttl: Duration) -> Option<Value>;

    /// Stores `payload` for `signature`, replacing any previous entry
    fn put(&self, signature: &RequestSignature, payload: &Value);
}

impl<C: CacheStore + ?Sized> CacheStore for Box<C> {
    fn get(&self, signature: &RequestSignature, ttl: Duration) -> Option<Value> {
        (**self).get(signature, ttl)
    }

    fn put(&self, signature: &RequestSignature, payload: &Value) {
        (**self).put(signature, payload)
    }
}

/// A cached payload together with the time it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The raw JSON payload, exactly as it was fetched
    pub payload: Value,
    /// When the entry was written
    pub stored_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Whether the entry is still within `ttl` at `now`
    ///
    /// Entries stamped in the future count as fresh.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        if ttl.is_zero() {
            return false;
        }
        match now.signed_duration_since(self.stored_at).to_std() {
            Ok(age) => age <= ttl,
            Err(_) => true,
        }
    }
}

/// Cache that stores one `<sha256>.json` file per signature in a directory
#[derive(Debug, Clone)]
pub struct DiskCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl DiskCache {
    /// Creates a cache rooted at `cache_dir`; the directory is created on first write
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Directory where cache files are stored
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the cache file for the given signature
    pub fn entry_path(&self, signature: &RequestSignature) -> PathBuf {
        self.cache_dir.join(format!("{}.json", signature.cache_key()))
    }

    /// Reads an entry regardless of its age
    ///
    /// Returns `None` if the file is missing, unreadable, or not valid JSON.
    pub fn read_entry(&self, signature: &RequestSignature) -> Option<CacheEntry> {
        let path = self.entry_path(signature);
        let result = (|| -> std::io::Result<CacheEntry> {
            let modified = fs::metadata(&path)?.modified()?;
            let content = fs::read_to_string(&path)?;
            let payload = serde_json::from_str(&content)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            Ok(CacheEntry {
                payload,
                stored_at: DateTime::<Utc>::from(modified),
            })
        })();

        match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::debug!(path = %path.display(), error = %e, "ignoring unreadable cache entry");
                }
                None
            }
        }
    }

    /// Writes an entry, propagating I/O errors
    fn write_entry(&self, signature: &RequestSignature, payload: &Value) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        let json = serde_json::to_string(payload)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(self.entry_path(signature), json)
    }
}

impl CacheStore for DiskCache {
    fn get(&self, signature: &RequestSignature, ttl: Duration) -> Option<Value> {
        if ttl.is_zero() {
            return None;
        }
        let entry = self.read_entry(signature)?;
        if entry.is_fresh(ttl, Utc::now()) {
            Some(entry.payload)
        } else {
            tracing::debug!(signature = %signature, stored_at = %entry.stored_at, "cache entry expired");
            None
        }
    }

    fn put(&self, signature: &RequestSignature, payload: &Value) {
        if let Err(e) = self.write_entry(signature, payload) {
            tracing::debug!(dir = %self.cache_dir.display(), error = %e, "cache write dropped");
        }
    }
}

/// Cache that never stores anything
///
/// Used when no cache directory can be determined.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl CacheStore for NoopCache {
    fn get(&self, _signature: &RequestSignature, _ttl: Duration) -> Option<Value> {
        None
    }

    fn put(&self, _signature: &RequestSignature, _payload: &Value) {}
}
