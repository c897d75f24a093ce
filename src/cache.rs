// Time-boxed reuse of loaded tables.
//
// Entries are keyed by a fingerprint of the file location and its bytes, so
// an edited file is reloaded even inside the TTL window.
use crate::error::Result;
use crate::loader::load_bytes;
use crate::types::RawTable;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_TTL_SECS: i64 = 600;
/// Longest TTL the command line accepts: one week.
pub const MAX_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone)]
struct CacheEntry {
    loaded_at: DateTime<Utc>,
    table: RawTable,
}

#[derive(Debug)]
pub struct TableCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl Default for TableCache {
    fn default() -> Self {
        TableCache::new(Duration::seconds(DEFAULT_TTL_SECS))
    }
}

impl TableCache {
    pub fn new(ttl: Duration) -> Self {
        TableCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get_or_load(&mut self, path: &Path) -> Result<RawTable> {
        self.get_or_load_at(path, Utc::now())
    }

    /// Same as `get_or_load` with an explicit clock.
    pub fn get_or_load_at(&mut self, path: &Path, now: DateTime<Utc>) -> Result<RawTable> {
        let bytes = std::fs::read(path)?;
        let key = fingerprint(path, &bytes);
        self.evict_expired(now);

        if let Some(entry) = self.entries.get(&key) {
            debug!("cache hit for {} ({})", path.display(), key);
            return Ok(entry.table.clone());
        }

        let table = load_bytes(path, &bytes)?;
        self.entries.insert(
            key,
            CacheEntry {
                loaded_at: now,
                table: table.clone(),
            },
        );
        Ok(table)
    }

    fn evict_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries.retain(|_, e| now - e.loaded_at < ttl);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!("evicted {} expired table(s)", evicted);
        }
    }
}

/// Short SHA-256 digest of the path and file contents.
pub fn fingerprint(path: &Path, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    hasher.update([0u8]);
    hasher.update(bytes);
    let hash = format!("{:x}", hasher.finalize());
    hash[..16].to_string()
}
