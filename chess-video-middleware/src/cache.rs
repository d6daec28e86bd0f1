//! The persistent enrichment cache.
//!
//! Combines an in-memory `moka` cache (fast repeated lookups within a run) with a
//! single on-disk JSON file, written atomically (write to a sibling temp file, then
//! rename) so a crash never leaves readers observing a partial file.
//!
//! The on-disk shape is a nested `{meta, entries}` object rather than mixing metadata
//! fields into the same namespace as video-id keys, so a video id can never collide
//! with a metadata field name.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chess_video_core::{EnrichedVideo, PipelineError};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};

/// On-disk metadata accompanying the cache entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMeta {
    /// When the file was last written.
    pub last_updated: DateTime<Utc>,
    /// Schema version, bumped if the on-disk shape changes incompatibly.
    pub version: u32,
}

impl Default for CacheMeta {
    fn default() -> Self {
        Self {
            last_updated: Utc::now(),
            version: 1,
        }
    }
}

/// The on-disk document shape: `{meta, entries}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheFile {
    meta: CacheMeta,
    entries: HashMap<String, EnrichedVideo>,
}

/// Persistent, TTL-bounded cache of `video id -> EnrichedVideo`.
pub struct EnrichmentCache {
    path: PathBuf,
    ttl: Duration,
    hot: Cache<String, EnrichedVideo>,
}

impl EnrichmentCache {
    /// Load the cache from `path`, or start empty if the file is missing or
    /// unreadable.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let hot = Cache::builder().time_to_live(ttl).build();
        let cache = Self { path, ttl, hot };
        if let Ok(contents) = fs::read_to_string(&cache.path)
            && let Ok(file) = serde_json::from_str::<CacheFile>(&contents)
        {
            for (id, video) in file.entries {
                cache.hot.blocking().insert(id, video);
            }
        }
        cache
    }

    /// True when `indexed_at` (RFC 3339) is within the configured TTL of `now`.
    #[must_use]
    pub fn is_fresh(&self, indexed_at: &str, now: DateTime<Utc>) -> bool {
        let Ok(indexed_at) = DateTime::parse_from_rfc3339(indexed_at) else {
            return false;
        };
        let age = now.signed_duration_since(indexed_at);
        age.to_std().is_ok_and(|age| age < self.ttl)
    }

    /// Look up a cached entry, honoring the TTL.
    pub async fn get(&self, video_id: &str, now: DateTime<Utc>) -> Option<EnrichedVideo> {
        let entry = self.hot.get(video_id).await?;
        if self.is_fresh(&entry.metadata.indexed_at, now) {
            Some(entry)
        } else {
            self.hot.invalidate(video_id).await;
            None
        }
    }

    /// Insert or refresh a cached entry.
    pub async fn insert(&self, video_id: String, video: EnrichedVideo) {
        self.hot.insert(video_id, video).await;
    }

    /// Atomically persist the current in-memory contents to disk.
    ///
    /// Writes to a sibling `.tmp` file and renames over the target, so concurrent
    /// readers never observe a partially written file. Ensures the parent directory
    /// exists first.
    ///
    /// # Errors
    /// Returns [`PipelineError::Io`] if the directory cannot be created or the
    /// temp-file write/rename fails.
    pub async fn persist(&self) -> Result<(), PipelineError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent.display(), e))?;
        }

        let mut entries = HashMap::new();
        for (id, video) in self.hot.iter() {
            entries.insert((*id).clone(), video);
        }
        let file = CacheFile {
            meta: CacheMeta {
                last_updated: Utc::now(),
                version: 1,
            },
            entries,
        };
        let serialized = serde_json::to_string_pretty(&file)
            .map_err(|e| PipelineError::io(self.path.display(), e))?;

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, serialized).map_err(|e| PipelineError::io(tmp.display(), e))?;
        fs::rename(&tmp, &self.path).map_err(|e| PipelineError::io(self.path.display(), e))?;
        Ok(())
    }

    /// Number of entries currently held in memory.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.hot.entry_count()
    }

    /// True if the in-memory cache currently holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
