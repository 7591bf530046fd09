//! Snapshot of the last successfully fetched posts
//!
//! The collection and its capture time live under two separate keys. The
//! snapshot is best-effort: a failed timestamp write after a successful data
//! write leaves the new collection in place with a stale timestamp.

use chrono::Utc;
use tracing::{debug, warn};

use super::manager::{CacheError, CacheManager};
use crate::data::Post;

/// Key holding the serialized post collection (JSON array)
pub const POSTS_CACHE_KEY: &str = "posts_cache";

/// Key holding the capture time in milliseconds since epoch
pub const POSTS_CACHE_TIMESTAMP_KEY: &str = "posts_cache_timestamp";

/// Persistent store for the posts snapshot
#[derive(Debug, Clone)]
pub struct PostsCache {
    store: CacheManager,
}

impl PostsCache {
    pub fn new(store: CacheManager) -> Self {
        Self { store }
    }

    /// Replaces the snapshot with `posts` and stamps it with the current time
    pub fn save(&self, posts: &[Post]) -> Result<(), CacheError> {
        let json = serde_json::to_string(posts)?;
        self.store.set_item(POSTS_CACHE_KEY, &json)?;

        let now_ms = Utc::now().timestamp_millis();
        self.store
            .set_item(POSTS_CACHE_TIMESTAMP_KEY, &now_ms.to_string())?;

        debug!(count = posts.len(), timestamp = now_ms, "Saved posts snapshot");
        Ok(())
    }

    /// Loads the last saved collection
    ///
    /// A missing, unreadable, or corrupt snapshot yields `None`.
    pub fn load(&self) -> Option<Vec<Post>> {
        let json = match self.store.get_item(POSTS_CACHE_KEY) {
            Ok(json) => json?,
            Err(e) => {
                warn!(error = %e, "Could not read posts snapshot");
                return None;
            }
        };

        match serde_json::from_str(&json) {
            Ok(posts) => Some(posts),
            Err(e) => {
                warn!(error = %e, "Discarding corrupt posts snapshot");
                None
            }
        }
    }

    /// Capture time of the last save, in milliseconds since epoch
    pub fn cache_timestamp(&self) -> Option<i64> {
        let raw = match self.store.get_item(POSTS_CACHE_TIMESTAMP_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Could not read posts snapshot timestamp");
                return None;
            }
        };
        raw.trim().parse().ok()
    }

    /// Removes the snapshot and its timestamp
    ///
    /// Failures are logged and otherwise ignored.
    pub fn clear(&self) {
        for key in [POSTS_CACHE_KEY, POSTS_CACHE_TIMESTAMP_KEY] {
            if let Err(e) = self.store.remove_item(key) {
                warn!(key, error = %e, "Failed to clear cache entry");
            }
        }
    }
}
