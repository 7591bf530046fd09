//! Cache module for persisting data to disk
//!
//! This module provides a key-value store backed by the filesystem and the
//! posts snapshot built on top of it. Reads never fail loudly: a missing or
//! corrupt value is reported as "no cache" so callers can degrade gracefully
//! when the network is unavailable.

mod manager;
mod posts;

pub use manager::{CacheError, CacheManager};
pub use posts::{PostsCache, POSTS_CACHE_KEY, POSTS_CACHE_TIMESTAMP_KEY};
