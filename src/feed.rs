//! Posts freshness coordinator
//!
//! Decides, for every load, whether the posts screen shows live data, the
//! cached snapshot, or an error. A cycle is split into `begin` (synchronous
//! transition into `Loading`) and `complete` (resolution of the fetch result)
//! so the network call can run on another task while the UI keeps drawing.
//!
//! ```text
//! Idle ──begin──▶ Loading ──ok──▶ Fresh
//!                    │
//!                    └──err──▶ cache non-empty? ──yes──▶ CachedOffline
//!                                               └─no──▶ Error(Network | Api)
//! ```

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::cache::PostsCache;
use crate::data::{filter_posts, ErrorKind, FetchError, Post, PostsSource};

/// Authoritative status of the posts feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    /// Nothing requested yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// Posts came from the network in the last cycle
    Fresh,
    /// The last fetch failed and posts came from the snapshot
    CachedOffline,
    /// The last fetch failed and no snapshot was available
    Error(ErrorKind),
}

/// What triggered a fetch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// First load when the screen opens
    Initial,
    /// User asked to try again after a failure or while offline
    Retry,
    /// Pull-to-refresh; current posts stay visible until resolution
    Refresh,
}

impl FetchMode {
    /// Whether a cycle of this kind may start from `status`
    fn allowed_from(self, status: FeedStatus) -> bool {
        match (self, status) {
            (_, FeedStatus::Loading) => false,
            (FetchMode::Initial, _) => true,
            (FetchMode::Retry, FeedStatus::Error(_) | FeedStatus::CachedOffline) => true,
            (FetchMode::Refresh, FeedStatus::Fresh | FeedStatus::CachedOffline) => true,
            _ => false,
        }
    }
}

/// Coordinator owning the posts shown on screen and their freshness
pub struct PostsFeed {
    source: Arc<dyn PostsSource>,
    cache: Option<PostsCache>,
    posts: Vec<Post>,
    status: FeedStatus,
    error_message: Option<String>,
    offline_banner: bool,
    refreshing: bool,
    search_query: String,
    last_updated: Option<DateTime<Local>>,
}

impl PostsFeed {
    /// Creates an idle feed over `source`, falling back to `cache` on failure
    pub fn new(source: Arc<dyn PostsSource>, cache: Option<PostsCache>) -> Self {
        Self {
            source,
            cache,
            posts: Vec::new(),
            status: FeedStatus::Idle,
            error_message: None,
            offline_banner: false,
            refreshing: false,
            search_query: String::new(),
            last_updated: None,
        }
    }

    /// Shared handle to the remote source, for running a fetch elsewhere
    pub fn source(&self) -> Arc<dyn PostsSource> {
        Arc::clone(&self.source)
    }

    /// Shows the snapshot, if any, before the first fetch resolves
    ///
    /// Status and the offline banner are left alone. Returns whether posts
    /// were loaded.
    pub fn hydrate_from_cache(&mut self) -> bool {
        if !self.posts.is_empty() {
            return false;
        }
        match self.cache.as_ref().and_then(PostsCache::load) {
            Some(cached) if !cached.is_empty() => {
                debug!(count = cached.len(), "Showing cached posts while loading");
                self.posts = cached;
                true
            }
            _ => false,
        }
    }

    /// Enters `Loading` for a cycle of the given kind
    ///
    /// Returns `false`, leaving the state untouched, when the command is not
    /// available in the current status (including while a fetch is in flight).
    pub fn begin(&mut self, mode: FetchMode) -> bool {
        if !mode.allowed_from(self.status) {
            debug!(?mode, status = ?self.status, "Ignoring fetch request");
            return false;
        }

        self.status = FeedStatus::Loading;
        self.error_message = None;
        self.refreshing = mode == FetchMode::Refresh;
        true
    }

    /// Resolves the in-flight cycle with the result of the remote fetch
    pub fn complete(&mut self, result: Result<Vec<Post>, FetchError>) {
        if self.status != FeedStatus::Loading {
            warn!(status = ?self.status, "Dropping fetch result with no cycle in flight");
            return;
        }
        self.refreshing = false;

        match result {
            Ok(posts) => {
                info!(count = posts.len(), "Posts are fresh");
                self.posts = posts;
                self.status = FeedStatus::Fresh;
                self.offline_banner = false;
                self.last_updated = Some(Local::now());
            }
            Err(err) => self.fall_back(err),
        }
    }

    fn fall_back(&mut self, err: FetchError) {
        match self.cache.as_ref().and_then(PostsCache::load) {
            Some(cached) if !cached.is_empty() => {
                info!(count = cached.len(), error = %err, "Serving cached posts");
                self.posts = cached;
                self.status = FeedStatus::CachedOffline;
                self.offline_banner = true;
            }
            _ => {
                let kind = err.kind();
                warn!(?kind, error = %err, "No cached posts to fall back on");
                self.posts.clear();
                self.status = FeedStatus::Error(kind);
                self.error_message = Some(err.to_string());
                self.offline_banner = false;
            }
        }
    }

    /// Runs one full cycle against the source
    ///
    /// Returns `false` when the cycle could not start.
    pub async fn run(&mut self, mode: FetchMode) -> bool {
        if !self.begin(mode) {
            return false;
        }
        let result = self.source.get_all_posts().await;
        self.complete(result);
        true
    }

    /// Opening sequence: show the snapshot, then fetch
    pub async fn mount(&mut self) -> bool {
        self.hydrate_from_cache();
        self.run(FetchMode::Initial).await
    }

    pub fn status(&self) -> FeedStatus {
        self.status
    }

    /// All posts currently displayed, ignoring the search query
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Error class when the feed is in an error state
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self.status {
            FeedStatus::Error(kind) => Some(kind),
            _ => None,
        }
    }

    /// Raw message of the failure behind the current error state
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.status == FeedStatus::Loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn offline_banner_visible(&self) -> bool {
        self.offline_banner
    }

    /// Hides the offline banner without triggering a fetch
    pub fn dismiss_offline_banner(&mut self) {
        self.offline_banner = false;
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Posts matching the current search query
    pub fn visible_posts(&self) -> Vec<&Post> {
        filter_posts(&self.posts, &self.search_query)
    }

    /// When the feed last resolved to fresh data
    pub fn last_updated(&self) -> Option<DateTime<Local>> {
        self.last_updated
    }
}
