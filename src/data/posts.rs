//! Posts API client
//!
//! Fetches the post collection from a JSONPlaceholder-style REST API,
//! classifies failures, and writes successful responses through to the
//! on-disk snapshot.

use async_trait::async_trait;
use reqwest::{header, Client};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::Post;
use crate::cache::PostsCache;

/// Base URL of the public posts API
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Upper bound on a single request, including reading the body
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Errors that can occur when fetching posts
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("Request timeout. Please check your internet connection.")]
    Timeout,

    /// The request never produced a response (DNS, connect, transport)
    #[error("No internet connection. Please check your network settings.")]
    NetworkUnreachable,

    /// The server answered with a non-success status
    #[error("API Error: {status} - {status_text}")]
    Api { status: u16, status_text: String },

    /// Any other failure, including an undecodable body
    #[error("An unexpected error occurred. Please try again.")]
    Unexpected(String),
}

/// Two-bucket classification shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Api,
}

impl ErrorKind {
    /// Title shown on the error screen
    pub fn headline(self) -> &'static str {
        match self {
            ErrorKind::Network => "No Internet Connection",
            ErrorKind::Api => "Oops! Something went wrong",
        }
    }

    /// One-line guidance shown under the headline
    pub fn advice(self) -> &'static str {
        match self {
            ErrorKind::Network => "Please check your internet connection and try again.",
            ErrorKind::Api => {
                "We encountered an issue while loading posts. Please try again later."
            }
        }
    }
}

impl FetchError {
    /// Maps the failure onto the user-visible error class
    ///
    /// `Unexpected` lands in the API bucket even when no response exists.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Timeout | FetchError::NetworkUnreachable => ErrorKind::Network,
            FetchError::Api { .. } | FetchError::Unexpected(_) => ErrorKind::Api,
        }
    }

    /// Classifies an error raised while sending or reading a request
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Unexpected(err.to_string())
        } else {
            FetchError::NetworkUnreachable
        }
    }
}

/// Anything that can produce the current post collection
#[async_trait]
pub trait PostsSource: Send + Sync {
    async fn get_all_posts(&self) -> Result<Vec<Post>, FetchError>;
}

/// Client for fetching posts over HTTP
#[derive(Debug, Clone)]
pub struct PostsClient {
    /// HTTP client carrying the request timeout
    http_client: Client,
    /// Snapshot updated after every successful fetch
    cache: Option<PostsCache>,
    /// Base URL for the API (allows override for testing)
    base_url: String,
}

impl PostsClient {
    /// Creates a client for `base_url` with the given request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unexpected(e.to_string()))?;

        Ok(Self {
            http_client,
            cache: None,
            base_url: base_url.into(),
        })
    }

    /// Attaches the snapshot used for write-through
    pub fn with_cache(mut self, cache: PostsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    fn posts_url(&self) -> String {
        format!("{}/posts", self.base_url.trim_end_matches('/'))
    }

    /// Performs `GET /posts` without touching the cache
    async fn fetch_from_api(&self) -> Result<Vec<Post>, FetchError> {
        let url = self.posts_url();
        debug!(%url, "Requesting posts");

        let response = self
            .http_client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response
            .json::<Vec<Post>>()
            .await
            .map_err(FetchError::from_transport)
    }
}

#[async_trait]
impl PostsSource for PostsClient {
    async fn get_all_posts(&self) -> Result<Vec<Post>, FetchError> {
        let posts = match self.fetch_from_api().await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(error = ?e, "Posts request failed");
                return Err(e);
            }
        };

        if let Some(dup) = first_duplicate_id(&posts) {
            warn!(id = dup, "Posts response contains a duplicate id");
        }

        if let Some(ref cache) = self.cache {
            if let Err(e) = cache.save(&posts) {
                warn!(error = %e, "Failed to write posts snapshot");
            }
        }

        info!(count = posts.len(), "Fetched posts");
        Ok(posts)
    }
}

fn first_duplicate_id(posts: &[Post]) -> Option<u64> {
    let mut seen = HashSet::with_capacity(posts.len());
    posts.iter().map(|p| p.id).find(|id| !seen.insert(*id))
}
