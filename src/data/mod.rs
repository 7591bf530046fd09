//! Core data models for Postboard
//!
//! This module contains the post model shared by the remote source, the
//! on-disk snapshot, and the presentation layer.

pub mod posts;

pub use posts::{ErrorKind, FetchError, PostsClient, PostsSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

use serde::{Deserialize, Serialize};

/// One content item returned by `GET /posts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Owning author reference
    #[serde(rename = "userId")]
    pub user_id: u64,
    /// Unique identifier, stable across fetches
    pub id: u64,
    /// Post title, may be empty
    pub title: String,
    /// Post body, may be empty
    pub body: String,
}

impl Post {
    /// Case-insensitive match of an already lowercased needle against title or body
    fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.body.to_lowercase().contains(needle)
    }
}

/// Filters posts whose title or body contains `query`, ignoring case
///
/// A blank query returns every post. Otherwise the query is matched as
/// typed, surrounding whitespace included. Order is preserved.
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    if query.trim().is_empty() {
        return posts.iter().collect();
    }
    let needle = query.to_lowercase();
    posts.iter().filter(|p| p.matches_lowercase(&needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Vec<Post> {
        vec![
            Post {
                user_id: 1,
                id: 1,
                title: "Foo".to_string(),
                body: "bar".to_string(),
            },
            Post {
                user_id: 1,
                id: 2,
                title: "Baz".to_string(),
                body: "qux".to_string(),
            },
        ]
    }

    #[test]
    fn test_post_deserializes_from_wire_format() {
        let json = r#"{"userId": 3, "id": 7, "title": "t", "body": "b"}"#;
        let post: Post = serde_json::from_str(json).expect("Should parse post");

        assert_eq!(post.user_id, 3);
        assert_eq!(post.id, 7);
        assert_eq!(post.title, "t");
        assert_eq!(post.body, "b");
    }

    #[test]
    fn test_post_accepts_empty_text_fields() {
        let json = r#"{"userId": 1, "id": 1, "title": "", "body": ""}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.title.is_empty());
        assert!(post.body.is_empty());
    }

    #[test]
    fn test_post_rejects_null_title() {
        let json = r#"{"userId": 1, "id": 1, "title": null, "body": ""}"#;
        assert!(serde_json::from_str::<Post>(json).is_err());
    }

    #[test]
    fn test_filter_matches_title_ignoring_case() {
        let posts = fixture();
        let result = filter_posts(&posts, "foo");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 1);
    }

    #[test]
    fn test_filter_matches_body() {
        let posts = fixture();
        let result = filter_posts(&posts, "QUX");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, 2);
    }

    #[test]
    fn test_filter_empty_query_returns_all() {
        let posts = fixture();
        assert_eq!(filter_posts(&posts, "").len(), 2);
        assert_eq!(filter_posts(&posts, "   ").len(), 2);
    }

    #[test]
    fn test_filter_keeps_surrounding_whitespace() {
        let posts = fixture();
        assert!(filter_posts(&posts, "foo ").is_empty());
        assert!(filter_posts(&posts, " bar").is_empty());
    }

    #[test]
    fn test_filter_no_match_returns_empty() {
        let posts = fixture();
        assert!(filter_posts(&posts, "zzz").is_empty());
    }

    #[test]
    fn test_filter_preserves_order() {
        let posts = fixture();
        let result = filter_posts(&posts, "a");
        let ids: Vec<u64> = result.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
