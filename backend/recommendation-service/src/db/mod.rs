//! Read-only data access for the recommendation engine
//!
//! The engine never writes. Everything it needs is expressed through
//! [`ContentStore`], which is implemented for Postgres ([`PgContentStore`])
//! and for in-process snapshots ([`InMemoryContentStore`]).

mod memory;
mod pg_store;

pub use memory::{InMemoryContentStore, StoredUser};
pub use pg_store::{create_pool, PgContentStore};

use crate::config::TrendingConfig;
use crate::models::{CandidateUser, Community, Post, UserProfile};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Data source unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Query interface the engine consumes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Load the requester's profile, `None` when the id does not resolve
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>>;

    /// Posts whose tags intersect `tags`
    async fn find_posts_by_tags(&self, tags: &[String], limit: i64) -> Result<Vec<Post>>;

    /// Posts written by any of `author_ids`
    async fn find_posts_by_authors(&self, author_ids: &[Uuid], limit: i64) -> Result<Vec<Post>>;

    /// Posts matching the trending predicate, most liked first
    async fn find_trending_posts(&self, limit: i64) -> Result<Vec<Post>>;

    /// Communities whose tags intersect `tags`, ordered by member count then recency
    async fn find_communities_by_tags(&self, tags: &[String], limit: i64)
        -> Result<Vec<Community>>;

    /// Users other than `requester_id` sharing an interest or mentioning one in their bio
    async fn find_candidate_users(
        &self,
        requester_id: Uuid,
        interests: &[String],
        limit: i64,
    ) -> Result<Vec<CandidateUser>>;
}

/// Trending predicate shared by every store implementation.
///
/// NOTE: `dislikes <= max_dislikes` is an OR branch, so a post with no likes
/// and no views still qualifies as long as it has few dislikes.
pub fn is_trending(post: &Post, criteria: &TrendingConfig) -> bool {
    post.likes_count >= criteria.min_likes
        || post.dislikes_count <= criteria.max_dislikes
        || post.views >= criteria.min_views
}

/// Drop blank entries and repeated values, keeping first occurrences.
pub(crate) fn normalize_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    terms
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Clamp a signed store counter into the non-negative domain range
pub(crate) fn clamp_count(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn post(likes: u32, dislikes: u32, views: u32) -> Post {
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            heading: String::new(),
            tldr: String::new(),
            description: None,
            tags: vec![],
            likes_count: likes,
            dislikes_count: dislikes,
            comment_count: 0,
            views,
            created_on: Utc::now(),
        }
    }

    #[test]
    fn test_trending_by_likes_or_views() {
        let criteria = TrendingConfig::default();
        assert!(is_trending(&post(50, 500, 0), &criteria));
        assert!(is_trending(&post(0, 500, 100), &criteria));
        assert!(!is_trending(&post(49, 11, 99), &criteria));
    }

    #[test]
    fn test_low_dislikes_alone_qualifies_as_trending() {
        // Documents current behaviour: zero engagement still counts as trending.
        let criteria = TrendingConfig::default();
        assert!(is_trending(&post(0, 0, 0), &criteria));
        assert!(is_trending(&post(0, 10, 0), &criteria));
    }

    #[test]
    fn test_normalize_terms() {
        let terms = vec![
            "rust".to_string(),
            " ".to_string(),
            "go".to_string(),
            "rust".to_string(),
            " python ".to_string(),
        ];
        assert_eq!(normalize_terms(terms), vec!["rust", "go", "python"]);
    }

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(-3), 0);
        assert_eq!(clamp_count(42), 42);
        assert_eq!(clamp_count(i64::MAX), u32::MAX);
    }
}
