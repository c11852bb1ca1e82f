//! Data models for recommendation-service
//!
//! Entities are read-only snapshots fetched per request. The `db` layer is
//! responsible for normalising raw rows into these types, so scoring code can
//! rely on every field being present and non-negative.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Output category produced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    Posts,
    Communities,
    Users,
}

impl Pipeline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pipeline::Posts => "posts",
            Pipeline::Communities => "communities",
            Pipeline::Users => "users",
        }
    }
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Profile of the user asking for recommendations
#[derive(Debug, Clone, Default)]
pub struct UserProfile {
    pub id: Uuid,
    /// Interest terms, deduplicated, in the order the user picked them
    pub interests: Vec<String>,
    pub following: HashSet<Uuid>,
    pub bio: String,
    /// Posts consumed during the current streak window
    pub recently_read_posts: HashSet<Uuid>,
}

impl UserProfile {
    pub fn interest_set(&self) -> HashSet<&str> {
        self.interests.iter().map(String::as_str).collect()
    }
}

/// Candidate post
#[derive(Debug, Clone)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub heading: String,
    pub tldr: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub likes_count: u32,
    pub dislikes_count: u32,
    pub comment_count: u32,
    pub views: u32,
    pub created_on: DateTime<Utc>,
}

/// Candidate community
#[derive(Debug, Clone)]
pub struct Community {
    pub id: Uuid,
    pub name: String,
    pub tags: Vec<String>,
    pub member_count: u32,
    pub created_on: DateTime<Utc>,
}

/// Another user who may be suggested to the requester
#[derive(Debug, Clone)]
pub struct CandidateUser {
    pub id: Uuid,
    pub username: String,
    pub handle: String,
    pub avatar_url: Option<String>,
    pub interests: Vec<String>,
    pub bio: String,
}

/// Entity carried together with the score computed for it
#[derive(Debug, Clone)]
pub struct Scored<T> {
    pub item: T,
    pub score: i64,
}

impl<T> Scored<T> {
    pub fn new(item: T, score: i64) -> Self {
        Self { item, score }
    }
}

/// Quotas requested by the caller. `None` skips the category entirely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default, rename = "posts")]
    pub max_posts: Option<i64>,
    #[serde(default, rename = "communities")]
    pub max_communities: Option<i64>,
    #[serde(default, rename = "users")]
    pub max_users: Option<i64>,
}

impl RecommendationRequest {
    pub fn posts(n: i64) -> Self {
        Self {
            max_posts: Some(n),
            ..Default::default()
        }
    }

    pub fn communities(n: i64) -> Self {
        Self {
            max_communities: Some(n),
            ..Default::default()
        }
    }

    pub fn users(n: i64) -> Self {
        Self {
            max_users: Some(n),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecommendation {
    pub post_id: Uuid,
    pub heading: String,
    pub tldr: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub likes: u32,
    pub dislikes: u32,
    pub comments_count: u32,
    pub views: u32,
    /// ISO-8601 timestamp
    pub created_on: String,
}

impl From<Post> for PostRecommendation {
    fn from(post: Post) -> Self {
        Self {
            post_id: post.id,
            heading: post.heading,
            tldr: post.tldr,
            description: post.description,
            tags: post.tags,
            likes: post.likes_count,
            dislikes: post.dislikes_count,
            comments_count: post.comment_count,
            views: post.views,
            created_on: post.created_on.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecommendation {
    pub community_id: Uuid,
    pub community_name: String,
    pub tags: Vec<String>,
    pub member_count: u32,
}

impl From<Community> for CommunityRecommendation {
    fn from(community: Community) -> Self {
        Self {
            community_id: community.id,
            community_name: community.name,
            tags: community.tags,
            member_count: community.member_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecommendation {
    pub username: String,
    pub handle: String,
    pub profile_picture: String,
}

impl From<CandidateUser> for UserRecommendation {
    fn from(user: CandidateUser) -> Self {
        Self {
            username: user.username,
            handle: user.handle,
            profile_picture: user.avatar_url.unwrap_or_default(),
        }
    }
}

/// Aggregated engine output. Only requested categories are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_posts: Option<Vec<PostRecommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_communities: Option<Vec<CommunityRecommendation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_users: Option<Vec<UserRecommendation>>,
}
