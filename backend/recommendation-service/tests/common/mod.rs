#![allow(dead_code)]

use chrono::{Duration, Utc};
use recommendation_service::config::TrendingConfig;
use recommendation_service::db::{InMemoryContentStore, StoredUser};
use recommendation_service::models::{Community, Post, UserProfile};
use uuid::Uuid;

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

pub fn user(name: &str, interests: &[&str], bio: &str) -> StoredUser {
    StoredUser {
        profile: UserProfile {
            id: Uuid::new_v4(),
            interests: strings(interests),
            bio: bio.to_string(),
            ..Default::default()
        },
        username: name.to_string(),
        handle: format!("@{name}"),
        avatar_url: None,
    }
}

/// A post that never qualifies as trending and earns no freshness bonus
pub fn post(author_id: Uuid, tags: &[&str], likes: u32) -> Post {
    Post {
        id: Uuid::new_v4(),
        author_id,
        heading: "Heading".to_string(),
        tldr: "Summary".to_string(),
        description: Some("Body".to_string()),
        tags: strings(tags),
        likes_count: likes,
        dislikes_count: 20,
        comment_count: 0,
        views: 0,
        created_on: Utc::now() - Duration::days(60),
    }
}

pub fn community(name: &str, tags: &[&str], member_count: u32) -> Community {
    Community {
        id: Uuid::new_v4(),
        name: name.to_string(),
        tags: strings(tags),
        member_count,
        created_on: Utc::now() - Duration::days(10),
    }
}

pub fn empty_store() -> InMemoryContentStore {
    InMemoryContentStore::new(TrendingConfig::default())
}
