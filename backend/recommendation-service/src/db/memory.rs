/// In-process content store over a fixed snapshot.
///
/// Mirrors the filtering and ordering of [`super::PgContentStore`] so the
/// engine can be exercised end to end without a database.
use super::{is_trending, ContentStore, Result};
use crate::config::TrendingConfig;
use crate::models::{CandidateUser, Community, Post, UserProfile};
use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

/// A user row: the private profile plus the public display fields
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub profile: UserProfile,
    pub username: String,
    pub handle: String,
    pub avatar_url: Option<String>,
}

impl StoredUser {
    fn as_candidate(&self) -> CandidateUser {
        CandidateUser {
            id: self.profile.id,
            username: self.username.clone(),
            handle: self.handle.clone(),
            avatar_url: self.avatar_url.clone(),
            interests: self.profile.interests.clone(),
            bio: self.profile.bio.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryContentStore {
    users: Vec<StoredUser>,
    posts: Vec<Post>,
    communities: Vec<Community>,
    trending: TrendingConfig,
}

impl InMemoryContentStore {
    pub fn new(trending: TrendingConfig) -> Self {
        Self {
            trending,
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user: StoredUser) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_post(mut self, post: Post) -> Self {
        self.posts.push(post);
        self
    }

    pub fn with_community(mut self, community: Community) -> Self {
        self.communities.push(community);
        self
    }
}

fn limit_to_len(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(0)
}

fn shares_any(values: &[String], wanted: &HashSet<&str>) -> bool {
    values.iter().any(|v| wanted.contains(v.as_str()))
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.profile.id == user_id)
            .map(|u| u.profile.clone()))
    }

    async fn find_posts_by_tags(&self, tags: &[String], limit: i64) -> Result<Vec<Post>> {
        let wanted: HashSet<&str> = tags.iter().map(String::as_str).collect();
        Ok(self
            .posts
            .iter()
            .filter(|p| shares_any(&p.tags, &wanted))
            .take(limit_to_len(limit))
            .cloned()
            .collect())
    }

    async fn find_posts_by_authors(&self, author_ids: &[Uuid], limit: i64) -> Result<Vec<Post>> {
        Ok(self
            .posts
            .iter()
            .filter(|p| author_ids.contains(&p.author_id))
            .take(limit_to_len(limit))
            .cloned()
            .collect())
    }

    async fn find_trending_posts(&self, limit: i64) -> Result<Vec<Post>> {
        let mut trending: Vec<Post> = self
            .posts
            .iter()
            .filter(|p| is_trending(p, &self.trending))
            .cloned()
            .collect();
        trending.sort_by(|a, b| b.likes_count.cmp(&a.likes_count));
        trending.truncate(limit_to_len(limit));
        Ok(trending)
    }

    async fn find_communities_by_tags(
        &self,
        tags: &[String],
        limit: i64,
    ) -> Result<Vec<Community>> {
        let wanted: HashSet<&str> = tags.iter().map(String::as_str).collect();
        let mut matching: Vec<Community> = self
            .communities
            .iter()
            .filter(|c| shares_any(&c.tags, &wanted))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.member_count
                .cmp(&a.member_count)
                .then_with(|| b.created_on.cmp(&a.created_on))
        });
        matching.truncate(limit_to_len(limit));
        Ok(matching)
    }

    async fn find_candidate_users(
        &self,
        requester_id: Uuid,
        interests: &[String],
        limit: i64,
    ) -> Result<Vec<CandidateUser>> {
        let wanted: HashSet<&str> = interests.iter().map(String::as_str).collect();
        let terms: Vec<String> = interests.iter().map(|i| i.to_lowercase()).collect();

        Ok(self
            .users
            .iter()
            .filter(|u| u.profile.id != requester_id)
            .filter(|u| {
                let bio = u.profile.bio.to_lowercase();
                shares_any(&u.profile.interests, &wanted)
                    || terms.iter().any(|t| bio.contains(t.as_str()))
            })
            .take(limit_to_len(limit))
            .map(StoredUser::as_candidate)
            .collect())
    }
}
