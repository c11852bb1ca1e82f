/// Postgres-backed content store
///
/// Reads tables owned by identity-service (users, follows), content-service
/// (posts, read history) and social-service (communities). All queries are
/// plain SELECTs.
use super::{clamp_count, normalize_terms, ContentStore, Result};
use crate::config::{DatabaseConfig, TrendingConfig};
use crate::models::{CandidateUser, Community, Post, UserProfile};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Create and verify the connection pool
pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    debug!(
        "Creating database pool: max={}, acquire_timeout={}s",
        config.max_connections, config.acquire_timeout_secs
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!("Database pool created and verified successfully");

    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct UserProfileRow {
    id: Uuid,
    interests: Option<Vec<String>>,
    bio: Option<String>,
    following: Vec<Uuid>,
    recently_read_posts: Vec<Uuid>,
}

impl From<UserProfileRow> for UserProfile {
    fn from(row: UserProfileRow) -> Self {
        Self {
            id: row.id,
            interests: normalize_terms(row.interests.unwrap_or_default()),
            following: row.following.into_iter().collect(),
            bio: row.bio.unwrap_or_default(),
            recently_read_posts: row.recently_read_posts.into_iter().collect(),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    heading: String,
    tldr: Option<String>,
    description: Option<String>,
    tags: Option<Vec<String>>,
    likes_count: i64,
    dislikes_count: i64,
    comments_count: i64,
    views: Option<i64>,
    created_on: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            author_id: row.user_id,
            heading: row.heading,
            tldr: row.tldr.unwrap_or_default(),
            description: row.description,
            tags: normalize_terms(row.tags.unwrap_or_default()),
            likes_count: clamp_count(row.likes_count),
            dislikes_count: clamp_count(row.dislikes_count),
            comment_count: clamp_count(row.comments_count),
            views: clamp_count(row.views.unwrap_or(0)),
            created_on: row.created_on,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommunityRow {
    id: Uuid,
    name: String,
    tags: Option<Vec<String>>,
    member_count: i64,
    created_on: DateTime<Utc>,
}

impl From<CommunityRow> for Community {
    fn from(row: CommunityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            tags: normalize_terms(row.tags.unwrap_or_default()),
            member_count: clamp_count(row.member_count),
            created_on: row.created_on,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CandidateUserRow {
    id: Uuid,
    username: String,
    handle: String,
    profile_picture_url: Option<String>,
    interests: Option<Vec<String>>,
    bio: Option<String>,
}

impl From<CandidateUserRow> for CandidateUser {
    fn from(row: CandidateUserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            handle: row.handle,
            avatar_url: row.profile_picture_url.filter(|url| !url.is_empty()),
            interests: normalize_terms(row.interests.unwrap_or_default()),
            bio: row.bio.unwrap_or_default(),
        }
    }
}

const POST_COLUMNS: &str = "id, user_id, heading, tldr, description, tags, \
     likes_count::bigint AS likes_count, dislikes_count::bigint AS dislikes_count, \
     comments_count::bigint AS comments_count, views::bigint AS views, created_on";

pub struct PgContentStore {
    pool: PgPool,
    trending: TrendingConfig,
}

impl PgContentStore {
    pub fn new(pool: PgPool, trending: TrendingConfig) -> Self {
        Self { pool, trending }
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn get_user(&self, user_id: Uuid) -> Result<Option<UserProfile>> {
        let row = sqlx::query_as::<_, UserProfileRow>(
            r#"
            SELECT u.id, u.interests, u.bio,
                   ARRAY(SELECT f.followee_id FROM user_follows f
                         WHERE f.follower_id = u.id) AS following,
                   ARRAY(SELECT r.post_id FROM user_read_posts r
                         WHERE r.user_id = u.id) AS recently_read_posts
            FROM users u
            WHERE u.id = $1 AND u.deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserProfile::from))
    }

    async fn find_posts_by_tags(&self, tags: &[String], limit: i64) -> Result<Vec<Post>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE tags && $1::text[] AND deleted_at IS NULL \
             ORDER BY created_on DESC, id \
             LIMIT $2"
        );

        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(tags)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_posts_by_authors(&self, author_ids: &[Uuid], limit: i64) -> Result<Vec<Post>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE user_id = ANY($1::uuid[]) AND deleted_at IS NULL \
             ORDER BY created_on DESC, id \
             LIMIT $2"
        );

        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(author_ids)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_trending_posts(&self, limit: i64) -> Result<Vec<Post>> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE deleted_at IS NULL \
               AND (likes_count >= $1 OR dislikes_count <= $2 OR COALESCE(views, 0) >= $3) \
             ORDER BY likes_count DESC, id \
             LIMIT $4"
        );

        let rows = sqlx::query_as::<_, PostRow>(&query)
            .bind(i64::from(self.trending.min_likes))
            .bind(i64::from(self.trending.max_dislikes))
            .bind(i64::from(self.trending.min_views))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn find_communities_by_tags(
        &self,
        tags: &[String],
        limit: i64,
    ) -> Result<Vec<Community>> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, CommunityRow>(
            r#"
            SELECT id, name, tags, member_count::bigint AS member_count, created_on
            FROM communities
            WHERE tags && $1::text[] AND deleted_at IS NULL
            ORDER BY member_count DESC, created_on DESC
            LIMIT $2
            "#,
        )
        .bind(tags)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Community::from).collect())
    }

    async fn find_candidate_users(
        &self,
        requester_id: Uuid,
        interests: &[String],
        limit: i64,
    ) -> Result<Vec<CandidateUser>> {
        if interests.is_empty() {
            return Ok(Vec::new());
        }

        // strpos instead of ILIKE so interest terms never act as patterns
        let rows = sqlx::query_as::<_, CandidateUserRow>(
            r#"
            SELECT id, username, handle, profile_picture_url, interests, bio
            FROM users
            WHERE id <> $1
              AND deleted_at IS NULL
              AND (
                interests && $2::text[]
                OR EXISTS (
                    SELECT 1 FROM unnest($2::text[]) AS term
                    WHERE strpos(lower(COALESCE(bio, '')), lower(term)) > 0
                )
              )
            LIMIT $3
            "#,
        )
        .bind(requester_id)
        .bind(interests)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CandidateUser::from).collect())
    }
}
