use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub recommendation: RecommendationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub service_name: String,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

/// Candidate pool sizes and the trending predicate thresholds
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    pub interest_posts_limit: i64,
    pub followed_posts_limit: i64,
    pub trending_posts_limit: i64,
    pub communities_limit: i64,
    pub candidate_users_limit: i64,
    pub trending: TrendingConfig,
}

/// A post is trending when ANY of the clauses hold.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TrendingConfig {
    pub min_likes: u32,
    pub max_dislikes: u32,
    pub min_views: u32,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            min_likes: 50,
            max_dislikes: 10,
            min_views: 100,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            interest_posts_limit: 100,
            followed_posts_limit: 50,
            trending_posts_limit: 50,
            communities_limit: 100,
            candidate_users_limit: 100,
            trending: TrendingConfig::default(),
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = RecommendationConfig::default();

        Ok(Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                port: env_or("APP_PORT", 8012)?,
                service_name: env::var("SERVICE_NAME")
                    .unwrap_or_else(|_| "recommendation-service".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
                acquire_timeout_secs: env_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 10)?,
            },
            recommendation: RecommendationConfig {
                interest_posts_limit: env_or(
                    "INTEREST_POSTS_LIMIT",
                    defaults.interest_posts_limit,
                )?,
                followed_posts_limit: env_or(
                    "FOLLOWED_POSTS_LIMIT",
                    defaults.followed_posts_limit,
                )?,
                trending_posts_limit: env_or(
                    "TRENDING_POSTS_LIMIT",
                    defaults.trending_posts_limit,
                )?,
                communities_limit: env_or("COMMUNITIES_LIMIT", defaults.communities_limit)?,
                candidate_users_limit: env_or(
                    "CANDIDATE_USERS_LIMIT",
                    defaults.candidate_users_limit,
                )?,
                trending: TrendingConfig {
                    min_likes: env_or("TRENDING_MIN_LIKES", defaults.trending.min_likes)?,
                    max_dislikes: env_or(
                        "TRENDING_MAX_DISLIKES",
                        defaults.trending.max_dislikes,
                    )?,
                    min_views: env_or("TRENDING_MIN_VIEWS", defaults.trending.min_views)?,
                },
            },
        })
    }
}
