/// Recommendation Engine
///
/// Loads the requester's profile once, then runs every requested pipeline
/// concurrently. A quota of `None` omits the category from the result, a
/// quota of zero yields an empty list.
use super::community_ranking::CommunityRanker;
use super::post_ranking::PostRanker;
use super::tie_breaker::{RandomTieBreaker, TieBreaker};
use crate::config::RecommendationConfig;
use crate::db::{ContentStore, StoreError};
use crate::metrics;
use crate::models::{
    CommunityRecommendation, Pipeline, PostRecommendation, RecommendationRequest,
    RecommendationResult, UserRecommendation,
};
use crate::services::user_ranking::UserRanker;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Invalid quota for {pipeline}: {value} (must be >= 0)")]
    InvalidQuota { pipeline: Pipeline, value: i64 },

    #[error("Data source unavailable while loading {pipeline}: {source}")]
    DataSourceUnavailable {
        pipeline: &'static str,
        #[source]
        source: StoreError,
    },
}

pub type Result<T> = std::result::Result<T, RecommendationError>;

fn validate_quota(pipeline: Pipeline, quota: Option<i64>) -> Result<Option<usize>> {
    match quota {
        None => Ok(None),
        Some(value) => usize::try_from(value)
            .map(Some)
            .map_err(|_| RecommendationError::InvalidQuota { pipeline, value }),
    }
}

/// Run `fut` only if a quota was given, recording metrics for the pipeline
async fn run_pipeline<T, F>(
    pipeline: Pipeline,
    quota: Option<usize>,
    run: impl FnOnce(usize) -> F,
) -> Result<Option<Vec<T>>>
where
    F: Future<Output = std::result::Result<Vec<T>, StoreError>>,
{
    let Some(quota) = quota else {
        return Ok(None);
    };

    let start = Instant::now();
    let outcome = run(quota).await;
    metrics::record_pipeline_duration(pipeline, start.elapsed());

    match outcome {
        Ok(items) => {
            metrics::record_pipeline_result(pipeline, "success");
            Ok(Some(items))
        }
        Err(err) => {
            metrics::record_pipeline_result(pipeline, "error");
            warn!(pipeline = %pipeline, error = %err, "Pipeline failed");
            Err(RecommendationError::DataSourceUnavailable {
                pipeline: pipeline.as_str(),
                source: err,
            })
        }
    }
}

pub struct RecommendationEngine {
    store: Arc<dyn ContentStore>,
    posts: PostRanker,
    communities: CommunityRanker,
    users: UserRanker,
}

impl RecommendationEngine {
    /// Engine with the process-wide random tie breaker
    pub fn new(store: Arc<dyn ContentStore>, config: RecommendationConfig) -> Self {
        Self::with_tie_breaker(store, config, Arc::new(RandomTieBreaker))
    }

    pub fn with_tie_breaker(
        store: Arc<dyn ContentStore>,
        config: RecommendationConfig,
        tie_breaker: Arc<dyn TieBreaker>,
    ) -> Self {
        Self {
            posts: PostRanker::new(store.clone(), config.clone(), tie_breaker.clone()),
            communities: CommunityRanker::new(store.clone(), config.clone()),
            users: UserRanker::new(store.clone(), config, tie_breaker),
            store,
        }
    }

    /// Recommend posts, communities and/or users for `user_id`
    pub async fn recommend(
        &self,
        user_id: Uuid,
        request: RecommendationRequest,
    ) -> Result<RecommendationResult> {
        let max_posts = validate_quota(Pipeline::Posts, request.max_posts)?;
        let max_communities = validate_quota(Pipeline::Communities, request.max_communities)?;
        let max_users = validate_quota(Pipeline::Users, request.max_users)?;

        let profile = self
            .store
            .get_user(user_id)
            .await
            .map_err(|source| RecommendationError::DataSourceUnavailable {
                pipeline: "profile",
                source,
            })?
            .ok_or(RecommendationError::UserNotFound(user_id))?;

        let now = Utc::now();
        let profile = &profile;

        let (recommended_posts, recommended_communities, recommended_users) = tokio::try_join!(
            run_pipeline(Pipeline::Posts, max_posts, |n| self
                .posts
                .recommend(profile, n, now)),
            run_pipeline(Pipeline::Communities, max_communities, |n| self
                .communities
                .recommend(profile, n)),
            run_pipeline(Pipeline::Users, max_users, |n| self.users.recommend(profile, n)),
        )?;

        info!(
            user_id = %user_id,
            posts = recommended_posts.as_ref().map(Vec::len),
            communities = recommended_communities.as_ref().map(Vec::len),
            users = recommended_users.as_ref().map(Vec::len),
            "Recommendations generated"
        );

        Ok(RecommendationResult {
            recommended_posts,
            recommended_communities,
            recommended_users,
        })
    }

    pub async fn recommend_posts(
        &self,
        user_id: Uuid,
        max_posts: i64,
    ) -> Result<Vec<PostRecommendation>> {
        let result = self
            .recommend(user_id, RecommendationRequest::posts(max_posts))
            .await?;
        Ok(result.recommended_posts.unwrap_or_default())
    }

    pub async fn recommend_communities(
        &self,
        user_id: Uuid,
        max_communities: i64,
    ) -> Result<Vec<CommunityRecommendation>> {
        let result = self
            .recommend(user_id, RecommendationRequest::communities(max_communities))
            .await?;
        Ok(result.recommended_communities.unwrap_or_default())
    }

    pub async fn recommend_users(
        &self,
        user_id: Uuid,
        max_users: i64,
    ) -> Result<Vec<UserRecommendation>> {
        let result = self
            .recommend(user_id, RecommendationRequest::users(max_users))
            .await?;
        Ok(result.recommended_users.unwrap_or_default())
    }
}
