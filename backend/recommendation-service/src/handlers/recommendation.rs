/// Recommendation API Handlers
///
/// The gateway authenticates the caller and forwards the user id in the
/// `x-user-id` header.
use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    CommunityRecommendation, PostRecommendation, RecommendationRequest, UserRecommendation,
};
use crate::services::{RecommendationEngine, RecommendationError};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Handler state for recommendation endpoints
pub struct RecommendationHandlerState {
    pub engine: Arc<RecommendationEngine>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendPostsRequest {
    pub posts: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendCommunitiesRequest {
    pub communities: i64,
}

#[derive(Debug, Deserialize)]
pub struct RecommendUsersRequest {
    pub users: i64,
}

#[derive(Debug, Serialize)]
pub struct RecommendedPostsResponse {
    pub recommended_posts: Vec<PostRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct RecommendedCommunitiesResponse {
    pub recommended_communities: Vec<CommunityRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct RecommendedUsersResponse {
    pub recommended_users: Vec<UserRecommendation>,
}

fn requester_id(req: &HttpRequest) -> Result<Uuid> {
    let raw = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing user ID".to_string()))?;

    Uuid::parse_str(raw).map_err(|_| AppError::Authentication("Invalid user ID".to_string()))
}

fn log_failure(user_id: Uuid, err: &RecommendationError) {
    match err {
        RecommendationError::DataSourceUnavailable { .. } => {
            error!(user_id = %user_id, error = %err, "Failed to generate recommendations")
        }
        _ => debug!(user_id = %user_id, error = %err, "Recommendation request rejected"),
    }
}

/// POST /api/v1/recommendations
/// Any combination of posts, communities and users in one call
#[post("/api/v1/recommendations")]
pub async fn get_recommendations(
    req: HttpRequest,
    body: web::Json<RecommendationRequest>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let user_id = requester_id(&req)?;
    let request = body.into_inner();

    debug!(user_id = %user_id, ?request, "Getting recommendations");

    match state.engine.recommend(user_id, request).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(err) => {
            log_failure(user_id, &err);
            Err(err.into())
        }
    }
}

/// POST /algorithm/recommend/posts
#[post("/algorithm/recommend/posts")]
pub async fn recommend_posts(
    req: HttpRequest,
    body: web::Json<RecommendPostsRequest>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let user_id = requester_id(&req)?;

    match state.engine.recommend_posts(user_id, body.posts).await {
        Ok(recommended_posts) => {
            Ok(HttpResponse::Ok().json(RecommendedPostsResponse { recommended_posts }))
        }
        Err(err) => {
            log_failure(user_id, &err);
            Err(err.into())
        }
    }
}

/// POST /algorithm/recommend/communities
#[post("/algorithm/recommend/communities")]
pub async fn recommend_communities(
    req: HttpRequest,
    body: web::Json<RecommendCommunitiesRequest>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let user_id = requester_id(&req)?;

    match state
        .engine
        .recommend_communities(user_id, body.communities)
        .await
    {
        Ok(recommended_communities) => Ok(HttpResponse::Ok().json(
            RecommendedCommunitiesResponse {
                recommended_communities,
            },
        )),
        Err(err) => {
            log_failure(user_id, &err);
            Err(err.into())
        }
    }
}

/// POST /algorithm/recommend/users
#[post("/algorithm/recommend/users")]
pub async fn recommend_users(
    req: HttpRequest,
    body: web::Json<RecommendUsersRequest>,
    state: web::Data<RecommendationHandlerState>,
) -> Result<HttpResponse> {
    let user_id = requester_id(&req)?;

    match state.engine.recommend_users(user_id, body.users).await {
        Ok(recommended_users) => {
            Ok(HttpResponse::Ok().json(RecommendedUsersResponse { recommended_users }))
        }
        Err(err) => {
            log_failure(user_id, &err);
            Err(err.into())
        }
    }
}
