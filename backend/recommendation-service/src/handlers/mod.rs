pub mod recommendation;

// Re-export handlers for convenience
pub use recommendation::{
    get_recommendations, recommend_communities, recommend_posts, recommend_users,
    RecommendationHandlerState, USER_ID_HEADER,
};

use actix_web::web;

/// Register every recommendation route on an actix `App`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(get_recommendations)
        .service(recommend_posts)
        .service(recommend_communities)
        .service(recommend_users);
}
