//! Recommendation service layer
//!
//! - post_ranking: multi-pool recall, scoring, tiered tie-breaking
//! - community_ranking: store-ordered communities
//! - user_ranking: interest/bio similarity with a whole-list shuffle
//! - engine: orchestrates the three pipelines for one request

pub mod community_ranking;
pub mod engine;
pub mod post_ranking;
pub mod tie_breaker;
pub mod user_ranking;

pub use community_ranking::CommunityRanker;
pub use engine::{RecommendationEngine, RecommendationError};
pub use post_ranking::{score_post, PostRanker};
pub use tie_breaker::{NoopTieBreaker, RandomTieBreaker, TieBreaker};
pub use user_ranking::{score_candidate_user, UserRanker};
