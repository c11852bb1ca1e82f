/// User Ranking Pipeline
///
/// Suggests people to follow based on shared interests and bio mentions.
/// Unlike the post pipeline, the final order comes from one shuffle over the
/// whole ranked list rather than per score tier.
use super::tie_breaker::{shuffle_items, TieBreaker};
use crate::config::RecommendationConfig;
use crate::db::{ContentStore, StoreError};
use crate::metrics;
use crate::models::{CandidateUser, Pipeline, Scored, UserProfile, UserRecommendation};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

const SHARED_INTEREST_POINTS: i64 = 10;
const BIO_MENTION_POINTS: i64 = 5;

/// Similarity between the requester and `candidate`.
///
/// Returns `None` when the requester already follows the candidate.
/// Otherwise +10 per shared interest (set intersection) and +5 per requester
/// interest found case-insensitively in the candidate's bio.
pub fn score_candidate_user(profile: &UserProfile, candidate: &CandidateUser) -> Option<i64> {
    if profile.following.contains(&candidate.id) {
        return None;
    }

    let mine = profile.interest_set();
    let theirs: HashSet<&str> = candidate.interests.iter().map(String::as_str).collect();
    let shared = mine.intersection(&theirs).count() as i64;

    let bio = candidate.bio.to_lowercase();
    let mentions = profile
        .interests
        .iter()
        .filter(|interest| bio.contains(interest.to_lowercase().as_str()))
        .count() as i64;

    Some(shared * SHARED_INTEREST_POINTS + mentions * BIO_MENTION_POINTS)
}

pub struct UserRanker {
    store: Arc<dyn ContentStore>,
    config: RecommendationConfig,
    tie_breaker: Arc<dyn TieBreaker>,
}

impl UserRanker {
    pub fn new(
        store: Arc<dyn ContentStore>,
        config: RecommendationConfig,
        tie_breaker: Arc<dyn TieBreaker>,
    ) -> Self {
        Self {
            store,
            config,
            tie_breaker,
        }
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        quota: usize,
    ) -> Result<Vec<UserRecommendation>, StoreError> {
        if quota == 0 {
            return Ok(Vec::new());
        }

        let candidates = self
            .store
            .find_candidate_users(
                profile.id,
                &profile.interests,
                self.config.candidate_users_limit,
            )
            .await?;
        metrics::record_pool_size(Pipeline::Users, candidates.len());

        let mut scored: Vec<Scored<CandidateUser>> = candidates
            .into_iter()
            .filter(|candidate| candidate.id != profile.id)
            .filter_map(|candidate| {
                score_candidate_user(profile, &candidate)
                    .filter(|score| *score > 0)
                    .map(|score| Scored::new(candidate, score))
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        let ranked = shuffle_items(self.tie_breaker.as_ref(), scored);

        debug!(candidate_count = ranked.len(), "Users ranked");

        Ok(ranked
            .into_iter()
            .take(quota)
            .map(|scored| UserRecommendation::from(scored.item))
            .collect())
    }
}
