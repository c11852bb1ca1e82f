/// Community Ranking Pipeline
///
/// The store already returns interest-matched communities ordered by member
/// count and recency, so ranking here is dedup + truncate. No randomness.
use crate::config::RecommendationConfig;
use crate::db::{ContentStore, StoreError};
use crate::metrics;
use crate::models::{Community, CommunityRecommendation, Pipeline, UserProfile};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Keep the first occurrence of each community, preserving store order
pub fn dedup_communities(communities: Vec<Community>) -> Vec<Community> {
    let mut seen: HashSet<Uuid> = HashSet::new();
    communities
        .into_iter()
        .filter(|c| seen.insert(c.id))
        .collect()
}

pub struct CommunityRanker {
    store: Arc<dyn ContentStore>,
    config: RecommendationConfig,
}

impl CommunityRanker {
    pub fn new(store: Arc<dyn ContentStore>, config: RecommendationConfig) -> Self {
        Self { store, config }
    }

    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        quota: usize,
    ) -> Result<Vec<CommunityRecommendation>, StoreError> {
        if quota == 0 {
            return Ok(Vec::new());
        }

        let matching = self
            .store
            .find_communities_by_tags(&profile.interests, self.config.communities_limit)
            .await?;
        metrics::record_pool_size(Pipeline::Communities, matching.len());

        let ranked = dedup_communities(matching);
        debug!(candidate_count = ranked.len(), "Communities ranked");

        Ok(ranked
            .into_iter()
            .take(quota)
            .map(CommunityRecommendation::from)
            .collect())
    }
}
