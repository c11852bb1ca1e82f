/// Post Ranking Pipeline
///
/// Recall from three overlapping pools (interest tags, followed authors,
/// trending), drop what the user already read, score every candidate once,
/// then order by score with a random shuffle inside each score tier.
use super::tie_breaker::{shuffle_items, TieBreaker};
use crate::config::RecommendationConfig;
use crate::db::{ContentStore, StoreError};
use crate::metrics;
use crate::models::{Pipeline, Post, PostRecommendation, Scored, UserProfile};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

const TAG_MATCH_POINTS: i64 = 10;
const LIKE_POINTS: i64 = 5;
const DISLIKE_PENALTY: i64 = 2;
const COMMENT_POINTS: i64 = 3;
const FRESHNESS_WINDOW_DAYS: i64 = 7;
const FRESHNESS_POINTS_PER_DAY: i64 = 2;
const VIEWS_PER_POINT: i64 = 10;
const MAX_VIEW_POINTS: i64 = 20;

/// Relevance of `post` for a user with `interests`, evaluated at `now`.
///
/// - +10 per post tag in `interests`
/// - +5 per like, -2 per dislike, +3 per comment
/// - `(7 - days_old) * 2` while the post is at most 7 days old
/// - one point per 10 views, capped at 20
///
/// Posts dated in the future count as zero days old.
pub fn score_post(post: &Post, interests: &HashSet<&str>, now: DateTime<Utc>) -> i64 {
    let tag_matches = post
        .tags
        .iter()
        .filter(|tag| interests.contains(tag.as_str()))
        .count() as i64;

    let mut score = tag_matches * TAG_MATCH_POINTS;
    score += i64::from(post.likes_count) * LIKE_POINTS;
    score -= i64::from(post.dislikes_count) * DISLIKE_PENALTY;
    score += i64::from(post.comment_count) * COMMENT_POINTS;

    let days_old = (now - post.created_on).num_days().max(0);
    if days_old <= FRESHNESS_WINDOW_DAYS {
        score += (FRESHNESS_WINDOW_DAYS - days_old) * FRESHNESS_POINTS_PER_DAY;
    }

    score += (i64::from(post.views) / VIEWS_PER_POINT).min(MAX_VIEW_POINTS);

    score
}

/// Merge recall pools, keeping the first copy of each post and skipping read ones
pub fn merge_candidates<I>(pools: I, recently_read: &HashSet<Uuid>) -> Vec<Post>
where
    I: IntoIterator<Item = Vec<Post>>,
{
    let mut seen: HashSet<Uuid> = HashSet::new();
    pools
        .into_iter()
        .flatten()
        .filter(|post| seen.insert(post.id))
        .filter(|post| !recently_read.contains(&post.id))
        .collect()
}

/// Highest score first; posts sharing a score come out in random order.
pub fn rank_by_score_tiers(
    mut scored: Vec<Scored<Post>>,
    tie_breaker: &dyn TieBreaker,
) -> Vec<Scored<Post>> {
    scored.sort_by(|a, b| b.score.cmp(&a.score));

    let mut ranked = Vec::with_capacity(scored.len());
    let mut tier: Vec<Scored<Post>> = Vec::new();

    for candidate in scored {
        if tier.first().map_or(false, |head| head.score != candidate.score) {
            ranked.extend(shuffle_items(tie_breaker, std::mem::take(&mut tier)));
        }
        tier.push(candidate);
    }
    ranked.extend(shuffle_items(tie_breaker, tier));

    ranked
}

pub struct PostRanker {
    store: Arc<dyn ContentStore>,
    config: RecommendationConfig,
    tie_breaker: Arc<dyn TieBreaker>,
}

impl PostRanker {
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

    /// Up to `quota` posts for `profile`, best first
    #[instrument(skip(self, profile), fields(user_id = %profile.id))]
    pub async fn recommend(
        &self,
        profile: &UserProfile,
        quota: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostRecommendation>, StoreError> {
        if quota == 0 {
            return Ok(Vec::new());
        }

        let candidates = self.recall_candidates(profile).await?;
        metrics::record_pool_size(Pipeline::Posts, candidates.len());

        let interests = profile.interest_set();
        let scored: Vec<Scored<Post>> = candidates
            .into_iter()
            .map(|post| {
                let score = score_post(&post, &interests, now);
                Scored::new(post, score)
            })
            .collect();

        let ranked = rank_by_score_tiers(scored, self.tie_breaker.as_ref());

        debug!(
            candidate_count = ranked.len(),
            top_score = ranked.first().map(|c| c.score),
            "Posts ranked"
        );

        Ok(ranked
            .into_iter()
            .take(quota)
            .map(|scored| PostRecommendation::from(scored.item))
            .collect())
    }

    /// Fetch the three pools concurrently. Any failure fails the whole recall.
    async fn recall_candidates(&self, profile: &UserProfile) -> Result<Vec<Post>, StoreError> {
        let mut following: Vec<Uuid> = profile.following.iter().copied().collect();
        following.sort_unstable();

        let (by_interest, by_author, trending) = futures::future::try_join3(
            self.store
                .find_posts_by_tags(&profile.interests, self.config.interest_posts_limit),
            self.store
                .find_posts_by_authors(&following, self.config.followed_posts_limit),
            self.store
                .find_trending_posts(self.config.trending_posts_limit),
        )
        .await?;

        debug!(
            interest = by_interest.len(),
            followed = by_author.len(),
            trending = trending.len(),
            "Post recall completed"
        );

        Ok(merge_candidates(
            [by_interest, by_author, trending],
            &profile.recently_read_posts,
        ))
    }
}
