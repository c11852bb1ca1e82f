mod common;

use chrono::Utc;
use common::{community, empty_store, post, user};
use recommendation_service::config::RecommendationConfig;
use recommendation_service::models::{Pipeline, RecommendationRequest};
use recommendation_service::services::{score_post, NoopTieBreaker};
use recommendation_service::{RecommendationEngine, RecommendationError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

fn engine(store: recommendation_service::db::InMemoryContentStore) -> RecommendationEngine {
    RecommendationEngine::new(Arc::new(store), RecommendationConfig::default())
}

#[tokio::test]
async fn test_recently_read_posts_are_never_recommended() {
    let mut reader = user("reader", &["rust"], "");
    let author = Uuid::new_v4();
    let read = post(author, &["rust"], 30);
    let unread = post(author, &["rust"], 10);
    reader.profile.recently_read_posts.insert(read.id);

    let store = empty_store()
        .with_user(reader.clone())
        .with_post(read.clone())
        .with_post(unread.clone());

    let posts = engine(store)
        .recommend_posts(reader.profile.id, 10)
        .await
        .unwrap();

    let ids: Vec<Uuid> = posts.iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![unread.id]);
}

#[tokio::test]
async fn test_followed_authors_contribute_candidates() {
    let mut reader = user("reader", &["rust"], "");
    let friend = Uuid::new_v4();
    reader.profile.following.insert(friend);

    let friends_post = post(friend, &["gardening"], 1);
    let strangers_post = post(Uuid::new_v4(), &["gardening"], 1);

    let store = empty_store()
        .with_user(reader.clone())
        .with_post(friends_post.clone())
        .with_post(strangers_post);

    let posts = engine(store)
        .recommend_posts(reader.profile.id, 10)
        .await
        .unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].post_id, friends_post.id);
}

#[tokio::test]
async fn test_low_dislike_posts_surface_as_trending() {
    // Zero likes, zero views, unrelated tags and author: only the
    // `dislikes <= 10` clause of the trending predicate lets this through.
    let reader = user("reader", &["rust"], "");
    let mut quiet = post(Uuid::new_v4(), &["knitting"], 0);
    quiet.dislikes_count = 0;

    let store = empty_store()
        .with_user(reader.clone())
        .with_post(quiet.clone());

    let posts = engine(store)
        .recommend_posts(reader.profile.id, 10)
        .await
        .unwrap();

    let ids: Vec<Uuid> = posts.iter().map(|p| p.post_id).collect();
    assert_eq!(ids, vec![quiet.id]);
}

#[tokio::test]
async fn test_posts_keep_score_order_across_calls() {
    let reader = user("reader", &["rust"], "");
    let author = Uuid::new_v4();
    // Three score tiers with several posts each
    let posts: Vec<_> = [5u32, 5, 5, 3, 3, 1, 1, 1]
        .iter()
        .map(|likes| post(author, &["rust"], *likes))
        .collect();

    let mut store = empty_store().with_user(reader.clone());
    for p in &posts {
        store = store.with_post(p.clone());
    }
    let engine = engine(store);

    let interests: HashSet<&str> = ["rust"].into_iter().collect();
    let now = Utc::now();
    let scores: HashMap<Uuid, i64> = posts
        .iter()
        .map(|p| (p.id, score_post(p, &interests, now)))
        .collect();

    let first = engine.recommend_posts(reader.profile.id, 100).await.unwrap();
    let second = engine.recommend_posts(reader.profile.id, 100).await.unwrap();

    for run in [&first, &second] {
        let ordered: Vec<i64> = run.iter().map(|p| scores[&p.post_id]).collect();
        assert!(ordered.windows(2).all(|w| w[0] >= w[1]), "{ordered:?}");
    }

    let first_ids: HashSet<Uuid> = first.iter().map(|p| p.post_id).collect();
    let second_ids: HashSet<Uuid> = second.iter().map(|p| p.post_id).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(first_ids.len(), posts.len());
}

#[tokio::test]
async fn test_quota_bounds_every_category() {
    let reader = user("reader", &["rust"], "");
    let mut store = empty_store().with_user(reader.clone());
    for i in 0..8 {
        store = store
            .with_post(post(Uuid::new_v4(), &["rust"], i))
            .with_community(community(&format!("c{i}"), &["rust"], i * 10))
            .with_user(user(&format!("u{i}"), &["rust"], ""));
    }
    let engine = engine(store);

    let result = engine
        .recommend(
            reader.profile.id,
            RecommendationRequest {
                max_posts: Some(3),
                max_communities: Some(0),
                max_users: Some(5),
            },
        )
        .await
        .unwrap();

    assert_eq!(result.recommended_posts.map(|p| p.len()), Some(3));
    assert_eq!(result.recommended_communities, Some(vec![]));
    assert_eq!(result.recommended_users.map(|u| u.len()), Some(5));

    let only_users = engine
        .recommend(reader.profile.id, RecommendationRequest::users(2))
        .await
        .unwrap();
    assert!(only_users.recommended_posts.is_none());
    assert!(only_users.recommended_communities.is_none());
    assert_eq!(only_users.recommended_users.map(|u| u.len()), Some(2));
}

#[tokio::test]
async fn test_communities_ordered_by_membership_regardless_of_rng() {
    let reader = user("reader", &["rust"], "");
    let a = community("A", &["rust"], 50);
    let b = community("B", &["rust"], 80);
    let off_topic = community("C", &["baking"], 500);

    let engine = engine(
        empty_store()
            .with_user(reader.clone())
            .with_community(a.clone())
            .with_community(b.clone())
            .with_community(off_topic),
    );

    for _ in 0..10 {
        let communities = engine
            .recommend_communities(reader.profile.id, 10)
            .await
            .unwrap();
        let names: Vec<&str> = communities
            .iter()
            .map(|c| c.community_name.as_str())
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }
}

#[tokio::test]
async fn test_followed_users_and_requester_are_never_suggested() {
    let mut reader = user("reader", &["rust", "go", "jazz"], "rust and go");
    let followed = user("followed", &["rust", "go"], "jazz");
    let candidate = user("candidate", &["rust", "go"], "Loves JAZZ");
    let stranger = user("stranger", &["baking"], "cakes");
    reader.profile.following.insert(followed.profile.id);

    let engine = RecommendationEngine::with_tie_breaker(
        Arc::new(
            empty_store()
                .with_user(reader.clone())
                .with_user(followed)
                .with_user(candidate)
                .with_user(stranger),
        ),
        RecommendationConfig::default(),
        Arc::new(NoopTieBreaker),
    );

    let users = engine.recommend_users(reader.profile.id, 10).await.unwrap();

    let handles: Vec<&str> = users.iter().map(|u| u.handle.as_str()).collect();
    assert_eq!(handles, vec!["@candidate"]);
    assert_eq!(users[0].profile_picture, "");
}

#[tokio::test]
async fn test_unknown_user_fails_whole_call() {
    let result = engine(empty_store())
        .recommend(
            Uuid::new_v4(),
            RecommendationRequest {
                max_posts: Some(1),
                max_communities: Some(1),
                max_users: Some(1),
            },
        )
        .await;

    assert!(matches!(result, Err(RecommendationError::UserNotFound(_))));
}

#[tokio::test]
async fn test_negative_quota_is_rejected() {
    let reader = user("reader", &["rust"], "");
    let result = engine(empty_store().with_user(reader.clone()))
        .recommend_posts(reader.profile.id, -1)
        .await;

    assert!(matches!(
        result,
        Err(RecommendationError::InvalidQuota {
            pipeline: Pipeline::Posts,
            value: -1
        })
    ));
}

#[tokio::test]
async fn test_user_without_interests_gets_no_people() {
    let reader = user("reader", &[], "");
    let other = user("other", &["rust"], "rust");

    let users = engine(empty_store().with_user(reader.clone()).with_user(other))
        .recommend_users(reader.profile.id, 10)
        .await
        .unwrap();

    assert!(users.is_empty());
}
