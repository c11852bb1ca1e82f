mod common;

use actix_web::{test, web, App};
use common::{community, empty_store, post, user};
use recommendation_service::config::RecommendationConfig;
use recommendation_service::handlers::{self, RecommendationHandlerState, USER_ID_HEADER};
use recommendation_service::RecommendationEngine;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

fn handler_state(
    store: recommendation_service::db::InMemoryContentStore,
) -> web::Data<RecommendationHandlerState> {
    web::Data::new(RecommendationHandlerState {
        engine: Arc::new(RecommendationEngine::new(
            Arc::new(store),
            RecommendationConfig::default(),
        )),
    })
}

#[actix_web::test]
async fn test_combined_endpoint_returns_only_requested_keys() {
    let reader = user("reader", &["rust"], "");
    let state = handler_state(
        empty_store()
            .with_user(reader.clone())
            .with_community(community("rustaceans", &["rust"], 42)),
    );

    let app = test::init_service(App::new().app_data(state).configure(handlers::configure)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .insert_header((USER_ID_HEADER, reader.profile.id.to_string()))
        .set_json(json!({ "communities": 5 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let obj = body.as_object().unwrap();
    assert_eq!(obj.len(), 1);
    assert_eq!(body["recommended_communities"][0]["community_name"], "rustaceans");
    assert_eq!(body["recommended_communities"][0]["member_count"], 42);
}

#[actix_web::test]
async fn test_posts_endpoint_shape() {
    let reader = user("reader", &["rust"], "");
    let written = post(Uuid::new_v4(), &["rust"], 7);
    let state = handler_state(
        empty_store()
            .with_user(reader.clone())
            .with_post(written.clone()),
    );

    let app = test::init_service(App::new().app_data(state).configure(handlers::configure)).await;

    let req = test::TestRequest::post()
        .uri("/algorithm/recommend/posts")
        .insert_header((USER_ID_HEADER, reader.profile.id.to_string()))
        .set_json(json!({ "posts": 10 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let first = &body["recommended_posts"][0];
    assert_eq!(first["post_id"], written.id.to_string());
    assert_eq!(first["likes"], 7);
    assert_eq!(first["dislikes"], 20);
    assert_eq!(first["comments_count"], 0);
    assert_eq!(first["views"], 0);
    assert_eq!(first["tags"], json!(["rust"]));
    assert!(first["created_on"].is_string());
}

#[actix_web::test]
async fn test_users_endpoint_with_zero_quota_returns_empty_list() {
    let reader = user("reader", &["rust"], "");
    let state = handler_state(
        empty_store()
            .with_user(reader.clone())
            .with_user(user("peer", &["rust"], "")),
    );

    let app = test::init_service(App::new().app_data(state).configure(handlers::configure)).await;

    let req = test::TestRequest::post()
        .uri("/algorithm/recommend/users")
        .insert_header((USER_ID_HEADER, reader.profile.id.to_string()))
        .set_json(json!({ "users": 0 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "recommended_users": [] }));
}

#[actix_web::test]
async fn test_error_statuses() {
    let reader = user("reader", &["rust"], "");
    let state = handler_state(empty_store().with_user(reader.clone()));
    let app = test::init_service(App::new().app_data(state).configure(handlers::configure)).await;

    // No user header
    let req = test::TestRequest::post()
        .uri("/algorithm/recommend/communities")
        .set_json(json!({ "communities": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // Unknown user
    let req = test::TestRequest::post()
        .uri("/algorithm/recommend/communities")
        .insert_header((USER_ID_HEADER, Uuid::new_v4().to_string()))
        .set_json(json!({ "communities": 3 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    // Negative quota
    let req = test::TestRequest::post()
        .uri("/api/v1/recommendations")
        .insert_header((USER_ID_HEADER, reader.profile.id.to_string()))
        .set_json(json!({ "posts": -4 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 400);
}
