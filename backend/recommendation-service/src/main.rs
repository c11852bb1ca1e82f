use actix_web::{web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_service::config::Config;
use recommendation_service::db::{create_pool, PgContentStore};
use recommendation_service::handlers::{self, RecommendationHandlerState};
use recommendation_service::metrics::serve_metrics;
use recommendation_service::RecommendationEngine;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Starting {} v{}",
        config.app.service_name,
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    let db_pool = match create_pool(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    let store = Arc::new(PgContentStore::new(
        db_pool,
        config.recommendation.trending,
    ));
    let engine = Arc::new(RecommendationEngine::new(
        store,
        config.recommendation.clone(),
    ));
    tracing::info!(
        recommendation_config = ?config.recommendation,
        "Recommendation engine initialized"
    );

    let handler_state = web::Data::new(RecommendationHandlerState { engine });

    HttpServer::new(move || {
        App::new()
            .app_data(handler_state.clone())
            .route("/health", web::get().to(|| async { "OK" }))
            // Health endpoints for K8s probes
            .route("/api/v1/health/live", web::get().to(|| async { "OK" }))
            .route("/api/v1/health/ready", web::get().to(|| async { "OK" }))
            .route("/metrics", web::get().to(serve_metrics))
            .configure(handlers::configure)
    })
    .bind(format!("0.0.0.0:{}", config.app.port))?
    .run()
    .await
}
