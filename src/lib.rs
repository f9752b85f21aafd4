use axum::{http::HeaderValue, middleware, routing::get, Router};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;

use config::Config;
use error::StatsError;
use services::stats_api::StatsApiClient;

/// Source of "now". Handlers derive the local date from it with the
/// caller's UTC offset.
#[derive(Debug, Clone)]
pub enum Clock {
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub stats_api: StatsApiClient,
    pub clock: Clock,
}

impl AppState {
    pub fn new(config: Config, clock: Clock) -> Result<Self, StatsError> {
        let stats_api = StatsApiClient::new(
            &config.stats_api_base_url,
            Duration::from_secs(config.stats_api_timeout_secs),
        )?;
        Ok(Self {
            config: Arc::new(config),
            stats_api,
            clock,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(handlers::health::health_check));

    let protected_routes = Router::new()
        .route("/api/stats/streak", get(handlers::statistics::get_streak))
        .route("/api/stats/mood", get(handlers::statistics::get_mood_chart))
        .route(
            "/api/stats/activity",
            get(handlers::statistics::get_activity_stats),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let mut allowed_origins: Vec<HeaderValue> = Vec::new();
    match state.config.frontend_url.parse::<HeaderValue>() {
        Ok(origin) => allowed_origins.push(origin),
        Err(_) => tracing::warn!(url = %state.config.frontend_url, "Ignoring invalid FRONTEND_URL"),
    }
    // In dev, also allow LAN access (e.g. testing from another device)
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<HeaderValue>() {
                allowed_origins.push(hv);
            }
        }
    }
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
