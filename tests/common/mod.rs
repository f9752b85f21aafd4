//! Shared fixtures: an in-process stand-in for the statistics API and a
//! configured application router.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header::AUTHORIZATION, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use moodarc_stats::{auth::jwt::create_access_token, build_router, config::Config, AppState, Clock};

pub const JWT_SECRET: &str = "integration-secret";

#[derive(Clone, Copy, PartialEq)]
pub enum UpstreamMode {
    Healthy,
    HttpError,
    EnvelopeError,
}

#[derive(Clone)]
pub struct Upstream {
    pub calls: Arc<AtomicUsize>,
    pub mode: UpstreamMode,
}

impl Upstream {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn day(date: &str, moods: &[(u8, u32)]) -> Value {
    let stats: Vec<Value> = moods
        .iter()
        .map(|(id, count)| json!({ "moodId": id, "count": count }))
        .collect();
    let total: u32 = moods.iter().map(|(_, c)| c).sum();
    json!({ "date": date, "moodStats": stats, "totalRecords": total })
}

fn mood_rows(year: &str, month: &str) -> Vec<Value> {
    match (year, month) {
        ("2024", "2") => vec![day("2024-02-28", &[(1, 1)]), day("2024-02-29", &[(2, 1)])],
        ("2024", "3") => vec![
            day("2024-03-01", &[(4, 1), (5, 1)]),
            day("2024-03-02", &[(4, 1)]),
            json!({ "date": "not-a-date", "moodStats": [], "totalRecords": 1 }),
        ],
        _ => vec![],
    }
}

async fn mood_statistic(
    State(upstream): State<Upstream>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    upstream.calls.fetch_add(1, Ordering::SeqCst);
    match upstream.mode {
        UpstreamMode::HttpError => {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }
        UpstreamMode::EnvelopeError => {
            return Json(json!({ "statusCode": 404, "data": null })).into_response();
        }
        UpstreamMode::Healthy => {}
    }

    let year = params.get("year").map(String::as_str).unwrap_or_default();
    let month = params.get("month").map(String::as_str).unwrap_or_default();
    // Archived years are not served even when the API is otherwise up.
    if year == "1999" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "archive offline").into_response();
    }
    Json(json!({
        "statusCode": 200,
        "data": {
            "monthly": { "dailyMoodStats": mood_rows(year, month), "mostFrequentMood": null },
            "weekly": { "dailyMoodStats": [] },
        }
    }))
    .into_response()
}

async fn activity_statistic(State(upstream): State<Upstream>) -> Response {
    upstream.calls.fetch_add(1, Ordering::SeqCst);
    if upstream.mode != UpstreamMode::Healthy {
        return (StatusCode::BAD_GATEWAY, "unavailable").into_response();
    }
    Json(json!({
        "statusCode": 200,
        "data": {
            "monthly": {
                "activityData": { "1": [1, 0, 1], "2": [0, 2, 1] },
                "activityNames": { "1": "Reading", "2": "Running" },
                "dates": ["2024-03-01", "2024-03-02", "2024-03-03"],
                "totalRecords": 4,
            }
        }
    }))
    .into_response()
}

/// Starts the fake statistics API on a random local port.
pub async fn spawn_upstream(mode: UpstreamMode) -> (String, Upstream) {
    let upstream = Upstream {
        calls: Arc::new(AtomicUsize::new(0)),
        mode,
    };
    let router = Router::new()
        .route("/api/v1/records/statistic/mood", get(mood_statistic))
        .route("/api/v1/records/statistic/activity", get(activity_statistic))
        .with_state(upstream.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), upstream)
}

pub fn test_config(base_url: &str) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        frontend_url: "http://localhost:3000".into(),
        jwt_secret: JWT_SECRET.into(),
        stats_api_base_url: base_url.into(),
        stats_api_timeout_secs: 5,
        default_timezone: "UTC".into(),
        default_utc_offset_minutes: 0,
    }
}

/// Router whose clock is frozen at 2024-03-02 12:00 UTC.
pub fn test_app(base_url: &str) -> (Router, Config) {
    let config = test_config(base_url);
    let now = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
    let state = AppState::new(config.clone(), Clock::Fixed(now)).unwrap();
    (build_router(state), config)
}

pub fn bearer(config: &Config) -> String {
    let token = create_access_token(Uuid::new_v4(), 300, config).unwrap();
    format!("Bearer {}", token)
}

pub async fn get_json(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    let response = app
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}
