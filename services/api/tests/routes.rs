//! Drives the router with in-process fakes for the store and both LLM ports.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use drift_api_lib::{
    config::Config,
    web::{self, state::AppState},
};
use drift_core::{
    BehavioralData, EmotionAnalysis, EmotionClassifierService, EmotionScores,
    InsightGenerationService, InsightNarrative, InsightRequest, MemoryStore, PortError,
    PortResult,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct CalmClassifier;

#[async_trait]
impl EmotionClassifierService for CalmClassifier {
    async fn analyze_emotion(
        &self,
        _text: &str,
        _behavior: &BehavioralData,
    ) -> PortResult<EmotionAnalysis> {
        Ok(EmotionAnalysis {
            scores: EmotionScores {
                calm: 0.8,
                joy: 0.3,
                ..EmotionScores::zeroed()
            },
            intensity: 0.3,
            confidence: 92.0,
            behavior_confidence: 88.0,
        })
    }
}

struct DownGenerator;

#[async_trait]
impl InsightGenerationService for DownGenerator {
    async fn generate_insights(&self, _request: &InsightRequest) -> PortResult<InsightNarrative> {
        Err(PortError::Unexpected("503 Service Unavailable".into()))
    }
}

fn app() -> Router {
    let config = Config::from_lookup(|_| None).unwrap();
    let state = AppState::new(
        Arc::new(config),
        Arc::new(MemoryStore::new()),
        Arc::new(CalmClassifier),
        Arc::new(DownGenerator),
    );
    web::router(Arc::new(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, String) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn submit_then_read_dashboard() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/entries",
        Some(json!({"text": "Quiet morning", "userRating": 4, "timeSpentSeconds": 30.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(receipt["entry"]["dominantEmotion"], "calm");
    assert_eq!(receipt["entry"]["intensity"], 3);
    assert_eq!(receipt["degraded"], false);
    assert_eq!(receipt["user"]["streak"], 1);

    let (status, body) = send(&app, Method::GET, "/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let dashboard: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(dashboard["totalEntries"], 1);
    assert_eq!(dashboard["stabilityIndex"], 100);
    assert_eq!(dashboard["mostFrequentLabel"], "Calm");
    assert_eq!(dashboard["positivity"]["positive"], 92);
}

#[tokio::test]
async fn blank_entry_is_rejected() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/entries", Some(json!({"text": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(&app, Method::GET, "/entries", None).await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn rating_is_read_from_camel_case_body() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/entries",
        Some(json!({"text": "odd rating", "userRating": 9})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/entries",
        Some(json!({"text": "rated", "userRating": 2, "timeSpentSeconds": 5.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let receipt: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(receipt["entry"]["userRating"], 2);
    assert_eq!(receipt["entry"]["behavioralSignals"]["timeSpent"], 5.0);
}

#[tokio::test]
async fn insights_fall_back_when_generator_is_down() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/insights", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, Method::POST, "/entries", Some(json!({"text": "fine"}))).await;
    let (status, body) = send(&app, Method::POST, "/insights", None).await;
    assert_eq!(status, StatusCode::OK);
    let insight: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(insight["summary"], "Analysis unavailable.");
    assert_eq!(insight["stabilityIndicator"], 100.0);

    let (status, _) = send(&app, Method::GET, "/insights", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn export_is_served_as_csv_attachment() {
    let app = app();
    send(&app, Method::POST, "/entries", Some(json!({"text": "said \"ok\""}))).await;
    let response = app
        .clone()
        .oneshot(Request::get("/export").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("emotional-drift-report-"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.contains("\"said \"\"ok\"\"\""));
}

#[tokio::test]
async fn purge_requires_confirmation() {
    let app = app();
    send(&app, Method::POST, "/entries", Some(json!({"text": "keep me"}))).await;

    let (status, _) = send(&app, Method::DELETE, "/data", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = send(&app, Method::GET, "/entries", None).await;
    assert_ne!(body, "[]");

    let (status, _) = send(&app, Method::DELETE, "/data?confirm=true", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, Method::GET, "/entries", None).await;
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn theme_toggles() {
    let app = app();
    let (_, body) = send(&app, Method::GET, "/theme", None).await;
    assert_eq!(body, r#"{"theme":"light"}"#);
    let (_, body) = send(&app, Method::POST, "/theme/toggle", None).await;
    assert_eq!(body, r#"{"theme":"dark"}"#);
}
