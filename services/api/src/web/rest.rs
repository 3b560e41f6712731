//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use chrono::Utc;
use drift_core::{
    export::{export_csv, export_filename},
    insights, DashboardSummary, InsightRequest, Submission, SubmissionError, Theme,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        submit_entry_handler,
        list_entries_handler,
        dashboard_handler,
        generate_insights_handler,
        latest_insights_handler,
        export_handler,
        user_handler,
        theme_handler,
        toggle_theme_handler,
        clear_data_handler,
    ),
    components(
        schemas(SubmitEntryRequest, ThemeResponse)
    ),
    tags(
        (name = "Emotional Drift API", description = "Mood journal entries, drift metrics and AI insights.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// The payload for submitting a new journal entry.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEntryRequest {
    pub text: String,
    /// Self-reported mood, 1-5. Defaults to 3.
    #[serde(default = "default_rating")]
    pub user_rating: u8,
    /// Seconds between the first keystroke and submission.
    #[serde(default)]
    pub time_spent_seconds: f64,
}

fn default_rating() -> u8 {
    3
}

#[derive(Serialize, ToSchema)]
pub struct ThemeResponse {
    theme: String,
}

impl From<Theme> for ThemeResponse {
    fn from(theme: Theme) -> Self {
        Self {
            theme: theme.as_str().to_string(),
        }
    }
}

#[derive(Deserialize)]
pub struct PurgeParams {
    #[serde(default)]
    confirm: bool,
}

type HandlerResult<T> = Result<T, (StatusCode, String)>;

fn internal(context: &str, e: impl std::fmt::Display) -> (StatusCode, String) {
    error!("{}: {}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

//=========================================================================================
// Entry Handlers
//=========================================================================================

/// Submit a journal entry for classification and storage.
///
/// A classifier outage does not fail the request; the entry is stored with
/// zeroed scores and `degraded` is set in the receipt.
#[utoipa::path(
    post,
    path = "/entries",
    request_body = SubmitEntryRequest,
    responses(
        (status = 201, description = "Entry stored; receipt with entry, degraded flag and user"),
        (status = 400, description = "Empty text or rating outside 1-5"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn submit_entry_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<SubmitEntryRequest>,
) -> HandlerResult<impl IntoResponse> {
    let submission = Submission {
        text: payload.text,
        user_rating: payload.user_rating,
        elapsed_seconds: payload.time_spent_seconds,
    };

    let journal = app_state.journal.lock().await;
    match journal.submit(submission).await {
        Ok(receipt) => Ok((StatusCode::CREATED, Json(receipt))),
        Err(e @ (SubmissionError::EmptyText | SubmissionError::InvalidRating(_))) => {
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => Err(internal("Failed to save entry", e)),
    }
}

/// List all entries, newest first.
#[utoipa::path(
    get,
    path = "/entries",
    responses((status = 200, description = "Entries, newest first"))
)]
pub async fn list_entries_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let entries = app_state.journal.lock().await.store().get_entries().await;
    Json(entries)
}

/// Aggregated dashboard metrics over the full history.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Stability, frequency, positivity, distribution and timeline"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn dashboard_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let journal = app_state.journal.lock().await;
    let entries = journal.store().get_entries().await;
    let user = journal
        .store()
        .get_user()
        .await
        .map_err(|e| internal("Failed to load user", e))?;
    Ok(Json(DashboardSummary::from_entries(entries.as_slice(), user.streak)))
}

//=========================================================================================
// Insight Handlers
//=========================================================================================

/// Generate fresh insights from the ten most recent entries.
///
/// Only the most recently started request may publish; an older one that
/// finishes late is returned to its caller but not shown by `GET /insights`.
#[utoipa::path(
    post,
    path = "/insights",
    responses(
        (status = 200, description = "Generated or fallback insight"),
        (status = 404, description = "No entries to analyze")
    )
)]
pub async fn generate_insights_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let entries = app_state.journal.lock().await.store().get_entries().await;
    if entries.is_empty() {
        return Err((StatusCode::NOT_FOUND, "No entries to analyze".to_string()));
    }

    let ticket = app_state.insights.issue().await;
    let request = InsightRequest::from_entries(entries.as_slice());
    let outcome = insights::generate(app_state.insight_adapter.as_ref(), &request).await;
    let insight = outcome.into_insight();
    app_state.insights.publish(ticket, insight.clone()).await;
    Ok(Json(insight))
}

/// The latest published insight.
#[utoipa::path(
    get,
    path = "/insights",
    responses(
        (status = 200, description = "Latest insight"),
        (status = 404, description = "No insight generated yet")
    )
)]
pub async fn latest_insights_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    app_state
        .insights
        .current()
        .await
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "No insight generated yet".to_string()))
}

//=========================================================================================
// Export, Profile and Purge Handlers
//=========================================================================================

/// Download the full history and summary as CSV.
#[utoipa::path(
    get,
    path = "/export",
    responses(
        (status = 200, description = "CSV report (text/csv)"),
        (status = 500, description = "Encoding failure")
    )
)]
pub async fn export_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let entries = app_state.journal.lock().await.store().get_entries().await;
    let csv = export_csv(entries.as_slice()).map_err(|e| internal("Failed to export CSV", e))?;
    let filename = export_filename(Utc::now().date_naive());
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    ))
}

/// The local user profile, including the current streak.
#[utoipa::path(
    get,
    path = "/user",
    responses((status = 200, description = "User profile"), (status = 500, description = "Storage failure"))
)]
pub async fn user_handler(State(app_state): State<Arc<AppState>>) -> HandlerResult<impl IntoResponse> {
    let user = app_state
        .journal
        .lock()
        .await
        .store()
        .get_user()
        .await
        .map_err(|e| internal("Failed to load user", e))?;
    Ok(Json(user))
}

#[utoipa::path(
    get,
    path = "/theme",
    responses((status = 200, description = "Current theme", body = ThemeResponse))
)]
pub async fn theme_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let theme = app_state.journal.lock().await.store().get_theme().await;
    Json(ThemeResponse::from(theme))
}

#[utoipa::path(
    post,
    path = "/theme/toggle",
    responses((status = 200, description = "The new theme", body = ThemeResponse))
)]
pub async fn toggle_theme_handler(
    State(app_state): State<Arc<AppState>>,
) -> HandlerResult<impl IntoResponse> {
    let theme = app_state
        .journal
        .lock()
        .await
        .store()
        .toggle_theme()
        .await
        .map_err(|e| internal("Failed to save theme", e))?;
    Ok(Json(ThemeResponse::from(theme)))
}

/// Irreversibly delete all entries and the profile. Requires `confirm=true`.
#[utoipa::path(
    delete,
    path = "/data",
    params(("confirm" = Option<bool>, Query, description = "Must be true to purge.")),
    responses(
        (status = 204, description = "All journal data deleted"),
        (status = 400, description = "Confirmation missing")
    )
)]
pub async fn clear_data_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<PurgeParams>,
) -> HandlerResult<StatusCode> {
    if !params.confirm {
        return Err((
            StatusCode::BAD_REQUEST,
            "Clearing all journal history cannot be undone; pass confirm=true".to_string(),
        ));
    }
    app_state
        .journal
        .lock()
        .await
        .store()
        .clear_data()
        .await
        .map_err(|e| internal("Failed to clear data", e))?;
    app_state.insights.reset().await;
    info!("Journal history purged on request.");
    Ok(StatusCode::NO_CONTENT)
}
