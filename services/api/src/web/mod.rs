pub mod rest;
pub mod state;

// Re-export the handlers and router builder to make them easily accessible
// to the binary that builds the web server.
pub use rest::{
    clear_data_handler, dashboard_handler, export_handler, generate_insights_handler,
    latest_insights_handler, list_entries_handler, submit_entry_handler, theme_handler,
    toggle_theme_handler, user_handler,
};

use axum::{
    routing::{delete, get, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// All journal routes, bound to the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/entries", get(list_entries_handler).post(submit_entry_handler))
        .route("/dashboard", get(dashboard_handler))
        .route(
            "/insights",
            get(latest_insights_handler).post(generate_insights_handler),
        )
        .route("/export", get(export_handler))
        .route("/user", get(user_handler))
        .route("/theme", get(theme_handler))
        .route("/theme/toggle", post(toggle_theme_handler))
        .route("/data", delete(clear_data_handler))
        .with_state(app_state)
}
