use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::state::AppState;

async fn root() -> &'static str {
    "welcome"
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Endpoint not found" })),
    )
}

/// Assemble the full HTTP surface over the given application state.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(api::health::health))
        .route(
            "/roommates",
            post(api::listings::create_listing).get(api::listings::list_listings),
        )
        .route("/roommates/batch", post(api::batch::batch_operation))
        .route(
            "/roommates/{id}",
            get(api::listings::get_listing)
                .put(api::listings::update_listing)
                .delete(api::listings::delete_listing),
        )
        .route("/roommates/{id}/like", patch(api::listings::like_listing))
        .route(
            "/roommates/{id}/similar",
            get(api::discovery::similar_listings),
        )
        .route("/all-items", get(api::query::all_items))
        .route("/my-listings", get(api::stats::my_listings))
        .route("/dashboard/stats", get(api::stats::dashboard_stats))
        .route("/analytics", get(api::stats::analytics))
        .route("/filter-options", get(api::discovery::filter_options))
        .route("/trending", get(api::discovery::trending))
        .route(
            "/search-suggestions",
            get(api::discovery::search_suggestions),
        )
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
