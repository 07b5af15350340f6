use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::query::lenient_i64;
use crate::db::models::{ListingFilter, ListingInput};
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::validate_listing;

/// Deserialize a request body into [`ListingInput`], mapping any shape
/// mismatch to a 400 instead of the framework's default rejection.
fn parse_input(body: Value) -> Result<ListingInput, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::Validation(format!("Invalid listing: {e}")))
}

/// `POST /roommates`
pub async fn create_listing(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let input = parse_input(body)?;
    validate_listing(&input)?;

    let listing = state.repo.insert(input).await?;
    tracing::info!(id = %listing.id, "listing created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Roommate listing created", "roommate": listing })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LegacyListParams {
    available: Option<String>,
    limit: Option<String>,
}

/// `GET /roommates` — the legacy unfiltered list. `available=true` narrows to
/// open listings; `limit` caps the result (0 or garbage means unbounded).
pub async fn list_listings(
    State(state): State<AppState>,
    Query(params): Query<LegacyListParams>,
) -> Result<Json<Value>, AppError> {
    let filter = ListingFilter {
        availability: (params.available.as_deref() == Some("true"))
            .then(|| "available".to_string()),
        ..Default::default()
    };
    let limit = lenient_i64(params.limit.as_deref(), 0);

    let listings = state.repo.find(&filter, None, 0, limit).await?;
    Ok(Json(json!(listings)))
}

/// `GET /roommates/{id}` — fetch one listing. Every successful fetch bumps
/// viewCount by one; repeat viewers are counted again by design.
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let listing = state
        .repo
        .fetch_and_count_view(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    Ok(Json(json!(listing)))
}

/// `PUT /roommates/{id}` — full replacement of the client-settable fields.
pub async fn update_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let input = parse_input(body)?;
    validate_listing(&input)?;

    let updated = state
        .repo
        .update_by_id(&id, input)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    Ok(Json(json!({ "message": "Roommate listing updated", "updated": updated })))
}

/// `DELETE /roommates/{id}` — hard delete, idempotent from the caller's view:
/// a second delete simply reports NotFound.
pub async fn delete_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    if !state.repo.delete_by_id(&id).await? {
        return Err(AppError::NotFound("Not found".to_string()));
    }

    tracing::info!(id = %id, "listing deleted");
    Ok(Json(json!({ "message": "Roommate listing deleted" })))
}

/// `PATCH /roommates/{id}/like` — atomic increment, no per-caller dedup.
pub async fn like_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let like_count = state
        .repo
        .increment_likes(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    Ok(Json(json!({ "message": "Liked", "likeCount": like_count })))
}
