use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::query::lenient_i64;
use crate::db::models::{FacetOptions, Listing, ListingFilter, Sort};
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_TRENDING_LIMIT: i64 = 6;
const SUGGESTION_LIMIT: usize = 10;
const MIN_SUGGESTION_QUERY_LEN: usize = 2;
const SIMILAR_LIMIT: i64 = 4;

/// `GET /filter-options` — distinct facet values for the UI filter controls.
pub async fn filter_options(
    State(state): State<AppState>,
) -> Result<Json<FacetOptions>, AppError> {
    Ok(Json(state.repo.facet_options().await?))
}

#[derive(Debug, Deserialize)]
pub struct TrendingParams {
    limit: Option<String>,
}

/// `GET /trending` — available listings ranked by likes, views, recency.
pub async fn trending(
    State(state): State<AppState>,
    Query(params): Query<TrendingParams>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let limit = lenient_i64(params.limit.as_deref(), DEFAULT_TRENDING_LIMIT);
    Ok(Json(state.repo.trending(limit).await?))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    query: Option<String>,
}

/// `GET /search-suggestions` — autocomplete strings for the search box.
/// Queries under two characters yield an empty list rather than an error.
pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<Vec<String>>, AppError> {
    let query = params.query.unwrap_or_default();
    if query.trim().chars().count() < MIN_SUGGESTION_QUERY_LEN {
        return Ok(Json(vec![]));
    }

    let suggestions = state
        .repo
        .search_suggestions(query.trim(), SUGGESTION_LIMIT)
        .await?;
    Ok(Json(suggestions))
}

/// The ±20% rent window used for similar-listings matching.
fn rent_window(rent: i64) -> (i64, i64) {
    let rent = rent as f64;
    ((rent * 0.8).floor() as i64, (rent * 1.2).ceil() as i64)
}

/// The substring needle for location matching: the first comma-separated
/// segment, so a source in "Austin" also matches "Austin, TX".
fn location_needle(location: &str) -> &str {
    location.split(',').next().unwrap_or(location).trim()
}

/// `GET /roommates/{id}/similar` — up to four available listings near the
/// source in both location and rent, never including the source itself.
pub async fn similar_listings(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let source = state
        .repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Not found".to_string()))?;

    let (min_rent, max_rent) = rent_window(source.rent);
    let filter = ListingFilter {
        location: Some(location_needle(&source.location).to_string()),
        min_rent: Some(min_rent),
        max_rent: Some(max_rent),
        availability: Some("available".to_string()),
        exclude_id: Some(source.id.clone()),
        ..Default::default()
    };

    let similar = state
        .repo
        .find(&filter, Some(Sort::newest_first()), 0, SIMILAR_LIMIT)
        .await?;
    Ok(Json(json!(similar)))
}
