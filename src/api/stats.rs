use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::db::models::{AnalyticsSnapshot, Listing, ListingFilter, Sort};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EmailParams {
    email: Option<String>,
}

fn require_email(params: &EmailParams) -> Result<String, AppError> {
    params
        .email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("Email required".to_string()))
}

/// `GET /my-listings` — all listings owned by the given email, newest first.
/// The email is trusted as supplied; ownership is advisory only.
pub async fn my_listings(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Json<Value>, AppError> {
    let email = require_email(&params)?;

    let filter = ListingFilter {
        user_email: Some(email),
        ..Default::default()
    };
    let listings = state
        .repo
        .find(&filter, Some(Sort::newest_first()), 0, 0)
        .await?;
    Ok(Json(json!(listings)))
}

/// Trimmed listing projection shown in the dashboard's recent-items panel.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub rent: i64,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
}

impl From<&Listing> for RecentItem {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            rent: listing.rent,
            created_at: listing.created_at,
            like_count: listing.like_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: u64,
    pub my_items: u64,
    pub available_items: u64,
    pub total_likes: i64,
    pub recent_items: Vec<RecentItem>,
}

/// `GET /dashboard/stats` — per-caller aggregate view.
pub async fn dashboard_stats(
    State(state): State<AppState>,
    Query(params): Query<EmailParams>,
) -> Result<Json<DashboardStats>, AppError> {
    let email = require_email(&params)?;

    let total_items = state.repo.count(&ListingFilter::default()).await?;
    let available_items = state
        .repo
        .count(&ListingFilter {
            availability: Some("available".to_string()),
            ..Default::default()
        })
        .await?;

    let mine_filter = ListingFilter {
        user_email: Some(email),
        ..Default::default()
    };
    let mine = state
        .repo
        .find(&mine_filter, Some(Sort::newest_first()), 0, 0)
        .await?;

    let total_likes = mine.iter().map(|l| l.like_count).sum();
    let recent_items = mine.iter().take(5).map(RecentItem::from).collect();

    Ok(Json(DashboardStats {
        total_items,
        my_items: mine.len() as u64,
        available_items,
        total_likes,
        recent_items,
    }))
}

/// `GET /analytics` — global aggregate view.
pub async fn analytics(
    State(state): State<AppState>,
) -> Result<Json<AnalyticsSnapshot>, AppError> {
    Ok(Json(state.repo.analytics_snapshot().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_email_rejects_missing_and_blank() {
        for email in [None, Some(String::new()), Some("   ".to_string())] {
            let params = EmailParams { email };
            match require_email(&params).unwrap_err() {
                AppError::BadRequest(msg) => assert_eq!(msg, "Email required"),
                other => panic!("Expected BadRequest, got: {:?}", other),
            }
        }
    }

    #[test]
    fn recent_item_serializes_wire_names() {
        let item = RecentItem {
            id: "abc".to_string(),
            title: "Room".to_string(),
            rent: 700,
            created_at: Utc::now(),
            like_count: 3,
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["_id"], "abc");
        assert_eq!(json["likeCount"], 3);
        assert!(json.get("createdAt").is_some());
    }
}
