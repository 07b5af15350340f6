use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a listing is still open for roommate applications.
///
/// Serialized exactly as the wire strings the frontend filters on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "not available")]
    NotAvailable,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::NotAvailable => "not available",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Availability::Available => Availability::NotAvailable,
            Availability::NotAvailable => Availability::Available,
        }
    }
}

/// A roommate listing stored in the `roommates` collection.
///
/// Field names are camelCase on the wire (and in BSON) to match the original
/// schema the frontend reads; the id travels as `_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Opaque identifier assigned by the store on insert.
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    /// Free-text location, matched via case-insensitive substring search.
    pub location: String,
    /// Monthly rent in whole currency units. Never negative.
    pub rent: i64,
    pub room_type: String,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    pub description: String,
    pub contact_info: String,
    #[serde(default)]
    pub availability: Availability,
    /// Owner identity as supplied by the caller. Not verified server-side;
    /// ownership is a UI convention, not an enforced guarantee.
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
    /// Monotonically incremented, never decremented, no per-user dedup.
    #[serde(default)]
    pub like_count: i64,
    /// Incremented on every detail fetch, repeat viewers included.
    #[serde(default)]
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Materialize a new document from client input: fresh id, zeroed
    /// counters, timestamps set to now.
    pub fn from_input(input: ListingInput) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().simple().to_string(),
            title: input.title,
            location: input.location,
            rent: input.rent,
            room_type: input.room_type,
            lifestyle: input.lifestyle,
            description: input.description,
            contact_info: input.contact_info,
            availability: input.availability,
            user_email: input.user_email,
            user_name: input.user_name,
            like_count: 0,
            view_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The client-settable subset of a listing: everything except the id, the
/// timestamps and the counters. Used for both create and full update, where
/// `lifestyle` is replaced wholesale rather than merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingInput {
    pub title: String,
    pub location: String,
    pub rent: i64,
    pub room_type: String,
    #[serde(default)]
    pub lifestyle: Vec<String>,
    pub description: String,
    pub contact_info: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub user_name: String,
}

/// Filter criteria for listing queries. All fields are conjunctive; `None`
/// means "don't filter on this dimension".
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Case-insensitive substring, OR-matched across title, location,
    /// description and userName.
    pub search: Option<String>,
    /// Case-insensitive substring match on location alone.
    pub location: Option<String>,
    /// Inclusive rent range.
    pub min_rent: Option<i64>,
    pub max_rent: Option<i64>,
    /// Exact match on the roomType label.
    pub room_type: Option<String>,
    /// Exact match on the availability string.
    pub availability: Option<String>,
    /// Exact match on the owner email.
    pub user_email: Option<String>,
    /// Excluded document id (used by similar-listings to drop the source).
    pub exclude_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Rent,
    LikeCount,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A single-key sort. Ties fall back to store-native order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    pub fn newest_first() -> Self {
        Self {
            key: SortKey::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

/// Distinct facet values used to populate the UI filter controls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetOptions {
    pub room_types: Vec<String>,
    pub locations: Vec<String>,
    pub rent_range: RentRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentRange {
    pub min_rent: i64,
    pub max_rent: i64,
}

/// One entry of the analytics top-locations ranking. Keeps the Mongo
/// aggregation shape (`_id` = group key) the dashboard already renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCount {
    #[serde(rename = "_id")]
    pub location: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceStats {
    pub avg_rent: f64,
    pub min_rent: i64,
    pub max_rent: i64,
}

/// Global aggregate view served by `GET /analytics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSnapshot {
    pub total_listings: u64,
    pub available_listings: u64,
    pub total_likes: i64,
    pub total_views: i64,
    pub recent_listings: Vec<Listing>,
    pub top_locations: Vec<LocationCount>,
    pub price_stats: PriceStats,
}
