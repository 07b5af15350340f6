use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::models::{Listing, ListingFilter, Sort, SortKey, SortOrder};
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_MIN_RENT: i64 = 0;
const DEFAULT_MAX_RENT: i64 = 10_000;
const DEFAULT_PAGE_SIZE: i64 = 12;

/// Parse an optional numeric query parameter the way the frontend expects:
/// missing, malformed or non-positive values silently fall back to the
/// default instead of failing the request.
pub(crate) fn lenient_i64(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

/// Query-string surface of `GET /all-items`. Everything is optional; the
/// literal value `"All"` on roomType/availability means "no filter".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllItemsParams {
    pub search: Option<String>,
    pub location: Option<String>,
    pub min_rent: Option<String>,
    pub max_rent: Option<String>,
    pub room_type: Option<String>,
    pub availability: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl AllItemsParams {
    pub fn filter(&self) -> ListingFilter {
        ListingFilter {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            location: self
                .location
                .clone()
                .filter(|l| !l.is_empty() && l != "All"),
            min_rent: Some(lenient_i64(self.min_rent.as_deref(), DEFAULT_MIN_RENT)),
            max_rent: Some(lenient_i64(self.max_rent.as_deref(), DEFAULT_MAX_RENT)),
            room_type: self
                .room_type
                .clone()
                .filter(|r| !r.is_empty() && r != "All"),
            availability: self
                .availability
                .clone()
                .filter(|a| !a.is_empty() && a != "All"),
            ..Default::default()
        }
    }

    pub fn sort(&self) -> Sort {
        parse_sort(self.sort.as_deref(), self.order.as_deref())
    }

    pub fn page(&self) -> u64 {
        lenient_i64(self.page.as_deref(), 1) as u64
    }

    pub fn limit(&self) -> i64 {
        lenient_i64(self.limit.as_deref(), DEFAULT_PAGE_SIZE)
    }
}

/// Map the (sort, order) pair onto a store sort. Unknown sort names fall
/// back to newest-first; the explicit order only applies to the field sorts,
/// with a sensible direction when omitted.
fn parse_sort(sort: Option<&str>, order: Option<&str>) -> Sort {
    let explicit = match order {
        Some("asc") => Some(SortOrder::Asc),
        Some("desc") => Some(SortOrder::Desc),
        _ => None,
    };

    match sort.unwrap_or("newest") {
        "oldest" => Sort {
            key: SortKey::CreatedAt,
            order: SortOrder::Asc,
        },
        "rent" => Sort {
            key: SortKey::Rent,
            order: explicit.unwrap_or(SortOrder::Asc),
        },
        "likes" => Sort {
            key: SortKey::LikeCount,
            order: explicit.unwrap_or(SortOrder::Desc),
        },
        "title" => Sort {
            key: SortKey::Title,
            order: explicit.unwrap_or(SortOrder::Asc),
        },
        _ => Sort::newest_first(),
    }
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub current: u64,
    pub pages: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
pub struct PaginatedListings {
    pub items: Vec<Listing>,
    pub pagination: Pagination,
}

/// `GET /all-items` — the filtered, sorted, paginated listing query.
pub async fn all_items(
    State(state): State<AppState>,
    Query(params): Query<AllItemsParams>,
) -> Result<Json<PaginatedListings>, AppError> {
    let filter = params.filter();
    let sort = params.sort();
    let page = params.page();
    let limit = params.limit();

    let total = state.repo.count(&filter).await?;
    // page is client-controlled and can be arbitrarily large; saturate
    // instead of overflowing.
    let skip = page.saturating_sub(1).saturating_mul(limit as u64);
    let items = state.repo.find(&filter, Some(sort), skip, limit).await?;

    Ok(Json(PaginatedListings {
        items,
        pagination: Pagination {
            current: page,
            pages: total.div_ceil(limit as u64),
            total,
        },
    }))
}
