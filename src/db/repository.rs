use async_trait::async_trait;

use crate::db::models::{
    AnalyticsSnapshot, Availability, FacetOptions, Listing, ListingFilter, ListingInput,
    LocationCount, PriceStats, RentRange, Sort, SortKey, SortOrder,
};
use crate::error::AppError;

/// Maximum number of distinct locations returned to the filter controls.
const FACET_LOCATION_CAP: usize = 20;

/// Repository trait for listing persistence and query execution.
///
/// This trait allows substituting an in-memory store in tests.
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Insert a new listing: assigns the id and timestamps, zeroes counters.
    async fn insert(&self, input: ListingInput) -> Result<Listing, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, AppError>;

    /// Execute a filtered query. `limit <= 0` means unbounded. An empty
    /// result is a normal outcome, not an error.
    async fn find(
        &self,
        filter: &ListingFilter,
        sort: Option<Sort>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Listing>, AppError>;

    async fn count(&self, filter: &ListingFilter) -> Result<u64, AppError>;

    /// Replace the client-settable fields of a listing. Counters and
    /// createdAt are preserved; `lifestyle` is replaced wholesale.
    async fn update_by_id(
        &self,
        id: &str,
        input: ListingInput,
    ) -> Result<Option<Listing>, AppError>;

    /// Fetch a listing and atomically bump its viewCount in the same
    /// round-trip, so concurrent fetches never lose an increment.
    async fn fetch_and_count_view(&self, id: &str) -> Result<Option<Listing>, AppError>;

    /// Atomically increment likeCount, returning the new value.
    async fn increment_likes(&self, id: &str) -> Result<Option<i64>, AppError>;

    /// Remove a listing. Returns false when no document matched.
    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError>;

    /// Remove every listing whose id is in `ids`, returning the number
    /// actually removed.
    async fn delete_many(&self, ids: &[String]) -> Result<u64, AppError>;

    /// Set the availability flag. Returns false when no document matched.
    async fn set_availability(
        &self,
        id: &str,
        availability: Availability,
    ) -> Result<bool, AppError>;

    /// Distinct roomType and location values plus the global rent bounds.
    async fn facet_options(&self) -> Result<FacetOptions, AppError>;

    /// Available listings ranked by likes, then views, then recency.
    async fn trending(&self, limit: i64) -> Result<Vec<Listing>, AppError>;

    /// Distinct title/location strings containing `query`, case-insensitive.
    async fn search_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, AppError>;

    /// Global aggregate counters and rankings for the analytics view.
    async fn analytics_snapshot(&self) -> Result<AnalyticsSnapshot, AppError>;
}

// ---------------------------------------------------------------------------
// MongoDB implementation
// ---------------------------------------------------------------------------

pub struct MongoListingRepository {
    collection: mongodb::Collection<Listing>,
}

impl MongoListingRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection("roommates"),
        }
    }
}

/// Translate a [`ListingFilter`] into a MongoDB query document. Substring
/// dimensions become anchored-nowhere case-insensitive `$regex` clauses with
/// the user input escaped first.
fn filter_to_document(filter: &ListingFilter) -> mongodb::bson::Document {
    use mongodb::bson::{doc, Bson, Document};

    let mut query = Document::new();

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = regex::escape(search);
        let clauses: Vec<Bson> = ["title", "location", "description", "userName"]
            .iter()
            .map(|field| {
                let mut clause = Document::new();
                clause.insert(*field, doc! { "$regex": &pattern, "$options": "i" });
                Bson::Document(clause)
            })
            .collect();
        query.insert("$or", clauses);
    }

    if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
        query.insert(
            "location",
            doc! { "$regex": regex::escape(location), "$options": "i" },
        );
    }

    let mut rent = Document::new();
    if let Some(min) = filter.min_rent {
        rent.insert("$gte", min);
    }
    if let Some(max) = filter.max_rent {
        rent.insert("$lte", max);
    }
    if !rent.is_empty() {
        query.insert("rent", rent);
    }

    if let Some(room_type) = &filter.room_type {
        query.insert("roomType", room_type);
    }
    if let Some(availability) = &filter.availability {
        query.insert("availability", availability);
    }
    if let Some(email) = &filter.user_email {
        query.insert("userEmail", email);
    }
    if let Some(id) = &filter.exclude_id {
        query.insert("_id", doc! { "$ne": id });
    }

    query
}

fn sort_to_document(sort: Sort) -> mongodb::bson::Document {
    let key = match sort.key {
        SortKey::CreatedAt => "createdAt",
        SortKey::Rent => "rent",
        SortKey::LikeCount => "likeCount",
        SortKey::Title => "title",
    };
    let direction: i32 = match sort.order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    };
    let mut doc = mongodb::bson::Document::new();
    doc.insert(key, direction);
    doc
}

fn bson_i64(doc: &mongodb::bson::Document, key: &str) -> i64 {
    use mongodb::bson::Bson;
    match doc.get(key) {
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(Bson::Double(v)) => *v as i64,
        _ => 0,
    }
}

fn bson_f64(doc: &mongodb::bson::Document, key: &str) -> f64 {
    use mongodb::bson::Bson;
    match doc.get(key) {
        Some(Bson::Int32(v)) => f64::from(*v),
        Some(Bson::Int64(v)) => *v as f64,
        Some(Bson::Double(v)) => *v,
        _ => 0.0,
    }
}

#[async_trait]
impl ListingRepository for MongoListingRepository {
    async fn insert(&self, input: ListingInput) -> Result<Listing, AppError> {
        let listing = Listing::from_input(input);

        self.collection
            .insert_one(&listing)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(listing)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, AppError> {
        use mongodb::bson::doc;

        self.collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find(
        &self,
        filter: &ListingFilter,
        sort: Option<Sort>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Listing>, AppError> {
        use futures::TryStreamExt;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(sort.map(sort_to_document))
            .skip(if skip > 0 { Some(skip) } else { None })
            .limit(if limit > 0 { Some(limit) } else { None })
            .build();

        let cursor = self
            .collection
            .find(filter_to_document(filter))
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, AppError> {
        self.collection
            .count_documents(filter_to_document(filter))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn update_by_id(
        &self,
        id: &str,
        input: ListingInput,
    ) -> Result<Option<Listing>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let mut set_doc =
            mongodb::bson::to_document(&input).map_err(|e| AppError::Database(e.to_string()))?;
        set_doc.insert(
            "updatedAt",
            mongodb::bson::to_bson(&chrono::Utc::now())
                .map_err(|e| AppError::Database(e.to_string()))?,
        );

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set_doc })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn fetch_and_count_view(&self, id: &str) -> Result<Option<Listing>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "viewCount": 1 } })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn increment_likes(&self, id: &str) -> Result<Option<i64>, AppError> {
        use mongodb::bson::doc;
        use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "likeCount": 1 } })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated.map(|listing| listing.like_count))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count == 1)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, AppError> {
        use mongodb::bson::doc;

        let result = self
            .collection
            .delete_many(doc! { "_id": { "$in": ids.to_vec() } })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.deleted_count)
    }

    async fn set_availability(
        &self,
        id: &str,
        availability: Availability,
    ) -> Result<bool, AppError> {
        use mongodb::bson::doc;

        let updated_at = mongodb::bson::to_bson(&chrono::Utc::now())
            .map_err(|e| AppError::Database(e.to_string()))?;

        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "availability": availability.as_str(), "updatedAt": updated_at } },
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.matched_count == 1)
    }

    async fn facet_options(&self) -> Result<FacetOptions, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::{doc, Bson, Document};

        let room_types: Vec<String> = self
            .collection
            .distinct("roomType", doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .collect();

        let locations: Vec<String> = self
            .collection
            .distinct("location", doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .into_iter()
            .filter_map(|value| value.as_str().map(str::to_string))
            .take(FACET_LOCATION_CAP)
            .collect();

        let pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "minRent": { "$min": "$rent" },
                "maxRent": { "$max": "$rent" },
            }
        }];
        let bounds: Vec<Document> = self
            .collection
            .aggregate(pipeline)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let rent_range = bounds
            .first()
            .map(|doc| RentRange {
                min_rent: bson_i64(doc, "minRent"),
                max_rent: bson_i64(doc, "maxRent"),
            })
            .unwrap_or(RentRange {
                min_rent: 0,
                max_rent: 0,
            });

        Ok(FacetOptions {
            room_types,
            locations,
            rent_range,
        })
    }

    async fn trending(&self, limit: i64) -> Result<Vec<Listing>, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::doc;
        use mongodb::options::FindOptions;

        let options = FindOptions::builder()
            .sort(doc! { "likeCount": -1, "viewCount": -1, "createdAt": -1 })
            .limit(limit)
            .build();

        let cursor = self
            .collection
            .find(doc! { "availability": "available" })
            .with_options(options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn search_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        use mongodb::bson::doc;

        let pattern = regex::escape(query);
        let mut suggestions: Vec<String> = Vec::new();

        for field in ["title", "location"] {
            let mut filter = mongodb::bson::Document::new();
            filter.insert(field, doc! { "$regex": &pattern, "$options": "i" });

            let values = self
                .collection
                .distinct(field, filter)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            for value in values {
                if let Some(text) = value.as_str() {
                    if !suggestions.iter().any(|s| s == text) {
                        suggestions.push(text.to_string());
                    }
                }
            }
        }

        suggestions.truncate(limit);
        Ok(suggestions)
    }

    async fn analytics_snapshot(&self) -> Result<AnalyticsSnapshot, AppError> {
        use futures::TryStreamExt;
        use mongodb::bson::{doc, Bson, Document};
        use mongodb::options::FindOptions;

        let total_listings = self
            .collection
            .count_documents(doc! {})
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        let available_listings = self
            .collection
            .count_documents(doc! { "availability": "available" })
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let totals_pipeline = vec![doc! {
            "$group": {
                "_id": Bson::Null,
                "totalLikes": { "$sum": "$likeCount" },
                "totalViews": { "$sum": "$viewCount" },
                "avgRent": { "$avg": "$rent" },
                "minRent": { "$min": "$rent" },
                "maxRent": { "$max": "$rent" },
            }
        }];
        let totals: Vec<Document> = self
            .collection
            .aggregate(totals_pipeline)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let (total_likes, total_views, price_stats) = totals
            .first()
            .map(|doc| {
                (
                    bson_i64(doc, "totalLikes"),
                    bson_i64(doc, "totalViews"),
                    PriceStats {
                        avg_rent: bson_f64(doc, "avgRent"),
                        min_rent: bson_i64(doc, "minRent"),
                        max_rent: bson_i64(doc, "maxRent"),
                    },
                )
            })
            .unwrap_or((
                0,
                0,
                PriceStats {
                    avg_rent: 0.0,
                    min_rent: 0,
                    max_rent: 0,
                },
            ));

        let recent_options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(10)
            .build();
        let recent_listings: Vec<Listing> = self
            .collection
            .find(doc! {})
            .with_options(recent_options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let locations_pipeline = vec![
            doc! { "$group": { "_id": "$location", "count": { "$sum": 1 } } },
            doc! { "$sort": { "count": -1, "_id": 1 } },
            doc! { "$limit": 5 },
        ];
        let location_docs: Vec<Document> = self
            .collection
            .aggregate(locations_pipeline)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let top_locations = location_docs
            .into_iter()
            .filter_map(|doc| mongodb::bson::from_document::<LocationCount>(doc).ok())
            .collect();

        Ok(AnalyticsSnapshot {
            total_listings,
            available_listings,
            total_likes,
            total_views,
            recent_listings,
            top_locations,
            price_stats,
        })
    }
}

// ---------------------------------------------------------------------------
// In-memory implementation
// ---------------------------------------------------------------------------

/// In-memory store backing integration tests and local development without a
/// running MongoDB. All mutations happen under a single mutex, which gives the
/// same lost-update-free counter semantics as the driver's `$inc`.
#[derive(Default)]
pub struct MemoryListingRepository {
    listings: std::sync::Mutex<Vec<Listing>>,
}

impl MemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Vec<Listing>> {
        self.listings.lock().expect("listing store mutex poisoned")
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches(listing: &Listing, filter: &ListingFilter) -> bool {
    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        let hit = contains_ci(&listing.title, search)
            || contains_ci(&listing.location, search)
            || contains_ci(&listing.description, search)
            || contains_ci(&listing.user_name, search);
        if !hit {
            return false;
        }
    }
    if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
        if !contains_ci(&listing.location, location) {
            return false;
        }
    }
    if let Some(min) = filter.min_rent {
        if listing.rent < min {
            return false;
        }
    }
    if let Some(max) = filter.max_rent {
        if listing.rent > max {
            return false;
        }
    }
    if let Some(room_type) = &filter.room_type {
        if &listing.room_type != room_type {
            return false;
        }
    }
    if let Some(availability) = &filter.availability {
        if listing.availability.as_str() != availability {
            return false;
        }
    }
    if let Some(email) = &filter.user_email {
        if &listing.user_email != email {
            return false;
        }
    }
    if let Some(id) = &filter.exclude_id {
        if &listing.id == id {
            return false;
        }
    }
    true
}

fn compare(a: &Listing, b: &Listing, sort: Sort) -> std::cmp::Ordering {
    let ordering = match sort.key {
        SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        SortKey::Rent => a.rent.cmp(&b.rent),
        SortKey::LikeCount => a.like_count.cmp(&b.like_count),
        SortKey::Title => a.title.cmp(&b.title),
    };
    match sort.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl ListingRepository for MemoryListingRepository {
    async fn insert(&self, input: ListingInput) -> Result<Listing, AppError> {
        let listing = Listing::from_input(input);
        self.store().push(listing.clone());
        Ok(listing)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, AppError> {
        Ok(self.store().iter().find(|l| l.id == id).cloned())
    }

    async fn find(
        &self,
        filter: &ListingFilter,
        sort: Option<Sort>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Listing>, AppError> {
        let mut matched: Vec<Listing> = self
            .store()
            .iter()
            .filter(|l| matches(l, filter))
            .cloned()
            .collect();
        if let Some(sort) = sort {
            // Stable sort keeps insertion order for ties, like Mongo's
            // natural order on an unindexed collection.
            matched.sort_by(|a, b| compare(a, b, sort));
        }

        let mut page: Vec<Listing> = matched.into_iter().skip(skip as usize).collect();
        if limit > 0 {
            page.truncate(limit as usize);
        }
        Ok(page)
    }

    async fn count(&self, filter: &ListingFilter) -> Result<u64, AppError> {
        Ok(self.store().iter().filter(|l| matches(l, filter)).count() as u64)
    }

    async fn update_by_id(
        &self,
        id: &str,
        input: ListingInput,
    ) -> Result<Option<Listing>, AppError> {
        let mut store = self.store();
        let Some(listing) = store.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };

        listing.title = input.title;
        listing.location = input.location;
        listing.rent = input.rent;
        listing.room_type = input.room_type;
        listing.lifestyle = input.lifestyle;
        listing.description = input.description;
        listing.contact_info = input.contact_info;
        listing.availability = input.availability;
        listing.user_email = input.user_email;
        listing.user_name = input.user_name;
        listing.updated_at = chrono::Utc::now();

        Ok(Some(listing.clone()))
    }

    async fn fetch_and_count_view(&self, id: &str) -> Result<Option<Listing>, AppError> {
        let mut store = self.store();
        let Some(listing) = store.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        listing.view_count += 1;
        Ok(Some(listing.clone()))
    }

    async fn increment_likes(&self, id: &str) -> Result<Option<i64>, AppError> {
        let mut store = self.store();
        let Some(listing) = store.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        listing.like_count += 1;
        Ok(Some(listing.like_count))
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, AppError> {
        let mut store = self.store();
        let before = store.len();
        store.retain(|l| l.id != id);
        Ok(store.len() < before)
    }

    async fn delete_many(&self, ids: &[String]) -> Result<u64, AppError> {
        let mut store = self.store();
        let before = store.len();
        store.retain(|l| !ids.contains(&l.id));
        Ok((before - store.len()) as u64)
    }

    async fn set_availability(
        &self,
        id: &str,
        availability: Availability,
    ) -> Result<bool, AppError> {
        let mut store = self.store();
        let Some(listing) = store.iter_mut().find(|l| l.id == id) else {
            return Ok(false);
        };
        listing.availability = availability;
        listing.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn facet_options(&self) -> Result<FacetOptions, AppError> {
        let store = self.store();

        let mut room_types: Vec<String> = Vec::new();
        let mut locations: Vec<String> = Vec::new();
        for listing in store.iter() {
            if !room_types.contains(&listing.room_type) {
                room_types.push(listing.room_type.clone());
            }
            if !locations.contains(&listing.location) {
                locations.push(listing.location.clone());
            }
        }
        locations.truncate(FACET_LOCATION_CAP);

        let rent_range = RentRange {
            min_rent: store.iter().map(|l| l.rent).min().unwrap_or(0),
            max_rent: store.iter().map(|l| l.rent).max().unwrap_or(0),
        };

        Ok(FacetOptions {
            room_types,
            locations,
            rent_range,
        })
    }

    async fn trending(&self, limit: i64) -> Result<Vec<Listing>, AppError> {
        let mut available: Vec<Listing> = self
            .store()
            .iter()
            .filter(|l| l.availability == Availability::Available)
            .cloned()
            .collect();
        available.sort_by(|a, b| {
            b.like_count
                .cmp(&a.like_count)
                .then(b.view_count.cmp(&a.view_count))
                .then(b.created_at.cmp(&a.created_at))
        });
        if limit > 0 {
            available.truncate(limit as usize);
        }
        Ok(available)
    }

    async fn search_suggestions(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, AppError> {
        let store = self.store();
        let mut suggestions: Vec<String> = Vec::new();

        for listing in store.iter() {
            if contains_ci(&listing.title, query) && !suggestions.contains(&listing.title) {
                suggestions.push(listing.title.clone());
            }
        }
        for listing in store.iter() {
            if contains_ci(&listing.location, query) && !suggestions.contains(&listing.location) {
                suggestions.push(listing.location.clone());
            }
        }

        suggestions.truncate(limit);
        Ok(suggestions)
    }

    async fn analytics_snapshot(&self) -> Result<AnalyticsSnapshot, AppError> {
        let store = self.store();

        let total_listings = store.len() as u64;
        let available_listings = store
            .iter()
            .filter(|l| l.availability == Availability::Available)
            .count() as u64;
        let total_likes: i64 = store.iter().map(|l| l.like_count).sum();
        let total_views: i64 = store.iter().map(|l| l.view_count).sum();

        let price_stats = if store.is_empty() {
            PriceStats {
                avg_rent: 0.0,
                min_rent: 0,
                max_rent: 0,
            }
        } else {
            let rent_sum: i64 = store.iter().map(|l| l.rent).sum();
            PriceStats {
                avg_rent: rent_sum as f64 / store.len() as f64,
                min_rent: store.iter().map(|l| l.rent).min().unwrap_or(0),
                max_rent: store.iter().map(|l| l.rent).max().unwrap_or(0),
            }
        };

        let mut recent_listings: Vec<Listing> = store.iter().cloned().collect();
        recent_listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent_listings.truncate(10);

        let mut counts: Vec<LocationCount> = Vec::new();
        for listing in store.iter() {
            match counts.iter_mut().find(|c| c.location == listing.location) {
                Some(entry) => entry.count += 1,
                None => counts.push(LocationCount {
                    location: listing.location.clone(),
                    count: 1,
                }),
            }
        }
        counts.sort_by(|a, b| b.count.cmp(&a.count).then(a.location.cmp(&b.location)));
        counts.truncate(5);

        Ok(AnalyticsSnapshot {
            total_listings,
            available_listings,
            total_likes,
            total_views,
            recent_listings,
            top_locations: counts,
            price_stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ListingInput;

    fn input(title: &str, location: &str, rent: i64) -> ListingInput {
        ListingInput {
            title: title.to_string(),
            location: location.to_string(),
            rent,
            room_type: "Single".to_string(),
            lifestyle: vec![],
            description: "A room".to_string(),
            contact_info: "contact@example.com".to_string(),
            availability: Availability::Available,
            user_email: "owner@example.com".to_string(),
            user_name: "Owner".to_string(),
        }
    }

    #[test]
    fn filter_document_escapes_regex_metacharacters() {
        let filter = ListingFilter {
            search: Some("c++ (downtown)".to_string()),
            ..Default::default()
        };
        let doc = filter_to_document(&filter);
        let or = doc.get_array("$or").unwrap();
        let title_clause = or[0].as_document().unwrap();
        let pattern = title_clause
            .get_document("title")
            .unwrap()
            .get_str("$regex")
            .unwrap();
        assert_eq!(pattern, "c\\+\\+ \\(downtown\\)");
    }

    #[test]
    fn filter_document_builds_inclusive_rent_range() {
        let filter = ListingFilter {
            min_rent: Some(500),
            max_rent: Some(1500),
            ..Default::default()
        };
        let doc = filter_to_document(&filter);
        let rent = doc.get_document("rent").unwrap();
        assert_eq!(rent.get_i64("$gte").unwrap(), 500);
        assert_eq!(rent.get_i64("$lte").unwrap(), 1500);
    }

    #[test]
    fn empty_filter_produces_empty_query() {
        assert!(filter_to_document(&ListingFilter::default()).is_empty());
    }

    #[tokio::test]
    async fn memory_search_matches_across_fields() {
        let repo = MemoryListingRepository::new();
        repo.insert(input("Cozy loft", "Berlin", 700)).await.unwrap();
        repo.insert(input("Garden room", "Lisbon", 600)).await.unwrap();

        let filter = ListingFilter {
            search: Some("berlin".to_string()),
            ..Default::default()
        };
        let found = repo.find(&filter, None, 0, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Cozy loft");
    }

    #[tokio::test]
    async fn memory_sort_and_pagination() {
        let repo = MemoryListingRepository::new();
        for (title, rent) in [("a", 900), ("b", 300), ("c", 600)] {
            repo.insert(input(title, "Town", rent)).await.unwrap();
        }

        let sort = Sort {
            key: SortKey::Rent,
            order: SortOrder::Asc,
        };
        let page = repo
            .find(&ListingFilter::default(), Some(sort), 1, 1)
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].rent, 600);
    }

    #[tokio::test]
    async fn memory_update_preserves_counters_and_created_at() {
        let repo = MemoryListingRepository::new();
        let created = repo.insert(input("Old title", "Town", 500)).await.unwrap();
        repo.increment_likes(&created.id).await.unwrap();
        repo.fetch_and_count_view(&created.id).await.unwrap();

        let updated = repo
            .update_by_id(&created.id, input("New title", "Town", 550))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.like_count, 1);
        assert_eq!(updated.view_count, 1);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn memory_delete_many_reports_removed_count() {
        let repo = MemoryListingRepository::new();
        let a = repo.insert(input("a", "Town", 100)).await.unwrap();
        let b = repo.insert(input("b", "Town", 200)).await.unwrap();
        repo.insert(input("c", "Town", 300)).await.unwrap();

        let removed = repo
            .delete_many(&[a.id, b.id, "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.count(&ListingFilter::default()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn memory_trending_ranks_by_likes_then_views() {
        let repo = MemoryListingRepository::new();
        let quiet = repo.insert(input("quiet", "Town", 100)).await.unwrap();
        let liked = repo.insert(input("liked", "Town", 200)).await.unwrap();
        let viewed = repo.insert(input("viewed", "Town", 300)).await.unwrap();

        repo.increment_likes(&liked.id).await.unwrap();
        repo.fetch_and_count_view(&viewed.id).await.unwrap();
        // Unavailable listings never trend, regardless of counters.
        repo.set_availability(&quiet.id, Availability::NotAvailable)
            .await
            .unwrap();

        let top = repo.trending(6).await.unwrap();
        let titles: Vec<&str> = top.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["liked", "viewed"]);
    }

    #[tokio::test]
    async fn memory_suggestions_dedupe_and_cap() {
        let repo = MemoryListingRepository::new();
        repo.insert(input("Room in Austin", "Austin", 100)).await.unwrap();
        repo.insert(input("Room in Austin", "Austin, TX", 200)).await.unwrap();

        let suggestions = repo.search_suggestions("austin", 10).await.unwrap();
        assert_eq!(
            suggestions,
            vec!["Room in Austin", "Austin", "Austin, TX"]
        );
    }

    #[tokio::test]
    async fn memory_analytics_aggregates() {
        let repo = MemoryListingRepository::new();
        repo.insert(input("a", "Austin", 1000)).await.unwrap();
        let b = repo.insert(input("b", "Austin", 2000)).await.unwrap();
        repo.insert(input("c", "Lisbon", 600)).await.unwrap();
        repo.increment_likes(&b.id).await.unwrap();
        repo.set_availability(&b.id, Availability::NotAvailable)
            .await
            .unwrap();

        let snapshot = repo.analytics_snapshot().await.unwrap();
        assert_eq!(snapshot.total_listings, 3);
        assert_eq!(snapshot.available_listings, 2);
        assert_eq!(snapshot.total_likes, 1);
        assert_eq!(snapshot.price_stats.min_rent, 600);
        assert_eq!(snapshot.price_stats.max_rent, 2000);
        assert_eq!(snapshot.price_stats.avg_rent, 1200.0);
        assert_eq!(snapshot.top_locations[0].location, "Austin");
        assert_eq!(snapshot.top_locations[0].count, 2);
    }
}
