use std::sync::Arc;

use roommate_finder::db::repository::{ListingRepository, MemoryListingRepository};
use roommate_finder::router::build_router;
use roommate_finder::state::AppState;

/// Test environment: the full router wired to an in-memory listing store.
///
/// The repository handle is exposed so tests can drive it directly (e.g. for
/// concurrency properties) while observing the effects through the API.
pub struct TestEnv {
    pub repo: Arc<MemoryListingRepository>,
    router: axum::Router,
}

impl TestEnv {
    pub fn start() -> Self {
        let repo = Arc::new(MemoryListingRepository::new());
        let dyn_repo: Arc<dyn ListingRepository> = repo.clone();
        let router = build_router(AppState::new(dyn_repo));
        Self { repo, router }
    }

    /// Build an `axum_test::TestServer` from this environment's router.
    pub fn server(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder()
            .expect_success_by_default()
            .build(self.router.clone())
    }

    /// Build a `TestServer` that does NOT expect success by default (for error tests).
    pub fn server_permissive(&self) -> axum_test::TestServer {
        axum_test::TestServer::builder().build(self.router.clone())
    }

    /// Helper: create a listing via the API and return its id.
    pub async fn create_listing(
        &self,
        server: &axum_test::TestServer,
        title: &str,
        location: &str,
        rent: i64,
    ) -> String {
        let response = server
            .post("/roommates")
            .json(&listing_body(title, location, rent))
            .await;
        let body: serde_json::Value = response.json();
        body["roommate"]["_id"]
            .as_str()
            .expect("created listing should carry an _id")
            .to_string()
    }
}

/// A complete valid create-listing body with the given headline fields.
pub fn listing_body(title: &str, location: &str, rent: i64) -> serde_json::Value {
    serde_json::json!({
        "title": title,
        "location": location,
        "rent": rent,
        "roomType": "Single",
        "lifestyle": ["quiet"],
        "description": "A pleasant room with a window",
        "contactInfo": "host@example.com",
        "userEmail": "host@example.com",
        "userName": "Host"
    })
}
