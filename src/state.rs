use std::sync::Arc;
use std::time::Instant;

use crate::db::repository::ListingRepository;

/// Shared application state handed to every request handler.
///
/// The repository is the only shared mutable resource; it is constructed once
/// at startup and passed down explicitly rather than living in a global.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn ListingRepository>,
    /// Process start instant, reported as uptime by the health probe.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(repo: Arc<dyn ListingRepository>) -> Self {
        Self {
            repo,
            started_at: Instant::now(),
        }
    }
}
