pub mod api {
    pub mod batch;
    pub mod discovery;
    pub mod errors;
    pub mod health;
    pub mod listings;
    pub mod query;
    pub mod stats;
}
pub mod config;
pub mod db {
    pub mod models;
    pub mod repository;
}
pub mod error;
pub mod router;
pub mod state;
pub mod validation;
