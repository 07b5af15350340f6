/// Server configuration read from environment variables.
///
/// Every variable has a local-development default, so a bare `cargo run`
/// against a localhost MongoDB works without any setup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// MongoDB connection string (`MONGODB_URI`).
    pub mongodb_uri: String,
    /// Database name (`MONGODB_DATABASE`).
    pub mongodb_database: String,
    /// TCP port to listen on (`PORT`).
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mongodb_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let mongodb_database =
            std::env::var("MONGODB_DATABASE").unwrap_or_else(|_| "roommate_finder".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        Self {
            mongodb_uri,
            mongodb_database,
            port,
        }
    }
}
