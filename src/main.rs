#[tokio::main]
async fn main() {
    use std::sync::Arc;

    use roommate_finder::config::AppConfig;
    use roommate_finder::db::repository::MongoListingRepository;
    use roommate_finder::router::build_router;
    use roommate_finder::state::AppState;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roommate_finder=info,tower_http=info".into()),
        )
        .init();

    tracing::info!("Starting RoommateFinder server...");

    let config = AppConfig::from_env();

    // Connect to MongoDB
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .expect("Failed to connect to MongoDB");
    let mongo_db = mongo_client.database(&config.mongodb_database);
    let repo: Arc<dyn roommate_finder::db::repository::ListingRepository> =
        Arc::new(MongoListingRepository::new(&mongo_db));

    tracing::info!("Connected to MongoDB at {}", config.mongodb_uri);

    let app = build_router(AppState::new(repo));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
