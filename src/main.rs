use learnhub_api::server::app;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = learnhub_api::config::config();
    tracing::info!("Starting LearnHub API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 LearnHub API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
