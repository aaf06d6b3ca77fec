use users_backend::{
    datalayer::initialize_database, logging::init_telemetry, routes::create_router,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables first
    dotenvy::dotenv().ok();

    // Initialize telemetry (tracing, metrics, and logging)
    init_telemetry(None)?;

    tracing::info!("Starting Users Backend Application");

    // Initialize database: connect the pool and apply the schema migration
    let db = initialize_database().await?;

    tracing::info!("Database initialized successfully");

    // Create router with all routes; the storage handle travels in state
    let state = AppState::new(db.clone());
    let app = create_router(state);

    // Get server address from environment or use default
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        address = %addr,
        port = %port,
        "Server listening and ready to accept connections"
    );

    // Serve until a shutdown signal arrives; in-flight requests drain first
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Release the storage connection, then flush telemetry
    db.shutdown().await;
    users_backend::logging::shutdown_telemetry();

    Ok(())
}

/// Handle graceful shutdown signals
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::warn!("Shutdown signal received, cleaning up...");
}
