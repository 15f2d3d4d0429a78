use lms_api::{config::ApiConfig, state::ApiState};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env()?;

    lms_api::tracing::init_tracing(&config.env);

    // Connect and bring the schema up to date
    let pool = lms_db::create_pool(&config.database_url, 10).await?;
    lms_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    // Initialize the application state
    let state = ApiState::new(config, pool);

    // Create the application router
    let app = lms_api::router::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive());

    // Start the server
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await?;

    Ok(())
}
