use std::sync::Arc;

use feedback_desk::config::ServerConfig;
use feedback_desk::state::AppState;
use feedback_desk::store::{FeedbackStore, MemoryStore, PgStore};
use feedback_desk::{db, routes};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!(error = %e, "no .env file loaded");
    }

    let config = ServerConfig::from_env()?;

    // No DATABASE_URL is non-fatal: feedback lives in memory for this process.
    let store: Arc<dyn FeedbackStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections).await?;
            tracing::info!(max_connections = config.db_max_connections, "postgres feedback store ready");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; feedback is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(reviewers = ?config.roster.names(), "reviewer roster loaded");
    let state = AppState::new(store, config.roster, config.max_list_limit);

    let app = routes::app(state);
    let port = config.port;
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, "feedback server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
