mod config;
mod db;
mod errors;
mod evaluator;
mod journal;
mod llm_client;
mod models;
mod routes;
mod state;
mod store;
#[cfg(test)]
mod testutil;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::evaluator::LlmEvaluator;
use crate::journal::Journal;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{PgEntryStore, PgEvaluationStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("hibi_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hibi API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM-backed evaluator
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    let evaluator = Arc::new(LlmEvaluator::new(llm));
    info!("Evaluator initialized (model: {})", llm_client::MODEL);

    // Wire the orchestrator to the Postgres stores
    let journal = Journal::new(
        Arc::new(PgEntryStore::new(db.clone())),
        Arc::new(PgEvaluationStore::new(db)),
        evaluator,
    );

    let state = AppState {
        journal,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
