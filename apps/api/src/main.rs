mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::OpenAiResumeAnalyzer;
use crate::analysis::policy::ScoringPolicy;
use crate::analysis::storage::TempFileStore;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Scratch directory for in-flight uploads
    let store = TempFileStore::new(&config.upload_dir).await?;
    info!("Upload directory ready at {}", store.dir().display());

    // Scoring policy (prompt profile)
    let policy = Arc::new(ScoringPolicy::load(
        &config.scoring_policy,
        config.scoring_policy_file.as_deref(),
    )?);
    info!(
        "Scoring policy: {} (threshold {}, validation {:?})",
        policy.name, policy.ready_threshold, config.verdict_validation
    );

    // Initialize LLM client
    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.request_timeout,
    )?;
    info!("LLM client initialized (model: {})", config.openai_model);

    let analyzer = Arc::new(OpenAiResumeAnalyzer::new(
        llm,
        config.openai_model.clone(),
        policy.clone(),
    ));

    // Build app state
    let state = AppState {
        analyzer,
        store,
        policy,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
