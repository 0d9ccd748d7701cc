use anyhow::Context;
use chartline::api::{self, app_state::AppState};
use chartline::cli;
use chartline::config::loader::ConfigLoader;
use chartline::observability::{
    AppMetrics, HealthCheckResult, ObservabilityState, create_observability_router, init_tracing,
};
use chartline::services::session::DocumentationSession;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::load().context("failed to load configuration")?;
    ConfigLoader::validate(&config).context("invalid configuration")?;

    let _log_guard = init_tracing(&config.logging);
    info!(
        "Starting {} ({} environment)...",
        config.app_name, config.environment
    );
    info!("Configuration loaded successfully");

    let session = DocumentationSession::from_config(&config).await?;
    let mode = session.mode();
    let embedding_ok = session.semantic_index_available();
    let generation_ok = session.notes_available();
    info!("Documentation session initialized (mode: {})", mode.as_str());

    if std::env::var("CHARTLINE_MODE").is_ok_and(|m| m.eq_ignore_ascii_case("repl")) {
        info!("Starting interactive console...");
        cli::run_repl(session).await?;
        return Ok(());
    }

    let metrics = AppMetrics::default();
    let app_state = AppState::new(session, metrics.clone());
    info!("Application state created");

    let observability_state = Arc::new(ObservabilityState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        metrics,
    ));
    observability_state
        .set_health_check(HealthCheckResult::new("timeline", true, "in-memory"))
        .await;
    observability_state
        .set_health_check(HealthCheckResult::new(
            "embedding",
            embedding_ok,
            if embedding_ok {
                config.embedding.backend.as_str()
            } else {
                "semantic index unavailable"
            },
        ))
        .await;
    observability_state
        .set_health_check(HealthCheckResult::new(
            "generation",
            generation_ok,
            if generation_ok {
                config.generation.backend.as_str()
            } else {
                "note generation unavailable"
            },
        ))
        .await;

    let api_router = api::create_router(app_state, &config.server);
    let router = create_observability_router(observability_state).merge(api_router);
    info!("API router created with observability endpoints");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, router).await?;

    Ok(())
}
