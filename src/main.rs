// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::{DashboardService, SessionSettings};
use crate::application::persistence::PersistenceGateway;
use crate::application::visualization_service::VisualizationService;
use crate::domain::scenario::ScenarioCatalog;
use crate::infrastructure::config::{load_app_config, load_scenarios};
use crate::infrastructure::json_file_repository::JsonFileRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    ask_assistant, dispatch_action, drop_tile, generate_visualization, get_dashboard,
    health_check, list_scenarios, list_suggestions, presentation, redo, set_edit_mode, undo,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config().context("loading config/app")?;
    let scenarios = load_scenarios().context("loading config/scenarios")?;
    let catalog = Arc::new(ScenarioCatalog::new(scenarios.scenarios));
    tracing::info!("Loaded {} scenarios", catalog.all().len());

    // Create repository (infrastructure layer)
    let repository = Arc::new(JsonFileRepository::new(app_config.storage.data_dir.clone()));

    // Create services (application layer)
    let visualization_service =
        VisualizationService::new(catalog.clone(), app_config.assistant.latency());
    let dashboard_service = DashboardService::new(
        catalog.clone(),
        PersistenceGateway::new(repository),
        visualization_service.clone(),
        SessionSettings {
            history_limit: app_config.history.limit,
            save_debounce: app_config.storage.debounce(),
        },
    );

    // Create application state
    let state = Arc::new(AppState {
        catalog,
        dashboard_service,
        visualization_service,
    });

    // Build router (presentation layer)
    // Responses are compressed in json_response, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/scenarios", get(list_scenarios))
        .route("/scenarios/:id/suggestions", get(list_suggestions))
        .route("/scenarios/:id/dashboard", get(get_dashboard))
        .route("/scenarios/:id/actions", post(dispatch_action))
        .route("/scenarios/:id/undo", post(undo))
        .route("/scenarios/:id/redo", post(redo))
        .route("/scenarios/:id/edit-mode", post(set_edit_mode))
        .route("/scenarios/:id/tiles/:tile_id/query", post(ask_assistant))
        .route("/scenarios/:id/drop", post(drop_tile))
        .route("/scenarios/:id/presentation", get(presentation))
        .route("/visualization", post(generate_visualization))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .address
        .parse()
        .with_context(|| format!("invalid server address {}", app_config.server.address))?;
    tracing::info!("Starting dashboard-builder service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
