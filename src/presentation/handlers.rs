// HTTP request handlers
use crate::application::dashboard_service::ServiceError;
use crate::application::visualization_service::VisualizationError;
use crate::domain::scenario::{ScenarioSummary, SuggestedQuery};
use crate::domain::state::Action;
use crate::domain::tile::SizeType;
use crate::domain::visualization::{Visualization, VisualizationRequest};
use crate::infrastructure::http_response::{accepts_brotli, json_response, json_response_with_status};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

#[derive(Deserialize)]
pub struct SuggestionsQuery {
    pub size: Option<SizeType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditModeRequest {
    pub enabled: bool,
    #[serde(default)]
    pub abandon_pending: bool,
}

#[derive(Deserialize)]
pub struct AssistantQuery {
    pub query: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropRequest {
    pub dragged_tile_id: String,
    pub target_tile_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pending_tiles: Vec<String>,
}

#[derive(Serialize)]
struct VisualizationResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    visualization: Option<Visualization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn visualization_status(error: &VisualizationError) -> StatusCode {
    match error {
        VisualizationError::EmptyQuery => StatusCode::BAD_REQUEST,
        VisualizationError::UnknownScenario(_) | VisualizationError::NoVisualizations(_) => {
            StatusCode::NOT_FOUND
        }
    }
}

fn service_status(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::UnknownScenario(_) | ServiceError::UnknownTile(_) => StatusCode::NOT_FOUND,
        ServiceError::Validation(_) | ServiceError::NotInEditMode => StatusCode::BAD_REQUEST,
        ServiceError::PendingOperations(_) => StatusCode::CONFLICT,
        ServiceError::Visualization(e) => visualization_status(e),
    }
}

async fn send<T: Serialize>(status: StatusCode, value: &T, compress: bool) -> Response {
    match json_response_with_status(status, value, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn respond<T: Serialize>(result: Result<T, ServiceError>, compress: bool) -> Response {
    match result {
        Ok(value) => match json_response(&value, compress).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        },
        Err(e) => {
            let status = service_status(&e);
            if status.is_server_error() {
                tracing::error!("Request failed: {}", e);
            } else {
                tracing::debug!("Request rejected: {}", e);
            }
            let pending_tiles = match &e {
                ServiceError::PendingOperations(tiles) => tiles.clone(),
                _ => Vec::new(),
            };
            let body = ErrorBody {
                error: e.to_string(),
                pending_tiles,
            };
            send(status, &body, compress).await
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List scenarios, filtered by a search term on title, subtitle or description
pub async fn list_scenarios(
    Query(query): Query<SearchQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let term = query.search.unwrap_or_default();
    let summaries: Vec<ScenarioSummary> = state
        .catalog
        .search(&term)
        .map(|scenario| scenario.summary())
        .collect();

    send(StatusCode::OK, &summaries, accepts_brotli(&headers)).await
}

pub async fn list_suggestions(
    Path(id): Path<String>,
    Query(query): Query<SuggestionsQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state
        .catalog
        .get(&id)
        .ok_or(ServiceError::UnknownScenario(id.clone()))
        .map(|scenario| match query.size {
            Some(size) => scenario.suggested_queries_for(size).cloned().collect(),
            None => scenario.suggested_queries.clone(),
        });

    respond::<Vec<SuggestedQuery>>(result, accepts_brotli(&headers)).await
}

pub async fn get_dashboard(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state.dashboard_service.view(&id).await;
    respond(result, accepts_brotli(&headers)).await
}

pub async fn dispatch_action(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(action): Json<Action>,
) -> Response {
    let result = state.dashboard_service.dispatch(&id, action).await;
    respond(result, accepts_brotli(&headers)).await
}

pub async fn undo(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state.dashboard_service.undo(&id).await;
    respond(result, accepts_brotli(&headers)).await
}

pub async fn redo(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state.dashboard_service.redo(&id).await;
    respond(result, accepts_brotli(&headers)).await
}

pub async fn set_edit_mode(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<EditModeRequest>,
) -> Response {
    let result = state
        .dashboard_service
        .set_edit_mode(&id, request.enabled, request.abandon_pending)
        .await;
    respond(result, accepts_brotli(&headers)).await
}

/// Ask the assistant to fill a tile
pub async fn ask_assistant(
    Path((id, tile_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssistantQuery>,
) -> Response {
    let result = state
        .dashboard_service
        .ask_assistant(&id, &tile_id, &request.query)
        .await;
    respond(result, accepts_brotli(&headers)).await
}

pub async fn drop_tile(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<DropRequest>,
) -> Response {
    let result = state
        .dashboard_service
        .drop_tile(&id, &request.dragged_tile_id, &request.target_tile_id)
        .await;
    respond(result, accepts_brotli(&headers)).await
}

pub async fn presentation(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = state.dashboard_service.presentation(&id).await;
    respond(result, accepts_brotli(&headers)).await
}

/// Standalone visualization endpoint, no session involved
pub async fn generate_visualization(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(request): Json<VisualizationRequest>,
) -> Response {
    let compress = accepts_brotli(&headers);

    match state.visualization_service.generate(&request).await {
        Ok(visualization) => {
            let body = VisualizationResponse {
                success: true,
                visualization: Some(visualization),
                error: None,
            };
            send(StatusCode::OK, &body, compress).await
        }
        Err(e) => {
            tracing::warn!("Visualization request for {} failed: {}", request.tile_id, e);
            let body = VisualizationResponse {
                success: false,
                visualization: None,
                error: Some(e.to_string()),
            };
            send(visualization_status(&e), &body, compress).await
        }
    }
}
