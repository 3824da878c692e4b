// Dashboard service - Use cases for editing and presenting dashboards
use crate::application::persistence::{DebouncedSaver, PersistenceGateway};
use crate::application::visualization_service::{VisualizationError, VisualizationService};
use crate::domain::dashboard::{Dashboard, DashboardDocument};
use crate::domain::scenario::{Scenario, ScenarioCatalog};
use crate::domain::session::DashboardSession;
use crate::domain::state::Action;
use crate::domain::tile::{SizeType, Tile};
use crate::domain::visualization::{VisualizationPayload, VisualizationRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

pub const TILE_ERROR_MESSAGE: &str = "Failed to generate visualization. Please try again.";
const ASSISTANT_ERROR_MESSAGE: &str =
    "Sorry, I encountered an error while generating the visualization. Please try again.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("unknown tile: {0}")]
    UnknownTile(String),
    #[error("{0}")]
    Validation(String),
    #[error("dashboard is not in edit mode")]
    NotInEditMode,
    #[error("requests still pending on tiles: {}", .0.join(", "))]
    PendingOperations(Vec<String>),
    #[error(transparent)]
    Visualization(#[from] VisualizationError),
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub history_limit: usize,
    pub save_debounce: Duration,
}

/// Everything the editor needs to render one dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub scenario_id: String,
    pub dashboard: Dashboard,
    pub tiles: Vec<Tile>,
    pub is_edit_mode: bool,
    pub selected_tile_id: Option<String>,
    pub is_processing: bool,
    pub can_undo: bool,
    pub can_redo: bool,
    pub history_index: usize,
    pub history_len: usize,
    pub has_unsaved_changes: bool,
    pub last_saved: Option<DateTime<Utc>>,
    pub save_error: Option<String>,
    pub pending_tiles: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub assistant_message: String,
    /// False when the request failed or was abandoned meanwhile.
    pub applied: bool,
    pub view: DashboardView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentedTile {
    pub tile_id: String,
    pub row_index: usize,
    pub column_index: usize,
    pub size_type: SizeType,
    pub title: Option<String>,
    pub visualization: Option<VisualizationPayload>,
    pub summary: Option<String>,
}

/// Read-only replay of the populated tiles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationView {
    pub scenario_title: String,
    pub dashboard_name: String,
    pub tiles: Vec<PresentedTile>,
}

struct SessionEntry {
    session: DashboardSession,
    saver: DebouncedSaver,
    last_scheduled: DashboardDocument,
}

impl SessionEntry {
    /// Hand the current document to the saver if it changed since last time.
    fn sync(&mut self) {
        let document = self.session.document();
        if document != self.last_scheduled {
            self.saver.schedule(document.clone());
            self.last_scheduled = document;
        }
    }

    fn view(&mut self, scenario_id: &str) -> DashboardView {
        self.sync();
        let state = self.session.state();
        let status = self.saver.status();
        DashboardView {
            scenario_id: scenario_id.to_string(),
            dashboard: state.dashboard.clone(),
            tiles: state.tiles.clone(),
            is_edit_mode: state.is_edit_mode,
            selected_tile_id: state.selected_tile_id.clone(),
            is_processing: state.is_processing,
            can_undo: self.session.can_undo(),
            can_redo: self.session.can_redo(),
            history_index: self.session.history_index(),
            history_len: self.session.history_len(),
            has_unsaved_changes: state.has_unsaved_changes && self.saver.has_unsaved(),
            last_saved: status.last_saved,
            save_error: status.last_error,
            pending_tiles: self.session.pending_tiles(),
        }
    }
}

#[derive(Clone)]
pub struct DashboardService {
    catalog: Arc<ScenarioCatalog>,
    gateway: PersistenceGateway,
    assistant: VisualizationService,
    settings: SessionSettings,
    sessions: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl DashboardService {
    pub fn new(
        catalog: Arc<ScenarioCatalog>,
        gateway: PersistenceGateway,
        assistant: VisualizationService,
        settings: SessionSettings,
    ) -> Self {
        Self {
            catalog,
            gateway,
            assistant,
            settings,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn scenario(&self, scenario_id: &str) -> Result<&Scenario, ServiceError> {
        self.catalog
            .get(scenario_id)
            .ok_or_else(|| ServiceError::UnknownScenario(scenario_id.to_string()))
    }

    /// Run `f` against the scenario's session, opening it on first use, then
    /// schedule a save if the dashboard changed.
    async fn with_session<R>(
        &self,
        scenario_id: &str,
        f: impl FnOnce(&Scenario, &mut SessionEntry) -> Result<R, ServiceError>,
    ) -> Result<R, ServiceError> {
        let scenario = self.scenario(scenario_id)?;

        // Load outside the lock so a slow first open of one scenario does not
        // stall the others.
        let opened = if self.sessions.lock().await.contains_key(scenario_id) {
            None
        } else {
            Some(self.open_entry(scenario).await)
        };

        let mut sessions = self.sessions.lock().await;
        let entry = match sessions.entry(scenario_id.to_string()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => match opened {
                Some(entry) => vacant.insert(entry),
                None => vacant.insert(self.open_entry(scenario).await),
            },
        };

        let result = f(scenario, entry);
        entry.sync();
        result
    }

    async fn open_entry(&self, scenario: &Scenario) -> SessionEntry {
        let document = self.gateway.load(scenario).await;
        tracing::info!(
            "Opened dashboard session for {} ({} tiles)",
            scenario.id,
            document.tiles.len()
        );

        SessionEntry {
            session: DashboardSession::new(document.clone(), self.settings.history_limit),
            saver: DebouncedSaver::spawn(
                scenario.id.clone(),
                self.gateway.clone(),
                self.settings.save_debounce,
            ),
            last_scheduled: document,
        }
    }

    pub async fn view(&self, scenario_id: &str) -> Result<DashboardView, ServiceError> {
        self.with_session(scenario_id, |scenario, entry| Ok(entry.view(&scenario.id)))
            .await
    }

    /// Apply an action. Edits are recorded into history, a snapshot of the
    /// already recorded state is a no-op and a load starts a fresh history.
    pub async fn dispatch(
        &self,
        scenario_id: &str,
        action: Action,
    ) -> Result<DashboardView, ServiceError> {
        if let Action::SetEditMode { enabled } = action {
            return self.set_edit_mode(scenario_id, enabled, false).await;
        }

        self.with_session(scenario_id, |scenario, entry| {
            tracing::debug!("{} on {}", action.name(), scenario.id);
            entry.session.dispatch(action);
            Ok(entry.view(&scenario.id))
        })
        .await
    }

    pub async fn undo(&self, scenario_id: &str) -> Result<DashboardView, ServiceError> {
        self.dispatch(scenario_id, Action::Undo).await
    }

    pub async fn redo(&self, scenario_id: &str) -> Result<DashboardView, ServiceError> {
        self.dispatch(scenario_id, Action::Redo).await
    }

    /// Leaving edit mode with assistant requests in flight needs an explicit
    /// `abandon_pending`; otherwise the pending tiles are reported back.
    pub async fn set_edit_mode(
        &self,
        scenario_id: &str,
        enabled: bool,
        abandon_pending: bool,
    ) -> Result<DashboardView, ServiceError> {
        self.with_session(scenario_id, |scenario, entry| {
            if !enabled && entry.session.has_pending() {
                if !abandon_pending {
                    return Err(ServiceError::PendingOperations(entry.session.pending_tiles()));
                }
                let abandoned = entry.session.abandon_pending();
                tracing::info!(
                    "Abandoned pending requests on {} for {}",
                    abandoned.join(", "),
                    scenario.id
                );
            }
            entry.session.dispatch(Action::SetEditMode { enabled });
            Ok(entry.view(&scenario.id))
        })
        .await
    }

    /// Ask the mock assistant for a visualization and populate the tile with
    /// it. The session lock is released while the assistant works.
    pub async fn ask_assistant(
        &self,
        scenario_id: &str,
        tile_id: &str,
        query: &str,
    ) -> Result<AssistantReply, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::Validation("query must not be empty".to_string()));
        }

        let ticket = self
            .with_session(scenario_id, |_, entry| {
                if !entry.session.state().is_edit_mode {
                    return Err(ServiceError::NotInEditMode);
                }
                entry
                    .session
                    .begin_request(tile_id)
                    .ok_or_else(|| ServiceError::UnknownTile(tile_id.to_string()))
            })
            .await?;

        let request = VisualizationRequest {
            query: query.to_string(),
            tile_id: tile_id.to_string(),
            demo_type: scenario_id.to_string(),
        };
        let result = self.assistant.generate(&request).await;

        self.with_session(scenario_id, |scenario, entry| {
            if !entry.session.finish_request(&ticket) {
                tracing::info!("Dropping stale assistant result for {}", tile_id);
                return Ok(AssistantReply {
                    assistant_message: "The request was abandoned.".to_string(),
                    applied: false,
                    view: entry.view(&scenario.id),
                });
            }

            let (assistant_message, applied) = match result {
                Ok(visualization) => {
                    entry.session.edit(Action::PopulateTile {
                        tile_id: tile_id.to_string(),
                        data: visualization.tile_data(),
                    });
                    (visualization.assistant_message, true)
                }
                Err(e) => {
                    tracing::warn!("Visualization for {} failed: {}", tile_id, e);
                    entry.session.dispatch(Action::SetTileError {
                        tile_id: tile_id.to_string(),
                        error: Some(TILE_ERROR_MESSAGE.to_string()),
                    });
                    (ASSISTANT_ERROR_MESSAGE.to_string(), false)
                }
            };

            Ok(AssistantReply {
                assistant_message,
                applied,
                view: entry.view(&scenario.id),
            })
        })
        .await
    }

    /// Drag-and-drop of one tile onto another: onto an empty tile moves the
    /// content, onto a populated tile in the same row reorders the row.
    pub async fn drop_tile(
        &self,
        scenario_id: &str,
        dragged_id: &str,
        target_id: &str,
    ) -> Result<DashboardView, ServiceError> {
        self.with_session(scenario_id, |scenario, entry| {
            let state = entry.session.state();
            if !state.is_edit_mode {
                return Err(ServiceError::NotInEditMode);
            }
            let dragged = state
                .tile(dragged_id)
                .ok_or_else(|| ServiceError::UnknownTile(dragged_id.to_string()))?;
            let target = state
                .tile(target_id)
                .ok_or_else(|| ServiceError::UnknownTile(target_id.to_string()))?;

            let action = if dragged_id == target_id {
                None
            } else if !target.is_populated {
                Some(Action::MoveTileContent {
                    from: dragged_id.to_string(),
                    to: target_id.to_string(),
                })
            } else if dragged.row_index == target.row_index {
                state.dashboard.row(dragged.row_index).map(|row| {
                    Action::ReorderTilesInRow {
                        row: dragged.row_index,
                        order: moved_order(row, dragged_id, target_id),
                    }
                })
            } else {
                None
            };

            if let Some(action) = action {
                entry.session.edit(action);
            }
            Ok(entry.view(&scenario.id))
        })
        .await
    }

    pub async fn presentation(&self, scenario_id: &str) -> Result<PresentationView, ServiceError> {
        self.with_session(scenario_id, |scenario, entry| {
            let state = entry.session.state();
            let mut tiles: Vec<PresentedTile> = state
                .tiles
                .iter()
                .filter(|t| t.is_populated)
                .map(|t| PresentedTile {
                    tile_id: t.tile_id.clone(),
                    row_index: t.row_index,
                    column_index: t.column_index,
                    size_type: t.size_type,
                    title: t.title.clone(),
                    visualization: t.visualization.clone(),
                    summary: t.summary.clone(),
                })
                .collect();
            tiles.sort_by_key(|t| (t.row_index, t.column_index));

            Ok(PresentationView {
                scenario_title: scenario.title.clone(),
                dashboard_name: state.dashboard.name.clone(),
                tiles,
            })
        })
        .await
    }
}

/// Row order after moving `dragged` into `target`'s slot.
fn moved_order(row: &[String], dragged: &str, target: &str) -> Vec<String> {
    let mut order = row.to_vec();
    let (Some(from), Some(to)) = (
        order.iter().position(|id| id == dragged),
        order.iter().position(|id| id == target),
    ) else {
        return order;
    };
    let moved = order.remove(from);
    order.insert(to, moved);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_repository::testing::MemoryRepository;
    use crate::domain::scenario::test_scenario;
    use crate::domain::tile::TileData;
    use std::sync::atomic::Ordering;

    const SCENARIO: &str = "property-appraisal";

    fn service_with(repository: Arc<MemoryRepository>, latency: Duration) -> DashboardService {
        let catalog = Arc::new(ScenarioCatalog::new(vec![test_scenario()]));
        DashboardService::new(
            catalog.clone(),
            PersistenceGateway::new(repository),
            VisualizationService::new(catalog, latency),
            SessionSettings {
                history_limit: 100,
                save_debounce: Duration::from_millis(1000),
            },
        )
    }

    fn service() -> DashboardService {
        service_with(Arc::new(MemoryRepository::default()), Duration::ZERO)
    }

    async fn editing(service: &DashboardService) {
        service
            .dispatch(SCENARIO, Action::SetEditMode { enabled: true })
            .await
            .unwrap();
    }

    fn tile<'a>(view: &'a DashboardView, tile_id: &str) -> &'a Tile {
        view.tiles.iter().find(|t| t.tile_id == tile_id).unwrap()
    }

    #[tokio::test]
    async fn test_view_opens_default_dashboard() {
        let view = service().view(SCENARIO).await.unwrap();

        assert_eq!(view.tiles.len(), 7);
        assert_eq!(view.history_len, 1);
        assert!(!view.can_undo);
        assert!(!view.has_unsaved_changes);
    }

    #[tokio::test]
    async fn test_unknown_scenario() {
        let result = service().view("space-mining").await;
        assert!(matches!(result, Err(ServiceError::UnknownScenario(_))));
    }

    #[tokio::test]
    async fn test_dispatch_records_edits_only() {
        let service = service();
        service
            .dispatch(
                SCENARIO,
                Action::SelectTile {
                    tile_id: Some("tile-1".to_string()),
                },
            )
            .await
            .unwrap();
        let view = service
            .dispatch(
                SCENARIO,
                Action::PopulateTile {
                    tile_id: "tile-1".to_string(),
                    data: TileData::titled("A"),
                },
            )
            .await
            .unwrap();

        assert_eq!(view.history_len, 2);
        assert!(view.can_undo);
        assert!(view.has_unsaved_changes);

        let view = service.undo(SCENARIO).await.unwrap();
        assert!(!tile(&view, "tile-1").is_populated);
        assert!(view.can_redo);

        let view = service.redo(SCENARIO).await.unwrap();
        assert_eq!(tile(&view, "tile-1").title.as_deref(), Some("A"));
    }

    fn populate(tile_id: &str, title: &str) -> Action {
        Action::PopulateTile {
            tile_id: tile_id.to_string(),
            data: TileData::titled(title),
        }
    }

    #[tokio::test]
    async fn test_snapshot_then_edit_timeline() {
        let service = service();
        let view = service.view(SCENARIO).await.unwrap();
        assert_eq!(view.tiles.len(), 7);
        assert_eq!(view.history_index, 0);

        service.dispatch(SCENARIO, Action::SaveSnapshot).await.unwrap();
        let view = service.dispatch(SCENARIO, populate("tile-1", "A")).await.unwrap();
        assert_eq!((view.history_len, view.history_index), (2, 1));

        let view = service.undo(SCENARIO).await.unwrap();
        assert!(!tile(&view, "tile-1").is_populated);
        assert_eq!(view.history_index, 0);
        assert!(!view.can_undo);

        service.dispatch(SCENARIO, Action::SaveSnapshot).await.unwrap();
        let view = service.dispatch(SCENARIO, populate("tile-1", "B")).await.unwrap();
        assert_eq!((view.history_len, view.history_index), (2, 1));
        assert_eq!(tile(&view, "tile-1").title.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_edits_undone_in_full_restore_initial_dashboard() {
        let service = service();
        let initial = service.view(SCENARIO).await.unwrap();
        let edits = vec![
            populate("tile-1", "A"),
            Action::ReorderRow {
                old_row: 2,
                new_row: 0,
            },
            Action::RenameDashboard {
                name: "Audit".to_string(),
            },
            Action::ClearTile {
                tile_id: "tile-1".to_string(),
            },
        ];
        let count = edits.len();

        for edit in edits {
            service.dispatch(SCENARIO, Action::SaveSnapshot).await.unwrap();
            service.dispatch(SCENARIO, edit).await.unwrap();
        }
        let mut view = service.view(SCENARIO).await.unwrap();
        assert_eq!(view.history_len, count + 1);

        for _ in 0..count {
            view = service.undo(SCENARIO).await.unwrap();
        }
        assert_eq!(view.dashboard, initial.dashboard);
        assert_eq!(view.tiles, initial.tiles);
        assert!(!view.can_undo);

        let undone = service.undo(SCENARIO).await.unwrap();
        assert_eq!(undone.history_index, 0);
        let redone = service.redo(SCENARIO).await.unwrap();
        assert_eq!(redone.history_index, 1);
        assert_eq!(tile(&redone, "tile-1").title.as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn test_load_dashboard_is_validated() {
        let service = service();
        service.dispatch(SCENARIO, populate("tile-1", "A")).await.unwrap();

        let mut broken = test_scenario().default_document();
        broken.tiles.truncate(2);
        let view = service
            .dispatch(
                SCENARIO,
                Action::LoadDashboard {
                    dashboard: broken.dashboard,
                    tiles: broken.tiles,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.tiles.len(), 7);
        assert_eq!(view.history_len, 2);

        let mut imported = test_scenario().default_document();
        imported.dashboard.name = "Imported".to_string();
        let view = service
            .dispatch(
                SCENARIO,
                Action::LoadDashboard {
                    dashboard: imported.dashboard,
                    tiles: imported.tiles,
                },
            )
            .await
            .unwrap();
        assert_eq!(view.dashboard.name, "Imported");
        assert_eq!((view.history_len, view.history_index), (1, 0));
        assert!(!view.can_undo);
    }

    #[tokio::test]
    async fn test_ask_assistant_populates_tile() {
        let service = service();
        editing(&service).await;

        let reply = service
            .ask_assistant(SCENARIO, "tile-5", "Show sales by neighborhood on a map")
            .await
            .unwrap();

        assert!(reply.applied);
        assert_eq!(reply.assistant_message, "Done. The chart now shows sales ratio map.");
        let populated = tile(&reply.view, "tile-5");
        assert!(populated.is_populated);
        assert!(!populated.is_loading);
        assert_eq!(populated.title.as_deref(), Some("Sales Ratio Map"));
        assert_eq!(
            populated.visualization.as_ref().map(|v| v.kind.as_str()),
            Some("sales-map-chart")
        );
        assert_eq!(reply.view.history_len, 2);
        assert!(reply.view.pending_tiles.is_empty());
    }

    #[tokio::test]
    async fn test_ask_assistant_requires_edit_mode() {
        let result = service().ask_assistant(SCENARIO, "tile-1", "cod").await;
        assert!(matches!(result, Err(ServiceError::NotInEditMode)));
    }

    #[tokio::test]
    async fn test_ask_assistant_validates_input() {
        let service = service();
        editing(&service).await;

        let result = service.ask_assistant(SCENARIO, "tile-1", "  ").await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = service.ask_assistant(SCENARIO, "tile-99", "cod").await;
        assert!(matches!(result, Err(ServiceError::UnknownTile(_))));
    }

    #[tokio::test]
    async fn test_assistant_failure_sets_tile_error() {
        let mut scenario = test_scenario();
        scenario.visualizations.clear();
        let catalog = Arc::new(ScenarioCatalog::new(vec![scenario]));
        let service = DashboardService::new(
            catalog.clone(),
            PersistenceGateway::new(Arc::new(MemoryRepository::default())),
            VisualizationService::new(catalog, Duration::ZERO),
            SessionSettings {
                history_limit: 0,
                save_debounce: Duration::from_millis(1000),
            },
        );
        editing(&service).await;

        let reply = service.ask_assistant(SCENARIO, "tile-2", "cod").await.unwrap();

        assert!(!reply.applied);
        let failed = tile(&reply.view, "tile-2");
        assert_eq!(failed.error.as_deref(), Some(TILE_ERROR_MESSAGE));
        assert!(!failed.is_loading);
        assert!(!failed.is_populated);
        assert_eq!(reply.view.history_len, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_leaving_edit_mode_with_pending_request() {
        let service = service_with(Arc::new(MemoryRepository::default()), Duration::from_millis(1500));
        editing(&service).await;

        let background = service.clone();
        let request = tokio::spawn(async move {
            background.ask_assistant(SCENARIO, "tile-1", "cod").await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let view = service.view(SCENARIO).await.unwrap();
        assert!(tile(&view, "tile-1").is_loading);

        let refused = service.set_edit_mode(SCENARIO, false, false).await;
        match refused {
            Err(ServiceError::PendingOperations(tiles)) => assert_eq!(tiles, vec!["tile-1"]),
            other => panic!("expected pending operations, got {:?}", other.map(|v| v.is_edit_mode)),
        }

        let view = service.set_edit_mode(SCENARIO, false, true).await.unwrap();
        assert!(!view.is_edit_mode);
        assert!(!tile(&view, "tile-1").is_loading);

        let reply = request.await.unwrap().unwrap();
        assert!(!reply.applied);
        assert!(!tile(&reply.view, "tile-1").is_populated);
    }

    #[tokio::test]
    async fn test_drop_onto_empty_tile_moves_content() {
        let service = service();
        editing(&service).await;
        service.ask_assistant(SCENARIO, "tile-1", "cod").await.unwrap();

        let view = service.drop_tile(SCENARIO, "tile-1", "tile-7").await.unwrap();

        assert!(!tile(&view, "tile-1").is_populated);
        assert_eq!(
            tile(&view, "tile-7").title.as_deref(),
            Some("Coefficient of Dispersion")
        );
        assert_eq!(view.history_len, 3);
    }

    #[tokio::test]
    async fn test_drop_onto_populated_tile_in_row_reorders() {
        let service = service();
        editing(&service).await;
        service.ask_assistant(SCENARIO, "tile-1", "cod").await.unwrap();
        service.ask_assistant(SCENARIO, "tile-3", "prd").await.unwrap();

        let view = service.drop_tile(SCENARIO, "tile-1", "tile-3").await.unwrap();

        assert_eq!(view.dashboard.layout[0], vec!["tile-2", "tile-3", "tile-1", "tile-4"]);
        assert_eq!(tile(&view, "tile-1").column_index, 2);
        assert_eq!(tile(&view, "tile-2").column_index, 0);
    }

    #[tokio::test]
    async fn test_drop_onto_populated_tile_in_other_row_is_noop() {
        let service = service();
        editing(&service).await;
        service.ask_assistant(SCENARIO, "tile-1", "cod").await.unwrap();
        service.ask_assistant(SCENARIO, "tile-5", "prd").await.unwrap();
        let before = service.view(SCENARIO).await.unwrap();

        let view = service.drop_tile(SCENARIO, "tile-1", "tile-5").await.unwrap();

        assert_eq!(view.history_len, before.history_len);
        assert_eq!(view.dashboard, before.dashboard);
    }

    #[tokio::test]
    async fn test_presentation_lists_populated_tiles_in_order() {
        let service = service();
        editing(&service).await;
        service.ask_assistant(SCENARIO, "tile-7", "map").await.unwrap();
        service.ask_assistant(SCENARIO, "tile-2", "cod").await.unwrap();
        service
            .dispatch(
                SCENARIO,
                Action::RenameDashboard {
                    name: "Uniformity Audit".to_string(),
                },
            )
            .await
            .unwrap();

        let presentation = service.presentation(SCENARIO).await.unwrap();

        assert_eq!(presentation.scenario_title, "Property Appraisal");
        assert_eq!(presentation.dashboard_name, "Uniformity Audit");
        let order: Vec<&str> = presentation.tiles.iter().map(|t| t.tile_id.as_str()).collect();
        assert_eq!(order, vec!["tile-2", "tile-7"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_are_persisted_after_debounce() {
        let repository = Arc::new(MemoryRepository::default());
        let service = service_with(repository.clone(), Duration::ZERO);

        for name in ["One", "Two", "Three"] {
            service
                .dispatch(
                    SCENARIO,
                    Action::RenameDashboard {
                        name: name.to_string(),
                    },
                )
                .await
                .unwrap();
        }
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(repository.saves.load(Ordering::SeqCst), 1);
        assert_eq!(repository.stored(SCENARIO).unwrap().dashboard.name, "Three");
        let view = service.view(SCENARIO).await.unwrap();
        assert!(!view.has_unsaved_changes);
        assert!(view.last_saved.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_changes_are_not_persisted() {
        let repository = Arc::new(MemoryRepository::default());
        let service = service_with(repository.clone(), Duration::ZERO);

        service
            .dispatch(
                SCENARIO,
                Action::SetTileLoading {
                    tile_id: "tile-1".to_string(),
                    loading: true,
                },
            )
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(repository.saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_moved_order() {
        let row: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        assert_eq!(moved_order(&row, "a", "c"), vec!["b", "c", "a", "d"]);
        assert_eq!(moved_order(&row, "d", "b"), vec!["a", "d", "b", "c"]);
        assert_eq!(moved_order(&row, "x", "b"), row);
    }
}
