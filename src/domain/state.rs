// Live dashboard state and the actions that change it
use super::dashboard::{Dashboard, DashboardDocument};
use super::tile::{Tile, TileData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub dashboard: Dashboard,
    pub tiles: Vec<Tile>,
    pub is_edit_mode: bool,
    pub selected_tile_id: Option<String>,
    pub is_processing: bool,
    pub has_unsaved_changes: bool,
}

impl DashboardState {
    pub fn new(document: DashboardDocument) -> Self {
        Self {
            dashboard: document.dashboard,
            tiles: document.tiles,
            is_edit_mode: false,
            selected_tile_id: None,
            is_processing: false,
            has_unsaved_changes: false,
        }
    }

    pub fn tile(&self, tile_id: &str) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.tile_id == tile_id)
    }

    pub fn tile_mut(&mut self, tile_id: &str) -> Option<&mut Tile> {
        self.tiles.iter_mut().find(|t| t.tile_id == tile_id)
    }

    /// Current dashboard and tiles with transient flags stripped.
    pub fn document(&self) -> DashboardDocument {
        DashboardDocument::new(self.dashboard.clone(), self.tiles.clone()).without_transient()
    }

    /// Whether dashboard or tile content differs, ignoring loading/error flags.
    pub fn content_differs(&self, other: &DashboardState) -> bool {
        self.dashboard != other.dashboard
            || self.tiles.len() != other.tiles.len()
            || self
                .tiles
                .iter()
                .zip(&other.tiles)
                .any(|(a, b)| a.without_transient() != b.without_transient())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    SetEditMode { enabled: bool },
    SelectTile { tile_id: Option<String> },
    #[serde(alias = "UPDATE_DASHBOARD_NAME")]
    RenameDashboard { name: String },
    PopulateTile { tile_id: String, data: TileData },
    ClearTile { tile_id: String },
    ReorderTilesInRow { row: usize, order: Vec<String> },
    ReorderRow { old_row: usize, new_row: usize },
    /// Drag of a populated tile onto an empty one.
    MoveTileContent { from: String, to: String },
    SetTileLoading { tile_id: String, loading: bool },
    SetTileError { tile_id: String, error: Option<String> },
    SetProcessing { processing: bool },
    Undo,
    Redo,
    #[serde(alias = "SAVE_STATE")]
    SaveSnapshot,
    LoadDashboard { dashboard: Dashboard, tiles: Vec<Tile> },
}

impl Action {
    /// User-visible edits; these are the actions recorded into history.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Action::RenameDashboard { .. }
                | Action::PopulateTile { .. }
                | Action::ClearTile { .. }
                | Action::ReorderTilesInRow { .. }
                | Action::ReorderRow { .. }
                | Action::MoveTileContent { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::SetEditMode { .. } => "SET_EDIT_MODE",
            Action::SelectTile { .. } => "SELECT_TILE",
            Action::RenameDashboard { .. } => "RENAME_DASHBOARD",
            Action::PopulateTile { .. } => "POPULATE_TILE",
            Action::ClearTile { .. } => "CLEAR_TILE",
            Action::ReorderTilesInRow { .. } => "REORDER_TILES_IN_ROW",
            Action::ReorderRow { .. } => "REORDER_ROW",
            Action::MoveTileContent { .. } => "MOVE_TILE_CONTENT",
            Action::SetTileLoading { .. } => "SET_TILE_LOADING",
            Action::SetTileError { .. } => "SET_TILE_ERROR",
            Action::SetProcessing { .. } => "SET_PROCESSING",
            Action::Undo => "UNDO",
            Action::Redo => "REDO",
            Action::SaveSnapshot => "SAVE_SNAPSHOT",
            Action::LoadDashboard { .. } => "LOAD_DASHBOARD",
        }
    }
}
