// Tile domain model
use super::visualization::VisualizationPayload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeType {
    Small,
    Medium,
    Large,
}

/// One cell of the dashboard grid.
///
/// Field names on the wire follow the stored dashboard document, so a
/// document written by an older build still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    pub tile_id: String,
    pub dashboard_id: String,
    pub row_index: usize,
    pub column_index: usize,
    pub size_type: SizeType,
    #[serde(rename = "tileTitle")]
    pub title: Option<String>,
    #[serde(rename = "visualizationFunction")]
    pub visualization: Option<VisualizationPayload>,
    #[serde(rename = "chatSummary")]
    pub summary: Option<String>,
    pub cache_id: Option<String>,
    pub is_populated: bool,
    #[serde(default)]
    pub is_loading: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Content merged into a tile by a populate action. `None` keeps the
/// tile's current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileData {
    #[serde(default, rename = "tileTitle", alias = "title")]
    pub title: Option<String>,
    #[serde(default, rename = "visualizationFunction", alias = "visualization")]
    pub visualization: Option<VisualizationPayload>,
    #[serde(default, rename = "chatSummary", alias = "summary")]
    pub summary: Option<String>,
    #[serde(default)]
    pub cache_id: Option<String>,
}

impl TileData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Tile {
    /// The unpopulated shape a tile has right after a dashboard is loaded.
    pub fn empty(
        tile_id: String,
        dashboard_id: String,
        row_index: usize,
        column_index: usize,
        size_type: SizeType,
    ) -> Self {
        Self {
            tile_id,
            dashboard_id,
            row_index,
            column_index,
            size_type,
            title: None,
            visualization: None,
            summary: None,
            cache_id: None,
            is_populated: false,
            is_loading: false,
            error: None,
        }
    }

    pub fn populate(&mut self, data: TileData) {
        if let Some(title) = data.title {
            self.title = Some(title);
        }
        if let Some(visualization) = data.visualization {
            self.visualization = Some(visualization);
        }
        if let Some(summary) = data.summary {
            self.summary = Some(summary);
        }
        if let Some(cache_id) = data.cache_id {
            self.cache_id = Some(cache_id);
        }
        self.is_populated = true;
        self.is_loading = false;
        self.error = None;
    }

    pub fn clear(&mut self) {
        self.title = None;
        self.visualization = None;
        self.summary = None;
        self.cache_id = None;
        self.is_populated = false;
        self.is_loading = false;
        self.error = None;
    }

    /// Populated content of this tile, in the form a populate action takes.
    pub fn content(&self) -> TileData {
        TileData {
            title: self.title.clone(),
            visualization: self.visualization.clone(),
            summary: self.summary.clone(),
            cache_id: self.cache_id.clone(),
        }
    }

    pub fn reset_transient(&mut self) {
        self.is_loading = false;
        self.error = None;
    }

    pub fn without_transient(&self) -> Self {
        let mut tile = self.clone();
        tile.reset_transient();
        tile
    }
}
