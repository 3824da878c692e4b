// Visualization domain models
use super::tile::TileData;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque chart description stored on a tile. Only the chart type tag is
/// known here; data and metadata are forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub metadata: Value,
}

impl VisualizationPayload {
    pub fn new(kind: impl Into<String>, data: Value, metadata: Value) -> Self {
        Self {
            kind: kind.into(),
            data,
            metadata,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationRequest {
    pub query: String,
    pub tile_id: String,
    pub demo_type: String,
}

/// Answer of the mocked assistant for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub tile_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Value,
    pub metadata: Value,
    pub summary: String,
    pub assistant_message: String,
}

impl Visualization {
    pub fn payload(&self) -> VisualizationPayload {
        VisualizationPayload::new(self.kind.clone(), self.data.clone(), self.metadata.clone())
    }

    pub fn tile_data(&self) -> TileData {
        TileData {
            title: Some(self.title.clone()),
            visualization: Some(self.payload()),
            summary: Some(self.summary.clone()),
            cache_id: None,
        }
    }
}
