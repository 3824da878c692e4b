// Dashboard domain model
use super::tile::Tile;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub dashboard_id: String,
    pub owner_id: String,
    #[serde(rename = "dashboardName")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_name: Option<String>,
    /// Rows of tile ids, top to bottom, each left to right.
    pub layout: Vec<Vec<String>>,
}

impl Dashboard {
    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.layout.get(row).map(Vec::as_slice)
    }

    pub fn position_of(&self, tile_id: &str) -> Option<(usize, usize)> {
        self.layout.iter().enumerate().find_map(|(row, ids)| {
            ids.iter()
                .position(|id| id == tile_id)
                .map(|column| (row, column))
        })
    }
}

/// The persisted shape: current dashboard and tiles, never history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDocument {
    pub dashboard: Dashboard,
    pub tiles: Vec<Tile>,
}

impl DashboardDocument {
    pub fn new(dashboard: Dashboard, tiles: Vec<Tile>) -> Self {
        Self { dashboard, tiles }
    }

    pub fn without_transient(mut self) -> Self {
        self.tiles.iter_mut().for_each(Tile::reset_transient);
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        check_consistency(&self.dashboard, &self.tiles)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("tile {0} appears more than once")]
    DuplicateTile(String),
    #[error("layout references tile {0} which does not exist")]
    MissingTile(String),
    #[error("tile {0} is not placed in the layout")]
    UnplacedTile(String),
    #[error("tile {tile_id} is at ({row}, {column}) but the layout puts it at ({expected_row}, {expected_column})")]
    Misplaced {
        tile_id: String,
        row: usize,
        column: usize,
        expected_row: usize,
        expected_column: usize,
    },
}

/// Every id in the layout has exactly one tile, and every tile's indices
/// match its slot in the layout.
pub fn check_consistency(dashboard: &Dashboard, tiles: &[Tile]) -> Result<(), LayoutError> {
    let mut by_id: HashMap<&str, &Tile> = HashMap::with_capacity(tiles.len());
    for tile in tiles {
        if by_id.insert(tile.tile_id.as_str(), tile).is_some() {
            return Err(LayoutError::DuplicateTile(tile.tile_id.clone()));
        }
    }

    let mut placed = 0;
    for (row, ids) in dashboard.layout.iter().enumerate() {
        for (column, id) in ids.iter().enumerate() {
            let tile = by_id
                .get(id.as_str())
                .ok_or_else(|| LayoutError::MissingTile(id.clone()))?;
            if tile.row_index != row || tile.column_index != column {
                return Err(LayoutError::Misplaced {
                    tile_id: id.clone(),
                    row: tile.row_index,
                    column: tile.column_index,
                    expected_row: row,
                    expected_column: column,
                });
            }
            placed += 1;
        }
    }

    // A tile has one position, so an id listed twice already failed above.
    if placed != tiles.len() {
        if let Some(stray) = tiles
            .iter()
            .find(|t| dashboard.position_of(&t.tile_id).is_none())
        {
            return Err(LayoutError::UnplacedTile(stray.tile_id.clone()));
        }
    }

    Ok(())
}
