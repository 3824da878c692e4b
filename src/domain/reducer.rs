// Reducer - pure state transitions for dashboard actions
use super::dashboard::check_consistency;
use super::state::{Action, DashboardState};
use super::tile::TileData;
use std::collections::HashSet;

/// Compute the state that follows `action`.
///
/// Rejected actions (unknown tile, empty name, a reorder that doesn't match
/// the row, out of bounds rows, a loaded layout with missing tiles) return the state unchanged. `Undo`, `Redo`
/// and `SaveSnapshot` only concern history and are handled by the session.
pub fn reduce(state: &DashboardState, action: &Action) -> DashboardState {
    let mut next = state.clone();

    let applied = match action {
        Action::SetEditMode { enabled } => {
            next.is_edit_mode = *enabled;
            true
        }
        Action::SelectTile { tile_id } => {
            next.selected_tile_id = tile_id.clone();
            true
        }
        Action::RenameDashboard { name } => rename_dashboard(&mut next, name),
        Action::PopulateTile { tile_id, data } => populate_tile(&mut next, tile_id, data),
        Action::ClearTile { tile_id } => clear_tile(&mut next, tile_id),
        Action::ReorderTilesInRow { row, order } => reorder_tiles_in_row(&mut next, *row, order),
        Action::ReorderRow { old_row, new_row } => reorder_row(&mut next, *old_row, *new_row),
        Action::MoveTileContent { from, to } => move_tile_content(&mut next, from, to),
        Action::SetTileLoading { tile_id, loading } => match next.tile_mut(tile_id) {
            Some(tile) => {
                tile.is_loading = *loading;
                true
            }
            None => false,
        },
        Action::SetTileError { tile_id, error } => match next.tile_mut(tile_id) {
            Some(tile) => {
                tile.error = error.clone();
                tile.is_loading = false;
                true
            }
            None => false,
        },
        Action::SetProcessing { processing } => {
            next.is_processing = *processing;
            true
        }
        Action::LoadDashboard { dashboard, tiles } => match check_consistency(dashboard, tiles) {
            Ok(()) => {
                next.dashboard = dashboard.clone();
                next.tiles = tiles.clone();
                true
            }
            Err(e) => {
                tracing::debug!("loaded dashboard is inconsistent: {}", e);
                false
            }
        },
        Action::Undo | Action::Redo | Action::SaveSnapshot => return state.clone(),
    };

    if !applied {
        tracing::debug!("{} rejected, state unchanged", action.name());
        return state.clone();
    }

    if action.is_edit() {
        next.has_unsaved_changes = true;
    }
    next
}

fn rename_dashboard(state: &mut DashboardState, name: &str) -> bool {
    let name = name.trim();
    if name.is_empty() {
        return false;
    }
    state.dashboard.name = name.to_string();
    true
}

fn populate_tile(state: &mut DashboardState, tile_id: &str, data: &TileData) -> bool {
    match state.tile_mut(tile_id) {
        Some(tile) => {
            tile.populate(data.clone());
            true
        }
        None => false,
    }
}

fn clear_tile(state: &mut DashboardState, tile_id: &str) -> bool {
    match state.tile_mut(tile_id) {
        Some(tile) => {
            tile.clear();
            true
        }
        None => false,
    }
}

/// `order` must be exactly a permutation of the ids currently in `row`.
fn reorder_tiles_in_row(state: &mut DashboardState, row: usize, order: &[String]) -> bool {
    let Some(current) = state.dashboard.row(row) else {
        return false;
    };

    let current: HashSet<&String> = current.iter().collect();
    let requested: HashSet<&String> = order.iter().collect();
    if order.len() != current.len() || requested != current {
        return false;
    }

    for (column, id) in order.iter().enumerate() {
        if let Some(tile) = state.tile_mut(id) {
            tile.column_index = column;
        }
    }
    state.dashboard.layout[row] = order.to_vec();
    true
}

fn reorder_row(state: &mut DashboardState, old_row: usize, new_row: usize) -> bool {
    let rows = state.dashboard.layout.len();
    if old_row >= rows || new_row >= rows || old_row == new_row {
        return false;
    }

    let moved = state.dashboard.layout.remove(old_row);
    state.dashboard.layout.insert(new_row, moved);

    for tile in &mut state.tiles {
        let row = tile.row_index;
        if row == old_row {
            tile.row_index = new_row;
        } else if new_row < old_row && row >= new_row && row < old_row {
            tile.row_index = row + 1;
        } else if new_row > old_row && row > old_row && row <= new_row {
            tile.row_index = row - 1;
        }
    }
    true
}

fn move_tile_content(state: &mut DashboardState, from: &str, to: &str) -> bool {
    if from == to {
        return false;
    }
    let content = match (state.tile(from), state.tile(to)) {
        (Some(source), Some(target)) if source.is_populated && !target.is_populated => {
            source.content()
        }
        _ => return false,
    };

    if let Some(target) = state.tile_mut(to) {
        target.populate(content);
    }
    if let Some(source) = state.tile_mut(from) {
        source.clear();
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::scenario::test_scenario;

    fn initial() -> DashboardState {
        DashboardState::new(test_scenario().default_document())
    }

    fn populate(state: &DashboardState, tile_id: &str, title: &str) -> DashboardState {
        reduce(
            state,
            &Action::PopulateTile {
                tile_id: tile_id.to_string(),
                data: TileData::titled(title),
            },
        )
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[test]
    fn test_populate_tile() {
        let mut state = initial();
        state.tile_mut("tile-1").unwrap().is_loading = true;

        let next = populate(&state, "tile-1", "X");
        let tile = next.tile("tile-1").unwrap();

        assert!(tile.is_populated);
        assert_eq!(tile.title.as_deref(), Some("X"));
        assert_eq!(tile.error, None);
        assert!(!tile.is_loading);
        assert!(next.has_unsaved_changes);
    }

    #[test]
    fn test_populate_unknown_tile_is_noop() {
        let state = initial();
        assert_eq!(populate(&state, "tile-99", "X"), state);
    }

    #[test]
    fn test_clear_tile_restores_initial_shape() {
        let state = initial();
        let populated = populate(&state, "tile-3", "X");

        let cleared = reduce(
            &populated,
            &Action::ClearTile {
                tile_id: "tile-3".to_string(),
            },
        );

        assert_eq!(cleared.tile("tile-3"), state.tile("tile-3"));
    }

    #[test]
    fn test_rename_rejects_blank_name() {
        let state = initial();
        let next = reduce(
            &state,
            &Action::RenameDashboard {
                name: "   ".to_string(),
            },
        );
        assert_eq!(next, state);

        let next = reduce(
            &state,
            &Action::RenameDashboard {
                name: "  Q4 Review ".to_string(),
            },
        );
        assert_eq!(next.dashboard.name, "Q4 Review");
        assert!(next.has_unsaved_changes);
    }

    #[test]
    fn test_reorder_tiles_in_row() {
        let state = initial();
        let next = reduce(
            &state,
            &Action::ReorderTilesInRow {
                row: 0,
                order: ids(&["tile-4", "tile-1", "tile-2", "tile-3"]),
            },
        );

        assert_eq!(next.tile("tile-4").unwrap().column_index, 0);
        assert_eq!(next.tile("tile-3").unwrap().column_index, 3);
        assert_eq!(next.dashboard.layout[0], ids(&["tile-4", "tile-1", "tile-2", "tile-3"]));
        assert_eq!(check_consistency(&next.dashboard, &next.tiles), Ok(()));
    }

    #[test]
    fn test_reorder_tiles_in_row_rejects_mismatched_ids() {
        let state = initial();
        let mismatched = [
            ids(&["tile-1", "tile-2", "tile-3"]),
            ids(&["tile-1", "tile-2", "tile-3", "tile-5"]),
            ids(&["tile-1", "tile-1", "tile-2", "tile-3"]),
            ids(&["tile-1", "tile-2", "tile-3", "tile-4", "tile-4"]),
        ];

        for order in mismatched {
            let next = reduce(&state, &Action::ReorderTilesInRow { row: 0, order });
            assert_eq!(next, state);
        }

        let next = reduce(
            &state,
            &Action::ReorderTilesInRow {
                row: 7,
                order: ids(&["tile-7"]),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_reorder_row_moves_last_to_first() {
        let state = initial();
        let next = reduce(&state, &Action::ReorderRow { old_row: 2, new_row: 0 });

        assert_eq!(
            next.dashboard.layout,
            vec![
                ids(&["tile-7"]),
                ids(&["tile-1", "tile-2", "tile-3", "tile-4"]),
                ids(&["tile-5", "tile-6"]),
            ]
        );
        assert_eq!(next.tile("tile-7").unwrap().row_index, 0);
        assert_eq!(next.tile("tile-1").unwrap().row_index, 1);
        assert_eq!(next.tile("tile-5").unwrap().row_index, 2);
        assert_eq!(check_consistency(&next.dashboard, &next.tiles), Ok(()));
    }

    #[test]
    fn test_reorder_row_moves_first_to_last() {
        let state = initial();
        let next = reduce(&state, &Action::ReorderRow { old_row: 0, new_row: 2 });

        assert_eq!(next.dashboard.layout[2], ids(&["tile-1", "tile-2", "tile-3", "tile-4"]));
        assert_eq!(next.tile("tile-5").unwrap().row_index, 0);
        assert_eq!(next.tile("tile-7").unwrap().row_index, 1);
        assert_eq!(check_consistency(&next.dashboard, &next.tiles), Ok(()));
    }

    #[test]
    fn test_reorder_row_out_of_bounds_is_noop() {
        let state = initial();
        assert_eq!(reduce(&state, &Action::ReorderRow { old_row: 3, new_row: 0 }), state);
        assert_eq!(reduce(&state, &Action::ReorderRow { old_row: 0, new_row: 3 }), state);
        assert_eq!(reduce(&state, &Action::ReorderRow { old_row: 1, new_row: 1 }), state);
    }

    #[test]
    fn test_move_tile_content() {
        let state = populate(&initial(), "tile-1", "Sales");
        let next = reduce(
            &state,
            &Action::MoveTileContent {
                from: "tile-1".to_string(),
                to: "tile-7".to_string(),
            },
        );

        assert!(!next.tile("tile-1").unwrap().is_populated);
        let target = next.tile("tile-7").unwrap();
        assert!(target.is_populated);
        assert_eq!(target.title.as_deref(), Some("Sales"));
        assert_eq!(target.row_index, 2);
    }

    #[test]
    fn test_move_tile_content_onto_populated_is_noop() {
        let state = populate(&populate(&initial(), "tile-1", "A"), "tile-2", "B");
        let next = reduce(
            &state,
            &Action::MoveTileContent {
                from: "tile-1".to_string(),
                to: "tile-2".to_string(),
            },
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_transient_flags_do_not_mark_unsaved() {
        let state = initial();
        let loading = reduce(
            &state,
            &Action::SetTileLoading {
                tile_id: "tile-2".to_string(),
                loading: true,
            },
        );
        assert!(loading.tile("tile-2").unwrap().is_loading);
        assert!(!loading.has_unsaved_changes);

        let failed = reduce(
            &loading,
            &Action::SetTileError {
                tile_id: "tile-2".to_string(),
                error: Some("Failed".to_string()),
            },
        );
        let tile = failed.tile("tile-2").unwrap();
        assert!(!tile.is_loading);
        assert_eq!(tile.error.as_deref(), Some("Failed"));
        assert!(!failed.has_unsaved_changes);
        assert!(!failed.content_differs(&state));
    }

    #[test]
    fn test_history_actions_leave_state_alone() {
        let state = initial();
        assert_eq!(reduce(&state, &Action::Undo), state);
        assert_eq!(reduce(&state, &Action::Redo), state);
        assert_eq!(reduce(&state, &Action::SaveSnapshot), state);
    }

    #[test]
    fn test_load_dashboard() {
        let state = initial();
        let mut document = test_scenario().default_document();
        document.dashboard.name = "Imported".to_string();
        document.tiles[6].populate(TileData::titled("Loaded"));

        let next = reduce(
            &state,
            &Action::LoadDashboard {
                dashboard: document.dashboard.clone(),
                tiles: document.tiles.clone(),
            },
        );

        assert_eq!(next.dashboard.name, "Imported");
        assert_eq!(next.tile("tile-7").unwrap().title.as_deref(), Some("Loaded"));
    }

    #[test]
    fn test_load_dashboard_with_missing_tiles_is_noop() {
        let state = initial();
        let mut document = test_scenario().default_document();
        document.tiles.truncate(2);

        let next = reduce(
            &state,
            &Action::LoadDashboard {
                dashboard: document.dashboard,
                tiles: document.tiles,
            },
        );

        assert_eq!(next, state);
        assert_eq!(next.tiles.len(), 7);
    }
}
