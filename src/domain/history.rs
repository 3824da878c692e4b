// Edit history - linear snapshot list with a cursor
use super::dashboard::Dashboard;
use super::state::DashboardState;
use super::tile::Tile;

/// Independent copy of the undoable part of the state. Tiles are stored
/// with loading/error reset so a restore never brings back a stale spinner.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub dashboard: Dashboard,
    pub tiles: Vec<Tile>,
    pub selected_tile_id: Option<String>,
}

impl Snapshot {
    pub fn capture(state: &DashboardState) -> Self {
        Self {
            dashboard: state.dashboard.clone(),
            tiles: state.tiles.iter().map(Tile::without_transient).collect(),
            selected_tile_id: state.selected_tile_id.clone(),
        }
    }

    /// Structural equality with the live state, transient flags excluded.
    pub fn matches(&self, state: &DashboardState) -> bool {
        *self == Snapshot::capture(state)
    }
}

/// Truncate-on-branch history. `entries[cursor]` is the active entry;
/// recording after an undo discards everything past the cursor.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<Snapshot>,
    cursor: usize,
    limit: usize,
}

impl HistoryStore {
    /// Store seeded with `initial` as entry 0. A `limit` of 0 keeps every
    /// entry.
    pub fn new(initial: &DashboardState, limit: usize) -> Self {
        Self {
            entries: vec![Snapshot::capture(initial)],
            cursor: 0,
            limit,
        }
    }

    /// Append `state` after the cursor, dropping any redo branch. Recording
    /// a state equal to the active entry is a no-op, so an explicit snapshot
    /// taken before an edit that is itself recorded leaves one entry.
    pub fn record(&mut self, state: &DashboardState) {
        if self.is_empty() {
            self.entries.push(Snapshot::capture(state));
            self.cursor = 0;
            return;
        }
        if self.current().is_some_and(|active| active.matches(state)) {
            tracing::debug!("history unchanged at index {}", self.cursor);
            return;
        }

        self.entries.truncate(self.cursor + 1);
        self.entries.push(Snapshot::capture(state));
        self.cursor = self.entries.len() - 1;

        if self.limit > 0 && self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
            self.cursor -= overflow;
        }

        tracing::debug!(
            "history recorded: index {} of {}",
            self.cursor,
            self.entries.len()
        );
    }

    /// Drop every entry and start over from `state`.
    pub fn reset(&mut self, state: &DashboardState) {
        self.entries = vec![Snapshot::capture(state)];
        self.cursor = 0;
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        if !self.can_undo() {
            tracing::debug!("undo ignored at index {}", self.cursor);
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        if !self.can_redo() {
            tracing::debug!("redo ignored at index {}", self.cursor);
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.is_empty() && self.cursor < self.entries.len() - 1
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.entries.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reducer::reduce;
    use crate::domain::scenario::test_scenario;
    use crate::domain::state::Action;
    use crate::domain::tile::TileData;

    fn initial() -> DashboardState {
        DashboardState::new(test_scenario().default_document())
    }

    fn titled(state: &DashboardState, title: &str) -> DashboardState {
        reduce(
            state,
            &Action::PopulateTile {
                tile_id: "tile-1".to_string(),
                data: TileData::titled(title),
            },
        )
    }

    #[test]
    fn test_new_store_has_single_entry() {
        let state = initial();
        let mut history = HistoryStore::new(&state, 0);

        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(history.current().unwrap().matches(&state));
    }

    #[test]
    fn test_record_truncates_redo_branch() {
        let s0 = initial();
        let s1 = titled(&s0, "A");
        let s2 = titled(&s1, "B");
        let mut history = HistoryStore::new(&s0, 0);
        history.record(&s1);
        history.record(&s2);

        history.undo();
        history.undo();
        assert_eq!(history.cursor(), 0);

        let branch = titled(&s0, "C");
        history.record(&branch);

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert!(!history.can_redo());
        assert!(history.current().unwrap().matches(&branch));
    }

    #[test]
    fn test_snapshot_is_independent_of_live_state() {
        let mut state = initial();
        let history = HistoryStore::new(&state, 0);

        state.tiles[0].populate(TileData::titled("mutated"));
        state.dashboard.layout[0].clear();

        let snapshot = history.current().unwrap();
        assert!(!snapshot.tiles[0].is_populated);
        assert_eq!(snapshot.dashboard.layout[0].len(), 4);
    }

    #[test]
    fn test_snapshot_excludes_transient_flags() {
        let mut state = initial();
        state.tiles[0].is_loading = true;
        state.tiles[1].error = Some("failed".to_string());

        let snapshot = Snapshot::capture(&state);
        assert!(!snapshot.tiles[0].is_loading);
        assert_eq!(snapshot.tiles[1].error, None);
        assert!(snapshot.matches(&initial()));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let s0 = initial();
        let mut history = HistoryStore::new(&s0, 3);
        let mut state = s0.clone();
        for title in ["A", "B", "C", "D"] {
            state = titled(&state, title);
            history.record(&state);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        history.undo();
        let oldest = history.undo().cloned().unwrap();
        assert_eq!(oldest.tiles[0].title.as_deref(), Some("B"));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_recording_active_state_again_is_noop() {
        let s0 = initial();
        let s1 = titled(&s0, "A");
        let mut history = HistoryStore::new(&s0, 0);

        history.record(&s0);
        assert_eq!(history.len(), 1);

        history.record(&s1);
        history.undo();
        history.record(&s0);

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 0);
        assert!(history.can_redo());
    }

    #[test]
    fn test_reset_keeps_only_new_state() {
        let s0 = initial();
        let s1 = titled(&s0, "A");
        let mut history = HistoryStore::new(&s0, 0);
        history.record(&s1);

        history.reset(&s1);

        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert!(history.current().unwrap().matches(&s1));
    }
}
