// Dashboard session - live state plus its own edit history
use super::dashboard::DashboardDocument;
use super::history::{HistoryStore, Snapshot};
use super::reducer::reduce;
use super::state::{Action, DashboardState};
use std::collections::HashMap;

/// Handle for one outstanding assistant request on a tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub tile_id: String,
    id: u64,
}

/// One editing session over one dashboard. Owns the history explicitly;
/// there is no shared or global history.
#[derive(Debug, Clone)]
pub struct DashboardSession {
    state: DashboardState,
    history: HistoryStore,
    pending: HashMap<String, u64>,
    next_ticket: u64,
}

impl DashboardSession {
    pub fn new(document: DashboardDocument, history_limit: usize) -> Self {
        let state = DashboardState::new(document);
        let history = HistoryStore::new(&state, history_limit);
        Self {
            state,
            history,
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn document(&self) -> DashboardDocument {
        self.state.document()
    }

    /// Apply any action. Edits are recorded through [`edit`](Self::edit),
    /// and an explicit `SaveSnapshot` of the already recorded state adds
    /// nothing. A successful load starts a fresh history. Returns whether
    /// the live state changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Undo => self.undo(),
            Action::Redo => self.redo(),
            Action::SaveSnapshot => {
                self.record_snapshot();
                false
            }
            action if action.is_edit() => self.edit(action),
            action @ Action::LoadDashboard { .. } => {
                let next = reduce(&self.state, &action);
                if next == self.state {
                    return false;
                }
                self.state = next;
                self.abandon_pending();
                self.history.reset(&self.state);
                true
            }
            action => {
                let next = reduce(&self.state, &action);
                let changed = next != self.state;
                self.state = next;
                changed
            }
        }
    }

    /// First phase of an edit: apply it and hand back the new state. The
    /// caller records it with [`record_snapshot`](Self::record_snapshot).
    pub fn apply_edit(&mut self, action: Action) -> &DashboardState {
        self.state = reduce(&self.state, &action);
        &self.state
    }

    pub fn record_snapshot(&mut self) {
        self.history.record(&self.state);
    }

    /// Apply an edit and record it, unless the reducer rejected it. Returns
    /// whether a history entry was added.
    pub fn edit(&mut self, action: Action) -> bool {
        let before = self.state.clone();
        let changed = self.apply_edit(action).content_differs(&before);
        if changed {
            self.record_snapshot();
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.restore(snapshot);
                true
            }
            None => false,
        }
    }

    // Edit mode and processing flags stay as they are; tiles with a request
    // still in flight keep showing as loading.
    fn restore(&mut self, snapshot: Snapshot) {
        self.state.dashboard = snapshot.dashboard;
        self.state.tiles = snapshot.tiles;
        self.state.selected_tile_id = snapshot.selected_tile_id;
        self.state.has_unsaved_changes = true;

        for tile in &mut self.state.tiles {
            if self.pending.contains_key(&tile.tile_id) {
                tile.is_loading = true;
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_index(&self) -> usize {
        self.history.cursor()
    }

    /// Mark `tile_id` as loading and remember the request. A newer request on
    /// the same tile makes older tickets stale. `None` if the tile is unknown.
    pub fn begin_request(&mut self, tile_id: &str) -> Option<RequestTicket> {
        self.state.tile(tile_id)?;

        self.next_ticket += 1;
        self.pending.insert(tile_id.to_string(), self.next_ticket);
        self.dispatch(Action::SetTileLoading {
            tile_id: tile_id.to_string(),
            loading: true,
        });

        Some(RequestTicket {
            tile_id: tile_id.to_string(),
            id: self.next_ticket,
        })
    }

    /// Retire a ticket. Returns false if it was superseded or abandoned, in
    /// which case its result must be dropped.
    pub fn finish_request(&mut self, ticket: &RequestTicket) -> bool {
        match self.pending.get(&ticket.tile_id) {
            Some(id) if *id == ticket.id => {
                self.pending.remove(&ticket.tile_id);
                true
            }
            _ => false,
        }
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_tiles(&self) -> Vec<String> {
        let mut tiles: Vec<String> = self.pending.keys().cloned().collect();
        tiles.sort();
        tiles
    }

    /// Drop every outstanding request and its loading spinner.
    pub fn abandon_pending(&mut self) -> Vec<String> {
        let abandoned = self.pending_tiles();
        self.pending.clear();
        for tile_id in &abandoned {
            self.dispatch(Action::SetTileLoading {
                tile_id: tile_id.clone(),
                loading: false,
            });
        }
        abandoned
    }
}
