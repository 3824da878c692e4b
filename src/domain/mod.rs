// Domain layer - dashboard data model, reducer and edit history
pub mod dashboard;
pub mod history;
pub mod reducer;
pub mod scenario;
pub mod session;
pub mod state;
pub mod tile;
pub mod visualization;
