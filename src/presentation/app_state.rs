// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::visualization_service::VisualizationService;
use crate::domain::scenario::ScenarioCatalog;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<ScenarioCatalog>,
    pub dashboard_service: DashboardService,
    pub visualization_service: VisualizationService,
}
