// Repository trait for dashboard document storage
use crate::domain::dashboard::DashboardDocument;
use async_trait::async_trait;

#[async_trait]
pub trait DashboardRepository: Send + Sync {
    /// Last saved document for a scenario, `None` if nothing was saved yet
    async fn load(&self, scenario_id: &str) -> anyhow::Result<Option<DashboardDocument>>;

    /// Overwrite the stored document for a scenario
    async fn save(&self, scenario_id: &str, document: &DashboardDocument) -> anyhow::Result<()>;
}
