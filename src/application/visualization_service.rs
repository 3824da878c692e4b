// Visualization service - the mocked chat assistant
use crate::domain::scenario::ScenarioCatalog;
use crate::domain::visualization::{Visualization, VisualizationRequest};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisualizationError {
    #[error("query must not be empty")]
    EmptyQuery,
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    #[error("scenario {0} has no visualizations")]
    NoVisualizations(String),
}

#[derive(Clone)]
pub struct VisualizationService {
    catalog: Arc<ScenarioCatalog>,
    latency: Duration,
}

impl VisualizationService {
    pub fn new(catalog: Arc<ScenarioCatalog>, latency: Duration) -> Self {
        Self { catalog, latency }
    }

    /// Pick the canned visualization whose keywords match the query.
    pub async fn generate(
        &self,
        request: &VisualizationRequest,
    ) -> Result<Visualization, VisualizationError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(VisualizationError::EmptyQuery);
        }

        let scenario = self
            .catalog
            .get(&request.demo_type)
            .ok_or_else(|| VisualizationError::UnknownScenario(request.demo_type.clone()))?;

        let template = scenario
            .match_query(query)
            .ok_or_else(|| VisualizationError::NoVisualizations(scenario.id.clone()))?;

        tracing::debug!(
            "Query {:?} for {} matched {}",
            query,
            request.tile_id,
            template.key
        );

        // Simulated processing time
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let summary = format!(
            "Generated {} based on the query: \"{}\".",
            template.title, query
        );
        let assistant_message = template.assistant_message.clone().unwrap_or_else(|| {
            format!("Done. The chart now shows {}.", template.title.to_lowercase())
        });

        Ok(Visualization {
            tile_id: request.tile_id.clone(),
            title: template.title.clone(),
            kind: template.kind.clone(),
            data: template.data.clone(),
            metadata: template.metadata.clone(),
            summary,
            assistant_message,
        })
    }
}
