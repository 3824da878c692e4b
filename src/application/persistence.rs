// Persistence gateway - load/save of the current dashboard, debounced
use crate::application::dashboard_repository::DashboardRepository;
use crate::domain::dashboard::DashboardDocument;
use crate::domain::scenario::Scenario;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};

#[derive(Clone)]
pub struct PersistenceGateway {
    repository: Arc<dyn DashboardRepository>,
}

impl PersistenceGateway {
    pub fn new(repository: Arc<dyn DashboardRepository>) -> Self {
        Self { repository }
    }

    /// Stored document for the scenario, or its default layout when nothing
    /// usable is stored. Never fails.
    pub async fn load(&self, scenario: &Scenario) -> DashboardDocument {
        match self.repository.load(&scenario.id).await {
            Ok(Some(document)) => match document.validate() {
                Ok(()) => {
                    tracing::info!("Loaded saved dashboard for {}", scenario.id);
                    document.without_transient()
                }
                Err(e) => {
                    tracing::warn!(
                        "Stored dashboard for {} is inconsistent ({}), using default",
                        scenario.id,
                        e
                    );
                    scenario.default_document()
                }
            },
            Ok(None) => {
                tracing::info!("No saved dashboard for {}, using default", scenario.id);
                scenario.default_document()
            }
            Err(e) => {
                tracing::error!("Error loading dashboard for {}: {:#}", scenario.id, e);
                scenario.default_document()
            }
        }
    }

    pub async fn save(&self, scenario_id: &str, document: DashboardDocument) -> anyhow::Result<()> {
        let document = document.without_transient();
        self.repository.save(scenario_id, &document).await
    }
}

/// Outcome of the background writes for one scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStatus {
    pub last_saved: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Generation of the last document written successfully.
    pub saved_generation: u64,
}

/// Coalesces bursts of changes into one write.
///
/// Every `schedule` pushes the deadline to now + debounce and replaces the
/// pending document. A write already running is left alone; anything
/// scheduled meanwhile is written after it.
pub struct DebouncedSaver {
    tx: mpsc::UnboundedSender<(u64, DashboardDocument)>,
    status: watch::Receiver<SaveStatus>,
    generation: u64,
}

impl DebouncedSaver {
    pub fn spawn(scenario_id: String, gateway: PersistenceGateway, debounce: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::default());

        tokio::spawn(run_saver(scenario_id, gateway, debounce, rx, status_tx));

        Self {
            tx,
            status,
            generation: 0,
        }
    }

    pub fn schedule(&mut self, document: DashboardDocument) {
        self.generation += 1;
        if self.tx.send((self.generation, document)).is_err() {
            tracing::error!("Dashboard saver stopped, change not persisted");
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    /// Whether a scheduled document has not been written yet.
    pub fn has_unsaved(&self) -> bool {
        self.generation > self.status.borrow().saved_generation
    }
}

async fn run_saver(
    scenario_id: String,
    gateway: PersistenceGateway,
    debounce: Duration,
    mut rx: mpsc::UnboundedReceiver<(u64, DashboardDocument)>,
    status: watch::Sender<SaveStatus>,
) {
    while let Some(mut pending) = rx.recv().await {
        let mut deadline = Instant::now() + debounce;

        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                next = rx.recv() => match next {
                    Some(latest) => {
                        pending = latest;
                        deadline = Instant::now() + debounce;
                    }
                    // Saver dropped: flush what we have.
                    None => break,
                },
            }
        }

        let (generation, document) = pending;
        match gateway.save(&scenario_id, document).await {
            Ok(()) => {
                tracing::info!("Saved dashboard for {} (generation {})", scenario_id, generation);
                status.send_modify(|s| {
                    s.last_saved = Some(Utc::now());
                    s.last_error = None;
                    s.saved_generation = generation;
                });
            }
            Err(e) => {
                tracing::error!("Error saving dashboard for {}: {:#}", scenario_id, e);
                status.send_modify(|s| s.last_error = Some(e.to_string()));
            }
        }
    }
}
