use crate::domain::scenario::Scenario;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub history: HistorySettings,
    #[serde(default)]
    pub assistant: AssistantSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub address: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub debounce_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/dashboards"),
            debounce_ms: 1000,
        }
    }
}

impl StorageSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistorySettings {
    /// Maximum number of snapshots kept, 0 keeps everything.
    pub limit: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self { limit: 100 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssistantSettings {
    pub latency_ms: u64,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self { latency_ms: 1500 }
    }
}

impl AssistantSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScenariosConfig {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// `config/app.toml`, overridable with `DASHBOARD__SECTION__KEY` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app"))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_scenarios() -> anyhow::Result<ScenariosConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/scenarios"))
        .build()?;

    Ok(settings.try_deserialize()?)
}
