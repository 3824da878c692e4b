// JSON file repository - one document per scenario on local disk
use crate::application::dashboard_repository::DashboardRepository;
use crate::domain::dashboard::DashboardDocument;
use anyhow::Context;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub struct JsonFileRepository {
    data_dir: PathBuf,
}

impl JsonFileRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn path_for(&self, scenario_id: &str) -> anyhow::Result<PathBuf> {
        // Scenario ids end up in file names.
        if scenario_id.is_empty()
            || !scenario_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            anyhow::bail!("invalid scenario id {:?}", scenario_id);
        }
        Ok(self.data_dir.join(format!("{}.json", scenario_id)))
    }
}

#[async_trait]
impl DashboardRepository for JsonFileRepository {
    async fn load(&self, scenario_id: &str) -> anyhow::Result<Option<DashboardDocument>> {
        let path = self.path_for(scenario_id)?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };

        let document = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Some(document))
    }

    async fn save(&self, scenario_id: &str, document: &DashboardDocument) -> anyhow::Result<()> {
        let path = self.path_for(scenario_id)?;
        tokio::fs::create_dir_all(&self.data_dir)
            .await
            .with_context(|| format!("creating {}", self.data_dir.display()))?;

        let json = serde_json::to_vec_pretty(document)?;
        write_atomically(&path, &json).await
    }
}

/// Write to a sibling temp file, then rename over the target so readers
/// never see a half-written document.
async fn write_atomically(path: &Path, contents: &[u8]) -> anyhow::Result<()> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}
