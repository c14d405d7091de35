// JSON file persistence for the dashboard snapshot
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::widget::{LayoutItem, Widget};

/// Fixed namespace key; the snapshot lives in `<dir>/finboard-dashboard.json`.
pub const STORAGE_KEY: &str = "finboard-dashboard";

/// The durable part of the dashboard state. Loading flags and errors are
/// transient and never written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub widgets: Vec<Widget>,
    pub layout: Vec<LayoutItem>,
}

#[derive(Debug, Clone)]
pub struct DashboardStorage {
    path: PathBuf,
}

impl DashboardStorage {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// Read the persisted snapshot; `None` when nothing was saved yet.
    pub async fn load(&self) -> anyhow::Result<Option<DashboardSnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to read dashboard snapshot from {}", self.path.display())
                });
            }
        };

        let snapshot = serde_json::from_slice(&bytes).with_context(|| {
            format!("failed to parse dashboard snapshot at {}", self.path.display())
        })?;
        Ok(Some(snapshot))
    }

    /// Write the snapshot via a temp file rename so readers never observe a
    /// partial write.
    pub async fn save(&self, snapshot: &DashboardSnapshot) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let bytes = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }
}
