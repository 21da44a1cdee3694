//! Compiled contract artifacts and per-network deployment records on disk.
//!
//! Layout:
//! - `<artifacts>/<Name>.json` - compiler output with a `bytecode` field
//!   (either a hex string or an object with an `object` field)
//! - `<deployments>/<network>/<Name>.json` - one [`StoredDeployment`] per contract
//! - `<deployments>/<network>/<Name>.record.json` - the [`DeploymentRecord`] of a run

use std::path::{Path, PathBuf};

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DeployedContract, DeploymentRecord};

/// A deployed contract as persisted on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDeployment {
    #[serde(flatten)]
    pub contract: DeployedContract,
    /// Confirmation depth waited for at creation.
    pub confirmations: u64,
    /// Unix timestamp of the save.
    pub deployed_at: i64,
}

/// Reads compiled artifacts and reads/writes deployments of one network.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    artifacts_dir: PathBuf,
    network_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(
        artifacts_dir: impl Into<PathBuf>,
        deployments_dir: impl AsRef<Path>,
        network: &str,
    ) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            network_dir: deployments_dir.as_ref().join(network),
        }
    }

    /// Directory holding this network's deployments.
    pub fn network_dir(&self) -> &Path {
        &self.network_dir
    }

    /// Creation bytecode of contract `name`.
    pub async fn bytecode(&self, name: &str) -> Result<Bytes> {
        let path = self.artifacts_dir.join(format!("{name}.json"));
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;
        let artifact: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        let bytecode = match &artifact["bytecode"] {
            Value::String(hex) => hex.as_str(),
            Value::Object(object) => object
                .get("object")
                .and_then(Value::as_str)
                .context("Artifact bytecode object has no `object` field")?,
            _ => anyhow::bail!("Artifact {} has no bytecode", path.display()),
        };

        let bytes: Bytes = bytecode
            .parse()
            .with_context(|| format!("Invalid bytecode hex in {}", path.display()))?;

        if bytes.is_empty() {
            anyhow::bail!("Artifact {} has empty bytecode (abstract contract or interface?)", name);
        }

        Ok(bytes)
    }

    /// Persist a deployed contract, replacing any earlier deployment under the same name.
    pub async fn save(&self, contract: &DeployedContract, confirmations: u64) -> Result<PathBuf> {
        let stored = StoredDeployment {
            contract: contract.clone(),
            confirmations,
            deployed_at: chrono::Utc::now().timestamp(),
        };
        let path = self.network_dir.join(format!("{}.json", contract.name));
        self.write_json(&path, &stored).await?;
        tracing::debug!(path = %path.display(), name = contract.name, "Deployment saved");
        Ok(path)
    }

    /// Load the deployment saved under `name`, if any.
    pub async fn load(&self, name: &str) -> Result<Option<StoredDeployment>> {
        let path = self.network_dir.join(format!("{name}.json"));
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read deployment {}", path.display()))?;
        let stored = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deployment {}", path.display()))?;
        Ok(Some(stored))
    }

    /// Persist the record of a completed run.
    pub async fn save_record(&self, record: &DeploymentRecord) -> Result<PathBuf> {
        let path = self
            .network_dir
            .join(format!("{}.record.json", record.contract_name));
        self.write_json(&path, record).await?;
        tracing::info!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }

    /// Load the record of the last completed run for `name`, if any.
    pub async fn load_record(&self, name: &str) -> Result<Option<DeploymentRecord>> {
        let path = self.network_dir.join(format!("{name}.record.json"));
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        Ok(Some(serde_json::from_str(&content).context("Failed to parse deployment record")?))
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(&self.network_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.network_dir.display()))?;
        let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        tokio::fs::write(path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
