use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use openclaw_core::{ConfigurationProbe, ProbeError};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Directory under the workspace root that holds OpenClaw metadata.
pub const METADATA_DIR: &str = ".openclaw";
/// Encryption marker inside [`METADATA_DIR`].
pub const METADATA_FILE: &str = "encryption.json";

#[derive(Debug, Deserialize)]
struct EncryptionMetadata {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    version: Option<u32>,
}

/// Probe that reads `<workspace>/.openclaw/encryption.json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkspaceMetadataProbe;

impl WorkspaceMetadataProbe {
    pub fn new() -> Self {
        Self
    }

    pub fn metadata_path(workspace_dir: &Path) -> PathBuf {
        workspace_dir.join(METADATA_DIR).join(METADATA_FILE)
    }
}

#[async_trait]
impl ConfigurationProbe for WorkspaceMetadataProbe {
    #[instrument(skip_all, fields(workspace = %workspace_dir.display()))]
    async fn is_configured(&self, workspace_dir: &Path) -> Result<bool, ProbeError> {
        ensure_workspace_root(workspace_dir).await?;

        let path = Self::metadata_path(workspace_dir);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no encryption metadata");
                return Ok(false);
            }
            Err(source) => return Err(ProbeError::Io { path, source }),
        };

        let metadata: EncryptionMetadata =
            serde_json::from_str(&contents).map_err(|e| ProbeError::Malformed {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        debug!(
            enabled = metadata.enabled,
            version = ?metadata.version,
            "read encryption metadata"
        );
        Ok(metadata.enabled)
    }
}

async fn ensure_workspace_root(workspace_dir: &Path) -> Result<(), ProbeError> {
    match tokio::fs::metadata(workspace_dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(ProbeError::WorkspaceMissing {
            path: workspace_dir.to_path_buf(),
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(ProbeError::WorkspaceMissing {
            path: workspace_dir.to_path_buf(),
        }),
        Err(source) => Err(ProbeError::Io {
            path: workspace_dir.to_path_buf(),
            source,
        }),
    }
}
