use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

/// Failures of the probe itself. "Not configured" is never one of these.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The workspace root does not exist.
    #[error("workspace root not found: {}", path.display())]
    WorkspaceMissing { path: PathBuf },
    /// Workspace metadata exists but could not be read.
    #[error("failed to read workspace metadata at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Workspace metadata is present but unparseable.
    #[error("invalid workspace metadata at {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

/// Answers whether a workspace has encryption configured. Read-only.
#[async_trait]
pub trait ConfigurationProbe: Send + Sync {
    /// Returns `Ok(false)` for any workspace without encryption setup.
    async fn is_configured(&self, workspace_dir: &Path) -> Result<bool, ProbeError>;
}

/// Probe with a fixed answer, for tests and for hosts that already know.
#[derive(Debug, Clone, Copy)]
pub struct StaticProbe(pub bool);

#[async_trait]
impl ConfigurationProbe for StaticProbe {
    async fn is_configured(&self, _workspace_dir: &Path) -> Result<bool, ProbeError> {
        Ok(self.0)
    }
}
