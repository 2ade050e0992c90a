//! Startup sequence that decides whether this process can decrypt workspace
//! content, and installs the keys when it can.
//!
//! The sequence has exactly three outcomes, all reported as values:
//!
//! | probe | credential store | state                 | registry   |
//! |-------|------------------|-----------------------|------------|
//! | false | not consulted    | `Unconfigured`        | untouched  |
//! | true  | absent           | `ConfiguredNoKeys`    | untouched  |
//! | true  | key pair         | `ConfiguredActivated` | installed  |
//!
//! Probe or store *failures* (as opposed to "no" answers) surface as
//! [`BootstrapError`] and leave the registry untouched.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::{
    activation::{ActivationRegistry, KeyActivation},
    credentials::{CredentialError, CredentialStore},
    keys::KeyPair,
    probe::{ConfigurationProbe, ProbeError},
};

/// Shown to operators when encryption is configured but the keychain is locked.
/// Downstream tooling matches on this text; do not reword it.
pub const KEYS_MISSING_MESSAGE: &str = "Encryption is enabled but keys are not in the Keychain. Run \"openclaw security unlock\" to enter your password.";

/// Terminal state of one bootstrap invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Unconfigured,
    ConfiguredNoKeys,
    ConfiguredActivated,
}

/// Structured report of a bootstrap invocation.
///
/// Only constructible from a [`BootstrapState`], so `keys_loaded` implies
/// `enabled`, and `error` is set exactly when enabled without keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapResult {
    enabled: bool,
    keys_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BootstrapResult {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn keys_loaded(&self) -> bool {
        self.keys_loaded
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn state(&self) -> BootstrapState {
        match (self.enabled, self.keys_loaded) {
            (false, _) => BootstrapState::Unconfigured,
            (true, false) => BootstrapState::ConfiguredNoKeys,
            (true, true) => BootstrapState::ConfiguredActivated,
        }
    }
}

impl From<BootstrapState> for BootstrapResult {
    fn from(state: BootstrapState) -> Self {
        match state {
            BootstrapState::Unconfigured => Self {
                enabled: false,
                keys_loaded: false,
                error: None,
            },
            BootstrapState::ConfiguredNoKeys => Self {
                enabled: true,
                keys_loaded: false,
                error: Some(KEYS_MISSING_MESSAGE.to_string()),
            },
            BootstrapState::ConfiguredActivated => Self {
                enabled: true,
                keys_loaded: true,
                error: None,
            },
        }
    }
}

/// Infrastructure faults outside the three modelled outcomes.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("encryption configuration probe failed: {0}")]
    Probe(#[from] ProbeError),
    #[error("credential lookup failed: {0}")]
    Credentials(#[from] CredentialError),
}

/// What bootstrap decided to do, before anything is mutated.
#[derive(Debug)]
enum Plan {
    Skip,
    ReportMissingKeys,
    Activate(KeyPair),
}

impl Plan {
    /// The only step that touches activation state, and only for `Activate`.
    fn apply<A: KeyActivation + ?Sized>(self, activation: &A) -> BootstrapState {
        match self {
            Plan::Skip => BootstrapState::Unconfigured,
            Plan::ReportMissingKeys => BootstrapState::ConfiguredNoKeys,
            Plan::Activate(keys) => {
                let (workspace_key, config_key) = keys.into_parts();
                activation.install(workspace_key, config_key);
                BootstrapState::ConfiguredActivated
            }
        }
    }
}

/// Sequences probe, credential store and activation into one startup step.
pub struct EncryptionBootstrap<P, C, A = ActivationRegistry> {
    probe: P,
    credentials: C,
    activation: A,
}

impl<P, C, A> EncryptionBootstrap<P, C, A>
where
    P: ConfigurationProbe,
    C: CredentialStore,
    A: KeyActivation,
{
    pub fn new(probe: P, credentials: C, activation: A) -> Self {
        Self {
            probe,
            credentials,
            activation,
        }
    }

    pub fn activation(&self) -> &A {
        &self.activation
    }

    /// Run once at startup, before any workspace read that may need decryption.
    /// Repeat calls are safe; the last successful one wins.
    #[instrument(skip_all, fields(workspace = %workspace_dir.display()))]
    pub async fn bootstrap(
        &self,
        workspace_dir: &Path,
    ) -> Result<BootstrapResult, BootstrapError> {
        let plan = self.plan(workspace_dir).await?;
        let state = plan.apply(&self.activation);

        match state {
            BootstrapState::Unconfigured => info!("workspace encryption not configured"),
            BootstrapState::ConfiguredNoKeys => warn!("{KEYS_MISSING_MESSAGE}"),
            BootstrapState::ConfiguredActivated => info!("workspace encryption keys activated"),
        }
        Ok(state.into())
    }

    /// Clear activation state. Idempotent; intended for graceful termination.
    #[instrument(skip_all)]
    pub fn shutdown(&self) {
        self.activation.clear();
    }

    async fn plan(&self, workspace_dir: &Path) -> Result<Plan, BootstrapError> {
        if !self.probe.is_configured(workspace_dir).await? {
            return Ok(Plan::Skip);
        }
        Ok(match self.credentials.get_all()? {
            None => Plan::ReportMissingKeys,
            Some(keys) => Plan::Activate(keys),
        })
    }
}
