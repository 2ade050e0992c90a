use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use openclaw_core::{ActivationRegistry, BootstrapResult, EncryptionBootstrap};
use openclaw_keychain::{
    keyring_store::{DEFAULT_CONFIG_ACCOUNT, DEFAULT_SERVICE, DEFAULT_WORKSPACE_ACCOUNT},
    KeyringCredentialStore, WorkspaceMetadataProbe,
};
use tracing::debug;

pub type ProductionBootstrap = EncryptionBootstrap<WorkspaceMetadataProbe, KeyringCredentialStore>;

/// Build the keychain store, honouring config overrides.
pub fn credential_store(config: &Config) -> Result<KeyringCredentialStore> {
    let keychain = config.keychain.clone().unwrap_or_default();
    let service = keychain.service.as_deref().unwrap_or(DEFAULT_SERVICE);
    let workspace_account = keychain
        .workspace_account
        .unwrap_or_else(|| DEFAULT_WORKSPACE_ACCOUNT.to_string());
    let config_account = keychain
        .config_account
        .unwrap_or_else(|| DEFAULT_CONFIG_ACCOUNT.to_string());

    debug!(service, %workspace_account, %config_account, "opening keychain");
    Ok(KeyringCredentialStore::new(
        service,
        workspace_account,
        config_account,
    )?)
}

/// Build a production bootstrap driving the given registry.
pub fn production_bootstrap(
    config: &Config,
    registry: ActivationRegistry,
) -> Result<ProductionBootstrap> {
    Ok(EncryptionBootstrap::new(
        WorkspaceMetadataProbe::new(),
        credential_store(config)?,
        registry,
    ))
}

/// Pick the workspace root: explicit flag, then config, then the current directory.
pub fn resolve_workspace(flag: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    if let Some(dir) = flag.or_else(|| config.workspace_dir.clone()) {
        return Ok(dir);
    }
    Ok(std::env::current_dir()?)
}

/// Human-readable rendering of a bootstrap result.
pub fn render(result: &BootstrapResult) -> String {
    let mut out = format!(
        "Encryption: {}\nKeys: {}",
        if result.enabled() { "enabled" } else { "not configured" },
        if result.keys_loaded() { "loaded" } else { "not loaded" },
    );
    if let Some(error) = result.error() {
        out.push('\n');
        out.push_str(error);
    }
    out
}
