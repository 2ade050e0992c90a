mod cli;
mod config;
mod encryption;

use std::path::{Path, PathBuf};

use crate::cli::ConfigCommand;
use clap::Parser;
use color_eyre::Result;
use openclaw_core::{
    ActivationRegistry, BootstrapResult, ConfigurationProbe, CredentialStore, EncryptionBootstrap,
    KeyActivation,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = cli::Cli::parse();
    let config = config::load()?;
    let command = cli.command.unwrap_or(cli::Command::Status {
        workspace: None,
        json: false,
    });
    match command {
        cli::Command::Status { workspace, json } => run_status(workspace, json, &config).await?,
        cli::Command::Version => print_version(),
        cli::Command::Config(ConfigCommand::Init) => init_config(&config)?,
    }

    Ok(())
}

fn init_tracing() {
    // Respect user-provided filters, default to info to avoid noisy stdout.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn print_version() {
    println!("openclaw-bootstrap {}", env!("CARGO_PKG_VERSION"));
}

/// Bootstraps once, reports, then shuts down so no keys outlive the command.
async fn run_status(workspace: Option<PathBuf>, json: bool, config: &config::Config) -> Result<()> {
    let workspace = encryption::resolve_workspace(workspace, config)?;
    let bootstrap = encryption::production_bootstrap(config, ActivationRegistry::new())?;
    let result = bootstrap_and_shutdown(&bootstrap, &workspace).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", encryption::render(&result));
    }
    Ok(())
}

async fn bootstrap_and_shutdown<P, C, A>(
    bootstrap: &EncryptionBootstrap<P, C, A>,
    workspace: &Path,
) -> Result<BootstrapResult>
where
    P: ConfigurationProbe,
    C: CredentialStore,
    A: KeyActivation,
{
    let result = bootstrap.bootstrap(workspace).await;
    bootstrap.shutdown();
    Ok(result?)
}

fn init_config(config: &config::Config) -> Result<()> {
    let path = config::write_default_if_missing(config)?;
    println!("Config initialized at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{fs, io};

    use async_trait::async_trait;
    use openclaw_core::{
        BootstrapError, BootstrapState, InMemoryCredentialStore, KeyPair, ProbeError, StaticProbe,
    };
    use openclaw_keychain::{
        metadata_probe::{METADATA_DIR, METADATA_FILE},
        KeyringCredentialStore, WorkspaceMetadataProbe,
    };

    use super::*;

    #[tokio::test]
    async fn status_clears_keys_after_reporting() {
        let registry = ActivationRegistry::new();
        let bootstrap = EncryptionBootstrap::new(
            StaticProbe(true),
            InMemoryCredentialStore::with_keys(KeyPair::new("wk1", "ck1")),
            registry.clone(),
        );

        let result = bootstrap_and_shutdown(&bootstrap, Path::new("/srv/ws"))
            .await
            .expect("bootstrap");

        assert_eq!(result.state(), BootstrapState::ConfiguredActivated);
        assert!(!registry.is_active());
    }

    struct UnreadableMetadata;

    #[async_trait]
    impl ConfigurationProbe for UnreadableMetadata {
        async fn is_configured(&self, workspace_dir: &Path) -> Result<bool, ProbeError> {
            Err(ProbeError::Io {
                path: workspace_dir.join(".openclaw/encryption.json"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "metadata is root-only"),
            })
        }
    }

    #[tokio::test]
    async fn bootstrap_failure_keeps_source_chain() {
        let registry = ActivationRegistry::new();
        let bootstrap = EncryptionBootstrap::new(
            UnreadableMetadata,
            InMemoryCredentialStore::with_keys(KeyPair::new("wk1", "ck1")),
            registry.clone(),
        );

        let report = bootstrap_and_shutdown(&bootstrap, Path::new("/srv/ws"))
            .await
            .expect_err("unreadable metadata should fail");

        assert!(matches!(
            report.downcast_ref::<BootstrapError>(),
            Some(BootstrapError::Probe(ProbeError::Io { .. }))
        ));
        let io_err = report
            .root_cause()
            .downcast_ref::<io::Error>()
            .expect("io error at the root of the chain");
        assert_eq!(io_err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(report.chain().count(), 3);
        assert!(!registry.is_active());
    }

    #[tokio::test]
    async fn metadata_and_keychain_activate_end_to_end() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join(METADATA_DIR)).expect("metadata dir");
        fs::write(
            dir.path().join(METADATA_DIR).join(METADATA_FILE),
            r#"{ "enabled": true }"#,
        )
        .expect("write metadata");

        let store = KeyringCredentialStore::new("openclaw-e2e", "workspace-key", "config-key")
            .expect("mock keychain");
        store
            .store_all(&KeyPair::new("wk1", "ck1"))
            .expect("store keys");

        let registry = ActivationRegistry::new();
        let bootstrap =
            EncryptionBootstrap::new(WorkspaceMetadataProbe::new(), store, registry.clone());

        let result = bootstrap.bootstrap(dir.path()).await.expect("bootstrap");
        assert_eq!(
            result,
            BootstrapResult::from(BootstrapState::ConfiguredActivated)
        );
        assert_eq!(
            *registry.current_keys().expect("keys active"),
            KeyPair::new("wk1", "ck1")
        );

        bootstrap.shutdown();
        assert!(registry.current_keys().is_none());
    }

    #[tokio::test]
    async fn locked_keychain_reports_unlock_hint() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join(METADATA_DIR)).expect("metadata dir");
        fs::write(
            dir.path().join(METADATA_DIR).join(METADATA_FILE),
            r#"{ "enabled": true }"#,
        )
        .expect("write metadata");

        let store = KeyringCredentialStore::new("openclaw-locked", "workspace-key", "config-key")
            .expect("mock keychain");
        let registry = ActivationRegistry::new();
        let bootstrap =
            EncryptionBootstrap::new(WorkspaceMetadataProbe::new(), store, registry.clone());

        let result = bootstrap.bootstrap(dir.path()).await.expect("bootstrap");
        assert_eq!(result.state(), BootstrapState::ConfiguredNoKeys);
        assert!(encryption::render(&result).contains("openclaw security unlock"));
        assert!(!registry.is_active());
    }
}
