use base64::{engine::general_purpose, Engine as _};
use keyring::Entry;
use openclaw_core::{CredentialError, CredentialStore, KeyPair, SecretKey};
use tracing::{debug, instrument, warn};

pub const DEFAULT_SERVICE: &str = "openclaw";
pub const DEFAULT_WORKSPACE_ACCOUNT: &str = "workspace-key";
pub const DEFAULT_CONFIG_ACCOUNT: &str = "config-key";

/// OS keychain-backed credential store. Uses the `keyring` crate; each key
/// lives under its own account, base64 encoded.
pub struct KeyringCredentialStore {
    workspace: Slot,
    config: Slot,
}

struct Slot {
    account: String,
    entry: Entry,
}

impl Slot {
    fn open(service: &str, account: String) -> Result<Self, CredentialError> {
        let entry = Entry::new(service, &account).map_err(|e| CredentialError::Unavailable {
            reason: e.to_string(),
        })?;
        Ok(Self { account, entry })
    }

    fn read(&self) -> Result<Option<SecretKey>, CredentialError> {
        match self.entry.get_password() {
            Ok(secret) => decode_key(&self.account, &secret).map(Some),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(CredentialError::Unavailable {
                reason: err.to_string(),
            }),
        }
    }

    fn write(&self, key: &SecretKey) -> Result<(), CredentialError> {
        self.entry
            .set_password(&encode_key(key))
            .map_err(|e| CredentialError::Unavailable {
                reason: e.to_string(),
            })
    }

    fn delete(&self) -> Result<(), CredentialError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(CredentialError::Unavailable {
                reason: err.to_string(),
            }),
        }
    }
}

impl KeyringCredentialStore {
    pub fn new(
        service: impl AsRef<str>,
        workspace_account: impl Into<String>,
        config_account: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let service = service.as_ref();
        Ok(Self {
            workspace: Slot::open(service, workspace_account.into())?,
            config: Slot::open(service, config_account.into())?,
        })
    }

    pub fn with_defaults() -> Result<Self, CredentialError> {
        Self::new(
            DEFAULT_SERVICE,
            DEFAULT_WORKSPACE_ACCOUNT,
            DEFAULT_CONFIG_ACCOUNT,
        )
    }

    /// Write both keys, overwriting existing entries.
    #[instrument(skip_all)]
    pub fn store_all(&self, keys: &KeyPair) -> Result<(), CredentialError> {
        self.workspace.write(keys.workspace_key())?;
        self.config.write(keys.config_key())?;
        debug!("stored encryption keys in keychain");
        Ok(())
    }

    /// Remove both keys (idempotent).
    #[instrument(skip_all)]
    pub fn delete_all(&self) -> Result<(), CredentialError> {
        self.workspace.delete()?;
        self.config.delete()
    }
}

impl CredentialStore for KeyringCredentialStore {
    #[instrument(skip_all)]
    fn get_all(&self) -> Result<Option<KeyPair>, CredentialError> {
        // Keyring operations are synchronous, matching the contract.
        match (self.workspace.read()?, self.config.read()?) {
            (Some(workspace_key), Some(config_key)) => {
                Ok(Some(KeyPair::new(workspace_key, config_key)))
            }
            (None, None) => Ok(None),
            (workspace, config) => {
                warn!(
                    workspace_present = workspace.is_some(),
                    config_present = config.is_some(),
                    "keychain holds an incomplete key set; treating as absent"
                );
                Ok(None)
            }
        }
    }
}

fn encode_key(key: &SecretKey) -> String {
    general_purpose::STANDARD.encode(key.expose())
}

fn decode_key(account: &str, secret: &str) -> Result<SecretKey, CredentialError> {
    let bytes = general_purpose::STANDARD
        .decode(secret)
        .map_err(|e| CredentialError::Corrupt {
            account: account.to_string(),
            reason: e.to_string(),
        })?;

    if bytes.is_empty() {
        return Err(CredentialError::Corrupt {
            account: account.to_string(),
            reason: "empty key".to_string(),
        });
    }
    Ok(SecretKey::from(bytes))
}
