use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use thiserror::Error;

use crate::keys::KeyPair;

/// Errors produced by credential store implementations.
///
/// Keys simply not being present is not an error; stores return `Ok(None)`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    /// The secure store could not be reached or refused access.
    #[error("credential store unavailable: {reason}")]
    Unavailable { reason: String },
    /// An entry exists but does not hold usable key material.
    #[error("stored credential `{account}` is corrupt: {reason}")]
    Corrupt { account: String, reason: String },
}

/// Source of the full key set for the current user/session.
pub trait CredentialStore: Send + Sync {
    /// Read every key needed for decryption, or `None` when they are absent.
    fn get_all(&self) -> Result<Option<KeyPair>, CredentialError>;
}

impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    fn get_all(&self) -> Result<Option<KeyPair>, CredentialError> {
        (**self).get_all()
    }
}

/// In-memory credential store for tests and ephemeral sessions.
/// Counts lookups so callers can assert the store was (or was not) consulted.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    keys: Option<KeyPair>,
    lookups: AtomicUsize,
}

impl InMemoryCredentialStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: KeyPair) -> Self {
        Self {
            keys: Some(keys),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_all(&self) -> Result<Option<KeyPair>, CredentialError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.clone())
    }
}
