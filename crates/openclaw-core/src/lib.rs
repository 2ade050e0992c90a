//! Core of OpenClaw workspace encryption bootstrap: key types, the probe and
//! credential store contracts, the process-wide activation registry, and the
//! startup orchestrator that ties them together.
//! Concrete keychain and filesystem adapters live in `openclaw-keychain`.

pub mod activation;
pub mod bootstrap;
pub mod credentials;
pub mod keys;
pub mod probe;

pub use activation::{ActivationRegistry, KeyActivation};
pub use bootstrap::{
    BootstrapError, BootstrapResult, BootstrapState, EncryptionBootstrap, KEYS_MISSING_MESSAGE,
};
pub use credentials::{CredentialError, CredentialStore, InMemoryCredentialStore};
pub use keys::{KeyPair, SecretKey};
pub use probe::{ConfigurationProbe, ProbeError, StaticProbe};
