//! Concrete adapters for the bootstrap contracts.
//! Keys come from the OS keychain; configuration is read from workspace metadata.

pub mod keyring_store;
pub mod metadata_probe;

pub use keyring_store::KeyringCredentialStore;
pub use metadata_probe::WorkspaceMetadataProbe;
