use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::keys::{KeyPair, SecretKey};

/// Mutation side of key activation: what bootstrap and shutdown drive.
pub trait KeyActivation: Send + Sync {
    fn install(&self, workspace_key: SecretKey, config_key: SecretKey);
    fn clear(&self);
}

/// Holder of the key pair currently enabling transparent decryption.
///
/// Create one per process and hand clones to every read path; all clones
/// observe the same slot. Readers never contend with each other.
#[derive(Debug, Clone, Default)]
pub struct ActivationRegistry {
    active: Arc<RwLock<Option<Arc<KeyPair>>>>,
}

impl ActivationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `(workspace_key, config_key)` the active pair, replacing any previous one.
    pub fn install(&self, workspace_key: SecretKey, config_key: SecretKey) {
        let keys = Arc::new(KeyPair::new(workspace_key, config_key));
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        let replaced = slot.replace(keys).is_some();
        debug!(replaced, "installed active encryption keys");
    }

    /// Drop the active pair, if any. Safe to call repeatedly.
    pub fn clear(&self) {
        let mut slot = self.active.write().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("cleared active encryption keys");
        }
    }

    /// Snapshot of the active pair for read paths deciding whether to decrypt.
    pub fn current_keys(&self) -> Option<Arc<KeyPair>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl KeyActivation for ActivationRegistry {
    fn install(&self, workspace_key: SecretKey, config_key: SecretKey) {
        ActivationRegistry::install(self, workspace_key, config_key);
    }

    fn clear(&self) {
        ActivationRegistry::clear(self);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn starts_empty() {
        let registry = ActivationRegistry::new();
        assert!(!registry.is_active());
        assert!(registry.current_keys().is_none());
    }

    #[test]
    fn install_overwrites_previous_pair() {
        let registry = ActivationRegistry::new();
        registry.install("wk1".into(), "ck1".into());
        registry.install("wk2".into(), "ck2".into());

        let keys = registry.current_keys().expect("active keys");
        assert_eq!(*keys, KeyPair::new("wk2", "ck2"));
    }

    #[test]
    fn installing_same_pair_twice_is_observably_idempotent() {
        let registry = ActivationRegistry::new();
        registry.install("wk".into(), "ck".into());
        let first = registry.current_keys().expect("active keys");
        registry.install("wk".into(), "ck".into());
        let second = registry.current_keys().expect("active keys");

        assert_eq!(first, second);
    }

    #[test]
    fn clear_is_idempotent_and_safe_when_empty() {
        let registry = ActivationRegistry::new();
        registry.clear();
        assert!(!registry.is_active());

        registry.install("wk".into(), "ck".into());
        registry.clear();
        registry.clear();
        assert!(registry.current_keys().is_none());
    }

    #[test]
    fn clones_share_one_slot() {
        let registry = ActivationRegistry::new();
        let reader = registry.clone();

        registry.install("wk".into(), "ck".into());
        assert!(reader.is_active());

        reader.clear();
        assert!(!registry.is_active());
    }

    #[test]
    fn snapshot_survives_clear() {
        let registry = ActivationRegistry::new();
        registry.install("wk".into(), "ck".into());
        let in_flight = registry.current_keys().expect("active keys");

        registry.clear();
        assert_eq!(in_flight.workspace_key().expose(), b"wk");
        assert!(!registry.is_active());
    }

    #[test]
    fn concurrent_readers_only_see_whole_pairs() {
        let registry = ActivationRegistry::new();
        let pairs = [KeyPair::new("wk-a", "ck-a"), KeyPair::new("wk-b", "ck-b")];

        thread::scope(|scope| {
            for _ in 0..4 {
                let reader = registry.clone();
                let pairs = &pairs;
                scope.spawn(move || {
                    for _ in 0..2_000 {
                        if let Some(keys) = reader.current_keys() {
                            assert!(pairs.contains(&*keys), "torn snapshot: {keys:?}");
                        }
                    }
                });
            }

            for writer_id in 0..2 {
                let writer = registry.clone();
                let pairs = &pairs;
                scope.spawn(move || {
                    for round in 0..1_000 {
                        let keys = &pairs[(writer_id + round) % 2];
                        writer.install(keys.workspace_key().clone(), keys.config_key().clone());
                        if round % 7 == 0 {
                            writer.clear();
                        }
                    }
                });
            }
        });

        if let Some(last) = registry.current_keys() {
            assert!(pairs.contains(&*last));
        }
    }

    #[test]
    fn concurrent_installs_leave_one_of_the_written_pairs() {
        let registry = ActivationRegistry::new();
        let pairs = [KeyPair::new("wk-a", "ck-a"), KeyPair::new("wk-b", "ck-b")];

        thread::scope(|scope| {
            for keys in &pairs {
                let writer = registry.clone();
                scope.spawn(move || {
                    writer.install(keys.workspace_key().clone(), keys.config_key().clone());
                });
            }
        });

        let winner = registry.current_keys().expect("one install must win");
        assert!(pairs.contains(&*winner));
    }
}
