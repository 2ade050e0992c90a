use std::fmt;

use zeroize::Zeroize;

/// Opaque symmetric secret. Bytes are wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw key bytes. Callers must not log or persist these.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for SecretKey {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl From<Vec<u8>> for SecretKey {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// The two keys that together enable transparent decryption of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    workspace_key: SecretKey,
    config_key: SecretKey,
}

impl KeyPair {
    pub fn new(workspace_key: impl Into<SecretKey>, config_key: impl Into<SecretKey>) -> Self {
        Self {
            workspace_key: workspace_key.into(),
            config_key: config_key.into(),
        }
    }

    pub fn workspace_key(&self) -> &SecretKey {
        &self.workspace_key
    }

    pub fn config_key(&self) -> &SecretKey {
        &self.config_key
    }

    pub fn into_parts(self) -> (SecretKey, SecretKey) {
        (self.workspace_key, self.config_key)
    }
}
