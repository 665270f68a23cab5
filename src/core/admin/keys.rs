//! Key operations.
//!
//! Add, remove, and look up SSH keys. Changes stay in memory until
//! [`AdminRepository::save`].

use tracing::debug;

use super::AdminRepository;
use crate::core::domain::SshKey;
use crate::core::keyset::KeySet;
use crate::core::keystore::KeyStore;

impl AdminRepository {
    /// Add a key. A key with the same owner, location, and subfolders is
    /// replaced.
    pub fn add_key(&mut self, key: SshKey) {
        debug!(owner = key.owner(), path = %key.relative_path().display(), "adding key");
        self.keys.add(key);
    }

    /// Remove a key. Returns whether it was present.
    pub fn remove_key(&mut self, key: &SshKey) -> bool {
        debug!(owner = key.owner(), path = %key.relative_path().display(), "removing key");
        self.keys.remove(key)
    }

    /// All keys.
    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }

    /// Keys of `owner`, if the owner is known.
    pub fn keys_for(&self, owner: &str) -> Option<&KeySet> {
        self.keys.get(owner)
    }
}
