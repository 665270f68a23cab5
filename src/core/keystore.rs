//! Key directory model.
//!
//! Loads every key file under the key directory into per-owner
//! [`KeySet`]s and computes the writes and deletions needed to bring the
//! directory back in line with memory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::core::constants::KEY_EXTENSION;
use crate::core::domain::SshKey;
use crate::core::keypath;
use crate::core::keyset::KeySet;
use crate::core::types::Owner;
use crate::error::{Error, Result, StoreError};

/// Changes needed to reconcile the key directory with memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyDiff {
    /// Keys of modified owners, to be (re)written at their canonical path.
    pub to_write: Vec<SshKey>,
    /// Key files on disk that no longer exist in memory, relative to the
    /// key directory.
    pub to_delete: Vec<PathBuf>,
}

impl KeyDiff {
    pub fn is_empty(&self) -> bool {
        self.to_write.is_empty() && self.to_delete.is_empty()
    }
}

/// All keys of an admin repository, grouped by owner.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    sets: BTreeMap<Owner, KeySet>,
}

impl KeyStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `.pub` file below `root`.
    ///
    /// Every resulting set is clean. A missing `root` yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Load` naming the first file that fails to decode.
    pub fn load_all(root: &Path) -> Result<Self> {
        debug!(path = %root.display(), "loading keys");

        let mut store = Self::new();
        for relative in list_key_files(root)? {
            let key = keypath::decode(root, &relative).map_err(|e| match e {
                Error::Key(source) => Error::Store(StoreError::Load {
                    path: root.join(&relative),
                    source,
                }),
                other => other,
            })?;
            store.add(key);
        }
        store.mark_clean();

        debug!(owners = store.sets.len(), keys = store.len(), "keys loaded");
        Ok(store)
    }

    /// Compare memory with the key files under `root`.
    ///
    /// Only owners whose set was modified since the last load contribute
    /// to `to_write`; deletions consider every owner.
    pub fn diff(&self, root: &Path) -> Result<KeyDiff> {
        let expected: BTreeSet<PathBuf> = self.iter().map(SshKey::relative_path).collect();

        let to_delete = list_key_files(root)?
            .into_iter()
            .filter(|path| !expected.contains(path))
            .collect();

        let to_write = self
            .sets
            .values()
            .filter(|set| set.is_modified())
            .flat_map(|set| set.iter().cloned())
            .collect();

        let diff = KeyDiff {
            to_write,
            to_delete,
        };
        debug!(
            write = diff.to_write.len(),
            delete = diff.to_delete.len(),
            "computed key diff"
        );
        Ok(diff)
    }

    /// Add a key to its owner's set, creating the set if needed.
    pub fn add(&mut self, key: SshKey) {
        self.get_or_create(key.owner()).push(key);
    }

    /// Remove a key from its owner's set. Returns whether it was present.
    pub fn remove(&mut self, key: &SshKey) -> bool {
        self.sets
            .get_mut(key.owner())
            .is_some_and(|set| set.remove(key))
    }

    /// Set of `owner`, if the owner is known.
    pub fn get(&self, owner: &str) -> Option<&KeySet> {
        self.sets.get(owner)
    }

    /// Set of `owner`, created empty and clean if the owner is unknown.
    pub fn get_or_create(&mut self, owner: &str) -> &mut KeySet {
        self.sets.entry(owner.to_string()).or_default()
    }

    /// Whether the store holds exactly this key.
    pub fn contains(&self, key: &SshKey) -> bool {
        self.get(key.owner()).is_some_and(|set| set.contains(key))
    }

    /// Known owners, sorted.
    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Every key, grouped by owner.
    pub fn iter(&self) -> impl Iterator<Item = &SshKey> {
        self.sets.values().flat_map(KeySet::iter)
    }

    /// Total number of keys.
    pub fn len(&self) -> usize {
        self.sets.values().map(KeySet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether any owner's set has pending changes.
    pub fn is_modified(&self) -> bool {
        self.sets.values().any(KeySet::is_modified)
    }

    /// Mark every set clean.
    pub fn mark_clean(&mut self) {
        self.sets.values_mut().for_each(KeySet::mark_clean);
    }
}

/// Relative paths of every key file below `root`, sorted.
fn list_key_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(KEY_EXTENSION) {
            continue;
        }
        if let Ok(relative) = path.strip_prefix(root) {
            files.push(relative.to_path_buf());
        }
    }
    Ok(files)
}
