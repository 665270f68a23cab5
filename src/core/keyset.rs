//! Per-owner key collection with change tracking.

use crate::core::domain::SshKey;

/// Ordered keys of a single owner, remembering whether they changed since
/// the last [`KeySet::mark_clean`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<SshKey>,
    modified: bool,
}

impl KeySet {
    /// Empty, unmodified set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a key. A key occupying the same file as an existing one
    /// replaces it in place.
    pub fn push(&mut self, key: SshKey) {
        match self.keys.iter_mut().find(|k| k.same_slot(&key)) {
            Some(existing) => *existing = key,
            None => self.keys.push(key),
        }
        self.modified = true;
    }

    /// Remove a key. Returns `false` (and leaves the set untouched) if the
    /// key was not present.
    pub fn remove(&mut self, key: &SshKey) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k != key);
        let removed = self.keys.len() != before;
        if removed {
            self.modified = true;
        }
        removed
    }

    /// Remove every key.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.modified = true;
    }

    /// Forget pending changes without touching content.
    pub fn mark_clean(&mut self) {
        self.modified = false;
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn contains(&self, key: &SshKey) -> bool {
        self.keys.contains(key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SshKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a SshKey;
    type IntoIter = std::slice::Iter<'a, SshKey>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
