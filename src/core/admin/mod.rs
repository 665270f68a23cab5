//! The primary interface for admin repository operations.
//!
//! `AdminRepository` owns the git working tree, the permissions
//! configuration, and the key store, and keeps the three in step.

mod keys;
mod sync;

use std::path::{Path, PathBuf};

use git2::Oid;
use tracing::{debug, info};

use crate::core::conf::GitoliteConf;
use crate::core::config::Settings;
use crate::core::constants::{CONF_DIR, CONF_FILE, KEY_DIR};
use crate::core::git::{self, Git};
use crate::core::keystore::KeyStore;
use crate::error::{RepoError, Result};

/// A gitolite-style admin repository checked out on disk.
#[derive(Debug)]
pub struct AdminRepository {
    pub(super) git: Git,
    pub(super) settings: Settings,
    pub(super) conf: Option<GitoliteConf>,
    pub(super) keys: KeyStore,
}

impl AdminRepository {
    /// Open the admin repository at `path`, cloning it first when `path`
    /// does not exist or is an empty directory.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotAGitRepo` if `path` holds something other
    /// than a git working tree, `RepoError::InvalidLayout` if the working
    /// tree lacks `conf/`, `keydir/` or `conf/gitolite.conf`, and any
    /// clone or load error.
    pub fn open(path: impl AsRef<Path>, settings: Settings) -> Result<Self> {
        let path = path.as_ref();

        let git = if needs_clone(path)? {
            Git::clone(&settings.url(), path, &settings.credentials)?
        } else {
            debug!(path = %path.display(), "opening admin repository");
            Git::open(path)?
        };

        if let Some(missing) = git::missing_layout(git.workdir()) {
            return Err(RepoError::InvalidLayout {
                path: git.workdir().to_path_buf(),
                missing,
            }
            .into());
        }

        let mut admin = Self {
            git,
            settings,
            conf: None,
            keys: KeyStore::new(),
        };
        admin.reload()?;
        Ok(admin)
    }

    /// Whether `path` holds an admin working tree, without opening it.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        Git::open(path.as_ref()).is_ok_and(|git| git.is_valid_layout())
    }

    /// Discard in-memory state and load keys and configuration from disk.
    pub fn reload(&mut self) -> Result<()> {
        let conf_path = self.conf_dir().join(CONF_FILE);
        self.conf = if conf_path.exists() {
            Some(GitoliteConf::load(&conf_path)?)
        } else {
            None
        };
        self.keys = KeyStore::load_all(&self.keydir())?;

        info!(
            keys = self.keys.len(),
            owners = self.keys.owners().count(),
            "admin repository loaded"
        );
        Ok(())
    }

    /// Root of the working tree.
    pub fn path(&self) -> &Path {
        self.git.workdir()
    }

    /// Key directory (`<root>/keydir`).
    pub fn keydir(&self) -> PathBuf {
        self.path().join(KEY_DIR)
    }

    /// Configuration directory (`<root>/conf`).
    pub fn conf_dir(&self) -> PathBuf {
        self.path().join(CONF_DIR)
    }

    /// Loaded permissions configuration, if the file exists.
    pub fn conf(&self) -> Option<&GitoliteConf> {
        self.conf.as_ref()
    }

    /// Mutable permissions configuration.
    pub fn conf_mut(&mut self) -> Option<&mut GitoliteConf> {
        self.conf.as_mut()
    }

    /// Settings the repository was opened with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Commit `HEAD` points at.
    pub fn head(&self) -> Result<Oid> {
        self.git.head()
    }

    /// Underlying git backend.
    pub fn git(&self) -> &Git {
        &self.git
    }
}

/// A missing path or an empty directory is cloned into; anything else is
/// opened as is.
fn needs_clone(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    if path.is_dir() {
        return Ok(std::fs::read_dir(path)?.next().is_none());
    }
    Ok(false)
}
