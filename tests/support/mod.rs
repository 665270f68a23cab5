//! Test support utilities for keydir-admin integration tests.
//!
//! Every test gets its own temporary directory holding a bare "remote"
//! admin repository and any number of working-tree clones of it.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::fs;
use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{Oid, Repository, Signature};
use keydir_admin::{AdminRepository, Settings};
use tempfile::TempDir;

/// Isolated test environment with a seeded bare remote.
pub struct Test {
    /// Holds the remote, the seed, and every clone
    pub dir: TempDir,
}

impl Test {
    /// Create a bare remote whose `master` holds [`SEED_CONF`] and the
    /// keys in [`SEED_KEYS`].
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let seed = dir.path().join("seed");

        let repo = Repository::init(&seed).expect("failed to init seed repo");
        fs::create_dir_all(seed.join("conf")).unwrap();
        fs::write(seed.join("conf/gitolite.conf"), SEED_CONF).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("conf/gitolite.conf")).unwrap();
        for (relative, blob) in SEED_KEYS {
            let path = seed.join("keydir").join(relative);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("ssh-ed25519 {}\n", blob)).unwrap();
            index
                .add_path(&Path::new("keydir").join(relative))
                .unwrap();
        }
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let sig = Signature::now("seed", "seed@localhost").unwrap();
        repo.commit(Some("refs/heads/master"), &sig, &sig, "Initial", &tree, &[])
            .unwrap();
        repo.set_head("refs/heads/master").unwrap();

        RepoBuilder::new()
            .bare(true)
            .clone(seed.to_str().unwrap(), &dir.path().join("remote.git"))
            .expect("failed to create bare remote");

        Self { dir }
    }

    /// Path of the bare remote.
    pub fn remote_path(&self) -> PathBuf {
        self.dir.path().join("remote.git")
    }

    /// Settings pointing at the bare remote.
    pub fn settings(&self) -> Settings {
        Settings {
            remote_url: Some(self.remote_path().to_str().unwrap().to_string()),
            author_name: "tester".to_string(),
            author_email: "tester@localhost".to_string(),
            ..Settings::default()
        }
    }

    /// Working tree path for a clone named `name`.
    pub fn workdir(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Open (cloning on first use) the working tree named `name`.
    pub fn admin(&self, name: &str) -> AdminRepository {
        AdminRepository::open(self.workdir(name), self.settings())
            .expect("failed to open admin repository")
    }

    /// Commit `master` points at in the bare remote.
    pub fn remote_head(&self) -> Oid {
        let repo = Repository::open_bare(self.remote_path()).unwrap();
        let head = repo.find_reference("refs/heads/master").unwrap();
        head.target().unwrap()
    }
}

/// Open the git repository behind an admin working tree.
pub fn git_repo(admin: &AdminRepository) -> Repository {
    Repository::open(admin.path()).unwrap()
}

/// Whether the `HEAD` tree of `admin` contains `path`.
pub fn head_tree_has(admin: &AdminRepository, path: &str) -> bool {
    let repo = git_repo(admin);
    let tree = repo.head().unwrap().peel_to_tree().unwrap();
    tree.get_path(Path::new(path)).is_ok()
}
