//! Git backend.
//!
//! Thin wrapper over a `git2` working tree exposing the primitives the
//! admin repository sequences: clone, hard reset, staging, tree and commit
//! creation, fetch, push, and in-memory merges.

use std::path::{Path, PathBuf};

use git2::build::RepoBuilder;
use git2::{
    Cred, ErrorCode, FetchOptions, Index, Oid, PushOptions, RemoteCallbacks, Repository,
    ResetType, Signature,
};
use tracing::{debug, info};

use crate::core::config::Credentials;
use crate::core::constants::{CONF_DIR, CONF_FILE, KEY_DIR};
use crate::error::{RepoError, Result};

/// Returns the first required admin path missing under `root`, if any.
pub fn missing_layout(root: &Path) -> Option<String> {
    let conf_dir = root.join(CONF_DIR);
    let required = [
        (conf_dir.clone(), CONF_DIR.to_string()),
        (root.join(KEY_DIR), KEY_DIR.to_string()),
        (conf_dir.join(CONF_FILE), format!("{}/{}", CONF_DIR, CONF_FILE)),
    ];
    required
        .into_iter()
        .find(|(path, _)| !path.exists())
        .map(|(_, name)| name)
}

/// Inputs for [`Git::commit`].
pub struct CommitRequest<'a> {
    pub message: &'a str,
    pub tree: Oid,
    pub parents: &'a [Oid],
    /// Reference moved to the new commit, e.g. `HEAD`. `None` leaves every
    /// reference in place.
    pub update_ref: Option<&'a str>,
    pub signature: &'a Signature<'a>,
}

/// An open, non-bare git working tree.
pub struct Git {
    repo: Repository,
    workdir: PathBuf,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl Git {
    /// Open the working tree at `path`.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NotAGitRepo` if `path` is not a non-bare repository.
    pub fn open(path: &Path) -> Result<Self> {
        let repo =
            Repository::open(path).map_err(|_| RepoError::NotAGitRepo(path.to_path_buf()))?;
        Self::from_repo(repo, path)
    }

    /// Clone `url` into `dest`.
    pub fn clone(url: &str, dest: &Path, credentials: &Credentials) -> Result<Self> {
        info!(url, path = %dest.display(), "cloning admin repository");

        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(remote_callbacks(credentials));

        let repo = RepoBuilder::new().fetch_options(fetch).clone(url, dest)?;
        Self::from_repo(repo, dest)
    }

    fn from_repo(repo: Repository, path: &Path) -> Result<Self> {
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| RepoError::NotAGitRepo(path.to_path_buf()))?;
        Ok(Self { repo, workdir })
    }

    /// Root of the working tree.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Whether the working tree holds the admin layout.
    pub fn is_valid_layout(&self) -> bool {
        missing_layout(&self.workdir).is_none()
    }

    /// Hard reset index and working tree to `reference`.
    pub fn reset_hard(&self, reference: &str) -> Result<()> {
        debug!(reference, "hard reset");
        let target = self.repo.revparse_single(reference)?;
        self.repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }

    /// Hard reset index, working tree, and the current branch to `id`.
    pub fn reset_hard_to(&self, id: Oid) -> Result<()> {
        debug!(commit = %id, "hard reset");
        let target = self.repo.find_object(id, None)?;
        self.repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }

    /// Point the reference `name` at `id`, creating it if needed.
    pub fn set_reference(&self, name: &str, id: Oid, log_message: &str) -> Result<()> {
        debug!(reference = name, commit = %id, "updating reference");
        self.repo.reference(name, id, true, log_message)?;
        Ok(())
    }

    /// Start staging changes on the index.
    pub fn staging(&self) -> Result<Staging<'_>> {
        Ok(Staging {
            index: self.repo.index()?,
            repo: &self.repo,
            finished: false,
        })
    }

    /// Create a commit, moving `update_ref` to it when given.
    pub fn commit(&self, request: &CommitRequest<'_>) -> Result<Oid> {
        let tree = self.repo.find_tree(request.tree)?;
        let parents = request
            .parents
            .iter()
            .map(|id| self.repo.find_commit(*id))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        let id = self.repo.commit(
            request.update_ref,
            request.signature,
            request.signature,
            request.message,
            &tree,
            &parent_refs,
        )?;
        info!(commit = %id, parents = parent_refs.len(), "created commit");
        Ok(id)
    }

    /// Commit id `HEAD` points at.
    pub fn head(&self) -> Result<Oid> {
        let head = self.repo.head()?;
        head.target()
            .ok_or_else(|| RepoError::BranchNotFound("HEAD".to_string()).into())
    }

    /// Tree id of the commit `commit`.
    pub fn tree_of(&self, commit: Oid) -> Result<Oid> {
        Ok(self.repo.find_commit(commit)?.tree_id())
    }

    /// Parents of the commit `commit`.
    pub fn parents_of(&self, commit: Oid) -> Result<Vec<Oid>> {
        Ok(self.repo.find_commit(commit)?.parent_ids().collect())
    }

    /// Commit id a fully qualified reference points at.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::BranchNotFound` if the reference does not exist.
    pub fn branch_target(&self, name: &str) -> Result<Oid> {
        let reference = self.repo.find_reference(name).map_err(|e| match e.code() {
            ErrorCode::NotFound => RepoError::BranchNotFound(name.to_string()),
            _ => RepoError::Git(e),
        })?;
        reference
            .resolve()?
            .target()
            .ok_or_else(|| RepoError::BranchNotFound(name.to_string()).into())
    }

    /// Whether `descendant` has `ancestor` in its history.
    pub fn is_descendant(&self, descendant: Oid, ancestor: Oid) -> Result<bool> {
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    /// Fetch `branch` from `remote` into its remote-tracking reference.
    pub fn fetch(&self, remote: &str, branch: &str, credentials: &Credentials) -> Result<()> {
        info!(remote, branch, "fetching");
        let mut remote_handle = self.repo.find_remote(remote)?;

        let mut options = FetchOptions::new();
        options.remote_callbacks(remote_callbacks(credentials));

        let refspec = format!("+refs/heads/{0}:refs/remotes/{1}/{0}", branch, remote);
        remote_handle.fetch(&[refspec.as_str()], Some(&mut options), None)?;
        Ok(())
    }

    /// Push `refspecs` to `remote`.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::PushRejected` when the remote refuses an update
    /// (non fast-forward, hook rejection) or authentication fails.
    pub fn push(&self, remote: &str, refspecs: &[String], credentials: &Credentials) -> Result<()> {
        info!(remote, ?refspecs, "pushing");
        let mut remote_handle = self.repo.find_remote(remote)?;
        let mut rejected: Option<String> = None;

        {
            let mut callbacks = remote_callbacks(credentials);
            callbacks.push_update_reference(|reference, status| {
                if let Some(message) = status {
                    rejected = Some(format!("{}: {}", reference, message));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            let specs: Vec<&str> = refspecs.iter().map(String::as_str).collect();
            remote_handle
                .push(&specs, Some(&mut options))
                .map_err(|e| match e.code() {
                    ErrorCode::NotFastForward | ErrorCode::Auth => {
                        RepoError::PushRejected(e.message().to_string())
                    }
                    _ => RepoError::Git(e),
                })?;
        }

        match rejected {
            Some(message) => Err(RepoError::PushRejected(message).into()),
            None => Ok(()),
        }
    }

    /// Merge two commits in memory and write the merged tree.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::MergeConflict` if the trees cannot be merged cleanly.
    pub fn merge_commits(&self, ours: Oid, theirs: Oid) -> Result<Oid> {
        let ours = self.repo.find_commit(ours)?;
        let theirs = self.repo.find_commit(theirs)?;

        let mut index = self.repo.merge_commits(&ours, &theirs, None)?;
        if index.has_conflicts() {
            let conflicts = index.conflicts()?.count();
            return Err(RepoError::MergeConflict(conflicts).into());
        }
        Ok(index.write_tree_to(&self.repo)?)
    }
}

/// Pending changes to the index.
///
/// Changes only reach disk through [`Staging::write_tree`]; dropping an
/// unfinished staging discards them.
pub struct Staging<'r> {
    index: Index,
    repo: &'r Repository,
    finished: bool,
}

impl Staging<'_> {
    /// Stage the working tree file at `path` (relative to the workdir).
    pub fn add(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "staging");
        self.index.add_path(path)?;
        Ok(())
    }

    /// Unstage `path` (relative to the workdir).
    pub fn remove(&mut self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), "unstaging");
        self.index.remove_path(path)?;
        Ok(())
    }

    /// Persist the index and write it as a tree.
    pub fn write_tree(mut self) -> Result<Oid> {
        self.index.write()?;
        let tree = self.index.write_tree_to(self.repo)?;
        self.finished = true;
        Ok(tree)
    }
}

impl Drop for Staging<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!("discarding staged changes");
            if let Err(e) = self.index.read(true) {
                debug!(error = %e, "failed to reload index");
            }
        }
    }
}

fn remote_callbacks(credentials: &Credentials) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        Cred::ssh_key(
            &credentials.username,
            Some(credentials.public_key.as_path()),
            &credentials.private_key,
            credentials.passphrase.as_deref(),
        )
    });
    callbacks
}
