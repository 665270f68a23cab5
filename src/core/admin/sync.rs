//! Synchronization operations.
//!
//! Reset, save (stage and commit), push, and update (fetch and merge).

use std::path::Path;

use git2::{Oid, Signature};
use tracing::{debug, info};

use super::AdminRepository;
use crate::core::constants::{CONF_DIR, KEY_DIR};
use crate::core::git::CommitRequest;
use crate::core::keypath;
use crate::error::{RepoError, Result};

impl AdminRepository {
    /// Hard reset the working tree and the local branch to the upstream
    /// tracking branch, then reload.
    ///
    /// Uncommitted changes and unpushed local commits are discarded.
    pub fn reset(&mut self) -> Result<()> {
        let upstream = self.settings.tracking_ref();
        info!(reference = %upstream, "resetting working tree");
        self.git.reset_hard(&upstream)?;
        self.reload()
    }

    /// Write pending key and configuration changes, stage them, and commit
    /// on top of `HEAD`.
    ///
    /// Uses `message` or, when `None`, the configured commit message.
    ///
    /// A failure while writing or staging leaves the index untouched on disk
    /// and creates no commit; the working tree may be partially updated.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::NothingToCommit` if the resulting tree equals
    /// `HEAD`'s tree.
    pub fn save(&mut self, message: Option<&str>) -> Result<Oid> {
        let keydir = self.keydir();
        let diff = self.keys.diff(&keydir)?;
        debug!(
            write = diff.to_write.len(),
            delete = diff.to_delete.len(),
            "saving"
        );

        let tree = {
            let mut staging = self.git.staging()?;

            if let Some(conf) = &self.conf {
                let relative = conf.write_to(&self.conf_dir())?;
                staging.add(&Path::new(CONF_DIR).join(relative))?;
            }

            for relative in &diff.to_delete {
                keypath::remove(&keydir, relative)?;
                staging.remove(&Path::new(KEY_DIR).join(relative))?;
            }

            for key in &diff.to_write {
                let relative = keypath::write(&keydir, key)?;
                staging.add(&Path::new(KEY_DIR).join(relative))?;
            }

            staging.write_tree()?
        };

        let head = self.git.head()?;
        if self.git.tree_of(head)? == tree {
            return Err(RepoError::NothingToCommit.into());
        }

        let signature = self.signature()?;
        let message = message.unwrap_or(&self.settings.commit_message);
        let commit = self.git.commit(&CommitRequest {
            message,
            tree,
            parents: &[head],
            update_ref: Some("HEAD"),
            signature: &signature,
        })?;

        self.keys.mark_clean();
        if let Some(conf) = self.conf.as_mut() {
            conf.mark_clean();
        }

        info!(commit = %commit, "saved admin repository");
        Ok(commit)
    }

    /// Push the local branch to the configured remote and move the
    /// tracking branch to the pushed commit.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::PushRejected` if the remote refuses the update.
    /// Nothing is retried.
    pub fn push(&self) -> Result<()> {
        let local = self.settings.local_ref();
        let refspec = format!("{0}:{0}", local);
        self.git
            .push(&self.settings.remote, &[refspec], &self.settings.credentials)?;

        let head = self.git.branch_target(&local)?;
        self.git
            .set_reference(&self.settings.tracking_ref(), head, "push")
    }

    /// Save with `message` and push.
    pub fn save_and_push(&mut self, message: Option<&str>) -> Result<Oid> {
        let commit = self.save(message)?;
        self.push()?;
        Ok(commit)
    }

    /// Reset to upstream, fetch the remote branch, and merge it with the
    /// local head as it was before the reset.
    ///
    /// When the prior local head already contains the remote head nothing is
    /// merged and the local branch is restored to it. Otherwise a merge
    /// commit with the prior local head and the remote head as parents is
    /// created, even when a fast-forward would be possible. The result is
    /// checked out and reloaded.
    ///
    /// # Errors
    ///
    /// Returns `RepoError::MergeConflict` if the heads cannot be merged
    /// cleanly; the local branch is restored to its prior head.
    pub fn update(&mut self) -> Result<Oid> {
        let local = self.git.branch_target(&self.settings.local_ref())?;

        self.reset()?;
        self.git.fetch(
            &self.settings.remote,
            &self.settings.branch,
            &self.settings.credentials,
        )?;
        let remote = self.git.branch_target(&self.settings.tracking_ref())?;

        if local == remote || self.git.is_descendant(local, remote)? {
            info!(head = %local, "already up to date");
            self.checkout(local)?;
            return Ok(local);
        }

        let merge = match self.merge(local, remote) {
            Ok(merge) => merge,
            Err(e) => {
                self.checkout(local)?;
                return Err(e);
            }
        };
        self.checkout(merge)?;

        info!(commit = %merge, "merged remote changes");
        Ok(merge)
    }

    fn merge(&self, local: Oid, remote: Oid) -> Result<Oid> {
        let tree = self.git.merge_commits(local, remote)?;
        let signature = self.signature()?;
        let message = format!(
            "Merge {}/{} into {}",
            self.settings.remote, self.settings.branch, self.settings.branch
        );
        self.git.commit(&CommitRequest {
            message: &message,
            tree,
            parents: &[local, remote],
            update_ref: None,
            signature: &signature,
        })
    }

    /// Move the local branch and working tree to `commit`, then reload.
    fn checkout(&mut self, commit: Oid) -> Result<()> {
        self.git.reset_hard_to(commit)?;
        self.reload()
    }

    fn signature(&self) -> Result<Signature<'static>> {
        Ok(Signature::now(
            &self.settings.author_name,
            &self.settings.author_email,
        )?)
    }
}
