//! Sync commands: save, push, update.

use std::path::Path;

use tracing::info;

use crate::cli::{open, output};
use crate::core::admin::AdminRepository;
use crate::core::config::Settings;
use crate::error::{Error, RepoError, Result};

/// Commit pending changes, optionally pushing.
pub fn save(repo: &Path, settings: Settings, message: Option<&str>, push: bool) -> Result<()> {
    let mut admin = open(repo, settings)?;
    let message = message.unwrap_or(&admin.settings().commit_message).to_string();

    match commit(&mut admin, &message, push) {
        Err(Error::Repo(RepoError::NothingToCommit)) => {
            output::dimmed("nothing to commit");
            Ok(())
        }
        other => other,
    }
}

/// Push the local branch.
pub fn push(repo: &Path, settings: Settings) -> Result<()> {
    let admin = open(repo, settings)?;
    admin.push()?;
    output::success(&format!("pushed {}", admin.settings().branch));
    Ok(())
}

/// Fetch and merge remote changes.
pub fn update(repo: &Path, settings: Settings) -> Result<()> {
    let mut admin = open(repo, settings)?;
    let before = admin.head()?;
    let after = admin.update()?;

    if before == after {
        output::success("already up to date");
    } else {
        output::success(&format!("merged into {}", output::short_id(after)));
    }
    Ok(())
}

/// Save with `message`, then push when asked.
pub(crate) fn commit(admin: &mut AdminRepository, message: &str, push: bool) -> Result<()> {
    let id = admin.save(Some(message))?;
    info!(commit = %id, "committed");
    output::success(&format!("saved {}", output::short_id(id)));

    if push {
        admin.push()?;
        output::success(&format!("pushed {}", admin.settings().branch));
    }
    Ok(())
}
