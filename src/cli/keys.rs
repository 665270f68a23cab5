//! Key commands: list, add, rm.

use std::path::Path;

use tracing::info;

use crate::cli::{open, output, sync};
use crate::core::config::Settings;
use crate::core::constants::DEFAULT_LOCATION;
use crate::core::domain::{KeyAttributes, SshKey};
use crate::core::keypath;
use crate::error::{KeyError, Result};

/// List every key with its path and fingerprint.
pub fn list(repo: &Path, settings: Settings) -> Result<()> {
    let admin = open(repo, settings)?;
    let keys = admin.keys();

    if keys.is_empty() {
        output::dimmed("no keys");
        return Ok(());
    }

    output::header(&format!("{} keys", keys.len()));
    output::rule();
    let mut invalid = 0;
    for key in keys.iter() {
        let fingerprint = key.fingerprint().unwrap_or_else(|_| {
            invalid += 1;
            "invalid blob".to_string()
        });
        output::kv(
            &output::path(&key.relative_path().display().to_string()),
            format!("{} {}", key.key_type(), fingerprint),
        );
    }
    if invalid > 0 {
        output::rule();
        output::warn(&format!("{} key(s) with a blob that is not valid base64", invalid));
    }
    Ok(())
}

/// Add a key read from `file` and commit it.
pub fn add(
    repo: &Path,
    settings: Settings,
    owner: &str,
    file: &Path,
    location: Option<String>,
    subfolders: Vec<String>,
    push: bool,
) -> Result<()> {
    info!(owner, file = %file.display(), "adding key");

    let mut attributes = KeyAttributes::owner(owner).with_subfolders(subfolders);
    attributes.location = location;
    let key = SshKey::from_file(file, attributes)?;
    let relative = key.relative_path();

    let mut admin = open(repo, settings)?;
    admin.add_key(key);

    let message = format!("Add key {}", relative.display());
    sync::commit(&mut admin, &message, push)?;
    output::success(&format!("added {}", output::path(&relative.display().to_string())));
    Ok(())
}

/// Remove the key of `owner` at the given location and subfolders, and
/// commit the removal.
pub fn rm(
    repo: &Path,
    settings: Settings,
    owner: &str,
    location: Option<String>,
    subfolders: Vec<String>,
    push: bool,
) -> Result<()> {
    let location = location.unwrap_or_else(|| DEFAULT_LOCATION.to_string());
    let relative = keypath::relative_path(owner, &location, &subfolders);
    info!(path = %relative.display(), "removing key");

    let mut admin = open(repo, settings)?;
    let key = admin
        .keys_for(owner)
        .and_then(|set| set.iter().find(|k| k.relative_path() == relative))
        .cloned()
        .ok_or_else(|| KeyError::NotFound(admin.keydir().join(&relative)))?;
    admin.remove_key(&key);

    let message = format!("Remove key {}", relative.display());
    sync::commit(&mut admin, &message, push)?;
    output::success(&format!("removed {}", output::path(&relative.display().to_string())));
    Ok(())
}
