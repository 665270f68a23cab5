//! Key file path codec.
//!
//! Maps a key file inside the key directory to its owner, location, and
//! subfolders, and back. Accepted layouts, relative to the key directory:
//!
//! ```text
//! alice.pub                         owner alice
//! bob/bob.pub                       owner bob, subfolders [bob]        (legacy)
//! bob/bob@example.com.pub           owner bob@example.com, location bob
//! ops/eu/desktop/carol.pub          owner carol, location desktop, subfolders [ops, eu]
//! ```
//!
//! A parent directory named after the owner is never a location: it is an
//! organizational directory and the key has the default location.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::core::constants::{DEFAULT_LOCATION, KEY_EXTENSION};
use crate::core::domain::key::read_key_line;
use crate::core::domain::{KeyAttributes, SshKey};
use crate::error::{KeyError, Result};

/// File name for an owner's key (`<owner>.pub`).
pub fn filename(owner: &str) -> String {
    format!("{}.{}", owner, KEY_EXTENSION)
}

/// Canonical path of a key relative to the key directory.
///
/// Joins `subfolders`, `location`, and `<owner>.pub`, skipping empty
/// segments.
pub fn relative_path(owner: &str, location: &str, subfolders: &[String]) -> PathBuf {
    let mut path = PathBuf::new();
    for segment in subfolders.iter().map(String::as_str).chain([location]) {
        if !segment.is_empty() && segment != DEFAULT_LOCATION {
            path.push(segment);
        }
    }
    path.push(filename(owner));
    path
}

/// Decode the owner, location, and subfolders of a key file from its path.
///
/// Purely structural: the file is not read. `path` may be absolute or
/// relative to `root`.
///
/// # Errors
///
/// Returns `KeyError::InvalidFormat` if the path lies outside `root` or is
/// not a `.pub` file.
pub fn decode_attributes(root: &Path, path: &Path) -> Result<KeyAttributes> {
    let relative = if path.is_absolute() || path.starts_with(root) {
        path.strip_prefix(root).map_err(|_| KeyError::InvalidFormat {
            origin: path.display().to_string(),
            reason: format!("not inside {}", root.display()),
        })?
    } else {
        path
    };

    let invalid = |reason: &str| KeyError::InvalidFormat {
        origin: path.display().to_string(),
        reason: reason.to_string(),
    };

    let file_name = relative
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| invalid("missing file name"))?;
    let owner = file_name
        .strip_suffix(&format!(".{}", KEY_EXTENSION))
        .filter(|o| !o.is_empty())
        .ok_or_else(|| invalid("not a .pub key file"))?;

    let mut dirs = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            match component {
                Component::Normal(segment) => dirs.push(
                    segment
                        .to_str()
                        .ok_or_else(|| invalid("non UTF-8 path segment"))?
                        .to_string(),
                ),
                Component::CurDir => {}
                _ => return Err(invalid("unexpected path component").into()),
            }
        }
    }

    let attributes = KeyAttributes::owner(owner);
    let legacy = dirs.last().is_some_and(|parent| parent == owner);

    // Flat: <owner>.pub
    if dirs.is_empty() {
        return Ok(attributes);
    }
    // Legacy: [<subfolder>/...]/<owner>/<owner>.pub
    if legacy {
        return Ok(attributes.with_subfolders(dirs));
    }
    // [<subfolder>/...]/<location>/<owner>.pub
    let location = dirs.pop().unwrap_or_default();
    Ok(attributes.with_location(location).with_subfolders(dirs))
}

/// Read and decode the key file at `path` inside `root`.
///
/// # Errors
///
/// Returns `KeyError::NotFound` if the file does not exist, or
/// `KeyError::InvalidFormat` if its path or contents are malformed.
pub fn decode(root: &Path, path: &Path) -> Result<SshKey> {
    let attributes = decode_attributes(root, path)?;
    let full = if path.is_absolute() || path.starts_with(root) {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let line = read_key_line(&full)?;
    SshKey::parse(&line, attributes).map_err(|e| match e {
        crate::error::Error::Key(KeyError::InvalidFormat { reason, .. }) => {
            KeyError::InvalidFormat {
                origin: full.display().to_string(),
                reason,
            }
            .into()
        }
        other => other,
    })
}

/// Write a key to its canonical path under `root`, creating directories.
///
/// Returns the path relative to `root`.
///
/// # Errors
///
/// Returns `KeyError::WriteFailed` if a directory or the file cannot be written.
pub fn write(root: &Path, key: &SshKey) -> Result<PathBuf> {
    let relative = key.relative_path();
    let full = root.join(&relative);
    if let Some(parent) = full.parent() {
        fs::create_dir_all(parent).map_err(KeyError::WriteFailed)?;
    }
    fs::write(&full, format!("{}\n", key)).map_err(KeyError::WriteFailed)?;
    debug!(path = %relative.display(), "wrote key");
    Ok(relative)
}

/// Delete the key file at `relative` under `root`, then prune the location
/// and subfolder directories that became empty.
///
/// Pruning stops at the first directory that is not empty or cannot be
/// removed for lack of permission; those cases are logged, not returned.
///
/// # Errors
///
/// Returns `KeyError::NotFound` if the key file does not exist, or an I/O
/// error for any other failure.
pub fn remove(root: &Path, relative: &Path) -> Result<()> {
    let attributes = decode_attributes(root, relative)?;
    let full = root.join(relative);

    match fs::remove_file(&full) {
        Ok(()) => debug!(path = %relative.display(), "removed key"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(KeyError::NotFound(full).into())
        }
        Err(e) => return Err(KeyError::WriteFailed(e).into()),
    }

    let depth = attributes.subfolders.len()
        + usize::from(attributes.location.as_deref().is_some_and(|l| !l.is_empty()));
    let mut dir = full.parent().map(Path::to_path_buf);

    for _ in 0..depth {
        let Some(current) = dir else { break };
        if current == root {
            break;
        }
        match fs::remove_dir(&current) {
            Ok(()) => debug!(path = %current.display(), "removed empty directory"),
            Err(e) if e.kind() == io::ErrorKind::DirectoryNotEmpty => {
                debug!(path = %current.display(), "directory not empty, keeping");
                break;
            }
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                warn!(path = %current.display(), error = %e, "could not remove directory");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        dir = current.parent().map(Path::to_path_buf);
    }

    Ok(())
}
