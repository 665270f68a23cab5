//! SSH public key record.
//!
//! A key is the parsed `<type> <blob> [<comment>]` line plus the attributes
//! that place it inside the key directory: owner, location, and subfolders.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::core::constants::DEFAULT_LOCATION;
use crate::core::keypath;
use crate::core::types::{Location, Owner, Subfolder};
use crate::error::{KeyError, Result};

/// Attributes placing a key inside the key directory.
///
/// Used both as the overrides given to [`SshKey::parse`] and as the result of
/// decoding a key file path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyAttributes {
    /// Required when constructing a key.
    pub owner: Option<Owner>,
    /// `None` means [`DEFAULT_LOCATION`].
    pub location: Option<Location>,
    /// Organizational directories above the location, root first.
    pub subfolders: Vec<Subfolder>,
}

impl KeyAttributes {
    /// Attributes for `owner` with no location and no subfolders.
    pub fn owner(owner: impl Into<Owner>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<Location>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the subfolder chain.
    pub fn with_subfolders<I, S>(mut self, subfolders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Subfolder>,
    {
        self.subfolders = subfolders.into_iter().map(Into::into).collect();
        self
    }
}

/// One SSH public key entry.
///
/// Equality is structural over every field. Owner, location, and subfolders
/// together determine the key's file path, see [`SshKey::relative_path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SshKey {
    owner: Owner,
    key_type: String,
    blob: String,
    comment: String,
    location: Location,
    subfolders: Vec<Subfolder>,
}

impl SshKey {
    /// Build a key from a key line and its attributes.
    ///
    /// The line must hold at least a type and a blob token; anything after
    /// the blob is the comment, which defaults to the owner.
    ///
    /// Attributes are normalized to the form [`keypath::decode`] reads back
    /// from the key's path: a location equal to the owner becomes a trailing
    /// owner-directory subfolder, and without a location the innermost
    /// subfolder not named after the owner becomes the location.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::MissingOwner` if no (or an empty) owner is given,
    /// `KeyError::InvalidFormat` if the line has fewer than two tokens or an
    /// attribute contains a path separator.
    pub fn parse(line: &str, attributes: KeyAttributes) -> Result<Self> {
        let owner = attributes
            .owner
            .filter(|o| !o.is_empty())
            .ok_or(KeyError::MissingOwner)?;

        let mut location = attributes
            .location
            .unwrap_or_else(|| DEFAULT_LOCATION.to_string());
        let mut subfolders: Vec<Subfolder> = attributes
            .subfolders
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();

        // Shape the attributes the way the key path decodes: a directory
        // named after the owner is an owner directory, any other innermost
        // directory is the location.
        if location == owner {
            subfolders.push(std::mem::take(&mut location));
        } else if location.is_empty() && subfolders.last().is_some_and(|last| *last != owner) {
            location = subfolders.pop().unwrap_or_default();
        }

        for segment in std::iter::once(&owner)
            .chain(std::iter::once(&location))
            .chain(subfolders.iter())
        {
            validate_segment(segment)?;
        }

        let mut tokens = line.split_whitespace();
        let (key_type, blob) = match (tokens.next(), tokens.next()) {
            (Some(key_type), Some(blob)) => (key_type.to_string(), blob.to_string()),
            _ => {
                return Err(KeyError::InvalidFormat {
                    origin: owner,
                    reason: "expected '<type> <blob> [<comment>]'".to_string(),
                }
                .into())
            }
        };
        let rest: Vec<&str> = tokens.collect();
        let comment = if rest.is_empty() {
            owner.clone()
        } else {
            rest.join(" ")
        };

        Ok(Self {
            owner,
            key_type,
            blob,
            comment,
            location,
            subfolders,
        })
    }

    /// Read a standalone `.pub` file and attach the given attributes.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::NotFound` if the file does not exist, plus every
    /// error of [`SshKey::parse`].
    pub fn from_file(path: &Path, attributes: KeyAttributes) -> Result<Self> {
        let line = read_key_line(path)?;
        Self::parse(&line, attributes)
    }

    /// Owner name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Algorithm token, e.g. `ssh-ed25519`.
    pub fn key_type(&self) -> &str {
        &self.key_type
    }

    /// Base64 key material.
    pub fn blob(&self) -> &str {
        &self.blob
    }

    /// Trailing comment.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Location, empty when the key has none.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Whether the key lives under a named location.
    pub fn has_location(&self) -> bool {
        self.location != DEFAULT_LOCATION
    }

    /// Subfolder chain, root first.
    pub fn subfolders(&self) -> &[Subfolder] {
        &self.subfolders
    }

    /// File name of the key (`<owner>.pub`).
    pub fn filename(&self) -> String {
        keypath::filename(&self.owner)
    }

    /// Path of the key file relative to the key directory.
    pub fn relative_path(&self) -> PathBuf {
        keypath::relative_path(&self.owner, &self.location, &self.subfolders)
    }

    /// OpenSSH style SHA256 fingerprint (`SHA256:<base64>`).
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidBlob` if the blob is not valid base64.
    pub fn fingerprint(&self) -> Result<String> {
        let raw = STANDARD
            .decode(&self.blob)
            .map_err(|e| KeyError::InvalidBlob(e.to_string()))?;
        let digest = Sha256::digest(&raw);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
    }

    /// Whether `other` occupies the same file as this key.
    pub fn same_slot(&self, other: &SshKey) -> bool {
        self.relative_path() == other.relative_path()
    }
}

impl fmt::Display for SshKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.key_type, self.blob, self.comment)
    }
}

/// Read the contents of a key file.
pub(crate) fn read_key_line(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(KeyError::NotFound(path.to_path_buf()).into());
    }
    Ok(fs::read_to_string(path).map_err(KeyError::ReadFailed)?)
}

fn validate_segment(segment: &str) -> Result<()> {
    if segment.contains('/') || segment.contains('\\') || segment == "." || segment == ".." {
        return Err(KeyError::InvalidFormat {
            origin: segment.to_string(),
            reason: "path segments may not contain separators or be '.'/'..'".to_string(),
        }
        .into());
    }
    Ok(())
}
