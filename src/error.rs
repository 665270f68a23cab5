//! Error types.
//!
//! Each area of the crate has its own error enum; all of them fold into
//! [`Error`] so callers can match on the area first and the cause second.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing, reading, or writing a single SSH key.
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("key file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("invalid key format in {origin}: {reason}")]
    InvalidFormat { origin: String, reason: String },

    #[error("no owner given for key")]
    MissingOwner,

    #[error("key blob is not valid base64: {0}")]
    InvalidBlob(String),

    #[error("failed to read key: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write key: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors raised while loading or reconciling the key directory.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: KeyError,
    },

    #[error("failed to walk key directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Errors raised by the admin repository and its git backend.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("not a git repository: {}", .0.display())]
    NotAGitRepo(PathBuf),

    #[error("{} is not an admin repository: missing {missing}", path.display())]
    InvalidLayout { path: PathBuf, missing: String },

    #[error("push rejected: {0}")]
    PushRejected(String),

    #[error("merge produced {0} conflicting path(s)")]
    MergeConflict(usize),

    #[error("nothing to commit")]
    NothingToCommit,

    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// Errors raised while reading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<git2::Error> for Error {
    fn from(e: git2::Error) -> Self {
        Error::Repo(RepoError::Git(e))
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        Error::Store(StoreError::Walk(e))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
