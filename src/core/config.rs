//! Settings for an admin repository.
//!
//! Settings are an explicit value handed to [`AdminRepository::open`];
//! every field has a documented default and can be overridden from a TOML
//! file with [`Settings::load`].
//!
//! [`AdminRepository::open`]: crate::core::admin::AdminRepository::open

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Connection, identity, and branch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SSH user on the git host (default `git`).
    pub user: String,
    /// Git host name (default `localhost`).
    pub host: String,
    /// Name of the admin repository on the host (default `gitolite-admin`).
    pub repo_name: String,
    /// Explicit clone URL. When unset, `{user}@{host}:{repo_name}.git` is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// Remote name (default `origin`).
    pub remote: String,
    /// Branch that is committed to, merged into, and pushed (default `master`).
    pub branch: String,
    /// Author and committer name.
    pub author_name: String,
    /// Author and committer e-mail.
    pub author_email: String,
    /// Message used by `save` when none is given.
    pub commit_message: String,
    /// Credentials handed to the git transport.
    pub credentials: Credentials,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user: "git".to_string(),
            host: "localhost".to_string(),
            repo_name: "gitolite-admin".to_string(),
            remote_url: None,
            remote: "origin".to_string(),
            branch: "master".to_string(),
            author_name: "keydir-admin".to_string(),
            author_email: "keydir-admin@localhost".to_string(),
            commit_message: "Update gitolite configuration".to_string(),
            credentials: Credentials::default(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` if the file cannot be read, or
    /// `ConfigError::Parse` if the TOML is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading settings");

        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        let settings: Self = toml::from_str(&contents).map_err(ConfigError::Parse)?;

        Ok(settings)
    }

    /// URL the admin repository is cloned from.
    pub fn url(&self) -> String {
        match &self.remote_url {
            Some(url) => url.clone(),
            None => format!("{}@{}:{}.git", self.user, self.host, self.repo_name),
        }
    }

    /// Fully qualified local branch reference (`refs/heads/<branch>`).
    pub fn local_ref(&self) -> String {
        format!("refs/heads/{}", self.branch)
    }

    /// Fully qualified remote-tracking reference (`refs/remotes/<remote>/<branch>`).
    pub fn tracking_ref(&self) -> String {
        format!("refs/remotes/{}/{}", self.remote, self.branch)
    }
}

/// SSH credentials for the git transport.
///
/// Passed through unexamined to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// User name presented to the SSH server.
    pub username: String,
    /// Public key path.
    pub public_key: PathBuf,
    /// Private key path.
    pub private_key: PathBuf,
    /// Optional passphrase for the private key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

impl Default for Credentials {
    fn default() -> Self {
        let ssh_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ssh");
        Self {
            username: "git".to_string(),
            public_key: ssh_dir.join("id_rsa.pub"),
            private_key: ssh_dir.join("id_rsa"),
            passphrase: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_url() {
        let settings = Settings::default();
        assert_eq!(settings.url(), "git@localhost:gitolite-admin.git");
    }

    #[test]
    fn test_explicit_url_wins() {
        let settings = Settings {
            remote_url: Some("/srv/git/admin.git".to_string()),
            ..Settings::default()
        };
        assert_eq!(settings.url(), "/srv/git/admin.git");
    }

    #[test]
    fn test_refs() {
        let settings = Settings::default();
        assert_eq!(settings.local_ref(), "refs/heads/master");
        assert_eq!(settings.tracking_ref(), "refs/remotes/origin/master");
    }

    #[test]
    fn test_load_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(
            &path,
            "host = \"git.example.com\"\nbranch = \"main\"\n\n[credentials]\nusername = \"admin\"\n",
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.host, "git.example.com");
        assert_eq!(settings.branch, "main");
        assert_eq!(settings.user, "git");
        assert_eq!(settings.credentials.username, "admin");
        assert_eq!(settings.url(), "git@git.example.com:gitolite-admin.git");
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        std::fs::write(&path, "host = [").unwrap();

        let err = Settings::load(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load("/nonexistent/settings.toml").unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::Config(ConfigError::ReadFile(_))
        ));
    }
}
