//! Permissions configuration (`conf/gitolite.conf`).
//!
//! The file format is not interpreted here: the configuration is carried as
//! text, written back on save, and staged alongside the keys.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::constants::CONF_FILE;
use crate::error::{KeyError, Result};

/// Loaded permissions configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitoliteConf {
    contents: String,
    modified: bool,
}

impl GitoliteConf {
    /// Configuration holding `contents`, marked as modified.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
            modified: true,
        }
    }

    /// Load the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::NotFound` if the file does not exist, or an I/O
    /// error if it cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading permissions config");
        if !path.exists() {
            return Err(KeyError::NotFound(path.to_path_buf()).into());
        }
        let contents = fs::read_to_string(path)?;
        Ok(Self {
            contents,
            modified: false,
        })
    }

    /// Write the configuration into `conf_dir`.
    ///
    /// Returns the written file's path relative to `conf_dir`.
    pub fn write_to(&self, conf_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(conf_dir)?;
        let relative = PathBuf::from(CONF_FILE);
        fs::write(conf_dir.join(&relative), &self.contents)?;
        debug!(path = %relative.display(), "wrote permissions config");
        Ok(relative)
    }

    /// Raw configuration text.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Replace the configuration text.
    pub fn set_contents(&mut self, contents: impl Into<String>) {
        self.contents = contents.into();
        self.modified = true;
    }

    /// Whether the text changed since it was loaded or last saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_clean(&mut self) {
        self.modified = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONF: &str = "repo gitolite-admin\n    RW+ = admin\n";

    #[test]
    fn test_load_and_write_back() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(CONF_FILE);
        fs::write(&path, CONF).unwrap();

        let conf = GitoliteConf::load(&path).unwrap();
        assert_eq!(conf.contents(), CONF);
        assert!(!conf.is_modified());

        let out = TempDir::new().unwrap();
        let relative = conf.write_to(&out.path().join("conf")).unwrap();
        assert_eq!(relative, PathBuf::from(CONF_FILE));
        assert_eq!(
            fs::read_to_string(out.path().join("conf").join(CONF_FILE)).unwrap(),
            CONF
        );
    }

    #[test]
    fn test_set_contents_marks_modified() {
        let mut conf = GitoliteConf::new(CONF);
        conf.mark_clean();
        conf.set_contents("repo testing\n    RW+ = @all\n");
        assert!(conf.is_modified());
    }

    #[test]
    fn test_load_missing() {
        let tmp = TempDir::new().unwrap();
        assert!(GitoliteConf::load(&tmp.path().join(CONF_FILE)).is_err());
    }
}
