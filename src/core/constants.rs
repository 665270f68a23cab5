//! Constants used throughout keydir-admin.
//!
//! Centralizes the fixed admin repository layout.

/// Directory holding the permissions configuration (`<root>/conf`).
pub const CONF_DIR: &str = "conf";

/// Permissions configuration file name inside [`CONF_DIR`].
pub const CONF_FILE: &str = "gitolite.conf";

/// Directory holding SSH public keys (`<root>/keydir`).
pub const KEY_DIR: &str = "keydir";

/// Extension of every key file.
pub const KEY_EXTENSION: &str = "pub";

/// Location sentinel meaning "no location subdivision".
pub const DEFAULT_LOCATION: &str = "";
