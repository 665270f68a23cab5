//! keydir-admin - manage a gitolite-style admin repository.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── keys          # List, add, remove keys
//! │   ├── sync          # Save, push, update
//! │   └── output        # Terminal output helpers
//! └── core/             # Core library components
//!     ├── admin/        # AdminRepository: load, mutate, commit, merge, push
//!     ├── config        # Settings and credentials
//!     ├── conf          # conf/gitolite.conf handling
//!     ├── domain/       # SshKey and its attributes
//!     ├── git           # git2 backend
//!     ├── keypath       # key file path <-> owner/location/subfolders
//!     ├── keyset        # per-owner keys with change tracking
//!     └── keystore      # all keys, load and diff against disk
//! ```
//!
//! # Layout
//!
//! ```text
//! <root>/conf/gitolite.conf
//! <root>/keydir/[<subfolder>/...]/[<location>/]<owner>.pub
//! ```

pub mod cli;
pub mod core;
pub mod error;

pub use crate::core::admin::AdminRepository;
pub use crate::core::config::{Credentials, Settings};
pub use crate::core::domain::{KeyAttributes, SshKey};
pub use crate::core::keystore::{KeyDiff, KeyStore};
pub use crate::error::{Error, Result};
