//! Domain types.

pub mod key;

pub use key::{KeyAttributes, SshKey};
