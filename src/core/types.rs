//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// The principal a key belongs to (e.g. `alice`, `bob@example.com`).
///
/// Forms the base name of the key file.
pub type Owner = String;

/// A named subdivision for owners with several keys (e.g. `desktop`).
///
/// Empty means no subdivision.
pub type Location = String;

/// A single organizational directory segment above the location level.
pub type Subfolder = String;
