//! Test fixtures and constants.

use keydir_admin::{KeyAttributes, SshKey};

/// Distinct, valid ed25519-shaped key blobs.
pub const BLOBS: [&str; 4] = [
    "AAAAC3NzaC1lZDI1NTE5AAAAIAABAgMEBQYHCAkKCwwNDg8QERITFBUWFxgZGhscHR4f",
    "AAAAC3NzaC1lZDI1NTE5AAAAIAcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8gISIjJCUm",
    "AAAAC3NzaC1lZDI1NTE5AAAAIA4PEBESExQVFhcYGRobHB0eHyAhIiMkJSYnKCkqKywt",
    "AAAAC3NzaC1lZDI1NTE5AAAAIBUWFxgZGhscHR4fICEiIyQlJicoKSorLC0uLzAxMjM0",
];

/// Permissions configuration committed to the seeded remote.
pub const SEED_CONF: &str = "repo gitolite-admin\n    RW+ = admin\n\nrepo testing\n    RW+ = @all\n";

/// Keys committed to the seeded remote, relative to `keydir/`.
pub const SEED_KEYS: [(&str, &str); 3] = [
    ("admin.pub", BLOBS[0]),
    ("bob/bob.pub", BLOBS[1]),
    ("bob/deploy/server1/bob_deploy.pub", BLOBS[2]),
];

/// An ed25519 key line for `blob`.
pub fn key_line(blob: &str) -> String {
    format!("ssh-ed25519 {}", blob)
}

/// Build a key for tests.
pub fn key(attributes: KeyAttributes, blob: &str) -> SshKey {
    SshKey::parse(&key_line(blob), attributes).expect("valid test key")
}
