//! Assertions on command output.

use std::process::Output;

/// Panic with stderr unless the command succeeded.
pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Panic if the command succeeded.
pub fn assert_failure(output: &Output) {
    assert!(!output.status.success(), "expected command to fail");
}

pub fn assert_stdout_contains(output: &Output, expected: &str) {
    let out = String::from_utf8_lossy(&output.stdout);
    assert!(out.contains(expected), "stdout missing '{expected}':\n{out}");
}

pub fn assert_stderr_contains(output: &Output, expected: &str) {
    let err = String::from_utf8_lossy(&output.stderr);
    assert!(err.contains(expected), "stderr missing '{expected}':\n{err}");
}
