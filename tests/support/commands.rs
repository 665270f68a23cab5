//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

impl Test {
    /// Create a keydir-admin command bound to the working tree `name`.
    ///
    /// The remote URL and identity come from a settings file written next
    /// to the working trees.
    pub fn cmd(&self, name: &str) -> Command {
        let settings_path = self.dir.path().join("settings.toml");
        let settings = toml::to_string(&self.settings()).expect("serialize settings");
        std::fs::write(&settings_path, settings).expect("write settings");

        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("keydir-admin").expect("failed to find binary");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("KEYDIR_ADMIN_LOG");
        cmd.arg("--settings").arg(&settings_path);
        cmd.arg("-C").arg(self.workdir(name));
        cmd
    }

    /// Shortcut for `keydir-admin keys`.
    pub fn keys_cmd(&self, name: &str) -> Output {
        self.cmd(name)
            .arg("keys")
            .output()
            .expect("failed to run keydir-admin keys")
    }
}
