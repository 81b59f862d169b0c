//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::process::Output;

/// Variables the binary reads that a developer or CI shell may have set.
const SCRUBBED: &[&str] = &[
    "YC_IAM_TOKEN",
    "YCFN_LOG",
    "YCFN_CONFIG",
    "YCFN_ENDPOINT",
    "GITHUB_ACTIONS",
    "GITHUB_WORKSPACE",
    "GITHUB_OUTPUT",
    "GITHUB_STEP_SUMMARY",
    "GITHUB_SHA",
    "GITHUB_REPOSITORY",
];

impl Test {
    /// Create a ycfn command with a clean environment.
    ///
    /// Returns a Command configured with:
    /// - every `INPUT_*` and runner variable removed
    /// - runner output files pointing into the test's temp dir
    /// - NO_COLOR set and the current directory set to the workspace
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("ycfn").expect("failed to find ycfn binary");
        for (key, _) in std::env::vars_os() {
            if key.to_string_lossy().starts_with("INPUT_") {
                cmd.env_remove(key);
            }
        }
        for key in SCRUBBED {
            cmd.env_remove(key);
        }
        cmd.env("NO_COLOR", "1");
        cmd.env("GITHUB_OUTPUT", self.output_file());
        cmd.env("GITHUB_STEP_SUMMARY", self.summary_file());
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `ycfn package` writing `out` inside the workspace.
    pub fn package(&self, args: &[&str], out: &str) -> Output {
        self.cmd()
            .arg("package")
            .arg("--workspace")
            .arg(self.dir.path())
            .arg("--output")
            .arg(self.dir.path().join(out))
            .args(args)
            .output()
            .expect("failed to run ycfn package")
    }

    /// `ycfn deploy` with the required inputs set through action variables.
    pub fn deploy_cmd(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("deploy")
            .arg("--workspace")
            .arg(self.dir.path())
            .env("INPUT_FOLDER-ID", "b1gfolder")
            .env("INPUT_FUNCTION-NAME", "hello")
            .env("INPUT_RUNTIME", "nodejs18")
            .env("INPUT_ENTRYPOINT", "index.handler")
            .env("INPUT_INCLUDE", "index.js");
        cmd
    }
}
