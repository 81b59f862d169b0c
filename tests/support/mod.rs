//! Test support utilities for ycfn integration tests.
//!
//! Provides an isolated workspace with helpers to lay out source trees and
//! run the binary against them.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use tempfile::TempDir;

/// Test environment with an isolated temp workspace.
///
/// Child processes get the workspace through `--workspace` and a scrubbed
/// environment, so tests can run in parallel.
pub struct Test {
    /// Workspace the sources live in
    pub dir: TempDir,
    /// Runner files (`GITHUB_OUTPUT`, `GITHUB_STEP_SUMMARY`)
    pub runner: TempDir,
}

impl Test {
    /// Create a new empty workspace.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let runner = TempDir::new().expect("failed to create runner dir");
        Self { dir, runner }
    }

    /// Create a workspace holding `files`.
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let t = Self::new();
        for (path, contents) in files {
            t.write(path, contents);
        }
        t
    }

    /// Write a file below the workspace, creating parent directories.
    pub fn write(&self, path: &str, contents: &str) {
        let full = self.dir.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(full, contents).expect("failed to write file");
    }

    pub fn output_file(&self) -> std::path::PathBuf {
        self.runner.path().join("output")
    }

    pub fn summary_file(&self) -> std::path::PathBuf {
        self.runner.path().join("summary")
    }

    /// Contents of the step output file, empty when nothing was written.
    pub fn outputs(&self) -> String {
        std::fs::read_to_string(self.output_file()).unwrap_or_default()
    }

    /// Contents of the job summary, empty when nothing was written.
    pub fn summary(&self) -> String {
        std::fs::read_to_string(self.summary_file()).unwrap_or_default()
    }
}
