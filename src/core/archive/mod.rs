//! Source archive creation.
//!
//! Include patterns are resolved against the source root, directory matches
//! are expanded and filtered through the exclude patterns, and every selected
//! file is streamed into an in-memory zip.
//!
//! ## Exclusions
//!
//! Exclude patterns apply only to files found by expanding a matched
//! directory. A file matched directly by an include pattern is always added,
//! even when an exclude pattern would match its name. Existing workflows rely
//! on this, so it is kept as is.

mod select;
mod writer;

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::core::constants::INLINE_CONTENT_LIMIT;
use crate::error::Result;

pub use select::{for_each_entry, select_entries};
pub use writer::build_archive;

/// A file selected for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path of the file on disk.
    pub source: PathBuf,
    /// Slash-separated name inside the archive, relative to the source root.
    pub name: String,
}

/// A finished zip archive held in memory.
#[derive(Debug, Clone)]
pub struct ArchiveBuffer {
    bytes: Vec<u8>,
    entries: usize,
}

impl ArchiveBuffer {
    pub(crate) fn new(bytes: Vec<u8>, entries: usize) -> Self {
        Self { bytes, entries }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of files written.
    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Whether the archive is too large to be sent inline.
    pub fn exceeds_inline_limit(&self) -> bool {
        self.bytes.len() > INLINE_CONTENT_LIMIT
    }

    /// Hex-encoded SHA-256 of the archive bytes.
    pub fn sha256_hex(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// What to put into the archive.
#[derive(Debug, Clone, Default)]
pub struct ArchiveSpec {
    /// Directory patterns are resolved against.
    pub root: PathBuf,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ArchiveSpec {
    /// Spec rooted at `workspace` joined with `source_root`.
    pub fn new(workspace: &Path, source_root: &str, include: &[String], exclude: &[String]) -> Self {
        Self {
            root: workspace.join(source_root),
            include: include.to_vec(),
            exclude: exclude.to_vec(),
        }
    }

    /// Select the entries without building the archive.
    pub fn entries(&self) -> Result<Vec<ArchiveEntry>> {
        select_entries(&self.root, &self.include, &self.exclude)
    }

    /// Build the archive, reporting each entry to `observer`.
    pub fn build(&self, observer: &mut dyn FnMut(&ArchiveEntry)) -> Result<ArchiveBuffer> {
        build_archive(&self.root, &self.include, &self.exclude, observer)
    }
}
