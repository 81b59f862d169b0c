//! Zip writing.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;

use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::{select_entries, ArchiveBuffer, ArchiveEntry};
use crate::core::constants::ZIP_COMPRESSION_LEVEL;
use crate::error::{ArchiveError, Result};

/// Build a zip archive of the selected sources in memory.
///
/// `observer` sees every entry as it is written. When several entries share a
/// name the last one wins and earlier ones are dropped.
pub fn build_archive(
    root: &Path,
    include: &[String],
    exclude: &[String],
    observer: &mut dyn FnMut(&ArchiveEntry),
) -> Result<ArchiveBuffer> {
    let entries = last_writer_wins(select_entries(root, include, exclude)?);
    info!(root = %root.display(), entries = entries.len(), "archive initialize");

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    // 1980-01-01 00:00:00 for every entry.
    let fixed_time = DateTime::default();
    let base = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ZIP_COMPRESSION_LEVEL))
        .last_modified_time(fixed_time);

    for entry in &entries {
        let mut source = File::open(&entry.source).map_err(|source| ArchiveError::Read {
            path: entry.source.clone(),
            source,
        })?;
        let options = base.unix_permissions(file_mode(&source));

        zip.start_file(entry.name.as_str(), options)
            .map_err(ArchiveError::Zip)?;
        io::copy(&mut source, &mut zip).map_err(|source| ArchiveError::Read {
            path: entry.source.clone(),
            source,
        })?;
        observer(entry);
    }

    let bytes = zip.finish().map_err(ArchiveError::Zip)?.into_inner();
    debug!(bytes = bytes.len(), "archive finalized");

    Ok(ArchiveBuffer::new(bytes, entries.len()))
}

/// Keep only the last entry for each archive name, in order of those last
/// occurrences.
fn last_writer_wins(entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    let mut last: HashMap<&str, usize> = HashMap::new();
    for (i, entry) in entries.iter().enumerate() {
        last.insert(entry.name.as_str(), i);
    }
    let keep: Vec<bool> = (0..entries.len())
        .map(|i| last.get(entries[i].name.as_str()) == Some(&i))
        .collect();

    entries
        .into_iter()
        .zip(keep)
        .filter_map(|(entry, keep)| keep.then_some(entry))
        .collect()
}

#[cfg(unix)]
fn file_mode(file: &File) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    file.metadata()
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_file: &File) -> u32 {
    0o644
}
