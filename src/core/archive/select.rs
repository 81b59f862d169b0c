//! Include/exclude resolution against the filesystem.

use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};
use tracing::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use super::ArchiveEntry;
use crate::core::inputs::filter_patterns;
use crate::error::{ArchiveError, Result};

/// Select archive entries for `include` and `exclude` under `root`.
///
/// Entries come back in include-pattern order, then in file-name order
/// within each match. The same file may appear more than once when patterns
/// overlap.
pub fn select_entries(
    root: &Path,
    include: &[String],
    exclude: &[String],
) -> Result<Vec<ArchiveEntry>> {
    let mut entries = Vec::new();
    for_each_entry(root, include, exclude, |entry| {
        entries.push(entry);
        Ok(())
    })?;
    Ok(entries)
}

/// Stream archive entries to `sink` as they are discovered.
///
/// Blank include patterns are skipped. Patterns matching nothing contribute
/// nothing. Any filesystem error aborts the walk.
pub fn for_each_entry<F>(root: &Path, include: &[String], exclude: &[String], mut sink: F) -> Result<()>
where
    F: FnMut(ArchiveEntry) -> Result<()>,
{
    let exclusions = build_exclusions(exclude)?;

    for pattern in filter_patterns(include) {
        let matches = expand_include(root, &pattern)?;
        debug!(pattern = %pattern, matches = matches.len(), "include resolved");

        for path in matches {
            let metadata = std::fs::symlink_metadata(&path).map_err(|source| ArchiveError::Read {
                path: path.clone(),
                source,
            })?;

            if metadata.is_dir() {
                debug!(path = %path.display(), "match: dir");
                expand_directory(root, &path, &exclusions, &mut sink)?;
            } else {
                debug!(path = %path.display(), "match: file");
                sink(ArchiveEntry {
                    name: relative_name(root, &path),
                    source: path,
                })?;
            }
        }
    }

    Ok(())
}

/// Add every file below `dir`, minus the excluded ones.
fn expand_directory<F>(root: &Path, dir: &Path, exclusions: &GlobSet, sink: &mut F) -> Result<()>
where
    F: FnMut(ArchiveEntry) -> Result<()>,
{
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if entry.file_type().is_dir() {
            continue;
        }
        // Symlinks are followed only when they point at a regular file.
        if entry.file_type().is_symlink() && !entry.path().is_file() {
            trace!(path = %entry.path().display(), "skipping non-file symlink");
            continue;
        }

        let name = relative_name(root, entry.path());
        if exclusions.is_match(&name) {
            trace!(name = %name, "excluded");
            continue;
        }

        sink(ArchiveEntry {
            source: entry.into_path(),
            name,
        })?;
    }
    Ok(())
}

/// Resolve one include pattern to the paths it matches.
fn expand_include(root: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let segments: Vec<&str> = pattern
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    let literal = segments.iter().take_while(|s| !is_glob(s)).count();
    let mut base = root.to_path_buf();
    for segment in &segments[..literal] {
        base.push(segment);
    }
    let rest = &segments[literal..];

    if rest.is_empty() {
        return match std::fs::symlink_metadata(&base) {
            Ok(_) => Ok(vec![base]),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(source) => Err(ArchiveError::Read { path: base, source }.into()),
        };
    }

    if !base.is_dir() {
        return Ok(Vec::new());
    }

    let glob = rest.join("/");
    let matcher = compile_include(&glob)?;
    let recursive = rest.iter().any(|s| s.contains("**"));
    let allow_hidden = rest.iter().any(|s| s.starts_with('.'));

    let mut walker = WalkDir::new(&base).min_depth(1).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(rest.len());
    }

    let mut matches = Vec::new();
    let entries = walker
        .into_iter()
        .filter_entry(|e| allow_hidden || !is_hidden(e));
    for entry in entries {
        let entry = entry.map_err(|e| walk_error(&base, e))?;
        let candidate = slash_path(entry.path().strip_prefix(&base).unwrap_or(entry.path()));
        if matcher.is_match(&candidate) {
            matches.push(entry.into_path());
        }
    }
    Ok(matches)
}

fn compile_include(glob: &str) -> Result<GlobMatcher> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| pattern_error(glob, e))
}

/// Exclusions match anywhere in the name: `*` crosses `/`.
fn build_exclusions(exclude: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in filter_patterns(exclude) {
        let trimmed = pattern.strip_prefix("./").unwrap_or(&pattern);
        builder.add(Glob::new(trimmed).map_err(|e| pattern_error(&pattern, e))?);
    }
    builder.build().map_err(|e| pattern_error("<exclude>", e))
}

fn pattern_error(pattern: &str, e: globset::Error) -> crate::error::Error {
    ArchiveError::Pattern {
        pattern: pattern.to_string(),
        reason: e.kind().to_string(),
    }
    .into()
}

fn walk_error(path: &Path, e: walkdir::Error) -> crate::error::Error {
    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| path.to_path_buf());
    match e.into_io_error() {
        Some(source) => ArchiveError::Read { path, source }.into(),
        None => ArchiveError::Walk {
            path,
            reason: "filesystem loop detected".to_string(),
        }
        .into(),
    }
}

fn is_glob(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Archive name of `path`: its lexical path relative to `root`, `/`-separated.
pub(crate) fn relative_name(root: &Path, path: &Path) -> String {
    let root = normalize(root);
    let path = normalize(path);

    let common = root
        .iter()
        .zip(path.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..root.len() {
        parts.push("..".to_string());
    }
    parts.extend(path[common..].iter().cloned());
    parts.join("/")
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(last) if last != "..") {
                    out.pop();
                } else {
                    out.push("..".to_string());
                }
            }
            Component::RootDir => out.push(String::new()),
            Component::Prefix(p) => out.push(p.as_os_str().to_string_lossy().into_owned()),
            Component::Normal(s) => out.push(s.to_string_lossy().into_owned()),
        }
    }
    out
}

fn slash_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
