//! Fixture helpers: source trees and zip inspection.

use std::io::Cursor;
use std::path::Path;

/// The tree most archive tests run against.
pub const SOURCE_TREE: &[(&str, &str)] = &[
    ("src/func.js", "exports.handler = () => 1;\n"),
    ("src/foo/1.txt", "one\n"),
    ("src/foo/2.txt", "two\n"),
    ("src/foo/bar/3.txt", "three\n"),
    ("src/foo/bar/util.js", "module.exports = {};\n"),
    ("src/package.json", "{}\n"),
    ("README.md", "# fixture\n"),
];

/// Names of every entry in a zip, in archive order.
pub fn zip_names(bytes: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("not a zip archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("bad entry").name().to_string())
        .collect()
}

/// Names of every entry in a zip, sorted.
pub fn sorted_zip_names(bytes: &[u8]) -> Vec<String> {
    let mut names = zip_names(bytes);
    names.sort();
    names
}

/// Contents of one zip entry.
pub fn zip_entry(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("not a zip archive");
    let mut file = archive.by_name(name).expect("entry missing");
    let mut contents = String::new();
    std::io::Read::read_to_string(&mut file, &mut contents).expect("entry not utf-8");
    contents
}

/// Read a zip written to disk.
pub fn read_zip(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("failed to read zip")
}
