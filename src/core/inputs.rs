//! Parsers for action inputs.
//!
//! Every parser runs before any filesystem or network work so that a typo in
//! the workflow fails the run immediately.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::error::InputError;

/// 1 kilobyte = 1024 bytes.
pub const KB: u64 = 1024;

/// 1 megabyte = 1024 KB.
pub const MB: u64 = 1024 * KB;

/// 1 gigabyte = 1024 MB.
pub const GB: u64 = 1024 * MB;

/// Drop blank lines from a multiline pattern list.
pub fn filter_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a memory size such as `128Mb`, `1GB` or `256 mb` into bytes.
pub fn parse_memory(input: &str) -> Result<u64, InputError> {
    let err = || InputError::Memory(input.to_string());
    let trimmed = input.trim();

    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(err)?;
    let (digits, unit) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(err());
    }
    let unit = unit.strip_prefix(char::is_whitespace).unwrap_or(unit);

    let multiplier = match unit.to_ascii_lowercase().as_str() {
        "mb" => MB,
        "gb" => GB,
        _ => return Err(err()),
    };
    let value: u64 = digits.parse().map_err(|_| err())?;
    value.checked_mul(multiplier).ok_or_else(err)
}

/// Minimum level for function logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    #[default]
    #[serde(rename = "LEVEL_UNSPECIFIED")]
    Unspecified,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Unspecified => "LEVEL_UNSPECIFIED",
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        };
        f.write_str(name)
    }
}

/// Parse a log level name. Empty input means "unspecified".
pub fn parse_log_level(input: &str) -> Result<LogLevel, InputError> {
    let level = match input.trim().to_ascii_uppercase().as_str() {
        "" => LogLevel::Unspecified,
        "TRACE" => LogLevel::Trace,
        "DEBUG" => LogLevel::Debug,
        "INFO" => LogLevel::Info,
        "WARN" => LogLevel::Warn,
        "ERROR" => LogLevel::Error,
        "FATAL" => LogLevel::Fatal,
        _ => return Err(InputError::LogLevel(input.to_string())),
    };
    Ok(level)
}

/// Parse `KEY=value` lines. Only the first `=` separates; both sides are
/// trimmed.
pub fn parse_environment(lines: &[String]) -> Result<BTreeMap<String, String>, InputError> {
    let mut environment = BTreeMap::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| InputError::Environment(line.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(InputError::Environment(line.clone()));
        }
        environment.insert(key.to_string(), value.trim().to_string());
    }
    Ok(environment)
}

/// An Object Storage bucket mounted into the function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub name: String,
    pub bucket: String,
    pub prefix: Option<String>,
    pub read_only: bool,
}

/// Parse `<mount-point>:<bucket>[/<prefix>][:ro]` lines.
///
/// ```text
/// data:my-bucket
/// images:my-bucket/photos/:ro
/// logs:my-bucket:ro
/// ```
pub fn parse_mounts(lines: &[String]) -> Result<Vec<Mount>, InputError> {
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(parse_mount)
        .collect()
}

fn parse_mount(line: &str) -> Result<Mount, InputError> {
    let err = || InputError::Mount(line.to_string());

    let (name, target) = line.split_once(':').ok_or_else(err)?;
    let (location, read_only) = match target.strip_suffix(":ro") {
        Some(location) => (location, true),
        None => (target, false),
    };
    if name.is_empty() || location.contains(':') {
        return Err(err());
    }

    let (bucket, prefix) = match location.split_once('/') {
        Some((bucket, prefix)) => (bucket, Some(prefix.to_string())),
        None => (location, None),
    };
    if bucket.is_empty() {
        return Err(err());
    }

    Ok(Mount {
        name: name.to_string(),
        bucket: bucket.to_string(),
        prefix,
        read_only,
    })
}
