//! Lockbox secret references.
//!
//! A reference binds one payload entry of a Lockbox secret to an environment
//! variable of the function. References are written as
//! `ENVIRONMENT_VARIABLE=secretIdOrName/versionIdOrLatest/payloadKey`.

mod resolve;

use serde::Serialize;

use crate::core::constants::LATEST_VERSION;
use crate::error::InputError;

pub use resolve::{resolve_latest, resolve_latest_with, Resolution};

/// One secret binding for a function version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretRef {
    pub environment_variable: String,
    /// Secret ID, or a secret name that is looked up when `id` is not found.
    pub id: String,
    /// Concrete version ID or `latest`.
    pub version_id: String,
    pub key: String,
}

impl SecretRef {
    /// Whether the version still has to be resolved.
    pub fn is_latest(&self) -> bool {
        self.version_id == LATEST_VERSION
    }
}

/// Parse secret reference lines. Blank lines are ignored.
///
/// # Errors
///
/// Returns `InputError::SecretReference` naming the first malformed line.
pub fn parse_references(lines: &[String]) -> Result<Vec<SecretRef>, InputError> {
    lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| parse_reference(l))
        .collect()
}

fn parse_reference(line: &str) -> Result<SecretRef, InputError> {
    let broken = || InputError::SecretReference(line.to_string());

    let (environment_variable, values) = line.trim().split_once('=').ok_or_else(broken)?;
    // Split on the first `=`: ids may contain `=` and keys may contain `/`.
    let parts: Vec<&str> = values.splitn(3, '/').collect();
    let [id, version_id, key] = parts.as_slice() else {
        return Err(broken());
    };

    if [environment_variable, *id, *version_id, *key]
        .iter()
        .any(|part| part.is_empty())
    {
        return Err(broken());
    }

    Ok(SecretRef {
        environment_variable: environment_variable.to_string(),
        id: id.to_string(),
        version_id: version_id.to_string(),
        key: key.to_string(),
    })
}
