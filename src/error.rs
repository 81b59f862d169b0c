//! Error types for ycfn.
//!
//! Each concern gets its own enum; [`Error`] wraps them so callers can match
//! on the category while `?` converts transparently.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("zip file is too big: {size} bytes. Provide bucket name")]
    SizeLimit { size: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required input: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("no credentials: provide yc-iam-token")]
    NoCredentials,
}

/// Malformed user input. Raised before any filesystem or network work.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum InputError {
    #[error("broken reference to Lockbox secret: {0}")]
    SecretReference(String),

    #[error("memory has unknown format: {0}")]
    Memory(String),

    #[error("log level has unknown value: {0}")]
    LogLevel(String),

    #[error("invalid environment variable: '{0}'. Expected KEY=value")]
    Environment(String),

    #[error("invalid mount syntax: '{0}'. Expected <mount-point>:<bucket>[/<prefix>][:ro]")]
    Mount(String),

    #[error("{0}")]
    AsyncInvocation(String),
}

/// Source archive errors.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {path}: {reason}")]
    Walk { path: PathBuf, reason: String },

    #[error("failed to write zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Batched secret resolution failure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("failed to resolve latest versions for secrets: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// Cloud API errors.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{method} {url} returned {status}: {message}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    #[error("operation {id} failed: {message}")]
    Operation { id: String, message: String },

    #[error("operation {id} did not finish within {timeout:?}")]
    OperationTimeout { id: String, timeout: Duration },

    #[error("operation {0} finished without metadata")]
    MissingMetadata(String),

    #[error("service account with name {0} not found")]
    ServiceAccountNotFound(String),

    #[error("failed to create function '{0}'")]
    FunctionNotCreated(String),
}

impl ApiError {
    /// `true` when the service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
