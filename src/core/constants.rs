//! Constants used throughout ycfn.
//!
//! Centralizes service endpoints, limits and sentinel strings.

/// Largest archive that may be sent inline with a version request (3.5 MiB).
pub const INLINE_CONTENT_LIMIT: usize = 3_670_016;

/// Symbolic Lockbox version resolved to the secret's current version.
pub const LATEST_VERSION: &str = "latest";

/// Page size used when listing secrets in a folder.
pub const SECRET_PAGE_SIZE: u32 = 100;

/// In-flight limit for by-ID secret lookups.
pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 5;

/// Deflate level used for the source archive.
pub const ZIP_COMPRESSION_LEVEL: i64 = 9;

/// Default memory limit when none is configured.
pub const DEFAULT_MEMORY: &str = "128Mb";

/// Default execution timeout in seconds.
pub const DEFAULT_EXECUTION_TIMEOUT: u64 = 5;

/// Default retry count for async invocations.
pub const DEFAULT_ASYNC_RETRIES: u32 = 3;

/// Serverless Functions REST endpoint.
pub const FUNCTIONS_ENDPOINT: &str = "https://serverless-functions.api.cloud.yandex.net";

/// Lockbox REST endpoint.
pub const LOCKBOX_ENDPOINT: &str = "https://lockbox.api.cloud.yandex.net";

/// IAM REST endpoint.
pub const IAM_ENDPOINT: &str = "https://iam.api.cloud.yandex.net";

/// Operation service REST endpoint.
pub const OPERATION_ENDPOINT: &str = "https://operation.api.cloud.yandex.net";

/// Object Storage endpoint.
pub const STORAGE_ENDPOINT: &str = "https://storage.yandexcloud.net";

/// Web console base used for summary links.
pub const CONSOLE_URL: &str = "https://console.yandex.cloud";

/// Interval between operation status polls, in milliseconds.
pub const OPERATION_POLL_INTERVAL_MS: u64 = 1_000;

/// Longest wait for a cloud operation to finish, in seconds.
pub const OPERATION_TIMEOUT_SECS: u64 = 600;

/// Environment variable read for the tracing filter.
pub const LOG_ENV: &str = "YCFN_LOG";
