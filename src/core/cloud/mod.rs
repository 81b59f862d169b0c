//! Cloud service seams.
//!
//! Each trait covers the handful of calls ycfn makes against one service.
//! [`CloudClient`] implements all of them over REST; tests substitute
//! in-memory fakes.
//!
//! ## Example
//!
//! ```ignore
//! struct Fixed(Vec<LockboxSecret>);
//!
//! #[async_trait]
//! impl SecretService for Fixed {
//!     async fn get_secret(&self, id: &str) -> Result<LockboxSecret> { /* ... */ }
//!     async fn list_secrets(&self, folder: &str, size: u32, token: &str) -> Result<SecretPage> { /* ... */ }
//! }
//! ```

mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::Result;
use types::{CreateVersionRequest, Function, LockboxSecret, Operation, SecretPage, ServiceAccount};

pub use client::{CloudClient, Endpoints};

/// Lockbox secret metadata.
#[async_trait]
pub trait SecretService: Send + Sync {
    /// Fetch a secret by ID.
    ///
    /// # Errors
    ///
    /// Any failure, including "not found".
    async fn get_secret(&self, secret_id: &str) -> Result<LockboxSecret>;

    /// Fetch one page of the secrets in a folder. An empty `page_token`
    /// requests the first page.
    async fn list_secrets(
        &self,
        folder_id: &str,
        page_size: u32,
        page_token: &str,
    ) -> Result<SecretPage>;
}

/// IAM service account lookup.
#[async_trait]
pub trait ServiceAccountService: Send + Sync {
    /// Find a service account by exact name within a folder.
    async fn find_service_account(&self, folder_id: &str, name: &str)
        -> Result<Option<ServiceAccount>>;
}

/// Serverless Functions control plane.
#[async_trait]
pub trait FunctionService: Send + Sync {
    /// Find a function by exact name within a folder.
    async fn find_function(&self, folder_id: &str, name: &str) -> Result<Option<Function>>;

    async fn create_function(
        &self,
        folder_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Operation>;

    async fn create_version(&self, request: &CreateVersionRequest) -> Result<Operation>;

    /// Poll until the operation is done.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Operation` when the operation finishes with an error.
    async fn wait_operation(&self, operation: Operation) -> Result<Operation>;
}

/// Object Storage upload.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;
}
