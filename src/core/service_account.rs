//! Service account resolution.

use tracing::debug;

use crate::core::cloud::ServiceAccountService;
use crate::error::{ApiError, Result};

/// Resolve a service account given by ID or by name.
///
/// A non-empty `id` wins without any call. Otherwise a non-empty `name` is
/// looked up in the folder. With neither, there is no service account.
///
/// # Errors
///
/// Returns `ApiError::ServiceAccountNotFound` if the name does not exist.
pub async fn resolve<S>(service: &S, folder_id: &str, id: &str, name: &str) -> Result<Option<String>>
where
    S: ServiceAccountService + ?Sized,
{
    if !id.is_empty() {
        return Ok(Some(id.to_string()));
    }
    if name.is_empty() {
        return Ok(None);
    }

    let account = service
        .find_service_account(folder_id, name)
        .await?
        .ok_or_else(|| ApiError::ServiceAccountNotFound(name.to_string()))?;
    debug!(name, id = %account.id, "resolved service account");
    Ok(Some(account.id))
}
