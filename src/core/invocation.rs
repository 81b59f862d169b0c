//! Async invocation configuration.
//!
//! A success or failure queue needs a service account allowed to write to it,
//! given by ID or by name but not both. The invoking service account falls
//! back to the function's own account.

use crate::core::cloud::types::{AsyncInvocationConfig, ResponseTarget};
use crate::core::cloud::ServiceAccountService;
use crate::core::config::AsyncSettings;
use crate::core::service_account;
use crate::error::{InputError, Result};

/// Check the interdependent async inputs. A no-op when async is disabled.
///
/// # Errors
///
/// Returns `InputError::AsyncInvocation` when a queue ARN has no service
/// account, or has both an ID and a name.
pub fn validate(settings: &AsyncSettings) -> std::result::Result<(), InputError> {
    if !settings.enabled {
        return Ok(());
    }
    check_target(
        "success",
        &settings.success_ymq_arn,
        &settings.success_sa_id,
        &settings.success_sa_name,
    )?;
    check_target(
        "failure",
        &settings.failure_ymq_arn,
        &settings.failure_sa_id,
        &settings.failure_sa_name,
    )
}

fn check_target(kind: &str, arn: &str, sa_id: &str, sa_name: &str) -> std::result::Result<(), InputError> {
    if arn.is_empty() {
        return Ok(());
    }
    if sa_id.is_empty() && sa_name.is_empty() {
        return Err(InputError::AsyncInvocation(format!(
            "either async-{kind}-sa-id or async-{kind}-sa-name must be set if async-{kind}-ymq-arn is set"
        )));
    }
    if !sa_id.is_empty() && !sa_name.is_empty() {
        return Err(InputError::AsyncInvocation(format!(
            "either async-{kind}-sa-id or async-{kind}-sa-name must be set, but not both"
        )));
    }
    Ok(())
}

/// Build the async invocation config, or `None` when async is disabled.
///
/// `function_sa_id` is the function's own, already resolved, service account.
pub async fn build<S>(
    service: &S,
    folder_id: &str,
    settings: &AsyncSettings,
    function_sa_id: Option<&str>,
) -> Result<Option<AsyncInvocationConfig>>
where
    S: ServiceAccountService + ?Sized,
{
    if !settings.enabled {
        return Ok(None);
    }
    validate(settings)?;

    let success_target = target(
        service,
        folder_id,
        &settings.success_ymq_arn,
        &settings.success_sa_id,
        &settings.success_sa_name,
    )
    .await?;
    let failure_target = target(
        service,
        folder_id,
        &settings.failure_ymq_arn,
        &settings.failure_sa_id,
        &settings.failure_sa_name,
    )
    .await?;

    let service_account_id =
        service_account::resolve(service, folder_id, &settings.sa_id, &settings.sa_name)
            .await?
            .or_else(|| function_sa_id.map(str::to_string));

    Ok(Some(AsyncInvocationConfig {
        retries_count: settings.retries_count.to_string(),
        success_target,
        failure_target,
        service_account_id,
    }))
}

async fn target<S>(
    service: &S,
    folder_id: &str,
    arn: &str,
    sa_id: &str,
    sa_name: &str,
) -> Result<ResponseTarget>
where
    S: ServiceAccountService + ?Sized,
{
    if arn.is_empty() {
        return Ok(ResponseTarget::EmptyTarget {});
    }
    let service_account_id = service_account::resolve(service, folder_id, sa_id, sa_name).await?;
    Ok(ResponseTarget::YmqTarget {
        queue_arn: arn.to_string(),
        service_account_id,
    })
}
