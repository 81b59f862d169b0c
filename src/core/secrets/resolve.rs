//! Resolution of `latest` Lockbox versions.
//!
//! A reference's `id` may be a secret ID or a secret name. Resolution runs in
//! two stages:
//!
//! 1. every `latest` reference is looked up by ID, a bounded number at a time;
//! 2. references whose lookup failed are matched by exact name against a
//!    single listing of the folder.
//!
//! Failures are collected and reported together; nothing is returned unless
//! every `latest` reference resolved.

use std::collections::HashMap;

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use super::SecretRef;
use crate::core::cloud::types::LockboxSecret;
use crate::core::cloud::SecretService;
use crate::core::constants::{DEFAULT_RESOLVE_CONCURRENCY, SECRET_PAGE_SIZE};
use crate::error::{ResolveError, Result};

/// Outcome of resolving one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Pinned to the secret's current version.
    Resolved(SecretRef),
    /// Not found by ID; retry by name.
    Fallback(SecretRef),
    Failed(String),
}

/// Resolve `latest` versions with the default lookup concurrency.
pub async fn resolve_latest<S>(
    service: &S,
    folder_id: &str,
    secrets: Vec<SecretRef>,
) -> Result<Vec<SecretRef>>
where
    S: SecretService + ?Sized,
{
    resolve_latest_with(service, folder_id, secrets, DEFAULT_RESOLVE_CONCURRENCY).await
}

/// Resolve `latest` versions, with at most `concurrency` ID lookups in flight.
///
/// References pinned to a concrete version are returned untouched and cost
/// no calls. The result keeps the input order.
///
/// # Errors
///
/// `ResolveError::Unresolved` listing every reference that could not be
/// resolved.
pub async fn resolve_latest_with<S>(
    service: &S,
    folder_id: &str,
    secrets: Vec<SecretRef>,
    concurrency: usize,
) -> Result<Vec<SecretRef>>
where
    S: SecretService + ?Sized,
{
    let latest: Vec<usize> = secrets
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_latest())
        .map(|(i, _)| i)
        .collect();
    if latest.is_empty() {
        return Ok(secrets);
    }

    let pending: Vec<SecretRef> = latest.iter().map(|&i| secrets[i].clone()).collect();
    let mut results = resolve_by_id(service, pending, concurrency).await;

    let fallbacks = results
        .iter()
        .filter(|r| matches!(r, Resolution::Fallback(_)))
        .count();
    if fallbacks > 0 {
        info!(
            count = fallbacks,
            folder_id, "failed to resolve secrets by ID, trying to find by name"
        );
        let by_name = secrets_by_name(service, folder_id).await?;
        for result in results.iter_mut() {
            if let Resolution::Fallback(secret) = result {
                let retried = resolve_by_name(secret, &by_name);
                *result = retried;
            }
        }
    }

    let mut failures = Vec::new();
    let mut resolved = secrets;
    for (index, result) in latest.into_iter().zip(results) {
        match result {
            Resolution::Resolved(secret) => resolved[index] = secret,
            Resolution::Failed(message) => failures.push(message),
            Resolution::Fallback(secret) => {
                failures.push(format!("failed to resolve secret: {}", secret.id))
            }
        }
    }

    if !failures.is_empty() {
        return Err(ResolveError::Unresolved(failures).into());
    }
    Ok(resolved)
}

/// Stage one: look each reference up by ID. Results keep input order.
async fn resolve_by_id<S>(service: &S, secrets: Vec<SecretRef>, concurrency: usize) -> Vec<Resolution>
where
    S: SecretService + ?Sized,
{
    stream::iter(secrets)
        .map(|secret| async move {
            match service.get_secret(&secret.id).await {
                Ok(found) => pin_current(secret, &found),
                Err(e) => {
                    debug!(id = %secret.id, error = %e, "secret lookup by ID failed");
                    Resolution::Fallback(secret)
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

/// Stage two: list the folder once, page by page.
async fn secrets_by_name<S>(service: &S, folder_id: &str) -> Result<HashMap<String, LockboxSecret>>
where
    S: SecretService + ?Sized,
{
    let mut by_name = HashMap::new();
    let mut page_token = String::new();

    loop {
        let page = service
            .list_secrets(folder_id, SECRET_PAGE_SIZE, &page_token)
            .await?;
        debug!(secrets = page.secrets.len(), "listed secrets page");
        for secret in page.secrets {
            by_name.insert(secret.name.clone(), secret);
        }
        if page.next_page_token.is_empty() {
            break;
        }
        page_token = page.next_page_token;
    }

    Ok(by_name)
}

fn resolve_by_name(secret: &SecretRef, by_name: &HashMap<String, LockboxSecret>) -> Resolution {
    let Some(found) = by_name.get(&secret.id) else {
        return Resolution::Failed(format!("failed to resolve secret: {}", secret.id));
    };
    info!(name = %secret.id, id = %found.id, "resolved secret by name");

    match &found.current_version {
        Some(version) => Resolution::Resolved(SecretRef {
            id: found.id.clone(),
            version_id: version.id.clone(),
            ..secret.clone()
        }),
        None => Resolution::Failed(format!(
            "secret {} (found as {}) has no current version",
            secret.id, found.id
        )),
    }
}

fn pin_current(secret: SecretRef, found: &LockboxSecret) -> Resolution {
    match &found.current_version {
        Some(version) => Resolution::Resolved(SecretRef {
            version_id: version.id.clone(),
            ..secret
        }),
        None => Resolution::Failed(format!("secret {} has no current version", secret.id)),
    }
}
