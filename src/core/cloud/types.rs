//! Wire types for the Yandex Cloud REST APIs.
//!
//! Only the fields ycfn reads or writes are modelled. 64-bit integers travel
//! as JSON strings, as the REST gateway expects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::inputs::{LogLevel, Mount};
use crate::core::secrets::SecretRef;

/// Lockbox secret metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockboxSecret {
    pub id: String,
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<SecretVersion>,
}

/// A version of a Lockbox secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretVersion {
    pub id: String,
    #[serde(default)]
    pub secret_id: String,
}

/// One page of a secret listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretPage {
    #[serde(default)]
    pub secrets: Vec<LockboxSecret>,
    /// Empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Function {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FunctionList {
    #[serde(default)]
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ServiceAccountList {
    #[serde(default)]
    pub service_accounts: Vec<ServiceAccount>,
}

/// Long-running operation returned by mutating calls.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub id: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<OperationError>,
}

impl Operation {
    /// String field of the operation metadata, e.g. `functionVersionId`.
    pub fn metadata_str(&self, field: &str) -> Option<&str> {
        self.metadata.as_ref()?.get(field)?.as_str()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OperationError {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateFunctionRequest<'a> {
    pub folder_id: &'a str,
    pub name: &'a str,
    pub description: &'a str,
}

/// Body of `functions/v1/versions`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub function_id: String,
    pub runtime: String,
    pub entrypoint: String,
    pub resources: Resources,
    /// Duration such as `5s`.
    pub execution_timeout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<SecretRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<Connectivity>,
    pub log_options: LogOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub async_invocation_config: Option<AsyncInvocationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<MountSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<Package>,
    /// Base64 zip content for inline uploads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Resources {
    /// Bytes, as a decimal string.
    pub memory: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connectivity {
    pub network_id: String,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogOptions {
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_group_id: Option<String>,
    pub min_level: LogLevel,
}

/// Package stored in Object Storage.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub bucket_name: String,
    pub object_name: String,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncInvocationConfig {
    pub retries_count: String,
    pub success_target: ResponseTarget,
    pub failure_target: ResponseTarget,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_id: Option<String>,
}

/// Where async invocation results go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseTarget {
    EmptyTarget {},
    #[serde(rename_all = "camelCase")]
    YmqTarget {
        queue_arn: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        service_account_id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MountSpec {
    pub name: String,
    pub mode: &'static str,
    pub object_storage: ObjectStorageMount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStorageMount {
    pub bucket_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl From<&Mount> for MountSpec {
    fn from(mount: &Mount) -> Self {
        Self {
            name: mount.name.clone(),
            mode: if mount.read_only { "READ_ONLY" } else { "READ_WRITE" },
            object_storage: ObjectStorageMount {
                bucket_id: mount.bucket.clone(),
                prefix: mount.prefix.clone(),
            },
        }
    }
}
