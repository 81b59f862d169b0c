//! REST client for the Yandex Cloud services ycfn talks to.
//!
//! Authenticates every request with a bearer IAM token. Object Storage takes
//! the same token through `X-YaCloud-SubjectToken`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::types::{
    CreateFunctionRequest, CreateVersionRequest, Function, FunctionList, LockboxSecret, Operation,
    SecretPage, ServiceAccount, ServiceAccountList,
};
use super::{FunctionService, ObjectStorage, SecretService, ServiceAccountService};
use crate::core::constants;
use crate::error::{ApiError, Error, Result};

/// Base URLs per service. Overridable for tests and private installations.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub functions: String,
    pub lockbox: String,
    pub iam: String,
    pub operation: String,
    pub storage: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            functions: constants::FUNCTIONS_ENDPOINT.to_string(),
            lockbox: constants::LOCKBOX_ENDPOINT.to_string(),
            iam: constants::IAM_ENDPOINT.to_string(),
            operation: constants::OPERATION_ENDPOINT.to_string(),
            storage: constants::STORAGE_ENDPOINT.to_string(),
        }
    }
}

impl Endpoints {
    /// Every service served from one base URL.
    pub fn single(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            functions: base.clone(),
            lockbox: base.clone(),
            iam: base.clone(),
            operation: base.clone(),
            storage: base,
        }
    }
}

/// Authenticated handle shared by every component of a deployment.
pub struct CloudClient {
    http: Client,
    token: Zeroizing<String>,
    endpoints: Endpoints,
    poll_interval: Duration,
    operation_timeout: Duration,
}

impl CloudClient {
    /// Client for the public endpoints.
    pub fn new(token: Zeroizing<String>) -> Result<Self> {
        Self::with_endpoints(token, Endpoints::default())
    }

    pub fn with_endpoints(token: Zeroizing<String>, endpoints: Endpoints) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("ycfn/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token,
            endpoints,
            poll_interval: Duration::from_millis(constants::OPERATION_POLL_INTERVAL_MS),
            operation_timeout: Duration::from_secs(constants::OPERATION_TIMEOUT_SECS),
        })
    }

    /// Override the operation poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override how long an operation may run before waiting gives up.
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    async fn poll_until_done(&self, mut operation: Operation) -> Result<Operation> {
        while !operation.done {
            tokio::time::sleep(self.poll_interval).await;
            let url = format!("{}/operations/{}", self.endpoints.operation, operation.id);
            operation = self.get_json(&url, &[]).await?;
            trace!(id = %operation.id, done = operation.done, "operation polled");
        }
        Ok(operation)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        trace!(url, "GET");
        let request = self.http.get(url).bearer_auth(self.token.as_str()).query(query);
        let response = send("GET", url, request).await?;
        decode(url, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T> {
        trace!(url, "POST");
        let request = self.http.post(url).bearer_auth(self.token.as_str()).json(body);
        let response = send("POST", url, request).await?;
        decode(url, response).await
    }
}

async fn send(method: &'static str, url: &str, request: RequestBuilder) -> Result<Response> {
    let response = request.send().await.map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    debug!(method, url, status = status.as_u16(), request_id = ?request_id, "request failed");
    Err(ApiError::Status {
        method,
        url: url.to_string(),
        status: status.as_u16(),
        message,
        request_id,
    }
    .into())
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    response.json::<T>().await.map_err(|source| {
        ApiError::Transport {
            url: url.to_string(),
            source,
        }
        .into()
    })
}

/// Quote a value for a `name = "..."` list filter.
fn name_filter(name: &str) -> String {
    format!("name = \"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
}

#[async_trait]
impl SecretService for CloudClient {
    async fn get_secret(&self, secret_id: &str) -> Result<LockboxSecret> {
        let url = format!("{}/lockbox/v1/secrets/{}", self.endpoints.lockbox, secret_id);
        self.get_json(&url, &[]).await
    }

    async fn list_secrets(
        &self,
        folder_id: &str,
        page_size: u32,
        page_token: &str,
    ) -> Result<SecretPage> {
        let url = format!("{}/lockbox/v1/secrets", self.endpoints.lockbox);
        let page_size = page_size.to_string();
        let mut query = vec![("folderId", folder_id), ("pageSize", page_size.as_str())];
        if !page_token.is_empty() {
            query.push(("pageToken", page_token));
        }
        self.get_json(&url, &query).await
    }
}

#[async_trait]
impl ServiceAccountService for CloudClient {
    async fn find_service_account(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<Option<ServiceAccount>> {
        let url = format!("{}/iam/v1/serviceAccounts", self.endpoints.iam);
        let filter = name_filter(name);
        let list: ServiceAccountList = self
            .get_json(&url, &[("folderId", folder_id), ("filter", filter.as_str())])
            .await?;
        Ok(list.service_accounts.into_iter().next())
    }
}

#[async_trait]
impl FunctionService for CloudClient {
    async fn find_function(&self, folder_id: &str, name: &str) -> Result<Option<Function>> {
        let url = format!("{}/functions/v1/functions", self.endpoints.functions);
        let filter = name_filter(name);
        let list: FunctionList = self
            .get_json(&url, &[("folderId", folder_id), ("filter", filter.as_str())])
            .await?;
        Ok(list.functions.into_iter().next())
    }

    async fn create_function(
        &self,
        folder_id: &str,
        name: &str,
        description: &str,
    ) -> Result<Operation> {
        let url = format!("{}/functions/v1/functions", self.endpoints.functions);
        let body = CreateFunctionRequest {
            folder_id,
            name,
            description,
        };
        self.post_json(&url, &body).await
    }

    async fn create_version(&self, request: &CreateVersionRequest) -> Result<Operation> {
        let url = format!("{}/functions/v1/versions", self.endpoints.functions);
        self.post_json(&url, request).await
    }

    async fn wait_operation(&self, operation: Operation) -> Result<Operation> {
        let id = operation.id.clone();
        let operation = tokio::time::timeout(self.operation_timeout, self.poll_until_done(operation))
            .await
            .map_err(|_| ApiError::OperationTimeout {
                id,
                timeout: self.operation_timeout,
            })??;

        if let Some(error) = &operation.error {
            return Err(ApiError::Operation {
                id: operation.id.clone(),
                message: error.message.clone(),
            }
            .into());
        }
        Ok(operation)
    }
}

#[async_trait]
impl ObjectStorage for CloudClient {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        let url = format!("{}/{}/{}", self.endpoints.storage, bucket, key);
        debug!(url = %url, bytes = body.len(), "uploading object");
        let request = self
            .http
            .put(&url)
            .header("X-YaCloud-SubjectToken", self.token.as_str())
            .body(body);
        send("PUT", &url, request).await?;
        Ok(())
    }
}
