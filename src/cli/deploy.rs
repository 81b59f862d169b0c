//! Deploy command.
//!
//! Validates every input, builds the archive, then talks to the cloud: find or
//! create the function, optionally upload the archive to Object Storage,
//! resolve service accounts and secrets, and create a new version. A job
//! summary is written whether or not the deployment succeeded.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::DeployArgs;
use crate::core::archive::{ArchiveBuffer, ArchiveSpec};
use crate::core::cloud::types::{
    Connectivity, CreateVersionRequest, LogOptions, MountSpec, Package, Resources,
};
use crate::core::cloud::{
    CloudClient, Endpoints, FunctionService, ObjectStorage, SecretService, ServiceAccountService,
};
use crate::core::config::{DeployConfig, Deployment};
use crate::core::github::{Runner, Summary};
use crate::core::{invocation, secrets, service_account};
use crate::error::{ApiError, ConfigError, Error, Result};

/// Every service a deployment talks to.
pub trait Cloud: FunctionService + SecretService + ServiceAccountService + ObjectStorage {}

impl<T> Cloud for T where T: FunctionService + SecretService + ServiceAccountService + ObjectStorage {}

/// Execute the deploy command.
pub fn execute(args: DeployArgs) -> Result<()> {
    let runner = Runner::from_env();
    let mut summary = Summary::default();

    let result = run(&args, &runner, &mut summary);
    if let Err(e) = &result {
        summary.error = Some(e.to_string());
    }
    if let Err(e) = runner.write_summary(&summary.to_markdown()) {
        warn!(error = %e, "failed to write job summary");
    }
    result
}

fn run(args: &DeployArgs, runner: &Runner, summary: &mut Summary) -> Result<()> {
    let config = args.to_config()?;
    if !config.function_name.is_empty() {
        summary.function_name = Some(config.function_name.clone());
    }
    if !config.folder_id.is_empty() {
        summary.folder_id = Some(config.folder_id.clone());
    }

    let deployment = config.validate()?;
    let token = iam_token(args)?;
    output::mask(&token);
    let commit = if deployment.config.bucket.is_empty() {
        None
    } else {
        Some(github_sha()?)
    };

    output::group("Archive sources");
    let archive = build_archive(&deployment.config, args);
    output::end_group();
    let archive = archive?;

    if commit.is_none() && archive.exceeds_inline_limit() {
        return Err(Error::SizeLimit {
            size: archive.len(),
        });
    }

    let client = match &args.endpoint {
        Some(base) => CloudClient::with_endpoints(token, Endpoints::single(base))?,
        None => CloudClient::new(token)?,
    };
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(deploy(
        &client,
        &deployment,
        archive,
        commit.as_deref(),
        runner,
        summary,
    ))
}

/// Run the cloud side of a deployment.
///
/// `commit` names the uploaded object and is required when a bucket is set.
pub async fn deploy<C>(
    client: &C,
    deployment: &Deployment,
    archive: ArchiveBuffer,
    commit: Option<&str>,
    runner: &Runner,
    summary: &mut Summary,
) -> Result<()>
where
    C: Cloud + ?Sized,
{
    let config = &deployment.config;

    output::group("Find function id");
    let function_id = find_or_create_function(client, config).await;
    output::end_group();
    let function_id = function_id?;
    summary.function_id = Some(function_id.clone());
    runner.set_output("function-id", &function_id)?;

    let package = match commit {
        Some(commit) if !config.bucket.is_empty() => {
            output::group("Upload to Object Storage");
            let uploaded = upload(client, &config.bucket, &function_id, commit, &archive).await;
            output::end_group();
            let package = uploaded?;
            summary.bucket = Some(package.bucket_name.clone());
            summary.bucket_object = Some(package.object_name.clone());
            Some(package)
        }
        _ => None,
    };

    output::group("Create function version");
    let version_id = create_version(client, deployment, &function_id, archive, package).await;
    output::end_group();
    let version_id = version_id?;
    summary.version_id = Some(version_id.clone());
    runner.set_output("version-id", &version_id)?;
    runner.set_output("time", &chrono::Local::now().format("%H:%M:%S GMT%z").to_string())?;

    output::success(&format!(
        "deployed {} version {}",
        output::name(&config.function_name),
        output::name(&version_id)
    ));
    Ok(())
}

fn iam_token(args: &DeployArgs) -> Result<Zeroizing<String>> {
    let token = args
        .iam_token
        .clone()
        .or_else(|| std::env::var("YC_IAM_TOKEN").ok())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::NoCredentials)?;
    Ok(Zeroizing::new(token))
}

fn github_sha() -> Result<String> {
    std::env::var("GITHUB_SHA")
        .ok()
        .filter(|sha| !sha.is_empty())
        .ok_or_else(|| ConfigError::MissingField { field: "GITHUB_SHA" }.into())
}

fn build_archive(config: &DeployConfig, args: &DeployArgs) -> Result<ArchiveBuffer> {
    let spec = ArchiveSpec::new(
        &args.source.workspace,
        &config.source_root,
        &config.include,
        &config.exclude,
    );
    info!(root = %spec.root.display(), "archiving sources");
    let buffer = spec.build(&mut |entry| debug!(name = %entry.name, "adding file"))?;
    output::kv("files", buffer.entries());
    output::kv("size", format!("{} bytes", buffer.len()));
    Ok(buffer)
}

async fn find_or_create_function<C>(client: &C, config: &DeployConfig) -> Result<String>
where
    C: FunctionService + ?Sized,
{
    if let Some(function) = client
        .find_function(&config.folder_id, &config.function_name)
        .await?
    {
        info!(name = %config.function_name, id = %function.id, "function exists");
        return Ok(function.id);
    }

    let description = match std::env::var("GITHUB_REPOSITORY") {
        Ok(repo) if !repo.is_empty() => format!("Created from {}", repo),
        _ => "Created by ycfn".to_string(),
    };
    let operation = client
        .create_function(&config.folder_id, &config.function_name, &description)
        .await?;
    let operation = client.wait_operation(operation).await?;
    let id = operation
        .metadata_str("functionId")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::FunctionNotCreated(config.function_name.clone()))?
        .to_string();

    info!(name = %config.function_name, id = %id, "function created");
    Ok(id)
}

async fn upload<C>(
    client: &C,
    bucket: &str,
    function_id: &str,
    commit: &str,
    archive: &ArchiveBuffer,
) -> Result<Package>
where
    C: ObjectStorage + ?Sized,
{
    let object_name = format!("{}/{}.zip", function_id, commit);
    info!(bucket, object = %object_name, "uploading archive");
    client
        .put_object(bucket, &object_name, archive.as_bytes().to_vec())
        .await?;

    Ok(Package {
        bucket_name: bucket.to_string(),
        object_name,
        sha256: archive.sha256_hex(),
    })
}

async fn create_version<C>(
    client: &C,
    deployment: &Deployment,
    function_id: &str,
    archive: ArchiveBuffer,
    package: Option<Package>,
) -> Result<String>
where
    C: Cloud + ?Sized,
{
    let config = &deployment.config;
    let folder_id = config.folder_id.as_str();
    info!(memory = deployment.memory, timeout = config.execution_timeout, "creating version");

    let service_account_id = service_account::resolve(
        client,
        folder_id,
        &config.service_account,
        &config.service_account_name,
    )
    .await?;
    let secrets = secrets::resolve_latest(client, folder_id, deployment.secrets.clone()).await?;
    let async_invocation_config = invocation::build(
        client,
        folder_id,
        &config.async_invocation,
        service_account_id.as_deref(),
    )
    .await?;

    let content = match package {
        Some(_) => None,
        None => Some(BASE64.encode(archive.into_bytes())),
    };
    let request = CreateVersionRequest {
        function_id: function_id.to_string(),
        runtime: config.runtime.clone(),
        entrypoint: config.entrypoint.clone(),
        resources: Resources {
            memory: deployment.memory.to_string(),
        },
        execution_timeout: format!("{}s", config.execution_timeout),
        service_account_id,
        description: config.description.clone(),
        environment: deployment.environment.clone(),
        tag: deployment.tags.clone(),
        secrets,
        connectivity: non_empty(&config.network_id).map(|network_id| Connectivity { network_id }),
        log_options: LogOptions {
            disabled: config.logs_disabled,
            log_group_id: non_empty(&config.logs_group_id),
            min_level: deployment.log_level,
        },
        async_invocation_config,
        mounts: deployment.mounts.iter().map(MountSpec::from).collect(),
        package,
        content,
    };

    let operation = client.create_version(&request).await?;
    debug!(id = %operation.id, "operation created");
    let operation = client.wait_operation(operation).await?;
    let version_id = operation
        .metadata_str("functionVersionId")
        .ok_or_else(|| ApiError::MissingMetadata(operation.id.clone()))?
        .to_string();

    info!(version_id = %version_id, "function version created");
    Ok(version_id)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
