//! Command-line interface.
//!
//! Every deployment flag also reads the variable GitHub Actions sets for the
//! matching action input (`INPUT_FOLDER-ID` for `--folder-id`), so the binary
//! runs unchanged as an action step. Empty values count as unset.

pub mod deploy;
pub mod output;
pub mod package;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::core::config::{parse_bool, DeployConfig};
use crate::error::{ConfigError, Result};

/// ycfn - Package and deploy Yandex Cloud Serverless Functions.
#[derive(Parser)]
#[command(
    name = "ycfn",
    about = "Package and deploy Yandex Cloud Serverless Functions",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Build the archive and deploy a new function version
    Deploy(DeployArgs),

    /// Build the archive only and write it to a file
    Package(PackageArgs),
}

/// Execute a command.
///
/// # Errors
///
/// Returns error if the command execution fails.
pub fn execute(command: Command) -> Result<()> {
    match command {
        Command::Deploy(args) => deploy::execute(args),
        Command::Package(args) => package::execute(args),
    }
}

/// Where the sources are and which of them to pack.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// TOML file with default settings
    #[arg(long, env = "YCFN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory relative paths are resolved against
    #[arg(long, env = "GITHUB_WORKSPACE", default_value = ".")]
    pub workspace: PathBuf,

    /// Source root, relative to the workspace
    #[arg(long, env = "INPUT_SOURCE-ROOT")]
    pub source_root: Option<String>,

    /// Include patterns, one per line
    #[arg(long, env = "INPUT_INCLUDE", value_delimiter = '\n')]
    pub include: Vec<String>,

    /// Exclude patterns, one per line
    #[arg(long, env = "INPUT_EXCLUDE", value_delimiter = '\n')]
    pub exclude: Vec<String>,
}

/// `ycfn package` arguments.
#[derive(Args, Debug, Clone)]
pub struct PackageArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Where to write the zip
    #[arg(short, long, default_value = "function.zip")]
    pub output: PathBuf,

    /// List every packed file
    #[arg(long)]
    pub list: bool,
}

/// `ycfn deploy` arguments.
#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// IAM token used for every API call
    #[arg(long, env = "INPUT_YC-IAM-TOKEN", hide_env_values = true)]
    pub iam_token: Option<String>,

    /// Serve every API from this base URL
    #[arg(long, env = "YCFN_ENDPOINT", hide = true)]
    pub endpoint: Option<String>,

    #[arg(long, env = "INPUT_FOLDER-ID")]
    pub folder_id: Option<String>,

    #[arg(long, env = "INPUT_FUNCTION-NAME")]
    pub function_name: Option<String>,

    /// Runtime, e.g. nodejs18
    #[arg(long, env = "INPUT_RUNTIME")]
    pub runtime: Option<String>,

    #[arg(long, env = "INPUT_ENTRYPOINT")]
    pub entrypoint: Option<String>,

    /// Memory limit, e.g. 256Mb or 1Gb
    #[arg(long, env = "INPUT_MEMORY")]
    pub memory: Option<String>,

    /// Execution timeout in seconds
    #[arg(long, env = "INPUT_EXECUTION-TIMEOUT")]
    pub execution_timeout: Option<String>,

    /// KEY=VALUE lines
    #[arg(long, env = "INPUT_ENVIRONMENT", value_delimiter = '\n')]
    pub environment: Vec<String>,

    #[arg(long, env = "INPUT_SERVICE-ACCOUNT")]
    pub service_account: Option<String>,

    #[arg(long, env = "INPUT_SERVICE-ACCOUNT-NAME")]
    pub service_account_name: Option<String>,

    /// Upload the archive to this bucket instead of sending it inline
    #[arg(long, env = "INPUT_BUCKET")]
    pub bucket: Option<String>,

    #[arg(long, env = "INPUT_DESCRIPTION")]
    pub description: Option<String>,

    /// ENV=secretIdOrName/versionId/key lines
    #[arg(long, env = "INPUT_SECRETS", value_delimiter = '\n')]
    pub secrets: Vec<String>,

    #[arg(long, env = "INPUT_NETWORK-ID")]
    pub network_id: Option<String>,

    #[arg(long, env = "INPUT_TAGS", value_delimiter = '\n')]
    pub tags: Vec<String>,

    #[arg(long, env = "INPUT_LOGS-DISABLED")]
    pub logs_disabled: Option<String>,

    #[arg(long, env = "INPUT_LOGS-GROUP-ID")]
    pub logs_group_id: Option<String>,

    /// Minimum log level: trace, debug, info, warn, error or fatal
    #[arg(long, env = "INPUT_LOG-LEVEL")]
    pub log_level: Option<String>,

    /// <mount>:<bucket>[/<prefix>][:ro] lines
    #[arg(long, env = "INPUT_MOUNTS", value_delimiter = '\n')]
    pub mounts: Vec<String>,

    #[command(flatten)]
    pub async_invocation: AsyncArgs,
}

/// Async invocation flags.
#[derive(Args, Debug, Clone, Default)]
pub struct AsyncArgs {
    #[arg(long = "async", env = "INPUT_ASYNC")]
    pub enabled: Option<String>,

    #[arg(long = "async-sa-id", env = "INPUT_ASYNC-SA-ID")]
    pub sa_id: Option<String>,

    #[arg(long = "async-sa-name", env = "INPUT_ASYNC-SA-NAME")]
    pub sa_name: Option<String>,

    #[arg(long = "async-retries-count", env = "INPUT_ASYNC-RETRIES-COUNT")]
    pub retries_count: Option<String>,

    #[arg(long = "async-success-ymq-arn", env = "INPUT_ASYNC-SUCCESS-YMQ-ARN")]
    pub success_ymq_arn: Option<String>,

    #[arg(long = "async-success-sa-id", env = "INPUT_ASYNC-SUCCESS-SA-ID")]
    pub success_sa_id: Option<String>,

    #[arg(long = "async-success-sa-name", env = "INPUT_ASYNC-SUCCESS-SA-NAME")]
    pub success_sa_name: Option<String>,

    #[arg(long = "async-failure-ymq-arn", env = "INPUT_ASYNC-FAILURE-YMQ-ARN")]
    pub failure_ymq_arn: Option<String>,

    #[arg(long = "async-failure-sa-id", env = "INPUT_ASYNC-FAILURE-SA-ID")]
    pub failure_sa_id: Option<String>,

    #[arg(long = "async-failure-sa-name", env = "INPUT_ASYNC-FAILURE-SA-NAME")]
    pub failure_sa_name: Option<String>,
}

/// Non-blank value, trimmed.
fn given(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn override_str(target: &mut String, value: &Option<String>) {
    if let Some(v) = given(value) {
        *target = v;
    }
}

fn override_lines(target: &mut Vec<String>, lines: &[String]) {
    if lines.iter().any(|l| !l.trim().is_empty()) {
        *target = lines.to_vec();
    }
}

fn override_parsed<T: std::str::FromStr>(
    target: &mut T,
    field: &'static str,
    value: &Option<String>,
) -> std::result::Result<(), ConfigError> {
    if let Some(v) = given(value) {
        *target = v.parse().map_err(|_| ConfigError::InvalidValue {
            field,
            reason: format!("expected a non-negative integer, got '{}'", v),
        })?;
    }
    Ok(())
}

fn override_bool(
    target: &mut bool,
    field: &'static str,
    value: &Option<String>,
) -> std::result::Result<(), ConfigError> {
    if let Some(v) = given(value) {
        *target = parse_bool(field, &v)?;
    }
    Ok(())
}

impl SourceArgs {
    /// The config file, or defaults when none was given.
    fn base_config(&self) -> Result<DeployConfig> {
        match &self.config {
            Some(path) => DeployConfig::load(&self.workspace.join(path)),
            None => Ok(DeployConfig::default()),
        }
    }

    /// Apply the source flags over `config`.
    fn apply(&self, config: &mut DeployConfig) {
        override_str(&mut config.source_root, &self.source_root);
        override_lines(&mut config.include, &self.include);
        override_lines(&mut config.exclude, &self.exclude);
    }

    /// Settings from the config file with the source flags applied.
    pub fn to_config(&self) -> Result<DeployConfig> {
        let mut config = self.base_config()?;
        self.apply(&mut config);
        Ok(config)
    }
}

impl DeployArgs {
    /// Merge the config file and flags. Flags win.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for an unreadable config file or a malformed
    /// number or boolean.
    pub fn to_config(&self) -> Result<DeployConfig> {
        let mut config = self.source.to_config()?;

        override_str(&mut config.folder_id, &self.folder_id);
        override_str(&mut config.function_name, &self.function_name);
        override_str(&mut config.runtime, &self.runtime);
        override_str(&mut config.entrypoint, &self.entrypoint);
        override_str(&mut config.memory, &self.memory);
        override_parsed(
            &mut config.execution_timeout,
            "execution-timeout",
            &self.execution_timeout,
        )?;
        override_lines(&mut config.environment, &self.environment);
        override_str(&mut config.service_account, &self.service_account);
        override_str(&mut config.service_account_name, &self.service_account_name);
        override_str(&mut config.bucket, &self.bucket);
        override_str(&mut config.description, &self.description);
        override_lines(&mut config.secrets, &self.secrets);
        override_str(&mut config.network_id, &self.network_id);
        override_lines(&mut config.tags, &self.tags);
        override_bool(&mut config.logs_disabled, "logs-disabled", &self.logs_disabled)?;
        override_str(&mut config.logs_group_id, &self.logs_group_id);
        override_str(&mut config.log_level, &self.log_level);
        override_lines(&mut config.mounts, &self.mounts);

        let a = &self.async_invocation;
        let target = &mut config.async_invocation;
        override_bool(&mut target.enabled, "async", &a.enabled)?;
        override_str(&mut target.sa_id, &a.sa_id);
        override_str(&mut target.sa_name, &a.sa_name);
        override_parsed(&mut target.retries_count, "async-retries-count", &a.retries_count)?;
        override_str(&mut target.success_ymq_arn, &a.success_ymq_arn);
        override_str(&mut target.success_sa_id, &a.success_sa_id);
        override_str(&mut target.success_sa_name, &a.success_sa_name);
        override_str(&mut target.failure_ymq_arn, &a.failure_ymq_arn);
        override_str(&mut target.failure_sa_id, &a.failure_sa_id);
        override_str(&mut target.failure_sa_name, &a.failure_sa_name);

        Ok(config)
    }
}
