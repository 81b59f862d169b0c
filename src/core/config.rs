//! Deployment configuration.
//!
//! Settings come from an optional TOML file and are overridden by command
//! line flags or the `INPUT_*` variables GitHub Actions sets for each action
//! input. [`DeployConfig::validate`] turns the merged settings into a
//! [`Deployment`] with every free-form input parsed.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::core::constants;
use crate::core::inputs::{self, LogLevel, Mount};
use crate::core::secrets::{self, SecretRef};
use crate::error::{ConfigError, Result};

/// Deployment settings, keyed like the action inputs (`folder-id`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DeployConfig {
    pub folder_id: String,
    pub function_name: String,
    pub runtime: String,
    pub entrypoint: String,
    pub memory: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub source_root: String,
    /// Seconds.
    pub execution_timeout: u64,
    pub environment: Vec<String>,
    pub service_account: String,
    pub service_account_name: String,
    pub bucket: String,
    pub description: String,
    pub secrets: Vec<String>,
    pub network_id: String,
    pub tags: Vec<String>,
    pub logs_disabled: bool,
    pub logs_group_id: String,
    pub log_level: String,
    pub mounts: Vec<String>,
    #[serde(rename = "async")]
    pub async_invocation: AsyncSettings,
}

/// Async invocation settings (`[async]` table in the config file).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct AsyncSettings {
    pub enabled: bool,
    pub sa_id: String,
    pub sa_name: String,
    pub retries_count: u32,
    pub success_ymq_arn: String,
    pub success_sa_id: String,
    pub success_sa_name: String,
    pub failure_ymq_arn: String,
    pub failure_sa_id: String,
    pub failure_sa_name: String,
}

impl Default for AsyncSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            sa_id: String::new(),
            sa_name: String::new(),
            retries_count: constants::DEFAULT_ASYNC_RETRIES,
            success_ymq_arn: String::new(),
            success_sa_id: String::new(),
            success_sa_name: String::new(),
            failure_ymq_arn: String::new(),
            failure_sa_id: String::new(),
            failure_sa_name: String::new(),
        }
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            folder_id: String::new(),
            function_name: String::new(),
            runtime: String::new(),
            entrypoint: String::new(),
            memory: constants::DEFAULT_MEMORY.to_string(),
            include: Vec::new(),
            exclude: Vec::new(),
            source_root: ".".to_string(),
            execution_timeout: constants::DEFAULT_EXECUTION_TIMEOUT,
            environment: Vec::new(),
            service_account: String::new(),
            service_account_name: String::new(),
            bucket: String::new(),
            description: String::new(),
            secrets: Vec::new(),
            network_id: String::new(),
            tags: Vec::new(),
            logs_disabled: false,
            logs_group_id: String::new(),
            log_level: String::new(),
            mounts: Vec::new(),
            async_invocation: AsyncSettings::default(),
        }
    }
}

/// Settings with every free-form input parsed.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub config: DeployConfig,
    /// Bytes.
    pub memory: u64,
    pub log_level: LogLevel,
    pub secrets: Vec<SecretRef>,
    pub environment: BTreeMap<String, String>,
    pub mounts: Vec<Mount>,
    pub tags: Vec<String>,
}

impl DeployConfig {
    /// Load settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Check required fields and parse every free-form input.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingField` for an absent required input and
    /// `InputError` for the first malformed one.
    pub fn validate(self) -> Result<Deployment> {
        let required = [
            ("folder-id", &self.folder_id),
            ("function-name", &self.function_name),
            ("runtime", &self.runtime),
            ("entrypoint", &self.entrypoint),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField { field }.into());
            }
        }

        if self.execution_timeout == 0 {
            return Err(ConfigError::InvalidValue {
                field: "execution-timeout",
                reason: "must be at least one second".to_string(),
            }
            .into());
        }

        crate::core::invocation::validate(&self.async_invocation)?;

        let memory = inputs::parse_memory(&self.memory)?;
        let log_level = inputs::parse_log_level(&self.log_level)?;
        let secrets = secrets::parse_references(&self.secrets)?;
        let environment = inputs::parse_environment(&self.environment)?;
        let mounts = inputs::parse_mounts(&self.mounts)?;
        let tags = inputs::filter_patterns(&self.tags);

        debug!(
            memory,
            secrets = secrets.len(),
            mounts = mounts.len(),
            "inputs parsed"
        );

        Ok(Deployment {
            config: self,
            memory,
            log_level,
            secrets,
            environment,
            mounts,
            tags,
        })
    }
}

/// Parse a boolean input the way GitHub Actions does.
pub fn parse_bool(field: &'static str, value: &str) -> std::result::Result<bool, ConfigError> {
    match value.trim() {
        "true" | "True" | "TRUE" => Ok(true),
        "false" | "False" | "FALSE" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            field,
            reason: format!("expected true or false, got '{}'", other),
        }),
    }
}
