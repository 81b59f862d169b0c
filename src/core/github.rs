//! GitHub Actions runner integration.
//!
//! Step outputs and the job summary are appended to the files named by
//! `GITHUB_OUTPUT` and `GITHUB_STEP_SUMMARY`. Outside a runner both are
//! silently skipped.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::core::constants::CONSOLE_URL;
use crate::error::Result;

/// Files the runner collects outputs and the summary from.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    pub output_file: Option<PathBuf>,
    pub summary_file: Option<PathBuf>,
}

impl Runner {
    /// Read the runner file locations from the environment.
    pub fn from_env() -> Self {
        let path = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            output_file: path("GITHUB_OUTPUT"),
            summary_file: path("GITHUB_STEP_SUMMARY"),
        }
    }

    /// Set a step output.
    pub fn set_output(&self, name: &str, value: &str) -> Result<()> {
        debug!(name, value, "set output");
        let Some(path) = &self.output_file else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if value.contains('\n') {
            let delimiter = format!("ycfn_{}", std::process::id());
            writeln!(file, "{name}<<{delimiter}\n{value}\n{delimiter}")?;
        } else {
            writeln!(file, "{name}={value}")?;
        }
        Ok(())
    }

    /// Append markdown to the job summary.
    pub fn write_summary(&self, markdown: &str) -> Result<()> {
        let Some(path) = &self.summary_file else {
            return Ok(());
        };
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(markdown.as_bytes())?;
        Ok(())
    }
}

/// What a deployment achieved, for the job summary.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub function_name: Option<String>,
    pub function_id: Option<String>,
    pub version_id: Option<String>,
    pub folder_id: Option<String>,
    pub bucket: Option<String>,
    pub bucket_object: Option<String>,
    pub error: Option<String>,
}

impl Summary {
    /// Render as a markdown heading and list.
    pub fn to_markdown(&self) -> String {
        let mut items = Vec::new();
        if let Some(name) = &self.function_name {
            items.push(format!("Function Name: {}", name));
        }
        if let (Some(id), Some(folder)) = (&self.function_id, &self.folder_id) {
            let url = format!("{CONSOLE_URL}/folders/{folder}/functions/functions/{id}/overview");
            items.push(format!("Function ID: <a href=\"{url}\">{id}</a>"));
        }
        if let Some(version) = &self.version_id {
            items.push(format!("Version ID: {}", version));
        }
        if let Some(bucket) = &self.bucket {
            items.push(format!("Bucket: {}", bucket));
        }
        if let Some(object) = &self.bucket_object {
            items.push(format!("Bucket Object: {}", object));
        }
        match &self.error {
            Some(error) => items.push(format!("❌ Error: {}", error)),
            None => items.push("✅ Success".to_string()),
        }

        let mut markdown = String::from("## Yandex Cloud Function Deployment Summary\n\n");
        for item in items {
            markdown.push_str(&format!("- {}\n", item));
        }
        markdown
    }
}
