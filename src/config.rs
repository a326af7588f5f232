//! Installation-wide generator configuration.
//!
//! Loaded from a JSON document and/or `COURIER_*` environment variables.
//! Once built it is never mutated by a job, so one configuration can be
//! shared by concurrent `produce` calls.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CourierError;

pub const ENV_BASE_URL: &str = "COURIER_BASE_URL";
pub const ENV_BINARY_PATH: &str = "COURIER_BINARY_PATH";
pub const ENV_STORAGE_PATH: &str = "COURIER_STORAGE_PATH";
pub const ENV_TIMEOUT: &str = "COURIER_TIMEOUT";
pub const ENV_RENDER_SCRIPT: &str = "COURIER_RENDER_SCRIPT";
pub const ENV_MERGE_TOOL: &str = "COURIER_MERGE_TOOL";
pub const ENV_COMMAND_LINE_OPTIONS: &str = "COURIER_COMMAND_LINE_OPTIONS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Injected as `<base href>` into every staged document.
    pub base_url: Option<String>,
    /// Renderer executable (default: `courier-render` from `PATH`).
    pub binary_path: PathBuf,
    /// Directory for temporary HTML and PDF files.
    #[serde(alias = "temporary_file_path")]
    pub storage_path: Option<PathBuf>,
    /// Subprocess timeout in seconds; `0` disables the limit.
    #[serde(alias = "timeout")]
    pub timeout_secs: u64,
    /// Flags passed to the renderer ahead of the positional arguments.
    pub command_line_options: Vec<String>,
    /// Script handed to script-hosting renderers; omitted when unset.
    #[serde(alias = "generation_script")]
    pub render_script: Option<PathBuf>,
    /// PDF concatenation utility used by `merge`.
    pub merge_tool: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            binary_path: PathBuf::from("courier-render"),
            storage_path: None,
            timeout_secs: 60,
            command_line_options: Vec::new(),
            render_script: None,
            merge_tool: PathBuf::from("pdfunite"),
        }
    }
}

impl GeneratorConfig {
    pub fn from_json(json: &str) -> Result<Self, CourierError> {
        serde_json::from_str(json)
            .map_err(|e| CourierError::Configuration(format!("invalid config JSON: {e}")))
    }

    pub fn from_file(path: &Path) -> Result<Self, CourierError> {
        let text = fs::read_to_string(path).map_err(|e| {
            CourierError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&text)
    }

    /// Overlay values from the process environment.
    pub fn apply_env(self) -> Result<Self, CourierError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`; empty values are ignored.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, CourierError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_BASE_URL) {
            self.base_url = Some(url);
        }
        if let Some(path) = get(ENV_BINARY_PATH) {
            self.binary_path = PathBuf::from(path);
        }
        if let Some(path) = get(ENV_STORAGE_PATH) {
            self.storage_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = get(ENV_TIMEOUT) {
            self.timeout_secs = secs.trim().parse().map_err(|_| {
                CourierError::Configuration(format!("{ENV_TIMEOUT} must be whole seconds, got `{secs}`"))
            })?;
        }
        if let Some(path) = get(ENV_RENDER_SCRIPT) {
            self.render_script = Some(PathBuf::from(path));
        }
        if let Some(tool) = get(ENV_MERGE_TOOL) {
            self.merge_tool = PathBuf::from(tool);
        }
        if let Some(options) = get(ENV_COMMAND_LINE_OPTIONS) {
            self.command_line_options = options.split_whitespace().map(str::to_string).collect();
        }
        Ok(self)
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn with_binary_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary_path = path.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_render_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.render_script = Some(path.into());
        self
    }

    pub fn with_merge_tool(mut self, tool: impl Into<PathBuf>) -> Self {
        self.merge_tool = tool.into();
        self
    }

    pub fn add_command_line_option(mut self, option: impl Into<String>) -> Self {
        self.command_line_options.push(option.into());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}
