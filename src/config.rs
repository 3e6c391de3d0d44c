//! Run configuration with layered resolution.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via [`IndexDocConfig::apply_cli_overrides`])
//! 2. Environment variables (`INDEX_DOC_HOST`, `INDEX_DOC_TIMEOUT_MS`)
//! 3. TOML config file (`--config`)
//! 4. Compiled defaults
//!
//! ```toml
//! host = "https://es.internal:9200"
//! timeout_ms = 10000
//! max_retries = 3
//! retry_delay_ms = 250
//! format = "json"
//! color = false
//! ```

use crate::cli::args::OutputFormat;
use crate::fetch::client::Endpoint;
use crate::IndexDocError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "http://localhost:9200";
pub const DEFAULT_TIMEOUT_MS: u64 = 30000;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;
/// Upper bound for `max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

pub const ENV_HOST: &str = "INDEX_DOC_HOST";
pub const ENV_TIMEOUT_MS: &str = "INDEX_DOC_TIMEOUT_MS";

/// Resolved configuration of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexDocConfig {
    /// Cluster endpoint
    pub host: String,
    /// Connect and read timeout per request
    pub timeout_ms: u64,
    /// Retries of a failed request
    pub max_retries: u32,
    /// Delay before the first retry; doubles with each retry
    pub retry_delay_ms: u64,
    /// Read the snapshot from this JSON file instead of the cluster
    pub snapshot_file: Option<PathBuf>,
    pub format: OutputFormat,
    pub color: bool,
}

impl Default for IndexDocConfig {
    fn default() -> Self {
        IndexDocConfig {
            host: DEFAULT_HOST.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            snapshot_file: None,
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// Keys of the TOML config file; absent keys leave the value below alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    timeout_ms: Option<u64>,
    max_retries: Option<u32>,
    retry_delay_ms: Option<u64>,
    snapshot: Option<PathBuf>,
    format: Option<OutputFormat>,
    color: Option<bool>,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub host: Option<String>,
    pub timeout_ms: Option<u64>,
    pub snapshot_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub no_color: bool,
}

impl IndexDocConfig {
    /// Resolve the configuration from every layer and validate it.
    pub fn load(config_file: Option<&Path>, cli: &CliOverrides) -> Result<Self, IndexDocError> {
        let mut config = IndexDocConfig::default();

        if let Some(path) = config_file {
            config.merge_toml_file(path)?;
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.apply_cli_overrides(cli);
        config.validate()?;

        tracing::debug!(host = %config.host, timeout_ms = config.timeout_ms, "configuration resolved");
        Ok(config)
    }

    /// Defaults overlaid with a TOML document.
    pub fn from_toml(toml_str: &str) -> Result<Self, IndexDocError> {
        let mut config = IndexDocConfig::default();
        config.merge_toml("<string>", toml_str)?;
        Ok(config)
    }

    fn merge_toml_file(&mut self, path: &Path) -> Result<(), IndexDocError> {
        let content = std::fs::read_to_string(path).map_err(|e| IndexDocError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.merge_toml(&path.display().to_string(), &content)
    }

    fn merge_toml(&mut self, origin: &str, content: &str) -> Result<(), IndexDocError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| IndexDocError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        })?;

        if let Some(host) = file.host {
            self.host = host;
        }
        if let Some(v) = file.timeout_ms {
            self.timeout_ms = v;
        }
        if let Some(v) = file.max_retries {
            self.max_retries = v;
        }
        if let Some(v) = file.retry_delay_ms {
            self.retry_delay_ms = v;
        }
        if file.snapshot.is_some() {
            self.snapshot_file = file.snapshot;
        }
        if let Some(v) = file.format {
            self.format = v;
        }
        if let Some(v) = file.color {
            self.color = v;
        }
        Ok(())
    }

    /// Apply `INDEX_DOC_*` variables read through `lookup`.
    ///
    /// Unparseable values are ignored with a warning.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.is_empty()) {
            self.host = host;
        }
        if let Some(val) = lookup(ENV_TIMEOUT_MS) {
            match val.parse::<u64>() {
                Ok(v) => self.timeout_ms = v,
                Err(_) => tracing::warn!(variable = ENV_TIMEOUT_MS, value = %val, "ignoring invalid value"),
            }
        }
    }

    /// Apply command line values (highest priority).
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref host) = cli.host {
            self.host = host.clone();
        }
        if let Some(v) = cli.timeout_ms {
            self.timeout_ms = v;
        }
        if let Some(ref path) = cli.snapshot_file {
            self.snapshot_file = Some(path.clone());
        }
        if let Some(v) = cli.format {
            self.format = v;
        }
        if cli.no_color {
            self.color = false;
        }
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), IndexDocError> {
        let invalid = |message: String| IndexDocError::Config {
            path: "<resolved>".to_string(),
            message,
        };

        if self.timeout_ms == 0 {
            return Err(invalid("timeout_ms must be greater than 0".to_string()));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(invalid(format!(
                "max_retries must be at most {}",
                MAX_RETRIES_LIMIT
            )));
        }
        if self.snapshot_file.is_none() {
            Endpoint::parse(&self.host).map_err(|e| invalid(e.to_string()))?;
        }
        Ok(())
    }
}
