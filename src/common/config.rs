//! Configuration file handling

use serde::Deserialize;
use std::path::Path;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Command catalog settings
    #[serde(default)]
    pub catalog: CatalogSettings,

    /// Test runner settings
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Settings consumed when the command catalog is built
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    /// Capability methods that must never be exposed as script commands
    #[serde(default = "default_reserved")]
    pub reserved: Vec<String>,

    /// Timeout handed to the page-load wait issued by `...AndWait` commands
    #[serde(default = "default_and_wait_timeout")]
    pub and_wait_timeout_ms: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            reserved: default_reserved(),
            and_wait_timeout_ms: default_and_wait_timeout(),
        }
    }
}

impl CatalogSettings {
    /// The AndWait timeout in the string form the automation handle expects
    pub fn and_wait_timeout(&self) -> String {
        self.and_wait_timeout_ms.to_string()
    }
}

fn default_reserved() -> Vec<String> {
    [
        "addCustomRequestHeader",
        "allowNativeXpath",
        "pause",
        "rollup",
        "setBrowserLogLevel",
        "setExtensionJs",
        "start",
        "stop",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_and_wait_timeout() -> u64 {
    30_000
}

/// Runner settings
#[derive(Debug, Deserialize, Clone)]
pub struct RunnerConfig {
    /// Maximum number of test cases executing at once
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    /// Stop scheduling new test cases once one aborts with a fatal error
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            fail_fast: false,
        }
    }
}

fn default_parallelism() -> usize {
    4
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| super::Error::FileRead {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))?;
        if config.runner.parallelism == 0 {
            tracing::warn!("runner.parallelism must be at least 1, using 1");
            config.runner.parallelism = 1;
        }
        Ok(config)
    }
}
