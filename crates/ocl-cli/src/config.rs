use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "OCL_CONFIG";

/// Settings read from a TOML file. Every field has a default, so an empty
/// file (or no file) is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Image layout directory.
    pub layout: PathBuf,
    /// Default log level: error, warn, info, debug or trace.
    pub log_level: String,
    pub format: OutputFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            layout: PathBuf::from("."),
            log_level: "warn".into(),
            format: OutputFormat::Text,
        }
    }
}

impl CliConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("parse config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Load from `--config`, then `$OCL_CONFIG`, then defaults, and apply the
    /// command-line overrides on top.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let path = cli
            .config
            .clone()
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };

        if let Some(layout) = &cli.layout {
            config.layout = layout.clone();
        }
        if let Some(format) = cli.format {
            config.format = format;
        }
        match cli.verbose {
            0 => {}
            1 => config.log_level = "debug".into(),
            _ => config.log_level = "trace".into(),
        }
        Ok(config)
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid log_level {:?}", self.log_level))
    }
}
