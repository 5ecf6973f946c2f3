mod file_config;

pub use file_config::FileConfig;

use crate::binning::DEFAULT_BIN_CAPACITY;
use anyhow::{anyhow, bail, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

pub const DEFAULT_TRIGGER: &str = "vinyl-bins";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub bin_capacity: Option<usize>,
    pub default_trigger: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub bin_capacity: NonZeroUsize,
    pub default_trigger: String,
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("db_path must be specified on the command line or in config file"))?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let bin_capacity = match file.bin_capacity.or(cli.bin_capacity) {
            Some(capacity) => NonZeroUsize::new(capacity)
                .ok_or_else(|| anyhow!("bin_capacity must be at least 1"))?,
            None => DEFAULT_BIN_CAPACITY,
        };

        let default_trigger = file
            .default_trigger
            .or_else(|| cli.default_trigger.clone())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRIGGER.to_string());

        let log_level = file.log_level.or_else(|| cli.log_level.clone());

        Ok(Self {
            db_path,
            bin_capacity,
            default_trigger,
            log_level,
        })
    }

    /// The trigger for one command: the explicit one if given, else the default.
    pub fn trigger_or_default(&self, trigger: Option<String>) -> String {
        trigger.unwrap_or_else(|| self.default_trigger.clone())
    }
}
