//! CLI configuration
//!
//! Layered as defaults, then an optional file, then `MULTISIG__*`
//! environment variables (e.g. `MULTISIG__ENGINE__DAO=0xdao`).

use crate::error::CliResult;
use multisig_runtime::EngineConfig;
use multisig_types::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Engine installed by `multisig init`
    pub engine: EngineConfig,

    /// Where the engine snapshot lives
    pub state_path: String,

    /// Supervising parent to install with, if any
    pub parent: Option<Address>,

    pub logging: LoggingConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            state_path: default_state_path(),
            parent: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_state_path() -> String {
    "multisig-state.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Use JSON format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&CliConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("MULTISIG")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
