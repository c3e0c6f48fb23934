//! CLI error types

use multisig_types::MultisigError;
use thiserror::Error;

/// CLI error types
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The engine rejected the operation
    #[error("Governance error: {0}")]
    Governance(#[from] MultisigError),

    #[error("No state at {0}; run `multisig init` first")]
    NotInitialized(String),

    #[error("State already exists at {0}; pass --force to overwrite")]
    AlreadyInitialized(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
