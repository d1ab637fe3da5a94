//! Error types and exit codes for vaultnorm.

use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes used by the CLI.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const VAULT_NOT_FOUND: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const FILES_FAILED: i32 = 4;
}

/// Main error type for vaultnorm operations.
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Vault not found at: {0}")]
    VaultNotFound(PathBuf),

    #[error("Invalid vault path: {0}")]
    InvalidVaultPath(PathBuf),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(String),
}

impl VaultError {
    /// Returns the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            VaultError::VaultNotFound(_) | VaultError::InvalidVaultPath(_) => {
                exit_code::VAULT_NOT_FOUND
            }
            VaultError::ConfigError(_) | VaultError::TomlParse(_) => exit_code::CONFIG_ERROR,
            _ => exit_code::GENERAL_ERROR,
        }
    }
}

/// Result type alias for vaultnorm operations.
pub type Result<T> = std::result::Result<T, VaultError>;

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FilesFailed,
}

impl ExitCode {
    /// Convert to exit code integer.
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => exit_code::SUCCESS,
            ExitCode::FilesFailed => exit_code::FILES_FAILED,
        }
    }
}
