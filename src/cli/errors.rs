//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::index::IndexError;
use crate::storage::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file missing, unreadable or invalid
    ConfigError,
    IoError,
    AlreadyInitialized,
    /// Store could not be opened or the server could not start
    BootFailed,
    IndexSetupFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CONTENTED_CLI_CONFIG_ERROR",
            Self::IoError => "CONTENTED_CLI_IO_ERROR",
            Self::AlreadyInitialized => "CONTENTED_CLI_ALREADY_INITIALIZED",
            Self::BootFailed => "CONTENTED_CLI_BOOT_FAILED",
            Self::IndexSetupFailed => "CONTENTED_CLI_INDEX_SETUP_FAILED",
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "Data directory already initialized",
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn index_setup_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IndexSetupFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<StorageError> for CliError {
    fn from(e: StorageError) -> Self {
        Self::boot_failed(format!("Failed to open document store: {}", e))
    }
}

impl From<IndexError> for CliError {
    fn from(e: IndexError) -> Self {
        Self::index_setup_failed(e.to_string())
    }
}

pub type CliResult<T> = Result<T, CliError>;
