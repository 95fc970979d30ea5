//! Error types for `support_tickets`.
//!
//! Store operations only ever fail with [`TicketError::Storage`]; the remaining
//! variants come from configuration loading.

use std::fmt;
use thiserror::Error;

/// Where in an operation a storage failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageStage {
    /// Opening the database file or configuring the connection.
    Open,
    /// Preparing or running a statement, or decoding its rows.
    Execute,
    /// Committing a write transaction.
    Commit,
}

impl StorageStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Execute => "execute",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for StorageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Primary error type for ticket store operations.
#[derive(Error, Debug)]
pub enum TicketError {
    // === Storage Errors ===
    /// Any failure to open, read from, write to, or commit against the database.
    #[error("Storage failure in {op} ({stage}): {source}")]
    Storage {
        op: &'static str,
        stage: StorageStage,
        #[source]
        source: rusqlite::Error,
    },

    // === Configuration Errors ===
    /// Configuration value could not be interpreted.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid YAML.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TicketError {
    #[must_use]
    pub const fn storage(op: &'static str, stage: StorageStage, source: rusqlite::Error) -> Self {
        Self::Storage { op, stage, source }
    }

    /// Returns the failing stage if this is a storage failure.
    #[must_use]
    pub const fn storage_stage(&self) -> Option<StorageStage> {
        match self {
            Self::Storage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}

/// Result type using `TicketError`.
pub type Result<T> = std::result::Result<T, TicketError>;
