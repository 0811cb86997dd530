//! Engine error types.

use std::path::PathBuf;

use homeaccount_shared::AppError;
use thiserror::Error;

use super::types::UnitKind;

/// Failure reported by a ledger backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct BackendError {
    message: String,
}

impl BackendError {
    /// Creates a backend error from a driver message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The driver message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while applying or inspecting units.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The ledger table could not be created, read, or written.
    #[error("{kind} ledger unavailable: {source}")]
    Ledger {
        /// Engine kind.
        kind: UnitKind,
        /// Backend failure.
        #[source]
        source: BackendError,
    },

    /// A unit's SQL failed; the pass was aborted at this unit.
    #[error("{kind} {name} failed: {source}")]
    Execution {
        /// Engine kind.
        kind: UnitKind,
        /// Filename of the failing unit.
        name: String,
        /// Backend failure.
        #[source]
        source: BackendError,
    },

    /// The unit directory or a unit file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Ledger { .. } => Self::Database(err.to_string()),
            EngineError::Execution { .. } => Self::Migration(err.to_string()),
            EngineError::Io { .. } => Self::Internal(err.to_string()),
        }
    }
}
