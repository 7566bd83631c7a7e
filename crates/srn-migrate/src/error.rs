//! Error types for the migration engine

use crate::status::{MigrationId, MigrationState};
use srn_scope::ScopeError;

/// Errors raised while planning, executing, or rolling back migrations
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The plan carried validation errors and was never executed
    #[error("migration {migration_id} validation failed: {}", errors.join(", "))]
    ValidationFailed {
        /// Migration that was marked failed
        migration_id: MigrationId,
        /// The plan's validation errors
        errors: Vec<String>,
    },

    /// Execution aborted at migration level
    #[error("migration {migration_id} failed: {message}")]
    ExecutionFailed {
        /// Migration that was marked failed
        migration_id: MigrationId,
        /// Cause of the abort
        message: String,
    },

    /// No status record for the given id
    #[error("migration {0} not found")]
    NotFound(MigrationId),

    /// A state transition outside the lifecycle graph was requested
    #[error("illegal migration state transition: {from} -> {to}")]
    IllegalTransition {
        /// Current state
        from: MigrationState,
        /// Requested state
        to: MigrationState,
    },

    /// The migration mutated storage but carries no undo log
    #[error("migration {0} cannot be rolled back: no undo log was recorded")]
    RollbackUnavailable(MigrationId),

    /// Target scope failure
    #[error(transparent)]
    Scope(#[from] ScopeError),

    /// Underlying storage became unreachable
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrationError {
    /// Stable machine-readable error code
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::ExecutionFailed { .. } => "EXECUTION_FAILED",
            Self::NotFound(_) => "MIGRATION_NOT_FOUND",
            Self::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            Self::RollbackUnavailable(_) => "ROLLBACK_UNAVAILABLE",
            Self::Scope(err) => err.code(),
            Self::Io(_) => "STORAGE_IO",
        }
    }
}
