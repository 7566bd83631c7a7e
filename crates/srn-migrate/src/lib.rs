//! Workspace-to-scope migration engine
//!
//! Moves data out of legacy flat workspace partitions into hierarchical
//! scope partitions:
//!
//! - **Discovery & analysis**: find legacy partitions under a working
//!   directory and inventory their storage artifacts
//!   ([`MigrationEngine::discover_workspaces`], [`MigrationEngine::analyze`])
//! - **Planning**: build and validate a [`MigrationPlan`] against a target
//!   scope before touching any data
//! - **Execution**: dry-run or real migration, tagging every record with
//!   the target scope's filter fields ([`MigrationEngine::execute`])
//! - **Lifecycle**: per-migration status in a shared [`StatusStore`],
//!   driven through the monotonic `pending -> running -> {completed |
//!   failed}` state machine, with one-way rollback from `completed`
//!
//! Item-level problems are logged and skipped; migration-level problems
//! abort the run and mark it `failed`. Rollback failures surface loudly
//! instead of silently reporting success.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod plan;
pub mod status;

pub use config::{MigrationConfig, DEFAULT_LARGE_DATASET_ITEMS, DEFAULT_LARGE_FILE_BYTES};
pub use engine::{MigrationEngine, MigrationOutcome};
pub use error::MigrationError;
pub use plan::{
    MigrationEstimate, MigrationPlan, StorageFileInfo, StorageKind, WorkspaceAnalysis,
};
pub use status::{
    allowed_transitions, validate_transition, MigrationId, MigrationState, MigrationStatus,
    StatusStore,
};

/// Commonly used migration types
pub mod prelude {
    pub use crate::config::MigrationConfig;
    pub use crate::engine::{MigrationEngine, MigrationOutcome};
    pub use crate::error::MigrationError;
    pub use crate::plan::{MigrationPlan, StorageKind, WorkspaceAnalysis};
    pub use crate::status::{MigrationId, MigrationState, MigrationStatus, StatusStore};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
