//! Migration status tracking
//!
//! Each migration owns one [`MigrationStatus`] record in a [`StatusStore`].
//! The lifecycle is a small monotonic state machine:
//!
//! `pending -> running -> {completed | failed}`, plus the one-way
//! `completed -> rolled_back` edge. Nothing leaves `failed` or
//! `rolled_back`, and a rolled-back migration is never re-run.

use crate::error::MigrationError;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use uuid::Uuid;

/// Unique migration identifier, minted fresh per `execute` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MigrationId(Uuid);

impl MigrationId {
    /// Mint a new random id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MigrationId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MigrationId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationState {
    /// Created, not yet started
    Pending,
    /// Walking the legacy partition
    Running,
    /// Finished successfully
    Completed,
    /// Aborted at migration level
    Failed,
    /// Undone after completion
    RolledBack,
}

impl MigrationState {
    /// Canonical lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::RolledBack => "rolled_back",
        }
    }

    /// Whether execution can no longer make progress from this state
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::RolledBack)
    }
}

impl Display for MigrationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States reachable in one step from `from`
#[must_use]
pub fn allowed_transitions(from: MigrationState) -> Vec<MigrationState> {
    use MigrationState::*;
    match from {
        Pending => vec![Running],
        Running => vec![Completed, Failed],
        Completed => vec![RolledBack],
        Failed => vec![],
        RolledBack => vec![],
    }
}

/// Validate a state transition
///
/// # Errors
/// Returns [`MigrationError::IllegalTransition`] for any edge outside the
/// lifecycle graph.
pub fn validate_transition(
    from: MigrationState,
    to: MigrationState,
) -> Result<(), MigrationError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(MigrationError::IllegalTransition { from, to })
    }
}

/// Status record for one migration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationStatus {
    /// Migration identifier
    pub migration_id: MigrationId,
    /// Legacy workspace being migrated
    pub source_workspace: String,
    /// Canonical SRN of the target scope
    pub target_scope: String,
    /// Current lifecycle state
    pub state: MigrationState,
    /// When the migration was created
    pub started_at: DateTime<Utc>,
    /// When the migration reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,
    /// Records migrated so far
    pub items_migrated: u64,
    /// Total records the plan expects
    pub total_items: u64,
    /// Abort cause, when `state` is `failed`
    pub error_message: Option<String>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Files written by this migration, replayed on rollback
    pub undo_log: Vec<PathBuf>,
}

impl MigrationStatus {
    /// Create a fresh `pending` record
    #[must_use]
    pub fn new(
        migration_id: MigrationId,
        source_workspace: impl Into<String>,
        target_scope: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            migration_id,
            source_workspace: source_workspace.into(),
            target_scope: target_scope.into(),
            state: MigrationState::Pending,
            started_at: Utc::now(),
            finished_at: None,
            items_migrated: 0,
            total_items: 0,
            error_message: None,
            dry_run,
            undo_log: Vec::new(),
        }
    }

    /// Completion percentage, 0 when nothing was expected
    #[inline]
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.total_items == 0 {
            0.0
        } else {
            self.items_migrated as f64 / self.total_items as f64 * 100.0
        }
    }
}

/// Shared table of migration statuses, keyed by migration id
///
/// Owned by (or injected into) the migration engine. Mutations for one id
/// are serialized through the map's entry locks; reads return cloned
/// snapshots, so a reader never observes a half-updated record.
#[derive(Debug, Default)]
pub struct StatusStore {
    inner: DashMap<MigrationId, MigrationStatus>,
}

impl StatusStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fresh status record
    pub fn insert(&self, status: MigrationStatus) {
        self.inner.insert(status.migration_id, status);
    }

    /// Point-in-time snapshot of one migration
    #[must_use]
    pub fn get(&self, migration_id: MigrationId) -> Option<MigrationStatus> {
        self.inner.get(&migration_id).map(|entry| entry.clone())
    }

    /// Snapshots of all migrations, oldest first
    #[must_use]
    pub fn list(&self) -> Vec<MigrationStatus> {
        let mut all: Vec<MigrationStatus> =
            self.inner.iter().map(|entry| entry.clone()).collect();
        all.sort_by_key(|status| status.started_at);
        all
    }

    /// Mutate one record under its entry lock
    ///
    /// # Errors
    /// Returns [`MigrationError::NotFound`] for unknown ids.
    pub fn update(
        &self,
        migration_id: MigrationId,
        mutate: impl FnOnce(&mut MigrationStatus),
    ) -> Result<(), MigrationError> {
        let mut entry = self
            .inner
            .get_mut(&migration_id)
            .ok_or(MigrationError::NotFound(migration_id))?;
        mutate(&mut entry);
        Ok(())
    }

    /// Validated state transition, stamping `finished_at` on terminal states
    ///
    /// # Errors
    /// [`MigrationError::NotFound`] for unknown ids,
    /// [`MigrationError::IllegalTransition`] for edges outside the graph.
    pub fn transition(
        &self,
        migration_id: MigrationId,
        to: MigrationState,
    ) -> Result<(), MigrationError> {
        let mut entry = self
            .inner
            .get_mut(&migration_id)
            .ok_or(MigrationError::NotFound(migration_id))?;
        validate_transition(entry.state, to)?;
        entry.state = to;
        if to.is_terminal() {
            entry.finished_at = Some(Utc::now());
        }
        Ok(())
    }

    /// Number of tracked migrations
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
