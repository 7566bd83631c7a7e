//! Migration engine
//!
//! Analyzes legacy flat workspace partitions, builds and validates
//! migration plans against a target scope, executes (or dry-runs) the
//! move, and tracks per-migration status through the lifecycle state
//! machine. Item-level problems are logged and skipped; only
//! migration-level problems (absent partition, unreachable storage) abort
//! a run.

use crate::config::MigrationConfig;
use crate::error::MigrationError;
use crate::plan::{
    MigrationEstimate, MigrationPlan, StorageFileInfo, StorageKind, WorkspaceAnalysis,
};
use crate::status::{
    validate_transition, MigrationId, MigrationState, MigrationStatus, StatusStore,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use srn_grammar::validate_workspace;
use srn_scope::{tag_record, Scope, ScopeFilterable};
use std::path::Path;
use std::sync::Arc;

/// Result of one `execute` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationOutcome {
    /// Migration identifier minted for this call
    pub migration_id: MigrationId,
    /// Final state (`completed` for successful runs)
    pub state: MigrationState,
    /// Records migrated
    pub items_migrated: u64,
    /// Records the plan expected
    pub total_items: u64,
    /// Whether storage was left untouched
    pub dry_run: bool,
    /// Non-fatal findings carried over from the plan
    pub warnings: Vec<String>,
}

/// Engine for migrating legacy workspace partitions into scopes
#[derive(Debug)]
pub struct MigrationEngine {
    config: MigrationConfig,
    store: Arc<StatusStore>,
}

impl MigrationEngine {
    /// Create an engine owning a fresh status store
    #[must_use]
    pub fn new(config: MigrationConfig) -> Self {
        Self::with_store(config, Arc::new(StatusStore::new()))
    }

    /// Create an engine sharing an injected status store
    #[must_use]
    pub fn with_store(config: MigrationConfig, store: Arc<StatusStore>) -> Self {
        Self { config, store }
    }

    /// The status store backing this engine
    #[inline]
    #[must_use]
    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    /// Discover legacy workspace partitions under the working directory
    ///
    /// A directory counts as a workspace when it holds at least one KV
    /// storage file. A missing working directory yields an empty list.
    ///
    /// # Errors
    /// Returns [`MigrationError::Io`] if the directory cannot be read.
    pub async fn discover_workspaces(&self) -> Result<Vec<String>, MigrationError> {
        let mut workspaces = Vec::new();
        let mut entries = match tokio::fs::read_dir(self.config.working_dir()).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(workspaces),
            Err(err) => return Err(err.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "_" {
                continue;
            }
            if has_kv_storage(&entry.path()).await? {
                workspaces.push(name);
            }
        }

        workspaces.sort();
        Ok(workspaces)
    }

    /// Scan a legacy partition's storage artifacts
    ///
    /// Absence and scan failures are reported in the analysis, not raised:
    /// callers decide whether an unanalyzable workspace is fatal.
    pub async fn analyze(&self, workspace: &str) -> WorkspaceAnalysis {
        let mut analysis = WorkspaceAnalysis {
            workspace: workspace.to_string(),
            ..WorkspaceAnalysis::default()
        };

        let path = self.config.workspace_path(workspace);
        if tokio::fs::metadata(&path).await.is_err() {
            analysis.validation_errors.push(format!(
                "workspace directory does not exist: {}",
                path.display()
            ));
            return analysis;
        }
        analysis.exists = true;

        if let Err(err) = scan_storage_files(&path, &mut analysis).await {
            analysis
                .validation_errors
                .push(format!("failed to scan workspace '{workspace}': {err}"));
            return analysis;
        }

        self.add_recommendations(&mut analysis);
        analysis
    }

    fn add_recommendations(&self, analysis: &mut WorkspaceAnalysis) {
        if analysis.total_items == 0 {
            return;
        }
        if validate_workspace(&analysis.workspace).is_ok() {
            analysis.recommendations.push(
                "workspace id is already 32-char hex - suitable for direct scope conversion"
                    .to_string(),
            );
        } else {
            analysis.recommendations.push(
                "workspace id is not 32-char hex - mint a hex workspace id for the target scope"
                    .to_string(),
            );
        }
        if analysis.total_items > self.config.large_dataset_items {
            analysis
                .recommendations
                .push("large dataset - consider migrating in batches".to_string());
        }
        if analysis.total_size_bytes > self.config.large_file_bytes {
            analysis.recommendations.push(
                "large files detected - ensure sufficient disk space for migration".to_string(),
            );
        }
    }

    /// Build a migration plan for moving `workspace` into `target`
    ///
    /// The plan carries validation errors when the source partition is
    /// absent or unreadable, and a warning (non-fatal; data merges) when
    /// the target scope directory already exists.
    pub async fn plan(&self, workspace: &str, target: &Scope) -> MigrationPlan {
        let mut plan = MigrationPlan::new(workspace, target.clone());

        let analysis = self.analyze(workspace).await;
        if !analysis.exists {
            plan.validation_errors
                .push(format!("source workspace '{workspace}' does not exist"));
            return plan;
        }
        plan.validation_errors
            .extend(analysis.validation_errors.iter().cloned());

        let target_path = self.config.working_dir().join(target.directory_key());
        if tokio::fs::metadata(&target_path).await.is_ok() {
            plan.warnings.push(format!(
                "target scope path already exists: {} (existing data will be merged)",
                target_path.display()
            ));
        }

        for (kind, files) in &analysis.storage_files {
            plan.storage_kinds.push(*kind);
            plan.estimated_items
                .insert(*kind, files.iter().map(|f| f.item_count).sum());
            plan.estimated_size
                .insert(*kind, files.iter().map(|f| f.size_bytes).sum());
        }

        plan
    }

    /// Validation errors for a prospective migration (empty means valid)
    pub async fn validate(&self, workspace: &str, target: &Scope) -> Vec<String> {
        self.plan(workspace, target).await.validation_errors
    }

    /// Rough size/effort estimate for migrating a workspace
    pub async fn estimate(&self, workspace: &str) -> MigrationEstimate {
        let analysis = self.analyze(workspace).await;
        MigrationEstimate {
            total_items: analysis.total_items,
            total_size_bytes: analysis.total_size_bytes,
            estimated_duration_minutes: (analysis.total_items / 1000).max(1),
            disk_space_required_bytes: analysis.total_size_bytes * 2,
        }
    }

    /// Execute (or dry-run) a migration
    ///
    /// Mints a fresh migration id and drives it `pending -> running ->
    /// {completed | failed}`. A dry run computes totals from the plan and
    /// completes without mutating storage. A real run walks the legacy
    /// partition's KV records, tags each with the target scope's filter
    /// fields, and writes them into the target scope directory, recording
    /// written files in the undo log.
    ///
    /// # Errors
    /// - [`MigrationError::ValidationFailed`] when the plan is not
    ///   executable; the migration is marked `failed`
    /// - [`MigrationError::ExecutionFailed`] when storage becomes
    ///   unreachable mid-run; the migration is marked `failed`
    pub async fn execute(
        &self,
        workspace: &str,
        target: &Scope,
        dry_run: bool,
    ) -> Result<MigrationOutcome, MigrationError> {
        let migration_id = MigrationId::new();
        self.store.insert(MigrationStatus::new(
            migration_id,
            workspace,
            target.as_str(),
            dry_run,
        ));
        self.store.transition(migration_id, MigrationState::Running)?;
        tracing::info!(
            %migration_id,
            source = workspace,
            target = %target,
            dry_run,
            "starting migration"
        );

        let plan = self.plan(workspace, target).await;
        if !plan.is_executable() {
            let errors = plan.validation_errors.clone();
            self.store.update(migration_id, |status| {
                status.error_message = Some(format!("validation failed: {}", errors.join(", ")));
            })?;
            self.store.transition(migration_id, MigrationState::Failed)?;
            tracing::error!(%migration_id, ?errors, "migration validation failed");
            return Err(MigrationError::ValidationFailed {
                migration_id,
                errors,
            });
        }

        let total_items = plan.total_items();
        self.store
            .update(migration_id, |status| status.total_items = total_items)?;

        if dry_run {
            self.store
                .update(migration_id, |status| status.items_migrated = total_items)?;
            self.store
                .transition(migration_id, MigrationState::Completed)?;
            tracing::info!(%migration_id, total_items, "dry run completed; storage untouched");
            return self.outcome(migration_id, plan.warnings);
        }

        if let Err(err) = self.perform(migration_id, workspace, target).await {
            let message = err.to_string();
            self.store.update(migration_id, |status| {
                status.error_message = Some(message.clone());
            })?;
            self.store.transition(migration_id, MigrationState::Failed)?;
            tracing::error!(%migration_id, error = %message, "migration failed");
            return Err(MigrationError::ExecutionFailed {
                migration_id,
                message,
            });
        }

        self.store
            .transition(migration_id, MigrationState::Completed)?;
        tracing::info!(%migration_id, "migration completed");
        self.outcome(migration_id, plan.warnings)
    }

    /// Walk the legacy partition's KV records into the target scope
    async fn perform(
        &self,
        migration_id: MigrationId,
        workspace: &str,
        target: &Scope,
    ) -> Result<(), MigrationError> {
        let source_dir = self.config.workspace_path(workspace);
        let target_dir = self.config.working_dir().join(target.directory_key());
        tokio::fs::create_dir_all(&target_dir).await?;

        let mut entries = tokio::fs::read_dir(&source_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let Some(kind) = StorageKind::classify(&file_name) else {
                continue;
            };
            if !kind.is_json() {
                // Binary artifacts move with their backend, not here
                continue;
            }

            let bytes = tokio::fs::read(entry.path()).await?;
            let parsed: Value = match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(err) => {
                    tracing::warn!(%migration_id, file = %file_name, error = %err, "skipping unparsable storage file");
                    continue;
                }
            };
            let Value::Object(records) = parsed else {
                tracing::warn!(%migration_id, file = %file_name, "skipping non-object storage file");
                continue;
            };

            let mut migrated = serde_json::Map::new();
            let mut migrated_count = 0u64;
            for (key, value) in records {
                match value {
                    Value::Object(record) => {
                        migrated.insert(key, Value::Object(tag_record(&record, target)));
                        migrated_count += 1;
                    }
                    _ => {
                        tracing::warn!(
                            %migration_id,
                            file = %file_name,
                            record = %key,
                            "skipping non-object record"
                        );
                    }
                }
            }

            let serialized = serde_json::to_vec(&Value::Object(migrated)).map_err(|err| {
                MigrationError::ExecutionFailed {
                    migration_id,
                    message: format!("failed to serialize {file_name}: {err}"),
                }
            })?;
            let out_path = target_dir.join(&file_name);
            tokio::fs::write(&out_path, serialized).await?;

            self.store.update(migration_id, |status| {
                status.items_migrated += migrated_count;
                status.undo_log.push(out_path.clone());
            })?;
            tracing::debug!(
                %migration_id,
                file = %file_name,
                records = migrated_count,
                "migrated storage file"
            );
        }

        Ok(())
    }

    /// Point-in-time snapshot of one migration
    #[must_use]
    pub fn status(&self, migration_id: MigrationId) -> Option<MigrationStatus> {
        self.store.get(migration_id)
    }

    /// Snapshots of all tracked migrations, oldest first
    #[must_use]
    pub fn list_migrations(&self) -> Vec<MigrationStatus> {
        self.store.list()
    }

    /// Roll back a completed migration
    ///
    /// Only legal from `completed`; any other state is a loud error, never
    /// a silent no-op. Dry runs roll back by pure state transition. Real
    /// runs replay the undo log, deleting the files the migration wrote; a
    /// mutating migration without an undo log cannot be reversed and fails
    /// with `ROLLBACK_UNAVAILABLE`. If deletion fails, the state stays
    /// `completed` and the error surfaces.
    ///
    /// # Errors
    /// [`MigrationError::NotFound`], [`MigrationError::IllegalTransition`],
    /// [`MigrationError::RollbackUnavailable`], or [`MigrationError::Io`].
    pub async fn rollback(&self, migration_id: MigrationId) -> Result<(), MigrationError> {
        let status = self
            .store
            .get(migration_id)
            .ok_or(MigrationError::NotFound(migration_id))?;
        validate_transition(status.state, MigrationState::RolledBack)?;

        if !status.dry_run {
            if status.undo_log.is_empty() && status.items_migrated > 0 {
                return Err(MigrationError::RollbackUnavailable(migration_id));
            }
            for path in &status.undo_log {
                tokio::fs::remove_file(path).await?;
            }
        }

        self.store
            .transition(migration_id, MigrationState::RolledBack)?;
        tracing::info!(%migration_id, "migration rolled back");
        Ok(())
    }

    fn outcome(
        &self,
        migration_id: MigrationId,
        warnings: Vec<String>,
    ) -> Result<MigrationOutcome, MigrationError> {
        let status = self
            .store
            .get(migration_id)
            .ok_or(MigrationError::NotFound(migration_id))?;
        Ok(MigrationOutcome {
            migration_id,
            state: status.state,
            items_migrated: status.items_migrated,
            total_items: status.total_items,
            dry_run: status.dry_run,
            warnings,
        })
    }
}

async fn has_kv_storage(dir: &Path) -> Result<bool, MigrationError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if StorageKind::classify(&name) == Some(StorageKind::KvStore)
            && entry.file_type().await?.is_file()
        {
            return Ok(true);
        }
    }
    Ok(false)
}

async fn scan_storage_files(
    dir: &Path,
    analysis: &mut WorkspaceAnalysis,
) -> Result<(), MigrationError> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(kind) = StorageKind::classify(&file_name) else {
            continue;
        };

        let size_bytes = entry.metadata().await?.len();
        let item_count = if kind.is_json() {
            count_json_items(&entry.path()).await
        } else {
            0
        };

        analysis.total_size_bytes += size_bytes;
        analysis.total_items += item_count;
        analysis.storage_files.entry(kind).or_default().push(StorageFileInfo {
            file_name,
            size_bytes,
            item_count,
        });
    }

    for files in analysis.storage_files.values_mut() {
        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    }
    Ok(())
}

/// Top-level entry count of a JSON object file; unparsable files count 0
async fn count_json_items(path: &Path) -> u64 {
    let Ok(bytes) = tokio::fs::read(path).await else {
        return 0;
    };
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map.len() as u64,
        Ok(_) | Err(_) => 0,
    }
}
