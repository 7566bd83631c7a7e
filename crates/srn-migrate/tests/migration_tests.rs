//! End-to-end migration engine tests against a temporary working directory

use srn_migrate::prelude::*;
use srn_scope::ScopeFilterable;
use srn_test_utils::{seed_binary_artifact, seed_legacy_workspace, user_scope, ws_id};
use std::sync::Arc;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn engine_in(dir: &TempDir) -> MigrationEngine {
    init_tracing();
    MigrationEngine::new(MigrationConfig::new(dir.path()))
}

#[tokio::test]
async fn discover_finds_only_partitions_with_kv_storage() {
    let dir = TempDir::new().unwrap();
    seed_legacy_workspace(dir.path(), "alpha", &[("full_docs", 2)]).unwrap();
    seed_legacy_workspace(dir.path(), "beta", &[("chunks", 1)]).unwrap();
    // Directory without KV storage must not count
    std::fs::create_dir(dir.path().join("not-a-workspace")).unwrap();
    std::fs::write(dir.path().join("not-a-workspace/readme.txt"), b"x").unwrap();

    let engine = engine_in(&dir);
    let workspaces = engine.discover_workspaces().await.unwrap();
    assert_eq!(workspaces, vec!["alpha".to_string(), "beta".to_string()]);
}

#[tokio::test]
async fn discover_on_missing_working_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    let engine = MigrationEngine::new(MigrationConfig::new(dir.path().join("absent")));
    assert!(engine.discover_workspaces().await.unwrap().is_empty());
}

#[tokio::test]
async fn analyze_counts_items_and_sizes() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(1);
    let ws_dir =
        seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 3), ("chunks", 2)]).unwrap();
    seed_binary_artifact(&ws_dir, "entities.vectordb", 128).unwrap();

    let engine = engine_in(&dir);
    let analysis = engine.analyze(&ws).await;

    assert!(analysis.exists);
    assert!(analysis.validation_errors.is_empty());
    assert_eq!(analysis.total_items, 5);
    assert_eq!(analysis.storage_files[&StorageKind::KvStore].len(), 2);
    assert_eq!(analysis.storage_files[&StorageKind::VectorStore].len(), 1);
    // Binary artifacts contribute size but never items
    assert_eq!(
        analysis.storage_files[&StorageKind::VectorStore][0].item_count,
        0
    );
    assert!(analysis.total_size_bytes >= 128);
    // 32-char hex id gets the direct-conversion recommendation
    assert!(analysis
        .recommendations
        .iter()
        .any(|r| r.contains("suitable for direct scope conversion")));
}

#[tokio::test]
async fn analyze_recommends_hex_id_and_batching() {
    let dir = TempDir::new().unwrap();
    seed_legacy_workspace(dir.path(), "legacy-name", &[("full_docs", 4)]).unwrap();

    let config = MigrationConfig::new(dir.path()).with_large_dataset_items(3);
    let engine = MigrationEngine::new(config);
    let analysis = engine.analyze("legacy-name").await;

    assert!(analysis
        .recommendations
        .iter()
        .any(|r| r.contains("not 32-char hex")));
    assert!(analysis
        .recommendations
        .iter()
        .any(|r| r.contains("batches")));
}

#[tokio::test]
async fn analyze_missing_workspace_reports_instead_of_failing() {
    let dir = TempDir::new().unwrap();
    let engine = engine_in(&dir);
    let analysis = engine.analyze("ghost").await;

    assert!(!analysis.exists);
    assert_eq!(analysis.total_items, 0);
    assert!(analysis.validation_errors[0].contains("does not exist"));
}

#[tokio::test]
async fn plan_flags_missing_source_and_existing_target() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(2);
    let target = user_scope(&ws, "john");

    let engine = engine_in(&dir);
    let plan = engine.plan("ghost", &target).await;
    assert!(!plan.is_executable());
    assert!(plan.validation_errors[0].contains("does not exist"));

    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 1)]).unwrap();
    std::fs::create_dir_all(dir.path().join(target.directory_key())).unwrap();

    let plan = engine.plan(&ws, &target).await;
    assert!(plan.is_executable());
    assert_eq!(plan.total_items(), 1);
    assert!(plan.warnings[0].contains("already exists"));
}

#[tokio::test]
async fn estimate_floors_duration_and_doubles_disk() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(3);
    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 5)]).unwrap();

    let engine = engine_in(&dir);
    let estimate = engine.estimate(&ws).await;
    assert_eq!(estimate.total_items, 5);
    assert_eq!(estimate.estimated_duration_minutes, 1);
    assert_eq!(
        estimate.disk_space_required_bytes,
        estimate.total_size_bytes * 2
    );
}

#[tokio::test]
async fn dry_run_completes_without_touching_storage() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(4);
    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 3)]).unwrap();
    let target = user_scope(&ws, "john");

    let engine = engine_in(&dir);
    let outcome = engine.execute(&ws, &target, true).await.unwrap();

    assert_eq!(outcome.state, MigrationState::Completed);
    assert!(outcome.dry_run);
    assert_eq!(outcome.items_migrated, 3);
    assert_eq!(outcome.items_migrated, outcome.total_items);
    // Nothing written
    assert!(!dir.path().join(target.directory_key()).exists());

    let status = engine.status(outcome.migration_id).unwrap();
    assert!(status.undo_log.is_empty());
    assert!(status.finished_at.is_some());
}

#[tokio::test]
async fn real_run_writes_tagged_records_into_scope_partition() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(5);
    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 2), ("chunks", 1)]).unwrap();
    let target = user_scope(&ws, "john");

    let engine = engine_in(&dir);
    let outcome = engine.execute(&ws, &target, false).await.unwrap();

    assert_eq!(outcome.state, MigrationState::Completed);
    assert_eq!(outcome.items_migrated, 3);

    let target_dir = dir.path().join(target.directory_key());
    let bytes = std::fs::read(target_dir.join("kv_store_full_docs.json")).unwrap();
    let records: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let record = &records["doc-0"];
    assert_eq!(record["workspace"], serde_json::json!(ws));
    assert_eq!(record["subject_type"], serde_json::json!("user"));
    assert_eq!(record["subject_id"], serde_json::json!("john"));
    // Payload preserved
    assert_eq!(record["content"], serde_json::json!("document 0"));

    let status = engine.status(outcome.migration_id).unwrap();
    assert_eq!(status.undo_log.len(), 2);
    assert_eq!(status.progress_percent(), 100.0);
}

#[tokio::test]
async fn execute_against_missing_workspace_marks_failed() {
    let dir = TempDir::new().unwrap();
    let engine = engine_in(&dir);
    let target = user_scope(&ws_id(6), "john");

    let err = engine.execute("ghost", &target, false).await.unwrap_err();
    assert_eq!(err.code(), "VALIDATION_FAILED");

    let MigrationError::ValidationFailed { migration_id, .. } = err else {
        panic!("expected ValidationFailed, got {err:?}");
    };
    let status = engine.status(migration_id).unwrap();
    assert_eq!(status.state, MigrationState::Failed);
    assert!(status.error_message.as_deref().unwrap().contains("does not exist"));
    assert!(status.finished_at.is_some());
}

#[tokio::test]
async fn rollback_removes_written_files() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(7);
    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 2)]).unwrap();
    let target = user_scope(&ws, "john");

    let engine = engine_in(&dir);
    let outcome = engine.execute(&ws, &target, false).await.unwrap();
    let written = dir
        .path()
        .join(target.directory_key())
        .join("kv_store_full_docs.json");
    assert!(written.exists());

    engine.rollback(outcome.migration_id).await.unwrap();
    assert!(!written.exists());
    assert_eq!(
        engine.status(outcome.migration_id).unwrap().state,
        MigrationState::RolledBack
    );

    // rolled_back is terminal; a second rollback is an illegal transition
    let err = engine.rollback(outcome.migration_id).await.unwrap_err();
    assert_eq!(err.code(), "ILLEGAL_TRANSITION");
}

#[tokio::test]
async fn rollback_of_dry_run_is_pure_state_change() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(8);
    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 1)]).unwrap();
    let target = user_scope(&ws, "jane");

    let engine = engine_in(&dir);
    let outcome = engine.execute(&ws, &target, true).await.unwrap();
    engine.rollback(outcome.migration_id).await.unwrap();
    assert_eq!(
        engine.status(outcome.migration_id).unwrap().state,
        MigrationState::RolledBack
    );
}

#[tokio::test]
async fn rollback_rejects_failed_and_unknown_migrations() {
    let dir = TempDir::new().unwrap();
    let engine = engine_in(&dir);
    let target = user_scope(&ws_id(9), "john");

    let err = engine.execute("ghost", &target, false).await.unwrap_err();
    let MigrationError::ValidationFailed { migration_id, .. } = err else {
        panic!("expected ValidationFailed");
    };
    // A failed migration never mutated storage; rolling it back is illegal
    assert_eq!(
        engine.rollback(migration_id).await.unwrap_err().code(),
        "ILLEGAL_TRANSITION"
    );

    assert_eq!(
        engine.rollback(MigrationId::new()).await.unwrap_err().code(),
        "MIGRATION_NOT_FOUND"
    );
}

#[tokio::test]
async fn shared_store_lists_migrations_across_engines() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let ws = ws_id(1);
    seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 1)]).unwrap();

    let store = Arc::new(StatusStore::new());
    let first = MigrationEngine::with_store(MigrationConfig::new(dir.path()), Arc::clone(&store));
    let second = MigrationEngine::with_store(MigrationConfig::new(dir.path()), Arc::clone(&store));

    let a = first.execute(&ws, &user_scope(&ws, "john"), true).await.unwrap();
    let b = second.execute(&ws, &user_scope(&ws, "jane"), true).await.unwrap();

    let listed = first.list_migrations();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|s| s.migration_id == a.migration_id));
    assert!(listed.iter().any(|s| s.migration_id == b.migration_id));
}

#[tokio::test]
async fn source_partition_is_left_intact_after_migration() {
    let dir = TempDir::new().unwrap();
    let ws = ws_id(2);
    let ws_dir = seed_legacy_workspace(dir.path(), &ws, &[("full_docs", 2)]).unwrap();
    let target = user_scope(&ws, "john");

    let engine = engine_in(&dir);
    engine.execute(&ws, &target, false).await.unwrap();

    let bytes = std::fs::read(ws_dir.join("kv_store_full_docs.json")).unwrap();
    let records: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    // Source records stay untagged
    assert!(records["doc-0"].get("workspace").is_none());
}
