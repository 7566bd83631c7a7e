//! Shared test fixtures for the SRN crates
//!
//! Deterministic workspace ids, scope builders, and legacy partition
//! seeding for integration tests. Not for production use.

#![allow(missing_docs)]

use serde_json::{json, Map, Value};
use srn_scope::Scope;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Deterministic 32-char lowercase hex workspace id, varied by seed
#[must_use]
pub fn ws_id(seed: u8) -> String {
    let digit = char::from_digit(u32::from(seed % 10), 10).unwrap_or('0');
    let mut id: String = std::iter::repeat(digit).take(24).collect();
    id.push_str("abcdef01");
    id
}

/// Parse an SRN into a scope, panicking on invalid input
///
/// # Panics
/// Panics when `srn` is not a valid SRN. Test fixtures only.
#[must_use]
pub fn scope(srn: &str) -> Scope {
    match Scope::parse(srn) {
        Ok(scope) => scope,
        Err(err) => panic!("fixture SRN {srn:?} failed to parse: {err}"),
    }
}

/// A user-level scope in the given workspace
#[must_use]
pub fn user_scope(workspace: &str, subject_id: &str) -> Scope {
    scope(&format!("1.{workspace}.user.{subject_id}"))
}

/// `count` synthetic KV records keyed `doc-0..doc-{count-1}`
#[must_use]
pub fn kv_records(count: usize) -> Map<String, Value> {
    let mut records = Map::new();
    for i in 0..count {
        records.insert(
            format!("doc-{i}"),
            json!({
                "content": format!("document {i}"),
                "tokens": i * 10,
            }),
        );
    }
    records
}

/// Seed a legacy workspace partition with KV storage files
///
/// Creates `<working_dir>/<workspace>/` holding one
/// `kv_store_<name>.json` per `(name, item_count)` pair, and returns the
/// partition directory.
///
/// # Errors
/// Propagates filesystem errors from directory or file creation.
pub fn seed_legacy_workspace(
    working_dir: &Path,
    workspace: &str,
    files: &[(&str, usize)],
) -> io::Result<PathBuf> {
    let dir = working_dir.join(workspace);
    fs::create_dir_all(&dir)?;
    for (name, item_count) in files {
        let path = dir.join(format!("kv_store_{name}.json"));
        let records = Value::Object(kv_records(*item_count));
        fs::write(path, serde_json::to_vec_pretty(&records)?)?;
    }
    Ok(dir)
}

/// Write a non-JSON storage artifact (vector or graph store) of `bytes` size
///
/// # Errors
/// Propagates filesystem errors.
pub fn seed_binary_artifact(
    workspace_dir: &Path,
    file_name: &str,
    bytes: usize,
) -> io::Result<PathBuf> {
    let path = workspace_dir.join(file_name);
    fs::write(&path, vec![0u8; bytes])?;
    Ok(path)
}
