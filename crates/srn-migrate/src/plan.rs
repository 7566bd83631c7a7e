//! Workspace analysis and migration plans
//!
//! [`WorkspaceAnalysis`] is the result of scanning one legacy partition's
//! storage artifacts; [`MigrationPlan`] ties that analysis to a target
//! scope. Plans are ephemeral: built on demand, never persisted.

use serde::{Deserialize, Serialize};
use srn_scope::Scope;
use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

/// Kinds of storage artifacts a legacy partition may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageKind {
    /// Key-value JSON stores (`kv_store_*.json`)
    KvStore,
    /// Vector indexes (`*.vectordb`)
    VectorStore,
    /// Graph databases (`*.graphdb`)
    GraphStore,
    /// Document status tables (`doc_status_*.json`)
    DocStatus,
}

impl StorageKind {
    /// All storage kinds, in scan order
    pub const ALL: [StorageKind; 4] = [
        Self::KvStore,
        Self::VectorStore,
        Self::GraphStore,
        Self::DocStatus,
    ];

    /// Canonical name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::KvStore => "kv_store",
            Self::VectorStore => "vector_store",
            Self::GraphStore => "graph_store",
            Self::DocStatus => "doc_status",
        }
    }

    /// Classify a file name, if it is a known storage artifact
    ///
    /// `doc_status_*.json` is checked before the KV pattern so the more
    /// specific prefix wins.
    #[must_use]
    pub fn classify(file_name: &str) -> Option<Self> {
        if file_name.starts_with("doc_status_") && file_name.ends_with(".json") {
            Some(Self::DocStatus)
        } else if file_name.starts_with("kv_store_") && file_name.ends_with(".json") {
            Some(Self::KvStore)
        } else if file_name.ends_with(".vectordb") {
            Some(Self::VectorStore)
        } else if file_name.ends_with(".graphdb") {
            Some(Self::GraphStore)
        } else {
            None
        }
    }

    /// Whether items inside this artifact are countable JSON records
    #[inline]
    #[must_use]
    pub fn is_json(&self) -> bool {
        matches!(self, Self::KvStore | Self::DocStatus)
    }
}

impl Display for StorageKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One storage file found during analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFileInfo {
    /// File name within the workspace directory
    pub file_name: String,
    /// File size in bytes
    pub size_bytes: u64,
    /// Record count, 0 for non-JSON artifacts
    pub item_count: u64,
}

/// Result of scanning one legacy workspace partition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceAnalysis {
    /// Legacy workspace identifier
    pub workspace: String,
    /// Whether the partition directory exists
    pub exists: bool,
    /// Discovered storage files, per kind
    pub storage_files: BTreeMap<StorageKind, Vec<StorageFileInfo>>,
    /// Total countable records
    pub total_items: u64,
    /// Total bytes across all storage files
    pub total_size_bytes: u64,
    /// Advisory notes (non-UUID id, large dataset, large files)
    pub recommendations: Vec<String>,
    /// Blocking problems (partition absent)
    pub validation_errors: Vec<String>,
}

/// Rough effort estimate for migrating a workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationEstimate {
    /// Total countable records
    pub total_items: u64,
    /// Total bytes across storage files
    pub total_size_bytes: u64,
    /// Rough wall-clock estimate, floor 1 minute
    pub estimated_duration_minutes: u64,
    /// Disk space to reserve (source doubled)
    pub disk_space_required_bytes: u64,
}

/// Plan for migrating one legacy workspace into a target scope
///
/// A plan with non-empty `validation_errors` must never be executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Source legacy workspace
    pub source_workspace: String,
    /// Target scope
    pub target_scope: Scope,
    /// Storage kinds found in the source
    pub storage_kinds: Vec<StorageKind>,
    /// Estimated record counts per kind
    pub estimated_items: BTreeMap<StorageKind, u64>,
    /// Estimated byte sizes per kind
    pub estimated_size: BTreeMap<StorageKind, u64>,
    /// Blocking problems; non-empty means the plan is not executable
    pub validation_errors: Vec<String>,
    /// Non-fatal findings (target partition already has data)
    pub warnings: Vec<String>,
}

impl MigrationPlan {
    /// Empty plan for a source/target pair
    #[must_use]
    pub fn new(source_workspace: impl Into<String>, target_scope: Scope) -> Self {
        Self {
            source_workspace: source_workspace.into(),
            target_scope,
            storage_kinds: Vec::new(),
            estimated_items: BTreeMap::new(),
            estimated_size: BTreeMap::new(),
            validation_errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether the plan may be executed
    #[inline]
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.validation_errors.is_empty()
    }

    /// Total records across all storage kinds
    #[inline]
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.estimated_items.values().sum()
    }

    /// Total bytes across all storage kinds
    #[inline]
    #[must_use]
    pub fn total_size_bytes(&self) -> u64 {
        self.estimated_size.values().sum()
    }
}
