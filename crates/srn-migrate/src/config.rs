//! Migration engine configuration

use std::path::{Path, PathBuf};

/// Advisory threshold above which a dataset gets a batching recommendation
pub const DEFAULT_LARGE_DATASET_ITEMS: u64 = 10_000;

/// Advisory threshold above which files get a disk-space recommendation
pub const DEFAULT_LARGE_FILE_BYTES: u64 = 100 * 1024 * 1024;

/// Configuration for [`crate::MigrationEngine`]
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Base working directory holding legacy workspace partitions
    pub working_dir: PathBuf,
    /// Item count above which analysis recommends batching
    pub large_dataset_items: u64,
    /// Byte size above which analysis recommends checking disk space
    pub large_file_bytes: u64,
}

impl MigrationConfig {
    /// Configuration with default thresholds
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            large_dataset_items: DEFAULT_LARGE_DATASET_ITEMS,
            large_file_bytes: DEFAULT_LARGE_FILE_BYTES,
        }
    }

    /// Override the batching threshold
    #[inline]
    #[must_use]
    pub fn with_large_dataset_items(mut self, items: u64) -> Self {
        self.large_dataset_items = items;
        self
    }

    /// Override the disk-space threshold
    #[inline]
    #[must_use]
    pub fn with_large_file_bytes(mut self, bytes: u64) -> Self {
        self.large_file_bytes = bytes;
        self
    }

    /// Directory of one legacy workspace partition
    #[inline]
    #[must_use]
    pub fn workspace_path(&self, workspace: &str) -> PathBuf {
        self.working_dir.join(workspace)
    }

    /// Base working directory
    #[inline]
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}
