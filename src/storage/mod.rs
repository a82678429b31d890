mod local_fs;

pub use local_fs::LocalMediaStore;

use crate::errors::StoreError;
use crate::media::{Category, MediaKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
}

/// Directory-as-category, file-as-record store.
///
/// Every path argument is relative to the store root and must consist of
/// plain components only. Nothing is cached: each call reads the tree.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    fn root(&self) -> &Path;

    /// Image categories sorted by name, with their image counts.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Sorted names of files in `dir` matching the kind's extension allow-list.
    async fn list_files(&self, dir: &Path, kind: MediaKind) -> Result<Vec<String>, StoreError>;

    async fn create_category(&self, raw_name: &str) -> Result<Category, StoreError>;

    /// Creates `dir` if needed and writes `bytes` to `dir/name`.
    async fn write_file(&self, dir: &Path, name: &str, bytes: &[u8])
    -> Result<PathBuf, StoreError>;

    async fn delete_file(&self, path: &Path) -> Result<(), StoreError>;

    async fn file_info(&self, path: &Path) -> Result<FileInfo, StoreError>;
}
