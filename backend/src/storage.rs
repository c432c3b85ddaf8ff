//! Flat-file JSON storage
//!
//! Each collection lives in one JSON file holding the whole array. Reads
//! return an empty collection when the file does not exist yet; writes
//! replace the file wholesale via a temp-file rename so a crashed write
//! never leaves a half-written collection behind.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{AppError, AppResult};

/// Whole-collection JSON file store.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full collection; a missing file is an empty collection.
    pub async fn load<T: DeserializeOwned>(&self) -> AppResult<Vec<T>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(AppError::StorageError(format!(
                    "failed to read {}: {}",
                    self.path.display(),
                    err
                )))
            }
        };

        serde_json::from_slice(&bytes).map_err(|err| {
            AppError::StorageError(format!("failed to parse {}: {}", self.path.display(), err))
        })
    }

    /// Overwrite the full collection.
    pub async fn persist<T: Serialize>(&self, items: &[T]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|err| {
                AppError::StorageError(format!(
                    "failed to create {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }

        let json = serde_json::to_vec_pretty(items)
            .map_err(|err| AppError::StorageError(format!("failed to serialize: {}", err)))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await.map_err(|err| {
            AppError::StorageError(format!("failed to write {}: {}", tmp.display(), err))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|err| {
            AppError::StorageError(format!(
                "failed to move {} into place: {}",
                tmp.display(),
                err
            ))
        })?;

        Ok(())
    }
}

/// Bounded stack of full-collection snapshots backing the undo feature.
///
/// Push before every mutation; pop to undo. When the bound is exceeded
/// the oldest snapshot is dropped. Held in memory only, so undo history
/// does not survive a restart.
#[derive(Debug)]
pub struct SnapshotStack<T> {
    limit: usize,
    stack: Vec<T>,
}

impl<T> SnapshotStack<T> {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            stack: Vec::new(),
        }
    }

    pub fn push(&mut self, snapshot: T) {
        if self.stack.len() == self.limit {
            self.stack.remove(0);
        }
        self.stack.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.stack.pop()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_stack_is_bounded() {
        let mut stack = SnapshotStack::new(3);
        for i in 0..5 {
            stack.push(i);
        }
        assert_eq!(stack.len(), 3);
        // oldest snapshots were dropped
        assert_eq!(stack.pop(), Some(4));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn test_snapshot_stack_zero_limit_keeps_one() {
        let mut stack = SnapshotStack::new(0);
        stack.push("a");
        stack.push("b");
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.pop(), Some("b"));
    }

    #[tokio::test]
    async fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("absent.json"));
        let items: Vec<serde_json::Value> = store.load().await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("nested").join("items.json"));
        let items = vec![serde_json::json!({"a": 1}), serde_json::json!({"a": 2})];
        store.persist(&items).await.unwrap();

        let loaded: Vec<serde_json::Value> = store.load().await.unwrap();
        assert_eq!(loaded, items);
    }

    #[tokio::test]
    async fn test_load_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = JsonStore::new(path);
        let result: crate::error::AppResult<Vec<serde_json::Value>> = store.load().await;
        assert!(matches!(result, Err(AppError::StorageError(_))));
    }
}
