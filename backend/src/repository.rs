//! In-process repository over the flat-file collections
//!
//! Holds both collections behind one lock so every operation sees a
//! consistent pair, mirrors them to disk after each mutation, and keeps
//! the bounded undo stack of full snapshots. The discipline is always
//! snapshot -> mutate -> persist; when persisting fails the in-memory
//! state is rolled back so callers observe no change.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use shared::{Roll, WorkOrder};

use crate::config::StorageConfig;
use crate::error::{AppError, AppResult};
use crate::storage::{JsonStore, SnapshotStack};

/// One undo point: both collections as they stood before a mutation.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rolls: Vec<Roll>,
    pub work_orders: Vec<WorkOrder>,
}

struct Collections {
    rolls: Vec<Roll>,
    work_orders: Vec<WorkOrder>,
}

/// Shared repository handle; cheap to clone into services.
#[derive(Clone)]
pub struct Repository {
    inner: Arc<Inner>,
}

struct Inner {
    collections: RwLock<Collections>,
    history: Mutex<SnapshotStack<Snapshot>>,
    rolls_store: JsonStore,
    work_orders_store: JsonStore,
}

impl Repository {
    /// Open the repository, loading both collection files (missing files
    /// load as empty collections).
    pub async fn open(config: &StorageConfig) -> AppResult<Self> {
        let data_dir = std::path::Path::new(&config.data_dir);
        let rolls_store = JsonStore::new(data_dir.join(&config.rolls_file));
        let work_orders_store = JsonStore::new(data_dir.join(&config.work_orders_file));

        let rolls: Vec<Roll> = rolls_store.load().await?;
        let work_orders: Vec<WorkOrder> = work_orders_store.load().await?;

        tracing::info!(
            rolls = rolls.len(),
            work_orders = work_orders.len(),
            "loaded collections from {}",
            data_dir.display()
        );

        Ok(Self {
            inner: Arc::new(Inner {
                collections: RwLock::new(Collections { rolls, work_orders }),
                history: Mutex::new(SnapshotStack::new(config.history_limit)),
                rolls_store,
                work_orders_store,
            }),
        })
    }

    /// Full roll collection, as stored.
    pub async fn rolls(&self) -> Vec<Roll> {
        self.inner.collections.read().await.rolls.clone()
    }

    /// Full work-order collection, as stored.
    pub async fn work_orders(&self) -> Vec<WorkOrder> {
        self.inner.collections.read().await.work_orders.clone()
    }

    /// Apply a mutation to both collections.
    ///
    /// The closure may fail, in which case nothing is changed or
    /// persisted. On success the previous state is pushed onto the undo
    /// stack and both files are rewritten; a persistence failure rolls
    /// the in-memory state back and surfaces as a storage error.
    pub async fn mutate<R>(
        &self,
        apply: impl FnOnce(&mut Vec<Roll>, &mut Vec<WorkOrder>) -> AppResult<R>,
    ) -> AppResult<R> {
        let mut guard = self.inner.collections.write().await;
        let before = Snapshot {
            rolls: guard.rolls.clone(),
            work_orders: guard.work_orders.clone(),
        };

        let collections = &mut *guard;
        let result = match apply(&mut collections.rolls, &mut collections.work_orders) {
            Ok(result) => result,
            Err(err) => {
                // a failed operation must not partially apply
                guard.rolls = before.rolls;
                guard.work_orders = before.work_orders;
                return Err(err);
            }
        };

        if let Err(err) = self.persist(&guard).await {
            guard.rolls = before.rolls;
            guard.work_orders = before.work_orders;
            return Err(err);
        }

        self.inner.history.lock().await.push(before);
        Ok(result)
    }

    /// Restore the most recent snapshot. Errors when the stack is empty.
    pub async fn undo(&self) -> AppResult<()> {
        let mut history = self.inner.history.lock().await;
        let snapshot = history.pop().ok_or(AppError::NothingToUndo)?;

        let mut guard = self.inner.collections.write().await;
        let current = Snapshot {
            rolls: std::mem::replace(&mut guard.rolls, snapshot.rolls),
            work_orders: std::mem::replace(&mut guard.work_orders, snapshot.work_orders),
        };

        if let Err(err) = self.persist(&guard).await {
            // put things back exactly as they were, snapshot included
            let restored = Snapshot {
                rolls: std::mem::replace(&mut guard.rolls, current.rolls),
                work_orders: std::mem::replace(&mut guard.work_orders, current.work_orders),
            };
            history.push(restored);
            return Err(err);
        }

        tracing::info!(remaining = history.len(), "restored previous snapshot");
        Ok(())
    }

    /// Number of undo snapshots currently held.
    pub async fn history_len(&self) -> usize {
        self.inner.history.lock().await.len()
    }

    async fn persist(&self, collections: &Collections) -> AppResult<()> {
        self.inner.rolls_store.persist(&collections.rolls).await?;
        self.inner
            .work_orders_store
            .persist(&collections.work_orders)
            .await?;
        Ok(())
    }
}
