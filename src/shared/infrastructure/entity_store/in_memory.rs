// In memory implementation of the EntityStore port.
//
// Purpose
// - Back the table client in tests and local runs without a durable backend.
//
// Responsibilities
// - Keep entities per partition, ordered by row key.
// - Serialize every read-check-write on a partition behind that partition's
//   mutex, so two writers holding the same version cannot both succeed.
// - Evaluate a whole batch before touching the partition, then apply it in one
//   step while the lock is still held.
// - Forget a partition once it is empty and no commit holds it.

use crate::modules::tables::core::entity::Entity;
use crate::modules::tables::core::errors::TableError;
use crate::modules::tables::core::etag::ETagGenerator;
use crate::modules::tables::core::evolve::{Change, WriteStamp, decide};
use crate::modules::tables::core::operation::{TableOperation, TableResult};
use crate::modules::tables::use_cases::execute_batch::validate::ValidatedBatch;
use crate::shared::infrastructure::entity_store::EntityStore;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

type Partition = BTreeMap<String, Entity>;

#[derive(Default)]
pub struct InMemoryEntityStore {
    partitions: RwLock<HashMap<String, Arc<Mutex<Partition>>>>,
    etags: ETagGenerator,
    offline: bool,
    delay_commit_ms: AtomicU64,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_offline(&mut self) {
        self.offline = !self.offline;
    }

    /// Sleeps between evaluating and applying a commit, with the partition
    /// lock held.
    pub fn set_delay_commit_ms(&self, ms: u64) {
        self.delay_commit_ms.store(ms, Ordering::Relaxed);
    }

    fn ensure_online(&self) -> Result<(), TableError> {
        if self.offline {
            return Err(TableError::Backend("Entity store offline".into()));
        }
        Ok(())
    }

    async fn partition(&self, partition_key: &str, create: bool) -> Option<Arc<Mutex<Partition>>> {
        if let Some(partition) = self.partitions.read().await.get(partition_key) {
            return Some(partition.clone());
        }
        if !create {
            return None;
        }
        let mut partitions = self.partitions.write().await;
        Some(
            partitions
                .entry(partition_key.to_string())
                .or_default()
                .clone(),
        )
    }

    async fn commit(
        &self,
        partition_key: &str,
        operations: &[TableOperation],
        batch: bool,
    ) -> Result<Vec<TableResult>, TableError> {
        self.ensure_online()?;
        let creates = operations.iter().any(|operation| {
            matches!(
                operation,
                TableOperation::Insert(_)
                    | TableOperation::InsertOrReplace(_)
                    | TableOperation::InsertOrMerge(_)
            )
        });
        // A missing partition that nothing creates is evaluated as empty and
        // every operation against it fails before anything is written.
        let partition = self
            .partition(partition_key, creates)
            .await
            .unwrap_or_default();
        let mut rows = partition.lock().await;
        let outcome = self.apply(partition_key, &mut rows, operations, batch).await;
        let emptied = rows.is_empty();
        drop(rows);
        drop(partition);
        if emptied {
            self.forget_if_empty(partition_key).await;
        }
        outcome
    }

    async fn apply(
        &self,
        partition_key: &str,
        rows: &mut Partition,
        operations: &[TableOperation],
        batch: bool,
    ) -> Result<Vec<TableResult>, TableError> {
        let now = Utc::now();
        let mut changes = Vec::with_capacity(operations.len());
        for (index, operation) in operations.iter().enumerate() {
            let change = decide(rows.get(operation.row_key()), operation, || WriteStamp {
                etag: self.etags.next(now),
                timestamp: now,
            })
            .map_err(|error| {
                debug!(partition_key, index, operation = operation.name(), %error, "commit rejected");
                if batch { error.at_index(index) } else { error }
            })?;
            changes.push(change);
        }

        let delay = self.delay_commit_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let results = changes
            .into_iter()
            .map(|change| {
                let result = change.result();
                match change {
                    Change::Put(entity) => {
                        rows.insert(entity.row_key.clone(), entity);
                    }
                    Change::Remove(key) => {
                        rows.remove(&key.row_key);
                    }
                    Change::Read(_) => {}
                }
                result
            })
            .collect::<Vec<_>>();
        debug!(partition_key, operations = results.len(), "commit applied");
        Ok(results)
    }

    /// Drops an empty partition from the map once no other commit holds it.
    /// A commit still holding it runs this again when it finishes.
    async fn forget_if_empty(&self, partition_key: &str) {
        let mut partitions = self.partitions.write().await;
        let unused_and_empty = partitions.get(partition_key).is_some_and(|partition| {
            Arc::strong_count(partition) == 1
                && partition
                    .try_lock()
                    .map(|rows| rows.is_empty())
                    .unwrap_or(false)
        });
        if unused_and_empty {
            partitions.remove(partition_key);
            debug!(partition_key, "empty partition forgotten");
        }
    }
}

#[async_trait::async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn execute(&self, operation: TableOperation) -> Result<TableResult, TableError> {
        let mut results = self
            .commit(operation.partition_key(), std::slice::from_ref(&operation), false)
            .await?;
        results
            .pop()
            .ok_or_else(|| TableError::Backend("commit produced no result".into()))
    }

    async fn commit_batch(&self, batch: ValidatedBatch) -> Result<Vec<TableResult>, TableError> {
        self.commit(batch.partition_key(), batch.operations(), true)
            .await
    }

    async fn retrieve_partition(&self, partition_key: &str) -> Result<Vec<Entity>, TableError> {
        self.ensure_online()?;
        match self.partition(partition_key, false).await {
            Some(partition) => Ok(partition.lock().await.values().cloned().collect()),
            None => Ok(Vec::new()),
        }
    }
}
