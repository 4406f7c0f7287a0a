// EntityStore port.
//
// Purpose
// - Describe what the table client needs from storage, without tying it to a
//   particular backend.
//
// Responsibilities
// - `execute` evaluates one operation under the lock of its entity's partition.
// - `commit_batch` evaluates every operation of a validated batch under one
//   partition lock and applies them all or none.
// - Version tokens are minted by the store on every successful write.
//
// Boundaries
// - Batch shape checks live in the execute_batch use case. The store only
//   accepts batches that went through `validate_batch`.

use crate::modules::tables::core::entity::Entity;
use crate::modules::tables::core::errors::TableError;
use crate::modules::tables::core::etag::ETag;
use crate::modules::tables::core::operation::{TableOperation, TableResult};
use crate::modules::tables::use_cases::execute_batch::validate::ValidatedBatch;
use async_trait::async_trait;

pub mod config;
pub mod in_memory;

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn execute(&self, operation: TableOperation) -> Result<TableResult, TableError>;

    async fn commit_batch(&self, batch: ValidatedBatch) -> Result<Vec<TableResult>, TableError>;

    /// Every entity of the partition in row key order.
    async fn retrieve_partition(&self, partition_key: &str) -> Result<Vec<Entity>, TableError>;

    async fn insert(&self, entity: Entity) -> Result<Entity, TableError> {
        self.execute(TableOperation::insert(entity)).await?.into_entity()
    }

    async fn retrieve(&self, partition_key: &str, row_key: &str) -> Result<Entity, TableError> {
        self.execute(TableOperation::retrieve(partition_key, row_key))
            .await?
            .into_entity()
    }

    async fn replace(&self, mut entity: Entity, expected: Option<ETag>) -> Result<Entity, TableError> {
        entity.etag = expected;
        self.execute(TableOperation::replace(entity)).await?.into_entity()
    }

    async fn merge(&self, mut entity: Entity, expected: Option<ETag>) -> Result<Entity, TableError> {
        entity.etag = expected;
        self.execute(TableOperation::merge(entity)).await?.into_entity()
    }

    async fn delete(
        &self,
        partition_key: &str,
        row_key: &str,
        expected: Option<ETag>,
    ) -> Result<(), TableError> {
        self.execute(TableOperation::delete(partition_key, row_key, expected))
            .await
            .map(|_| ())
    }
}
