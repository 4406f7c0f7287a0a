// Caller-facing table client.
//
// Responsibilities
// - Expose insert, retrieve, replace, merge, delete and batch calls.
// - Route single operations straight to the store and batches through the
//   batch executor.
// - Return store errors unchanged. Conflicts are logged, never retried.
//
// The client holds no entity state and no locks of its own; clones share the
// same store and can be used from many tasks at once.

use crate::modules::tables::core::entity::Entity;
use crate::modules::tables::core::errors::{ErrorKind, TableError};
use crate::modules::tables::core::etag::ETag;
use crate::modules::tables::core::operation::{TableOperation, TableResult};
use crate::modules::tables::use_cases::execute_batch::batch::TableBatchOperation;
use crate::modules::tables::use_cases::execute_batch::handler::ExecuteBatchHandler;
use crate::shared::infrastructure::entity_store::EntityStore;
use crate::shared::infrastructure::entity_store::config::StoreConfig;
use std::sync::Arc;
use tracing::{instrument, warn};

pub struct TableClient<TStore>
where
    TStore: EntityStore + ?Sized + 'static,
{
    table_name: String,
    store: Arc<TStore>,
    batch_handler: Arc<ExecuteBatchHandler<TStore>>,
}

impl<TStore> Clone for TableClient<TStore>
where
    TStore: EntityStore + ?Sized + 'static,
{
    fn clone(&self) -> Self {
        Self {
            table_name: self.table_name.clone(),
            store: self.store.clone(),
            batch_handler: self.batch_handler.clone(),
        }
    }
}

impl<TStore> TableClient<TStore>
where
    TStore: EntityStore + ?Sized + 'static,
{
    pub fn new(table_name: impl Into<String>, store: Arc<TStore>, config: &StoreConfig) -> Self {
        let batch_handler = Arc::new(ExecuteBatchHandler::new(store.clone(), config));
        Self {
            table_name: table_name.into(),
            store,
            batch_handler,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    #[instrument(
        skip_all,
        fields(
            table = %self.table_name,
            operation = operation.name(),
            partition_key = operation.partition_key(),
            row_key = operation.row_key(),
        )
    )]
    pub async fn execute(&self, operation: TableOperation) -> Result<TableResult, TableError> {
        self.store.execute(operation).await.inspect_err(log_failure)
    }

    #[instrument(skip_all, fields(table = %self.table_name, operations = batch.len()))]
    pub async fn execute_batch(
        &self,
        batch: TableBatchOperation,
    ) -> Result<Vec<TableResult>, TableError> {
        self.batch_handler.handle(batch).await
    }

    pub async fn insert(&self, entity: Entity) -> Result<Entity, TableError> {
        self.execute(TableOperation::insert(entity)).await?.into_entity()
    }

    pub async fn insert_or_replace(&self, entity: Entity) -> Result<Entity, TableError> {
        self.execute(TableOperation::insert_or_replace(entity))
            .await?
            .into_entity()
    }

    pub async fn insert_or_merge(&self, entity: Entity) -> Result<Entity, TableError> {
        self.execute(TableOperation::insert_or_merge(entity)).await?.into_entity()
    }

    pub async fn retrieve(&self, partition_key: &str, row_key: &str) -> Result<Entity, TableError> {
        self.execute(TableOperation::retrieve(partition_key, row_key))
            .await?
            .into_entity()
    }

    /// Overwrites the stored property set. Guarded by `entity.etag` unless it
    /// is `None` or the wildcard.
    pub async fn replace(&self, entity: Entity) -> Result<Entity, TableError> {
        self.execute(TableOperation::replace(entity)).await?.into_entity()
    }

    /// Overlays the given properties on the stored ones. Guarded like `replace`.
    pub async fn merge(&self, entity: Entity) -> Result<Entity, TableError> {
        self.execute(TableOperation::merge(entity)).await?.into_entity()
    }

    pub async fn delete(
        &self,
        partition_key: &str,
        row_key: &str,
        etag: Option<ETag>,
    ) -> Result<(), TableError> {
        self.execute(TableOperation::delete(partition_key, row_key, etag))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self), fields(table = %self.table_name))]
    pub async fn retrieve_partition(&self, partition_key: &str) -> Result<Vec<Entity>, TableError> {
        self.store.retrieve_partition(partition_key).await
    }
}

fn log_failure(error: &TableError) {
    match error.kind() {
        ErrorKind::PreconditionFailed => warn!(%error, "optimistic concurrency conflict"),
        ErrorKind::Backend => warn!(%error, "store failure"),
        _ => {}
    }
}
