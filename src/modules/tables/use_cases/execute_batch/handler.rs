// Batch executor.
//
// Responsibilities
// - Validate the batch shape before anything reaches the store.
// - Hand the validated batch to the store, which commits it atomically.
// - Report failures with the index of the offending operation; no retries.

use crate::modules::tables::core::errors::TableError;
use crate::modules::tables::core::operation::TableResult;
use crate::modules::tables::use_cases::execute_batch::batch::TableBatchOperation;
use crate::modules::tables::use_cases::execute_batch::validate::validate_batch;
use crate::shared::infrastructure::entity_store::EntityStore;
use crate::shared::infrastructure::entity_store::config::StoreConfig;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ExecuteBatchHandler<TStore>
where
    TStore: EntityStore + ?Sized + 'static,
{
    store: Arc<TStore>,
    max_batch_size: usize,
}

impl<TStore> ExecuteBatchHandler<TStore>
where
    TStore: EntityStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>, config: &StoreConfig) -> Self {
        Self {
            store,
            max_batch_size: config.max_batch_size,
        }
    }

    pub async fn handle(&self, batch: TableBatchOperation) -> Result<Vec<TableResult>, TableError> {
        let validated = validate_batch(batch, self.max_batch_size).inspect_err(|error| {
            warn!(%error, "batch rejected before execution");
        })?;
        let partition_key = validated.partition_key().to_string();
        let operations = validated.operations().len();
        match self.store.commit_batch(validated).await {
            Ok(results) => {
                debug!(%partition_key, operations, "batch committed");
                Ok(results)
            }
            Err(error) => {
                warn!(%partition_key, index = ?error.failed_index(), %error, "batch aborted");
                Err(error)
            }
        }
    }
}
