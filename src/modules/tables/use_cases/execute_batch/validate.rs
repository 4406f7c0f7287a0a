// Structural checks a batch must pass before the store sees it.
//
// Rules
// - At least one operation and no more than the configured maximum.
// - A retrieve must be the only operation.
// - Every operation targets the partition of the first one.
// - No row key is targeted twice.
//
// A `ValidatedBatch` can only be obtained through `validate_batch`, so the
// store never has to re-check these rules.

use crate::modules::tables::core::errors::{InvalidBatchReason, TableError};
use crate::modules::tables::core::operation::TableOperation;
use crate::modules::tables::use_cases::execute_batch::batch::TableBatchOperation;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    partition_key: String,
    operations: Vec<TableOperation>,
}

impl ValidatedBatch {
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn operations(&self) -> &[TableOperation] {
        &self.operations
    }
}

pub fn validate_batch(
    batch: TableBatchOperation,
    max_batch_size: usize,
) -> Result<ValidatedBatch, TableError> {
    let operations = batch.into_operations();
    let Some(first) = operations.first() else {
        return Err(InvalidBatchReason::Empty.into());
    };
    if operations.len() > max_batch_size {
        return Err(InvalidBatchReason::TooManyOperations {
            count: operations.len(),
            max: max_batch_size,
        }
        .into());
    }
    if operations.len() > 1 && operations.iter().any(TableOperation::is_retrieve) {
        return Err(InvalidBatchReason::RetrieveNotAlone.into());
    }

    let partition_key = first.partition_key().to_string();
    let mut row_keys = HashSet::with_capacity(operations.len());
    for (index, operation) in operations.iter().enumerate() {
        if operation.partition_key() != partition_key {
            return Err(InvalidBatchReason::MixedPartitions {
                expected: partition_key,
                found: operation.partition_key().to_string(),
                index,
            }
            .into());
        }
        if !row_keys.insert(operation.row_key()) {
            return Err(InvalidBatchReason::DuplicateRowKey {
                row_key: operation.row_key().to_string(),
                index,
            }
            .into());
        }
    }

    Ok(ValidatedBatch {
        partition_key,
        operations,
    })
}
