use crate::modules::tables::core::entity::EntityKey;
use crate::modules::tables::core::etag::ETag;
use crate::shared::core::primitives::InvalidKeyError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    PreconditionFailed,
    InvalidBatch,
    InvalidKey,
    Backend,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidBatchReason {
    #[error("batch contains no operations")]
    Empty,

    #[error("batch contains {count} operations, at most {max} allowed")]
    TooManyOperations { count: usize, max: usize },

    #[error("operation {index} targets partition {found:?}, batch is scoped to {expected:?}")]
    MixedPartitions {
        expected: String,
        found: String,
        index: usize,
    },

    #[error("operation {index} targets row {row_key:?} which an earlier operation already targets")]
    DuplicateRowKey { row_key: String, index: usize },

    #[error("a retrieve must be the only operation in a batch")]
    RetrieveNotAlone,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("entity {key} already exists")]
    AlreadyExists { key: EntityKey },

    #[error("entity {key} not found")]
    NotFound { key: EntityKey },

    #[error("precondition failed for {key}: expected {expected}, current {current}")]
    PreconditionFailed {
        key: EntityKey,
        expected: ETag,
        current: ETag,
    },

    #[error("invalid batch: {0}")]
    InvalidBatch(#[from] InvalidBatchReason),

    #[error("invalid key: {0}")]
    InvalidKey(#[from] InvalidKeyError),

    #[error("batch operation {index} failed: {source}")]
    BatchOperationFailed {
        index: usize,
        #[source]
        source: Box<TableError>,
    },

    #[error("backend error: {0}")]
    Backend(String),
}

impl TableError {
    /// Kind of the underlying failure, looking through the batch wrapper.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TableError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            TableError::NotFound { .. } => ErrorKind::NotFound,
            TableError::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            TableError::InvalidBatch(_) => ErrorKind::InvalidBatch,
            TableError::InvalidKey(_) => ErrorKind::InvalidKey,
            TableError::BatchOperationFailed { source, .. } => source.kind(),
            TableError::Backend(_) => ErrorKind::Backend,
        }
    }

    /// Index of the batch operation that aborted the batch, if any.
    pub fn failed_index(&self) -> Option<usize> {
        match self {
            TableError::BatchOperationFailed { index, .. } => Some(*index),
            TableError::InvalidBatch(
                InvalidBatchReason::MixedPartitions { index, .. }
                | InvalidBatchReason::DuplicateRowKey { index, .. },
            ) => Some(*index),
            _ => None,
        }
    }

    pub(crate) fn at_index(self, index: usize) -> Self {
        match self {
            TableError::Backend(_) => self,
            other => TableError::BatchOperationFailed {
                index,
                source: Box::new(other),
            },
        }
    }
}
