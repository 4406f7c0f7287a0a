// Ordered list of operations a caller wants to commit together.
//
// Nothing is checked while operations are added; `validate_batch` decides
// whether the batch may be executed at all.

use crate::modules::tables::core::entity::Entity;
use crate::modules::tables::core::etag::ETag;
use crate::modules::tables::core::operation::TableOperation;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableBatchOperation {
    operations: Vec<TableOperation>,
}

impl TableBatchOperation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, operation: TableOperation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    pub fn insert(&mut self, entity: Entity) -> &mut Self {
        self.add(TableOperation::insert(entity))
    }

    pub fn insert_or_replace(&mut self, entity: Entity) -> &mut Self {
        self.add(TableOperation::insert_or_replace(entity))
    }

    pub fn insert_or_merge(&mut self, entity: Entity) -> &mut Self {
        self.add(TableOperation::insert_or_merge(entity))
    }

    pub fn replace(&mut self, entity: Entity) -> &mut Self {
        self.add(TableOperation::replace(entity))
    }

    pub fn merge(&mut self, entity: Entity) -> &mut Self {
        self.add(TableOperation::merge(entity))
    }

    pub fn delete(
        &mut self,
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        etag: Option<ETag>,
    ) -> &mut Self {
        self.add(TableOperation::delete(partition_key, row_key, etag))
    }

    pub fn retrieve(
        &mut self,
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
    ) -> &mut Self {
        self.add(TableOperation::retrieve(partition_key, row_key))
    }

    /// Partition of the first operation; `None` for an empty batch.
    pub fn partition_key(&self) -> Option<&str> {
        self.operations.first().map(TableOperation::partition_key)
    }

    pub fn operations(&self) -> &[TableOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn clear(&mut self) {
        self.operations.clear();
    }

    pub fn into_operations(self) -> Vec<TableOperation> {
        self.operations
    }
}

impl FromIterator<TableOperation> for TableBatchOperation {
    fn from_iter<I: IntoIterator<Item = TableOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}
