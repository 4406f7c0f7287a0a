// Operation descriptors built by callers and evaluated by the store.
//
// Replace and Merge take their expected version from the entity's `etag`;
// `None` or the wildcard makes the write unconditional.

use crate::modules::tables::core::entity::{Entity, EntityKey};
use crate::modules::tables::core::errors::TableError;
use crate::modules::tables::core::etag::ETag;

#[derive(Debug, Clone, PartialEq)]
pub enum TableOperation {
    Insert(Entity),
    InsertOrReplace(Entity),
    InsertOrMerge(Entity),
    Replace(Entity),
    Merge(Entity),
    Delete { key: EntityKey, etag: Option<ETag> },
    Retrieve(EntityKey),
}

impl TableOperation {
    pub fn insert(entity: Entity) -> Self {
        TableOperation::Insert(entity)
    }

    pub fn insert_or_replace(entity: Entity) -> Self {
        TableOperation::InsertOrReplace(entity)
    }

    pub fn insert_or_merge(entity: Entity) -> Self {
        TableOperation::InsertOrMerge(entity)
    }

    pub fn replace(entity: Entity) -> Self {
        TableOperation::Replace(entity)
    }

    pub fn merge(entity: Entity) -> Self {
        TableOperation::Merge(entity)
    }

    pub fn delete(
        partition_key: impl Into<String>,
        row_key: impl Into<String>,
        etag: Option<ETag>,
    ) -> Self {
        TableOperation::Delete {
            key: EntityKey::new(partition_key, row_key),
            etag,
        }
    }

    pub fn retrieve(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        TableOperation::Retrieve(EntityKey::new(partition_key, row_key))
    }

    pub fn partition_key(&self) -> &str {
        match self {
            TableOperation::Insert(e)
            | TableOperation::InsertOrReplace(e)
            | TableOperation::InsertOrMerge(e)
            | TableOperation::Replace(e)
            | TableOperation::Merge(e) => &e.partition_key,
            TableOperation::Delete { key, .. } | TableOperation::Retrieve(key) => {
                &key.partition_key
            }
        }
    }

    pub fn row_key(&self) -> &str {
        match self {
            TableOperation::Insert(e)
            | TableOperation::InsertOrReplace(e)
            | TableOperation::InsertOrMerge(e)
            | TableOperation::Replace(e)
            | TableOperation::Merge(e) => &e.row_key,
            TableOperation::Delete { key, .. } | TableOperation::Retrieve(key) => &key.row_key,
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.partition_key(), self.row_key())
    }

    pub fn expected_etag(&self) -> Option<&ETag> {
        match self {
            TableOperation::Replace(e) | TableOperation::Merge(e) => e.etag.as_ref(),
            TableOperation::Delete { etag, .. } => etag.as_ref(),
            _ => None,
        }
    }

    pub fn is_retrieve(&self) -> bool {
        matches!(self, TableOperation::Retrieve(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            TableOperation::Insert(_) => "insert",
            TableOperation::InsertOrReplace(_) => "insert_or_replace",
            TableOperation::InsertOrMerge(_) => "insert_or_merge",
            TableOperation::Replace(_) => "replace",
            TableOperation::Merge(_) => "merge",
            TableOperation::Delete { .. } => "delete",
            TableOperation::Retrieve(_) => "retrieve",
        }
    }
}

/// Outcome of one operation. Writes carry the stored entity and its new
/// version, retrieves carry the entity, deletes carry neither.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableResult {
    pub etag: Option<ETag>,
    pub entity: Option<Entity>,
}

impl TableResult {
    pub fn from_entity(entity: Entity) -> Self {
        Self {
            etag: entity.etag.clone(),
            entity: Some(entity),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn into_entity(self) -> Result<Entity, TableError> {
        self.entity
            .ok_or_else(|| TableError::Backend("store returned no entity".into()))
    }
}
