// Pure evaluation of table operations.
//
// Purpose
// - Decide whether an operation may run against the currently stored entity
//   and compute the entity that would be stored afterwards.
//
// Boundaries
// - No input or output and no locking. The store calls `decide` while it holds
//   the partition lock and applies the resulting `Change`s itself.
//
// Replace vs merge
// - Replace stores exactly the incoming property set; stored properties the
//   caller did not send are dropped.
// - Merge overlays the incoming properties on the stored ones; stored
//   properties the caller did not send are kept as they are.

use crate::modules::tables::core::entity::{Entity, EntityKey, Properties};
use crate::modules::tables::core::errors::TableError;
use crate::modules::tables::core::etag::ETag;
use crate::modules::tables::core::operation::{TableOperation, TableResult};
use crate::shared::core::primitives::{validate_key, validate_property_name};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct WriteStamp {
    pub etag: ETag,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Put(Entity),
    Remove(EntityKey),
    Read(Entity),
}

impl Change {
    pub fn result(&self) -> TableResult {
        match self {
            Change::Put(entity) | Change::Read(entity) => TableResult::from_entity(entity.clone()),
            Change::Remove(_) => TableResult::empty(),
        }
    }
}

pub fn replace_properties(incoming: &Properties) -> Properties {
    incoming.clone()
}

pub fn merge_properties(existing: &Properties, incoming: &Properties) -> Properties {
    let mut merged = existing.clone();
    merged.extend(incoming.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

pub fn check_precondition(current: &Entity, expected: Option<&ETag>) -> Result<(), TableError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let current_etag = current.etag.clone().unwrap_or_else(|| ETag::new(""));
    if expected.matches(&current_etag) {
        Ok(())
    } else {
        Err(TableError::PreconditionFailed {
            key: current.key(),
            expected: expected.clone(),
            current: current_etag,
        })
    }
}

fn validate(operation: &TableOperation) -> Result<(), TableError> {
    validate_key("PartitionKey", operation.partition_key())?;
    validate_key("RowKey", operation.row_key())?;
    match operation {
        TableOperation::Insert(e)
        | TableOperation::InsertOrReplace(e)
        | TableOperation::InsertOrMerge(e)
        | TableOperation::Replace(e)
        | TableOperation::Merge(e) => {
            for name in e.properties.keys() {
                validate_property_name(name)?;
            }
            Ok(())
        }
        TableOperation::Delete { .. } | TableOperation::Retrieve(_) => Ok(()),
    }
}

fn stored(key: EntityKey, properties: Properties, stamp: WriteStamp) -> Entity {
    Entity {
        partition_key: key.partition_key,
        row_key: key.row_key,
        timestamp: Some(stamp.timestamp),
        etag: Some(stamp.etag),
        properties,
    }
}

/// Evaluates `operation` against `current`, the entity stored under the
/// operation's key. `stamp` is only called when the operation writes.
pub fn decide(
    current: Option<&Entity>,
    operation: &TableOperation,
    stamp: impl FnOnce() -> WriteStamp,
) -> Result<Change, TableError> {
    validate(operation)?;
    let key = operation.key();
    match (operation, current) {
        (TableOperation::Insert(_), Some(_)) => Err(TableError::AlreadyExists { key }),
        (TableOperation::Insert(e) | TableOperation::InsertOrReplace(e), _) => Ok(Change::Put(
            stored(key, replace_properties(&e.properties), stamp()),
        )),
        (TableOperation::InsertOrMerge(e), None) => Ok(Change::Put(stored(
            key,
            replace_properties(&e.properties),
            stamp(),
        ))),
        (TableOperation::InsertOrMerge(e), Some(existing)) => Ok(Change::Put(stored(
            key,
            merge_properties(&existing.properties, &e.properties),
            stamp(),
        ))),
        (
            TableOperation::Replace(_)
            | TableOperation::Merge(_)
            | TableOperation::Delete { .. }
            | TableOperation::Retrieve(_),
            None,
        ) => Err(TableError::NotFound { key }),
        (TableOperation::Replace(e), Some(existing)) => {
            check_precondition(existing, operation.expected_etag())?;
            Ok(Change::Put(stored(
                key,
                replace_properties(&e.properties),
                stamp(),
            )))
        }
        (TableOperation::Merge(e), Some(existing)) => {
            check_precondition(existing, operation.expected_etag())?;
            Ok(Change::Put(stored(
                key,
                merge_properties(&existing.properties, &e.properties),
                stamp(),
            )))
        }
        (TableOperation::Delete { .. }, Some(existing)) => {
            check_precondition(existing, operation.expected_etag())?;
            Ok(Change::Remove(key))
        }
        (TableOperation::Retrieve(_), Some(existing)) => Ok(Change::Read(existing.clone())),
    }
}

#[cfg(test)]
mod evolve_tests {
    use super::*;
    use crate::modules::tables::core::errors::ErrorKind;
    use crate::modules::tables::core::property::PropertyValue;
    use crate::tests::fixtures::entities::{similar_entity, stamp};
    use rstest::{fixture, rstest};

    #[fixture]
    fn stored_entity() -> Entity {
        match decide(None, &TableOperation::insert(similar_entity("p-1", "r-1")), || {
            stamp("v1")
        }) {
            Ok(Change::Put(entity)) => entity,
            other => panic!("expected Put, got {other:?}"),
        }
    }

    fn put(change: Result<Change, TableError>) -> Entity {
        match change {
            Ok(Change::Put(entity)) => entity,
            other => panic!("expected Put, got {other:?}"),
        }
    }

    #[rstest]
    fn it_should_stamp_inserted_entities(stored_entity: Entity) {
        assert_eq!(stored_entity.etag, Some(ETag::new("v1")));
        assert!(stored_entity.timestamp.is_some());
        assert_eq!(stored_entity.properties.len(), 2);
    }

    #[rstest]
    fn it_should_refuse_to_insert_over_an_existing_entity(stored_entity: Entity) {
        let result = decide(
            Some(&stored_entity),
            &TableOperation::insert(Entity::new("p-1", "r-1")),
            || stamp("v2"),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::AlreadyExists);
    }

    #[rstest]
    fn it_should_drop_unmentioned_properties_on_replace(stored_entity: Entity) {
        let incoming = Entity::new("p-1", "r-1")
            .with("Data", "DataModified")
            .with_etag(ETag::new("v1"));
        let entity = put(decide(
            Some(&stored_entity),
            &TableOperation::replace(incoming),
            || stamp("v2"),
        ));
        assert_eq!(entity.get("Data"), Some(&PropertyValue::from("DataModified")));
        assert_eq!(entity.get("AnotherProperty"), None);
        assert_eq!(entity.etag, Some(ETag::new("v2")));
    }

    #[rstest]
    fn it_should_keep_unmentioned_properties_on_merge(stored_entity: Entity) {
        let incoming = Entity::new("p-1", "r-1")
            .with("Data", "DataModified")
            .with_etag(ETag::new("v1"));
        let entity = put(decide(
            Some(&stored_entity),
            &TableOperation::merge(incoming),
            || stamp("v2"),
        ));
        assert_eq!(entity.get("Data"), Some(&PropertyValue::from("DataModified")));
        assert_eq!(
            entity.get("AnotherProperty"),
            stored_entity.get("AnotherProperty")
        );
    }

    #[rstest]
    #[case::replace(TableOperation::replace(Entity::new("p-1", "r-1").with_etag(ETag::new("v0"))))]
    #[case::merge(TableOperation::merge(Entity::new("p-1", "r-1").with_etag(ETag::new("v0"))))]
    #[case::delete(TableOperation::delete("p-1", "r-1", Some(ETag::new("v0"))))]
    fn it_should_fail_the_precondition_on_a_stale_version(
        stored_entity: Entity,
        #[case] operation: TableOperation,
    ) {
        let result = decide(Some(&stored_entity), &operation, || stamp("v2"));
        assert_eq!(
            result,
            Err(TableError::PreconditionFailed {
                key: EntityKey::new("p-1", "r-1"),
                expected: ETag::new("v0"),
                current: ETag::new("v1"),
            })
        );
    }

    #[rstest]
    #[case::no_version(None)]
    #[case::wildcard(Some(ETag::any()))]
    fn it_should_write_unconditionally_without_a_specific_version(
        stored_entity: Entity,
        #[case] etag: Option<ETag>,
    ) {
        let mut incoming = Entity::new("p-1", "r-1").with("Data", "x");
        incoming.etag = etag;
        let entity = put(decide(
            Some(&stored_entity),
            &TableOperation::replace(incoming),
            || stamp("v2"),
        ));
        assert_eq!(entity.etag, Some(ETag::new("v2")));
    }

    #[rstest]
    #[case::replace(TableOperation::replace(Entity::new("p-1", "r-9")))]
    #[case::merge(TableOperation::merge(Entity::new("p-1", "r-9")))]
    #[case::delete(TableOperation::delete("p-1", "r-9", None))]
    #[case::retrieve(TableOperation::retrieve("p-1", "r-9"))]
    fn it_should_report_missing_entities(#[case] operation: TableOperation) {
        let result = decide(None, &operation, || stamp("v1"));
        assert_eq!(
            result,
            Err(TableError::NotFound {
                key: EntityKey::new("p-1", "r-9")
            })
        );
    }

    #[rstest]
    fn it_should_upsert_with_merge_or_replace(stored_entity: Entity) {
        let incoming = Entity::new("p-1", "r-1").with("Data", "Upserted");
        let merged = put(decide(
            Some(&stored_entity),
            &TableOperation::insert_or_merge(incoming.clone()),
            || stamp("v2"),
        ));
        assert!(merged.get("AnotherProperty").is_some());
        let replaced = put(decide(
            Some(&stored_entity),
            &TableOperation::insert_or_replace(incoming.clone()),
            || stamp("v3"),
        ));
        assert!(replaced.get("AnotherProperty").is_none());
        let created = put(decide(None, &TableOperation::insert_or_merge(incoming), || {
            stamp("v4")
        }));
        assert_eq!(created.etag, Some(ETag::new("v4")));
    }

    #[rstest]
    fn it_should_not_stamp_reads_and_deletes(stored_entity: Entity) {
        let read = decide(
            Some(&stored_entity),
            &TableOperation::retrieve("p-1", "r-1"),
            || panic!("retrieve must not mint a version"),
        );
        assert_eq!(read, Ok(Change::Read(stored_entity.clone())));
        let removed = decide(
            Some(&stored_entity),
            &TableOperation::delete("p-1", "r-1", Some(ETag::new("v1"))),
            || panic!("delete must not mint a version"),
        );
        assert_eq!(removed, Ok(Change::Remove(EntityKey::new("p-1", "r-1"))));
        assert_eq!(removed.unwrap().result(), TableResult::empty());
    }

    #[rstest]
    fn it_should_reject_invalid_keys_and_reserved_property_names() {
        let bad_key = decide(None, &TableOperation::insert(Entity::new("p/1", "r")), || {
            stamp("v1")
        });
        assert_eq!(bad_key.unwrap_err().kind(), ErrorKind::InvalidKey);
        let reserved = decide(
            None,
            &TableOperation::insert(Entity::new("p", "r").with("ETag", "x")),
            || stamp("v1"),
        );
        assert_eq!(reserved.unwrap_err().kind(), ErrorKind::InvalidKey);
    }

    #[rstest]
    fn it_should_merge_property_maps_by_key() {
        let existing = Entity::new("p", "r").with("a", 1).with("b", 2).properties;
        let incoming = Entity::new("p", "r").with("b", 20).with("c", 30).properties;
        let merged = merge_properties(&existing, &incoming);
        assert_eq!(
            merged,
            Entity::new("p", "r")
                .with("a", 1)
                .with("b", 20)
                .with("c", 30)
                .properties
        );
        assert_eq!(replace_properties(&incoming), incoming);
    }
}
