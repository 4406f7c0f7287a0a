// Playground scenarios exercising the table contract end to end.
//
// - Concurrency conflict: a batch replace with one stale version must abort
//   as a whole.
// - Replace vs merge: writing back an entity read through a narrower shape
//   loses the properties it did not carry on replace and keeps them on merge.

use crate::modules::tables::adapters::inbound::table_client::TableClient;
use crate::modules::tables::core::entity::Entity;
use crate::modules::tables::core::errors::TableError;
use crate::modules::tables::core::etag::ETag;
use crate::modules::tables::use_cases::execute_batch::batch::TableBatchOperation;
use crate::shared::infrastructure::entity_store::EntityStore;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Replace,
    Merge,
}

#[derive(Debug)]
pub struct ConflictReport {
    pub inserted_etags: Vec<Option<ETag>>,
    pub batch_error: Option<TableError>,
    pub entity_one_after: Entity,
    pub entity_two_after: Entity,
}

#[derive(Debug)]
pub struct UpdateReport {
    pub mode: UpdateMode,
    pub before: Entity,
    pub after: Entity,
}

fn dump(entity: &Entity) -> String {
    serde_json::to_string(entity).unwrap_or_else(|error| format!("<unprintable: {error}>"))
}

fn new_key() -> String {
    Uuid::now_v7().to_string()
}

pub async fn verify_concurrency_conflict_behavior<TStore>(
    client: &TableClient<TStore>,
) -> Result<ConflictReport, TableError>
where
    TStore: EntityStore + ?Sized + 'static,
{
    let partition_key = new_key();
    let entity_one_id = new_key();
    let entity_two_id = new_key();

    let mut batch = TableBatchOperation::new();
    batch
        .insert(Entity::new(&partition_key, &entity_one_id).with("Data", "DataNotModified"))
        .insert(Entity::new(&partition_key, &entity_two_id).with("Data", "DataNotModified"));
    let inserted = client.execute_batch(batch).await?;
    let inserted_etags: Vec<Option<ETag>> = inserted.iter().map(|r| r.etag.clone()).collect();
    info!(etags = ?inserted_etags, "batch insert result");

    let entity_one_previous = inserted_etags.first().cloned().flatten();
    let entity_two_previous = inserted_etags.get(1).cloned().flatten();

    let mut entity_two = Entity::new(&partition_key, &entity_two_id).with("Data", "DataModified");
    entity_two.etag = entity_two_previous.clone();
    client.replace(entity_two).await?;
    info!("entity two modified");

    let mut entity_one = Entity::new(&partition_key, &entity_one_id).with("Data", "DataModified");
    entity_one.etag = entity_one_previous;
    let mut entity_two =
        Entity::new(&partition_key, &entity_two_id).with("Data", "DataModifiedAgain");
    entity_two.etag = entity_two_previous;

    let mut batch = TableBatchOperation::new();
    batch.replace(entity_one).replace(entity_two);
    let batch_error = match client.execute_batch(batch).await {
        Ok(results) => {
            info!(operations = results.len(), "batch with previous versions committed");
            None
        }
        Err(error) => {
            info!(%error, index = ?error.failed_index(), "batch with previous versions aborted");
            Some(error)
        }
    };

    Ok(ConflictReport {
        inserted_etags,
        batch_error,
        entity_one_after: client.retrieve(&partition_key, &entity_one_id).await?,
        entity_two_after: client.retrieve(&partition_key, &entity_two_id).await?,
    })
}

pub async fn verify_update_behavior<TStore>(
    client: &TableClient<TStore>,
    mode: UpdateMode,
) -> Result<UpdateReport, TableError>
where
    TStore: EntityStore + ?Sized + 'static,
{
    let partition_key = new_key();
    let entity_one_id = new_key();

    client
        .insert(
            Entity::new(&partition_key, &entity_one_id)
                .with("Data", "DataNotModified")
                .with("AnotherProperty", "Info we don't want to lose"),
        )
        .await?;

    let before = client.retrieve(&partition_key, &entity_one_id).await?;
    info!(entity = %dump(&before), "retrieve result");

    // Read back through a shape that only knows about `Data`.
    let mut narrowed = Entity::new(&partition_key, &entity_one_id).with("Data", "DataModified");
    narrowed.etag = before.etag.clone();

    match mode {
        UpdateMode::Replace => client.replace(narrowed).await?,
        UpdateMode::Merge => client.merge(narrowed).await?,
    };

    let after = client.retrieve(&partition_key, &entity_one_id).await?;
    info!(?mode, entity = %dump(&after), "retrieve result after modification");

    Ok(UpdateReport {
        mode,
        before,
        after,
    })
}
