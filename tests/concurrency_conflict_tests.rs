// End to end optimistic concurrency tests against the in-memory store.
//
// - A stale version fails with PreconditionFailed; retrying with the fresh
//   version succeeds.
// - Many tasks racing on one entity with the same version: exactly one wins.

use entity_tables::modules::tables::adapters::inbound::table_client::TableClient;
use entity_tables::modules::tables::core::entity::Entity;
use entity_tables::modules::tables::core::errors::ErrorKind;
use entity_tables::modules::tables::core::property::PropertyValue;
use entity_tables::shared::infrastructure::entity_store::config::StoreConfig;
use entity_tables::shared::infrastructure::entity_store::in_memory::InMemoryEntityStore;
use rstest::{fixture, rstest};
use std::sync::Arc;

#[fixture]
fn client() -> TableClient<InMemoryEntityStore> {
    TableClient::new(
        "concurrency",
        Arc::new(InMemoryEntityStore::new()),
        &StoreConfig::default(),
    )
}

#[rstest]
#[case::replace(false)]
#[case::merge(true)]
#[tokio::test]
async fn it_should_reject_a_stale_version_and_accept_the_retry(
    client: TableClient<InMemoryEntityStore>,
    #[case] merge: bool,
) {
    let inserted = client
        .insert(Entity::new("p", "e").with("Data", "DataNotModified"))
        .await
        .unwrap();
    let t0 = inserted.etag.clone().unwrap();

    // A third party writes first and advances the version.
    let third_party = client
        .replace(
            Entity::new("p", "e")
                .with("Data", "ThirdParty")
                .with_etag(t0.clone()),
        )
        .await
        .unwrap();
    let t1 = third_party.etag.clone().unwrap();
    assert_ne!(t0, t1);

    let write = |etag| {
        let entity = Entity::new("p", "e").with("Data", "Mine").with_etag(etag);
        let client = client.clone();
        async move {
            if merge {
                client.merge(entity).await
            } else {
                client.replace(entity).await
            }
        }
    };

    let stale = write(t0).await.unwrap_err();
    assert_eq!(stale.kind(), ErrorKind::PreconditionFailed);
    assert_eq!(
        client.retrieve("p", "e").await.unwrap().get("Data"),
        Some(&PropertyValue::from("ThirdParty"))
    );

    let retried = write(t1.clone()).await.unwrap();
    assert_ne!(retried.etag, Some(t1));
    assert_eq!(retried.get("Data"), Some(&PropertyValue::from("Mine")));
}

#[rstest]
#[tokio::test]
async fn it_should_let_exactly_one_of_many_racing_tasks_win() {
    let store = Arc::new(InMemoryEntityStore::new());
    store.set_delay_commit_ms(1);
    let client = TableClient::new("race", store, &StoreConfig::default());
    let inserted = client
        .insert(Entity::new("p", "e").with("Counter", 0))
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for i in 1..=8 {
        let client = client.clone();
        let etag = inserted.etag.clone().unwrap();
        tasks.push(tokio::spawn(async move {
            client
                .merge(Entity::new("p", "e").with("Counter", i).with_etag(etag))
                .await
        }));
    }

    let mut winners = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => winners += 1,
            Err(error) => assert_eq!(error.kind(), ErrorKind::PreconditionFailed),
        }
    }
    assert_eq!(winners, 1);
}

#[rstest]
#[tokio::test]
async fn it_should_fail_the_second_insert_regardless_of_payload(
    client: TableClient<InMemoryEntityStore>,
) {
    client
        .insert(Entity::new("p", "e").with("Data", "first"))
        .await
        .unwrap();
    for payload in [
        Entity::new("p", "e").with("Data", "first"),
        Entity::new("p", "e").with("Other", 42),
        Entity::new("p", "e"),
    ] {
        let error = client.insert(payload).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::AlreadyExists);
    }
}
