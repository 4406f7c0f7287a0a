// Composition root for the entity tables playground.
//
// Responsibilities
// - Read config from the environment (and an optional .env file).
// - Instantiate the in-memory store and wire it into a table client.
// - Run the playground scenarios from the binary.

pub mod config;
pub mod playground;

use crate::modules::tables::adapters::inbound::table_client::TableClient;
use crate::shared::infrastructure::entity_store::in_memory::InMemoryEntityStore;
use self::config::ShellConfig;
use std::sync::Arc;

pub fn build_client(config: &ShellConfig) -> TableClient<InMemoryEntityStore> {
    TableClient::new(
        config.table_name.clone(),
        Arc::new(InMemoryEntityStore::new()),
        &config.store,
    )
}
