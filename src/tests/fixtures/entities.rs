// Shared entity fixtures for unit tests.

use crate::modules::tables::core::entity::Entity;
use crate::modules::tables::core::etag::ETag;
use crate::modules::tables::core::evolve::WriteStamp;
use chrono::{TimeZone, Utc};

/// Entity with a single `Data` property, as first written by the playground.
pub fn data_entity(partition_key: &str, row_key: &str) -> Entity {
    Entity::new(partition_key, row_key).with("Data", "DataNotModified")
}

/// Entity carrying a second property that a replace would lose.
pub fn similar_entity(partition_key: &str, row_key: &str) -> Entity {
    data_entity(partition_key, row_key).with("AnotherProperty", "Info we don't want to lose")
}

pub fn stamp(etag: &str) -> WriteStamp {
    WriteStamp {
        etag: ETag::new(etag),
        timestamp: Utc.with_ymd_and_hms(2023, 11, 14, 22, 13, 20).unwrap(),
    }
}
