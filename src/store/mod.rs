//! Persistence for the concept registry and fact ledger.
//!
//! The hologram itself is never stored: it is a pure function of the ledger
//! and the bundle seed, so it is rebuilt on the first query after a load.
//! See [`HoloStore`] for the on-disk layout.

pub mod durable;

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use durable::HoloStore;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Version of the on-disk layout. Bumped on any incompatible change.
pub const FORMAT_VERSION: u64 = 1;

/// File name of the database inside the data directory.
pub const DB_FILE: &str = "holokg.redb";

/// A persisted concept prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub name: String,
    pub words: Vec<u64>,
}

/// A persisted ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub subject: String,
    pub relation: String,
    pub object: String,
    pub weight: u32,
}

/// Header values kept in the `meta` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreMeta {
    pub version: u64,
    pub dimension: usize,
    pub bundle_seed: u64,
}

pub(crate) fn encode_record<T: Serialize>(record: &T) -> StoreResult<Vec<u8>> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}

pub(crate) fn decode_record<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> StoreResult<T> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization {
        message: e.to_string(),
    })
}
