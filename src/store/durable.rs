//! ACID-durable graph snapshots backed by redb.
//!
//! Layout of `holokg.redb`:
//!
//! - `meta`: `"version"`, `"dimension"`, `"bundle_seed"` → `u64`
//! - `concepts`: insertion index → bincode [`ConceptRecord`]
//! - `facts`: ledger index → bincode [`FactRecord`]
//!
//! A save replaces all three tables inside one write transaction, so a
//! reader sees either the previous snapshot or the new one.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use redb::{Database, ReadTransaction, ReadableTable, TableDefinition, TableError, TableHandle};

use crate::config::HoloConfig;
use crate::error::{HoloResult, StoreError};
use crate::graph::{Fact, HoloGraph};
use crate::vsa::HyperVector;

use super::{
    ConceptRecord, DB_FILE, FORMAT_VERSION, FactRecord, StoreMeta, StoreResult, decode_record,
    encode_record,
};

const META_TABLE: TableDefinition<&str, u64> = TableDefinition::new("meta");
const CONCEPTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("concepts");
const FACTS_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("facts");

const KEY_VERSION: &str = "version";
const KEY_DIMENSION: &str = "dimension";
const KEY_BUNDLE_SEED: &str = "bundle_seed";

fn redb_err<E: std::fmt::Display>(context: &'static str) -> impl FnOnce(E) -> StoreError {
    move |e| StoreError::Redb {
        message: format!("{context} failed: {e}"),
    }
}

fn corrupted(message: impl Into<String>) -> StoreError {
    StoreError::CorruptedState {
        message: message.into(),
    }
}

/// Durable home of one graph's registry and ledger.
pub struct HoloStore {
    db: Arc<Database>,
    path: PathBuf,
}

impl HoloStore {
    /// Open or create the store in the given directory.
    pub fn open(data_dir: &Path) -> StoreResult<Self> {
        std::fs::create_dir_all(data_dir).map_err(|e| StoreError::Io { source: e })?;
        let path = data_dir.join(DB_FILE);
        let db = Database::create(&path).map_err(|e| StoreError::Redb {
            message: format!("failed to open redb at {}: {e}", path.display()),
        })?;
        tracing::info!(path = %path.display(), "opened holostore");
        Ok(Self {
            db: Arc::new(db),
            path,
        })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored snapshot with `graph`'s registry and ledger.
    pub fn save(&self, graph: &HoloGraph) -> StoreResult<()> {
        let txn = self
            .db
            .begin_write()
            .map_err(redb_err("begin_write"))?;
        {
            txn.delete_table(CONCEPTS_TABLE)
                .map_err(redb_err("delete_table"))?;
            txn.delete_table(FACTS_TABLE)
                .map_err(redb_err("delete_table"))?;

            let mut meta = txn
                .open_table(META_TABLE)
                .map_err(redb_err("open_table"))?;
            for (key, value) in [
                (KEY_VERSION, FORMAT_VERSION),
                (KEY_DIMENSION, graph.config().dimension as u64),
                (KEY_BUNDLE_SEED, graph.config().bundle_seed),
            ] {
                meta.insert(key, value)
                    .map_err(redb_err("insert"))?;
            }

            let mut concepts = txn
                .open_table(CONCEPTS_TABLE)
                .map_err(redb_err("open_table"))?;
            for (idx, (name, vec)) in graph.memory().iter().enumerate() {
                let bytes = encode_record(&ConceptRecord {
                    name: name.to_string(),
                    words: vec.words().to_vec(),
                })?;
                concepts
                    .insert(idx as u64, bytes.as_slice())
                    .map_err(redb_err("insert"))?;
            }

            let mut facts = txn
                .open_table(FACTS_TABLE)
                .map_err(redb_err("open_table"))?;
            for (idx, (fact, weight)) in graph.facts().enumerate() {
                let bytes = encode_record(&FactRecord {
                    subject: fact.subject.clone(),
                    relation: fact.relation.clone(),
                    object: fact.object.clone(),
                    weight,
                })?;
                facts
                    .insert(idx as u64, bytes.as_slice())
                    .map_err(redb_err("insert"))?;
            }
        }
        txn.commit().map_err(redb_err("commit"))?;

        tracing::info!(
            path = %self.path.display(),
            concepts = graph.concept_count(),
            facts = graph.fact_count(),
            "saved holograph"
        );
        Ok(())
    }

    /// Header of the stored snapshot, or `None` if nothing was saved yet.
    pub fn meta(&self) -> StoreResult<Option<StoreMeta>> {
        let txn = self.begin_read()?;
        read_meta(&txn)
    }

    fn begin_read(&self) -> StoreResult<ReadTransaction> {
        self.db.begin_read().map_err(redb_err("begin_read"))
    }

    /// Rebuild the stored graph.
    ///
    /// With nothing stored yet this is an empty graph built from `config`.
    /// The stored bundle seed overrides `config.bundle_seed` so the rebuilt
    /// hologram matches the saved one. Every record is validated; any
    /// inconsistency fails with [`StoreError::CorruptedState`]. All tables
    /// are read from one transaction, so a concurrent save is either fully
    /// visible or not at all.
    pub fn load(&self, config: &HoloConfig) -> HoloResult<HoloGraph> {
        let txn = self.begin_read()?;
        let Some(meta) = read_meta(&txn)? else {
            tracing::info!(path = %self.path.display(), "empty holostore, starting fresh graph");
            return HoloGraph::new(config.clone());
        };

        if meta.version != FORMAT_VERSION {
            return Err(corrupted(format!(
                "format version {} is not supported (expected {FORMAT_VERSION})",
                meta.version
            ))
            .into());
        }
        if meta.dimension != config.dimension {
            return Err(corrupted(format!(
                "stored dimension {} does not match configured dimension {}",
                meta.dimension, config.dimension
            ))
            .into());
        }

        let mut graph = HoloGraph::new(HoloConfig {
            bundle_seed: meta.bundle_seed,
            ..config.clone()
        })?;
        let dim = graph.config().dim();

        let concepts: Vec<ConceptRecord> = read_records(&txn, CONCEPTS_TABLE)?;
        for record in concepts {
            let vec = HyperVector::from_words(record.words, dim)
                .map_err(|e| corrupted(format!("concept \"{}\": {e}", record.name)))?;
            if !graph.memory_mut().insert(&record.name, vec)? {
                return Err(corrupted(format!("concept \"{}\" stored twice", record.name)).into());
            }
        }

        let facts: Vec<FactRecord> = read_records(&txn, FACTS_TABLE)?;
        let mut seen = HashSet::with_capacity(facts.len());
        for record in facts {
            let fact = Fact::new(record.subject, record.relation, record.object);
            for name in [&fact.subject, &fact.relation, &fact.object] {
                if !graph.memory().contains(name) {
                    return Err(corrupted(format!("fact {fact} references unknown concept \"{name}\"")).into());
                }
            }
            if record.weight == 0 {
                return Err(corrupted(format!("fact {fact} has zero weight")).into());
            }
            if !seen.insert(fact.clone()) {
                return Err(corrupted(format!("fact {fact} stored twice")).into());
            }
            graph.learn_weighted(fact, record.weight)?;
        }

        tracing::info!(
            path = %self.path.display(),
            concepts = graph.concept_count(),
            facts = graph.fact_count(),
            "loaded holograph"
        );
        Ok(graph)
    }

    #[cfg(test)]
    fn put_raw(&self, definition: TableDefinition<u64, &[u8]>, key: u64, value: &[u8]) {
        let txn = self.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(definition).unwrap();
            table.insert(key, value).unwrap();
        }
        txn.commit().unwrap();
    }

    #[cfg(test)]
    fn put_meta(&self, key: &str, value: u64) {
        let txn = self.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(META_TABLE).unwrap();
            table.insert(key, value).unwrap();
        }
        txn.commit().unwrap();
    }
}

fn read_meta(txn: &ReadTransaction) -> StoreResult<Option<StoreMeta>> {
    let table = match txn.open_table(META_TABLE) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(None),
        Err(e) => return Err(redb_err("open_table")(e)),
    };

    let read = |key: &str| -> StoreResult<u64> {
        table
            .get(key)
            .map_err(redb_err("get"))?
            .map(|guard| guard.value())
            .ok_or_else(|| corrupted(format!("meta table is missing \"{key}\"")))
    };

    Ok(Some(StoreMeta {
        version: read(KEY_VERSION)?,
        dimension: read(KEY_DIMENSION)? as usize,
        bundle_seed: read(KEY_BUNDLE_SEED)?,
    }))
}

// Records in key order; keys must run 0, 1, 2, ... without gaps.
fn read_records<T: for<'de> serde::Deserialize<'de>>(
    txn: &ReadTransaction,
    definition: TableDefinition<u64, &[u8]>,
) -> StoreResult<Vec<T>> {
    let table = match txn.open_table(definition) {
        Ok(table) => table,
        Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
        Err(e) => return Err(redb_err("open_table")(e)),
    };

    let mut records = Vec::new();
    for (expected, entry) in table
        .iter()
        .map_err(redb_err("iter"))?
        .enumerate()
    {
        let (key, value) = entry.map_err(redb_err("iter"))?;
        if key.value() != expected as u64 {
            return Err(corrupted(format!(
                "table {} has a gap at index {expected}",
                definition.name()
            )));
        }
        records.push(decode_record(value.value())?);
    }
    Ok(records)
}

impl std::fmt::Debug for HoloStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HoloStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HoloError;
    use tempfile::TempDir;

    fn config() -> HoloConfig {
        HoloConfig {
            dimension: 2048,
            ..Default::default()
        }
    }

    fn saved_store(dir: &TempDir) -> HoloStore {
        let mut graph = HoloGraph::new(config()).unwrap();
        graph.learn("Sky", "Is", "Blue").unwrap();
        graph.learn("Grass", "Is", "Green").unwrap();
        let store = HoloStore::open(dir.path()).unwrap();
        store.save(&graph).unwrap();
        store
    }

    fn assert_corrupted(result: HoloResult<HoloGraph>) {
        match result {
            Err(HoloError::Store(StoreError::CorruptedState { .. })) => {}
            other => panic!("expected CorruptedState, got {other:?}"),
        }
    }

    #[test]
    fn fresh_store_loads_empty_graph() {
        let dir = TempDir::new().unwrap();
        let store = HoloStore::open(dir.path()).unwrap();
        assert!(store.meta().unwrap().is_none());
        let graph = store.load(&config()).unwrap();
        assert_eq!(graph.concept_count(), 0);
        assert_eq!(graph.fact_count(), 0);
    }

    #[test]
    fn meta_records_header() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);
        let meta = store.meta().unwrap().unwrap();
        assert_eq!(meta.version, FORMAT_VERSION);
        assert_eq!(meta.dimension, 2048);
        assert_eq!(meta.bundle_seed, config().bundle_seed);
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);

        let mut smaller = HoloGraph::new(config()).unwrap();
        smaller.learn("A", "R", "B").unwrap();
        store.save(&smaller).unwrap();

        let loaded = store.load(&config()).unwrap();
        assert_eq!(loaded.fact_count(), 1);
        assert_eq!(loaded.concept_count(), 3);
    }

    #[test]
    fn wrong_word_count_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);
        let bad = encode_record(&ConceptRecord {
            name: "Sky".into(),
            words: vec![0; 3],
        })
        .unwrap();
        store.put_raw(CONCEPTS_TABLE, 0, &bad);
        assert_corrupted(store.load(&config()));
    }

    #[test]
    fn tail_bits_are_corrupted() {
        let dir = TempDir::new().unwrap();
        let cfg = HoloConfig {
            dimension: 2000,
            ..Default::default()
        };
        let mut graph = HoloGraph::new(cfg.clone()).unwrap();
        graph.define("Sky").unwrap();
        let store = HoloStore::open(dir.path()).unwrap();
        store.save(&graph).unwrap();

        // 2000 bits fill only the low 16 bits of word 31.
        let mut words = vec![0u64; 32];
        words[31] = u64::MAX;
        let bad = encode_record(&ConceptRecord {
            name: "Sky".into(),
            words,
        })
        .unwrap();
        store.put_raw(CONCEPTS_TABLE, 0, &bad);
        assert_corrupted(store.load(&cfg));
    }

    #[test]
    fn dangling_fact_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);
        let bad = encode_record(&FactRecord {
            subject: "Sky".into(),
            relation: "Is".into(),
            object: "Plaid".into(),
            weight: 1,
        })
        .unwrap();
        store.put_raw(FACTS_TABLE, 2, &bad);
        assert_corrupted(store.load(&config()));
    }

    #[test]
    fn index_gap_is_corrupted() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);
        let extra = encode_record(&ConceptRecord {
            name: "Orphan".into(),
            words: vec![0; 32],
        })
        .unwrap();
        store.put_raw(CONCEPTS_TABLE, 40, &extra);
        assert_corrupted(store.load(&config()));
    }

    #[test]
    fn version_and_dimension_mismatch_are_corrupted() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);

        let other_dim = HoloConfig {
            dimension: 4096,
            ..Default::default()
        };
        assert_corrupted(store.load(&other_dim));

        store.put_meta(KEY_VERSION, FORMAT_VERSION + 1);
        assert_corrupted(store.load(&config()));
    }

    #[test]
    fn garbage_record_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);
        store.put_raw(FACTS_TABLE, 0, &[0xFF]);
        assert!(matches!(
            store.load(&config()),
            Err(HoloError::Store(StoreError::Serialization { .. }))
        ));
    }

    #[test]
    fn load_sees_whole_snapshots_during_concurrent_saves() {
        let dir = TempDir::new().unwrap();
        let store = saved_store(&dir);
        let mut full = HoloGraph::new(config()).unwrap();
        full.learn("Sky", "Is", "Blue").unwrap();
        full.learn("Grass", "Is", "Green").unwrap();
        let mut small = HoloGraph::new(config()).unwrap();
        small.learn("A", "R", "B").unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..40 {
                    let graph = if i % 2 == 0 { &small } else { &full };
                    store.save(graph).unwrap();
                }
            });
            for _ in 0..40 {
                let loaded = store.load(&config()).unwrap();
                let shape = (loaded.fact_count(), loaded.concept_count());
                assert!(shape == (2, 5) || shape == (1, 3), "mixed snapshot {shape:?}");
            }
        });
    }
}
