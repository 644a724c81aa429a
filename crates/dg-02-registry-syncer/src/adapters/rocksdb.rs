//! # RocksDB Storage Driver
//!
//! Durable snapshot rows for nodes that must survive restarts.
//!
//! ## Layout
//!
//! - `registry_states` - rows keyed by big-endian id, value is JSON
//!   `{data, data_hash}`
//! - `registry_meta` - the last assigned row id
//!
//! A transaction loads the (small, retention-bounded) table, stages the
//! statements against it, and writes the difference as one `WriteBatch`.

use parking_lot::Mutex;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};

use super::memory::StateTable;
use crate::error::{StoreError, StoreResult};
use crate::ports::outbound::{StateRow, StateTransaction, StorageDriver};

pub const CF_STATES: &str = "registry_states";
pub const CF_META: &str = "registry_meta";

const NEXT_ID_KEY: &[u8] = b"next_id";

/// RocksDB configuration
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory
    pub path: String,
    /// fsync after each write batch (default: true)
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/registry-syncer".to_string(),
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config for tests (no fsync)
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sync_writes: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredRow {
    data: String,
    data_hash: String,
}

/// RocksDB-backed `StorageDriver`.
pub struct RocksDbStorageDriver {
    db: DB,
    config: RocksDbConfig,
    /// Serialises read-modify-write transactions
    write_lock: Mutex<()>,
}

impl RocksDbStorageDriver {
    /// Open or create the database.
    pub fn open(config: RocksDbConfig) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let cf_descriptors = [CF_STATES, CF_META]
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, &config.path, cf_descriptors)
            .map_err(|e| StoreError::Storage(format!("Failed to open RocksDB: {e}")))?;

        Ok(Self {
            db,
            config,
            write_lock: Mutex::new(()),
        })
    }

    fn cf(&self, name: &str) -> StoreResult<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Storage(format!("missing column family {name}")))
    }

    fn load_table(&self) -> StoreResult<StateTable> {
        let states = self.cf(CF_STATES)?;
        let mut table = StateTable::default();
        for entry in self.db.iterator_cf(states, IteratorMode::Start) {
            let (key, value) =
                entry.map_err(|e| StoreError::Storage(format!("RocksDB scan failed: {e}")))?;
            let row = decode_row(&key, &value)?;
            table.rows.insert(row.id, row);
        }

        let meta = self.cf(CF_META)?;
        table.next_id = match self
            .db
            .get_cf(meta, NEXT_ID_KEY)
            .map_err(|e| StoreError::Storage(format!("RocksDB get failed: {e}")))?
        {
            Some(raw) => decode_id(&raw)?,
            None => table.rows.keys().next_back().copied().unwrap_or(0),
        };
        Ok(table)
    }

    /// Number of stored rows.
    pub fn row_count(&self) -> StoreResult<usize> {
        Ok(self.load_table()?.rows.len())
    }
}

fn decode_id(raw: &[u8]) -> StoreResult<u64> {
    let bytes: [u8; 8] = raw
        .try_into()
        .map_err(|_| StoreError::Storage(format!("corrupt row id of {} bytes", raw.len())))?;
    Ok(u64::from_be_bytes(bytes))
}

fn decode_row(key: &[u8], value: &[u8]) -> StoreResult<StateRow> {
    let stored: StoredRow = serde_json::from_slice(value)
        .map_err(|e| StoreError::Serialization(format!("corrupt registry row: {e}")))?;
    Ok(StateRow {
        id: decode_id(key)?,
        data: stored.data,
        data_hash: stored.data_hash,
    })
}

impl StorageDriver for RocksDbStorageDriver {
    fn transact(
        &self,
        body: &mut dyn FnMut(&mut dyn StateTransaction) -> StoreResult<()>,
    ) -> StoreResult<()> {
        let _guard = self.write_lock.lock();
        let original = self.load_table()?;
        let mut staged = original.clone();
        body(&mut staged)?;

        let states = self.cf(CF_STATES)?;
        let meta = self.cf(CF_META)?;
        let mut batch = WriteBatch::default();

        for (id, row) in &staged.rows {
            if !original.rows.contains_key(id) {
                let value = serde_json::to_vec(&StoredRow {
                    data: row.data.clone(),
                    data_hash: row.data_hash.clone(),
                })
                .map_err(|e| StoreError::Serialization(e.to_string()))?;
                batch.put_cf(states, id.to_be_bytes(), value);
            }
        }
        for id in original.rows.keys() {
            if !staged.rows.contains_key(id) {
                batch.delete_cf(states, id.to_be_bytes());
            }
        }
        batch.put_cf(meta, NEXT_ID_KEY, staged.next_id.to_be_bytes());

        let mut write_opts = rocksdb::WriteOptions::default();
        write_opts.set_sync(self.config.sync_writes);
        self.db
            .write_opt(batch, &write_opts)
            .map_err(|e| StoreError::Storage(format!("RocksDB batch write failed: {e}")))
    }

    fn latest_row(&self) -> StoreResult<Option<StateRow>> {
        let states = self.cf(CF_STATES)?;
        match self.db.iterator_cf(states, IteratorMode::End).next() {
            Some(entry) => {
                let (key, value) =
                    entry.map_err(|e| StoreError::Storage(format!("RocksDB scan failed: {e}")))?;
                decode_row(&key, &value).map(Some)
            }
            None => Ok(None),
        }
    }
}
