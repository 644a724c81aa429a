//! In-memory storage driver for tests and ephemeral nodes.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};

use crate::error::StoreResult;
use crate::ports::outbound::{StateRow, StateTransaction, StorageDriver};

/// Snapshot rows keyed by id. Transactions run against a clone and replace
/// the original only on success.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateTable {
    pub(crate) rows: BTreeMap<u64, StateRow>,
    pub(crate) next_id: u64,
}

impl StateTable {
    pub(crate) fn latest(&self) -> Option<&StateRow> {
        self.rows.values().next_back()
    }
}

impl StateTransaction for StateTable {
    fn insert_if_latest_differs(
        &mut self,
        data: &str,
        data_hash: &str,
    ) -> StoreResult<Option<u64>> {
        if self.latest().is_some_and(|row| row.data_hash == data_hash) {
            return Ok(None);
        }
        self.next_id += 1;
        let id = self.next_id;
        self.rows.insert(
            id,
            StateRow {
                id,
                data: data.to_string(),
                data_hash: data_hash.to_string(),
            },
        );
        Ok(Some(id))
    }

    fn retain_recent_hashes(&mut self, keep: usize) -> StoreResult<usize> {
        let recent: HashSet<String> = self
            .rows
            .values()
            .rev()
            .take(keep)
            .map(|row| row.data_hash.clone())
            .collect();
        let before = self.rows.len();
        self.rows.retain(|_, row| recent.contains(&row.data_hash));
        Ok(before - self.rows.len())
    }
}

/// Volatile `StorageDriver`.
#[derive(Debug, Default)]
pub struct InMemoryStorageDriver {
    table: Mutex<StateTable>,
}

impl InMemoryStorageDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows, oldest first.
    pub fn rows(&self) -> Vec<StateRow> {
        self.table.lock().rows.values().cloned().collect()
    }

    pub fn row_count(&self) -> usize {
        self.table.lock().rows.len()
    }
}

impl StorageDriver for InMemoryStorageDriver {
    fn transact(
        &self,
        body: &mut dyn FnMut(&mut dyn StateTransaction) -> StoreResult<()>,
    ) -> StoreResult<()> {
        let mut table = self.table.lock();
        let mut staged = table.clone();
        body(&mut staged)?;
        *table = staged;
        Ok(())
    }

    fn latest_row(&self) -> StoreResult<Option<StateRow>> {
        Ok(self.table.lock().latest().cloned())
    }
}
