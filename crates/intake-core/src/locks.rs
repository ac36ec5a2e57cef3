use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use intake_model::SourceKey;

/// Identity of one source row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub source_key: SourceKey,
    pub row_number: u64,
}

impl RowKey {
    pub fn new(source_key: SourceKey, row_number: u64) -> Self {
        Self {
            source_key,
            row_number,
        }
    }
}

/// Per-row mutual exclusion for the import check-create-writeback sequence.
///
/// Imports of different rows proceed concurrently; two imports of the same
/// row serialize, so the second one observes the first one's marker.
#[derive(Debug, Default)]
pub struct RowLocks {
    slots: Mutex<HashMap<RowKey, Arc<Mutex<()>>>>,
}

impl RowLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `key`.
    pub fn with_row<T>(&self, key: &RowKey, f: impl FnOnce() -> T) -> T {
        let slot = self.acquire(key);
        let result = {
            let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release(key, slot);
        result
    }

    /// Number of rows currently locked or waited on.
    pub fn active(&self) -> usize {
        self.table().len()
    }

    fn acquire(&self, key: &RowKey) -> Arc<Mutex<()>> {
        Arc::clone(self.table().entry(key.clone()).or_default())
    }

    fn release(&self, key: &RowKey, slot: Arc<Mutex<()>>) {
        let mut table = self.table();
        drop(slot);
        if table
            .get(key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            table.remove(key);
        }
    }

    fn table(&self) -> MutexGuard<'_, HashMap<RowKey, Arc<Mutex<()>>>> {
        // The table only holds slot handles; a panic while it is held cannot
        // leave it inconsistent.
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
