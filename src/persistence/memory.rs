//! In-memory trial store

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{PersistenceError, TrialStore, newest_first};
use crate::sim::TrialRecord;

/// Per-user record lists held in memory.
///
/// Single-threaded like the rest of the app; interior mutability lets the
/// store be shared by reference with the session shell.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RefCell<HashMap<String, Vec<TrialRecord>>>,
    /// Number of batches accepted or rejected
    submissions: Cell<u32>,
    /// Reject every submission (failure-path testing)
    reject: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent submissions fail
    pub fn set_rejecting(&self, reject: bool) {
        self.reject.set(reject);
    }

    /// How many times `submit_trial_batch` was called
    pub fn submissions(&self) -> u32 {
        self.submissions.get()
    }

    /// Records stored for a user, in insertion order
    pub fn records(&self, user_id: &str) -> Vec<TrialRecord> {
        self.users
            .borrow()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl TrialStore for MemoryStore {
    async fn submit_trial_batch(
        &self,
        user_id: &str,
        records: &[TrialRecord],
    ) -> Result<(), PersistenceError> {
        self.submissions.set(self.submissions.get() + 1);
        if self.reject.get() {
            return Err(PersistenceError::Rejected("store is read-only".into()));
        }
        self.users
            .borrow_mut()
            .entry(user_id.to_string())
            .or_default()
            .extend_from_slice(records);
        log::debug!("Stored {} records for {}", records.len(), user_id);
        Ok(())
    }

    async fn fetch_trial_history(&self, user_id: &str) -> Result<Vec<TrialRecord>, PersistenceError> {
        Ok(newest_first(self.records(user_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, precision: u8) -> TrialRecord {
        TrialRecord {
            id,
            exercise_type: "test".into(),
            response_time_ms: 300,
            precision,
        }
    }

    #[test]
    fn test_submit_then_fetch_newest_first() {
        let store = MemoryStore::new();
        pollster::block_on(store.submit_trial_batch("ana", &[record(1, 10), record(2, 20)])).unwrap();
        pollster::block_on(store.submit_trial_batch("ana", &[record(3, 30)])).unwrap();

        let history = pollster::block_on(store.fetch_trial_history("ana")).unwrap();
        let ids: Vec<i64> = history.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert_eq!(store.records("ana")[0].id, 1);
        assert_eq!(store.submissions(), 2);
    }

    #[test]
    fn test_users_are_isolated() {
        let store = MemoryStore::new();
        pollster::block_on(store.submit_trial_batch("ana", &[record(1, 10)])).unwrap();
        let other = pollster::block_on(store.fetch_trial_history("ben")).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_rejecting_store_keeps_nothing() {
        let store = MemoryStore::new();
        store.set_rejecting(true);
        let result = pollster::block_on(store.submit_trial_batch("ana", &[record(1, 10)]));
        assert!(matches!(result, Err(PersistenceError::Rejected(_))));
        assert!(store.records("ana").is_empty());
        assert_eq!(store.submissions(), 1);
    }
}
