//! Trial history persistence
//!
//! The training core talks to storage through [`TrialStore`]: a batch sink
//! used once at session end and a history source for the progress view.
//!
//! Implementations:
//! - `MemoryStore`: in-process, used natively and in tests
//! - `LocalStorageStore`: browser LocalStorage (wasm only)

pub mod local_storage;
pub mod memory;

pub use memory::MemoryStore;

#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

use std::future::Future;

use thiserror::Error;

use crate::sim::TrialRecord;

/// Why a store call failed
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("could not encode trial history: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("store rejected the batch: {0}")]
    Rejected(String),
}

/// Session sink and history source for one user's trials
pub trait TrialStore {
    /// Append a completed session's records, preserving their order
    fn submit_trial_batch(
        &self,
        user_id: &str,
        records: &[TrialRecord],
    ) -> impl Future<Output = Result<(), PersistenceError>>;

    /// All stored records for a user, newest first
    fn fetch_trial_history(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<TrialRecord>, PersistenceError>>;
}

/// Order records newest first (ids are creation timestamps)
pub fn newest_first(mut records: Vec<TrialRecord>) -> Vec<TrialRecord> {
    records.sort_by(|a, b| b.id.cmp(&a.id));
    records
}
