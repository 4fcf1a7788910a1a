//! Browser LocalStorage trial store
//!
//! The store itself is wasm only; the JSON handling is plain functions so it
//! can be tested natively.

use super::PersistenceError;
use crate::sim::TrialRecord;

/// Decode a stored history. A missing key is an empty history; an unreadable
/// one is an error so it is never overwritten.
pub fn parse_history(stored: Option<&str>) -> Result<Vec<TrialRecord>, PersistenceError> {
    match stored {
        Some(json) => Ok(serde_json::from_str(json)?),
        None => Ok(Vec::new()),
    }
}

/// Append `records` to the stored history and encode the result
pub fn merge_history(
    stored: Option<&str>,
    records: &[TrialRecord],
) -> Result<String, PersistenceError> {
    let mut history = parse_history(stored)?;
    history.extend_from_slice(records);
    Ok(serde_json::to_string(&history)?)
}

#[cfg(target_arch = "wasm32")]
pub use store::LocalStorageStore;

#[cfg(target_arch = "wasm32")]
mod store {
    use super::{merge_history, parse_history};
    use crate::persistence::{PersistenceError, TrialStore, newest_first};
    use crate::sim::TrialRecord;

    /// Stores each user's history as one JSON array under a per-user key
    #[derive(Debug, Clone, Copy, Default)]
    pub struct LocalStorageStore;

    impl LocalStorageStore {
        const KEY_PREFIX: &'static str = "trajectory_trainer_history";

        fn key(user_id: &str) -> String {
            format!("{}:{}", Self::KEY_PREFIX, user_id)
        }

        fn storage() -> Result<web_sys::Storage, PersistenceError> {
            web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or_else(|| {
                    PersistenceError::Unavailable("LocalStorage is not accessible".into())
                })
        }

        fn read(storage: &web_sys::Storage, user_id: &str) -> Result<Option<String>, PersistenceError> {
            storage
                .get_item(&Self::key(user_id))
                .map_err(|e| PersistenceError::Unavailable(format!("{:?}", e)))
        }
    }

    impl TrialStore for LocalStorageStore {
        async fn submit_trial_batch(
            &self,
            user_id: &str,
            records: &[TrialRecord],
        ) -> Result<(), PersistenceError> {
            let storage = Self::storage()?;
            let stored = Self::read(&storage, user_id)?;
            let json = merge_history(stored.as_deref(), records).inspect_err(|e| {
                log::error!("Stored trial history is unreadable, not overwriting: {}", e);
            })?;
            storage
                .set_item(&Self::key(user_id), &json)
                .map_err(|e| PersistenceError::Rejected(format!("{:?}", e)))?;
            log::info!("Trial history saved ({} new records)", records.len());
            Ok(())
        }

        async fn fetch_trial_history(
            &self,
            user_id: &str,
        ) -> Result<Vec<TrialRecord>, PersistenceError> {
            let storage = Self::storage()?;
            let stored = Self::read(&storage, user_id)?;
            Ok(newest_first(parse_history(stored.as_deref())?))
        }
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
    fn test_missing_history_is_empty() {
        assert!(parse_history(None).unwrap().is_empty());
        let json = merge_history(None, &[record(1, 50)]).unwrap();
        assert_eq!(parse_history(Some(&json)).unwrap(), vec![record(1, 50)]);
    }

    #[test]
    fn test_merge_appends_in_order() {
        let existing = serde_json::to_string(&vec![record(1, 10), record(2, 20)]).unwrap();
        let json = merge_history(Some(&existing), &[record(3, 30)]).unwrap();
        let ids: Vec<i64> = parse_history(Some(&json)).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_corrupt_history_is_an_error_not_a_reset() {
        let result = merge_history(Some("[{bad"), &[record(1, 50)]);
        assert!(matches!(result, Err(PersistenceError::Serialize(_))));
        assert!(matches!(
            parse_history(Some("[{bad")),
            Err(PersistenceError::Serialize(_))
        ));
    }

    #[test]
    fn test_corrupt_history_reports_failed_save() {
        use crate::sim::{NoticeKind, SessionBatch};

        let result = merge_history(Some("not json"), &[record(1, 50)]).map(|_| ());
        let batch = SessionBatch {
            records: vec![record(1, 50)],
            mean_precision: 50,
        };
        assert_eq!(batch.notice(&result).kind, NoticeKind::Error);
    }
}
