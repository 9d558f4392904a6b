//! Completion record storage
//!
//! The analytics only ever see a [`Completions`] snapshot; stores own the
//! records between runs.

use crate::error::{Result, StoreError};
use crate::models::{Completions, DayName, SlotKey, WorkoutCompletion, FIRST_WEEK, LAST_WEEK};
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Keyed storage for completion records, one per plan slot
pub trait CompletionStore {
    /// Snapshot of every record
    fn all_completions(&self) -> Completions;

    fn get(&self, week: u8, day: DayName) -> Option<WorkoutCompletion>;

    /// Insert or replace the record for the completion's slot
    fn upsert(&mut self, completion: WorkoutCompletion) -> Result<WorkoutCompletion>;

    /// Remove a slot's record, returning it if present
    fn delete(&mut self, week: u8, day: DayName) -> Result<Option<WorkoutCompletion>>;

    /// Upsert a batch, returning how many records were written
    fn upsert_all(&mut self, completions: Vec<WorkoutCompletion>) -> Result<usize> {
        let count = completions.len();
        for completion in completions {
            self.upsert(completion)?;
        }
        Ok(count)
    }
}

/// Reject records the plan cannot hold
pub fn validate_completion(completion: &WorkoutCompletion) -> std::result::Result<(), StoreError> {
    if !(FIRST_WEEK..=LAST_WEEK).contains(&completion.week) {
        return Err(StoreError::WeekOutOfRange {
            week: completion.week,
        });
    }

    if let Some(effort) = completion.effort {
        if !(1..=10).contains(&effort) {
            return Err(StoreError::EffortOutOfRange { effort });
        }
    }

    Ok(())
}

/// Fill in the id and completion time a record is missing.
///
/// A slot keeps the id of the record it already holds.
fn prepare(
    mut completion: WorkoutCompletion,
    existing: Option<&WorkoutCompletion>,
) -> std::result::Result<WorkoutCompletion, StoreError> {
    validate_completion(&completion)?;

    if let Some(id) = existing.and_then(|record| record.id.clone()) {
        completion.id = Some(id);
    } else if completion.id.is_none() {
        completion.id = Some(Uuid::new_v4().to_string());
    }
    if completion.is_complete() && completion.completed_at.is_none() {
        completion.completed_at = Some(Utc::now());
    }

    Ok(completion)
}

/// Store that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    completions: Completions,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.completions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completions.is_empty()
    }
}

impl From<Completions> for MemoryStore {
    fn from(completions: Completions) -> Self {
        MemoryStore { completions }
    }
}

impl CompletionStore for MemoryStore {
    fn all_completions(&self) -> Completions {
        self.completions.clone()
    }

    fn get(&self, week: u8, day: DayName) -> Option<WorkoutCompletion> {
        self.completions.get(&SlotKey::new(week, day)).cloned()
    }

    fn upsert(&mut self, completion: WorkoutCompletion) -> Result<WorkoutCompletion> {
        let key = completion.key();
        let completion = prepare(completion, self.completions.get(&key))?;
        self.completions.insert(completion.key(), completion.clone());
        debug!(slot = %completion.key(), status = %completion.status, "Completion stored");
        Ok(completion)
    }

    fn delete(&mut self, week: u8, day: DayName) -> Result<Option<WorkoutCompletion>> {
        Ok(self.completions.remove(&SlotKey::new(week, day)))
    }
}

/// Store persisted as a JSON array of completion records
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    memory: MemoryStore,
}

impl JsonFileStore {
    /// Open the file at `path`; a missing file is an empty store
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let completions = if path.exists() {
            let content = fs::read_to_string(&path)?;
            let records: Vec<WorkoutCompletion> = if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content).map_err(|e| StoreError::Corrupted {
                    path: path.clone(),
                    reason: e.to_string(),
                })?
            };
            crate::models::completions_from(records)
        } else {
            Completions::new()
        };

        info!(path = %path.display(), records = completions.len(), "Opened completion log");

        Ok(JsonFileStore {
            path,
            memory: MemoryStore::from(completions),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `staged` to disk and adopt it; memory is untouched if the write fails
    fn commit(&mut self, staged: MemoryStore) -> Result<()> {
        self.persist(&staged.completions)?;
        self.memory = staged;
        Ok(())
    }

    fn persist(&self, completions: &Completions) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let records: Vec<&WorkoutCompletion> = completions.values().collect();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, json).map_err(|e| StoreError::PersistFailed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        debug!(path = %self.path.display(), records = records.len(), "Completion log written");
        Ok(())
    }
}

impl CompletionStore for JsonFileStore {
    fn all_completions(&self) -> Completions {
        self.memory.all_completions()
    }

    fn get(&self, week: u8, day: DayName) -> Option<WorkoutCompletion> {
        self.memory.get(week, day)
    }

    fn upsert(&mut self, completion: WorkoutCompletion) -> Result<WorkoutCompletion> {
        let mut staged = self.memory.clone();
        let stored = staged.upsert(completion)?;
        self.commit(staged)?;
        Ok(stored)
    }

    fn delete(&mut self, week: u8, day: DayName) -> Result<Option<WorkoutCompletion>> {
        let mut staged = self.memory.clone();
        let removed = staged.delete(week, day)?;
        if removed.is_some() {
            self.commit(staged)?;
        }
        Ok(removed)
    }

    fn upsert_all(&mut self, completions: Vec<WorkoutCompletion>) -> Result<usize> {
        let mut staged = self.memory.clone();
        let count = staged.upsert_all(completions)?;
        self.commit(staged)?;
        info!(path = %self.path.display(), count, "Completions imported");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackerError;
    use crate::models::CompletionStatus;
    use tempfile::tempdir;

    #[test]
    fn test_upsert_assigns_id_and_timestamp() {
        let mut store = MemoryStore::new();
        let stored = store
            .upsert(WorkoutCompletion::new(1, DayName::Monday, CompletionStatus::Complete))
            .unwrap();

        assert!(stored.id.is_some());
        assert!(stored.completed_at.is_some());
        assert_eq!(store.get(1, DayName::Monday), Some(stored));
    }

    #[test]
    fn test_incomplete_records_get_no_timestamp() {
        let mut store = MemoryStore::new();
        let stored = store
            .upsert(WorkoutCompletion::new(1, DayName::Monday, CompletionStatus::Partial))
            .unwrap();
        assert!(stored.completed_at.is_none());
    }

    #[test]
    fn test_upsert_replaces_slot() {
        let mut store = MemoryStore::new();
        store
            .upsert(WorkoutCompletion::new(2, DayName::Friday, CompletionStatus::Partial))
            .unwrap();
        store
            .upsert(WorkoutCompletion::new(2, DayName::Friday, CompletionStatus::Complete))
            .unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.get(2, DayName::Friday).unwrap().is_complete());
    }

    #[test]
    fn test_upsert_keeps_slot_id() {
        let mut store = MemoryStore::new();
        let first = store
            .upsert(WorkoutCompletion::new(2, DayName::Friday, CompletionStatus::Partial))
            .unwrap();

        let mut relogged = WorkoutCompletion::new(2, DayName::Friday, CompletionStatus::Complete);
        relogged.id = Some("imported-id".to_string());
        let second = store.upsert(relogged).unwrap();

        assert!(first.id.is_some());
        assert_eq!(first.id, second.id);
        assert_eq!(store.get(2, DayName::Friday).unwrap().id, first.id);
    }

    #[test]
    fn test_json_file_store_keeps_slot_id_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completions.json");

        let first = JsonFileStore::open(&path)
            .unwrap()
            .upsert(WorkoutCompletion::new(3, DayName::Monday, CompletionStatus::Partial))
            .unwrap();

        let mut store = JsonFileStore::open(&path).unwrap();
        let second = store
            .upsert(WorkoutCompletion::new(3, DayName::Monday, CompletionStatus::Complete))
            .unwrap();

        assert_eq!(first.id, second.id);
    }

    #[test]
    fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completions.json");
        let mut store = JsonFileStore::open(&path).unwrap();

        // A directory where the log file belongs makes every write fail
        fs::create_dir_all(&path).unwrap();

        let result = store.upsert(WorkoutCompletion::new(1, DayName::Monday, CompletionStatus::Complete));
        assert!(matches!(
            result,
            Err(TrackerError::Store(StoreError::PersistFailed { .. }))
        ));
        assert!(store.all_completions().is_empty());
    }

    #[test]
    fn test_rejected_batch_is_not_applied() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completions.json");
        let mut store = JsonFileStore::open(&path).unwrap();

        let result = store.upsert_all(vec![
            WorkoutCompletion::new(1, DayName::Monday, CompletionStatus::Complete),
            WorkoutCompletion::new(17, DayName::Monday, CompletionStatus::Complete),
        ]);

        assert!(result.is_err());
        assert!(store.all_completions().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_validation() {
        let mut store = MemoryStore::new();

        let result = store.upsert(WorkoutCompletion::new(17, DayName::Monday, CompletionStatus::Complete));
        assert!(matches!(
            result,
            Err(TrackerError::Store(StoreError::WeekOutOfRange { week: 17 }))
        ));

        let mut completion = WorkoutCompletion::new(3, DayName::Monday, CompletionStatus::Complete);
        completion.effort = Some(0);
        assert!(matches!(
            store.upsert(completion),
            Err(TrackerError::Store(StoreError::EffortOutOfRange { effort: 0 }))
        ));

        assert!(store.is_empty());
    }

    #[test]
    fn test_delete() {
        let mut store = MemoryStore::new();
        store
            .upsert(WorkoutCompletion::new(4, DayName::Sunday, CompletionStatus::Complete))
            .unwrap();

        assert!(store.delete(4, DayName::Sunday).unwrap().is_some());
        assert!(store.delete(4, DayName::Sunday).unwrap().is_none());
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("completions.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            assert!(store.all_completions().is_empty());

            let mut completion = WorkoutCompletion::new(1, DayName::Saturday, CompletionStatus::Complete);
            completion.distance = Some("10.2".to_string());
            store.upsert(completion).unwrap();
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let completion = reopened.get(1, DayName::Saturday).unwrap();
        assert_eq!(completion.distance.as_deref(), Some("10.2"));
    }

    #[test]
    fn test_json_file_store_batch_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completions.json");
        let mut store = JsonFileStore::open(&path).unwrap();

        let written = store
            .upsert_all(vec![
                WorkoutCompletion::new(1, DayName::Monday, CompletionStatus::Complete),
                WorkoutCompletion::new(1, DayName::Tuesday, CompletionStatus::Complete),
            ])
            .unwrap();
        assert_eq!(written, 2);

        let json = fs::read_to_string(&path).unwrap();
        let records: Vec<WorkoutCompletion> = serde_json::from_str(&json).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_corrupted_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("completions.json");
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, TrackerError::Store(StoreError::Corrupted { .. })));
    }
}
