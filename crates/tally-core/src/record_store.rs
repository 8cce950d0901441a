//! In-memory record list mirrored to a single storage key.
//!
//! Every mutation updates the list synchronously and then hands a full
//! snapshot to a background task that writes it. The returned [`PendingSave`]
//! may be awaited or dropped; dropping it does not cancel the write.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Serialize};
use tally_domain::{Identifiable, RecordId};
use tokio::{runtime::Handle, sync::Mutex, task::JoinHandle};
use tracing::{debug, error, warn};

use crate::{storage::KeyValueStorage, CoreError};

/// Anything a [`RecordStore`] can hold.
pub trait Record: Identifiable + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Record for T where T: Identifiable + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{}

/// Result of reading the persisted list back into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The stored list replaced the in-memory one.
    Loaded(usize),
    /// Nothing stored under the key; the in-memory list is untouched.
    Missing,
    /// Storage failed or held unparseable data; the in-memory list is untouched.
    Unreadable,
}

/// Handle to a background write of a store snapshot.
#[derive(Debug)]
pub struct PendingSave {
    inner: PendingInner,
}

#[derive(Debug)]
enum PendingInner {
    Spawned(JoinHandle<Result<(), CoreError>>),
    Failed(CoreError),
}

impl PendingSave {
    fn spawned(handle: JoinHandle<Result<(), CoreError>>) -> Self {
        Self {
            inner: PendingInner::Spawned(handle),
        }
    }

    fn failed(err: CoreError) -> Self {
        Self {
            inner: PendingInner::Failed(err),
        }
    }

    /// Waits for the write to settle. Failures were already logged by the
    /// time this returns them.
    pub async fn wait(self) -> Result<(), CoreError> {
        match self.inner {
            PendingInner::Spawned(handle) => handle
                .await
                .map_err(|err| CoreError::Background(err.to_string()))?,
            PendingInner::Failed(err) => Err(err),
        }
    }

    pub fn is_finished(&self) -> bool {
        match &self.inner {
            PendingInner::Spawned(handle) => handle.is_finished(),
            PendingInner::Failed(_) => true,
        }
    }
}

struct State<R> {
    records: Vec<R>,
    revision: u64,
}

/// Ordered list of records keyed by id, persisted as one JSON array.
pub struct RecordStore<R> {
    key: &'static str,
    storage: Arc<dyn KeyValueStorage>,
    state: RwLock<State<R>>,
    /// Highest snapshot revision written so far.
    persisted: Arc<Mutex<u64>>,
}

impl<R: Record> RecordStore<R> {
    pub fn new(key: &'static str, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            key,
            storage,
            state: RwLock::new(State {
                records: Vec::new(),
                revision: 0,
            }),
            persisted: Arc::new(Mutex::new(0)),
        }
    }

    pub fn list(&self) -> Vec<R> {
        self.read().records.clone()
    }

    pub fn get(&self, id: &RecordId) -> Option<R> {
        self.read()
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().records.is_empty()
    }

    /// Replaces the in-memory list with whatever storage holds.
    pub async fn load(&self) -> LoadOutcome {
        let raw = match self.storage.get(self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key = self.key, "nothing stored yet");
                return LoadOutcome::Missing;
            }
            Err(err) => {
                warn!(key = self.key, %err, "failed to read stored records");
                return LoadOutcome::Unreadable;
            }
        };
        match serde_json::from_str::<Vec<R>>(&raw) {
            Ok(records) => {
                let count = records.len();
                self.write().records = records;
                debug!(key = self.key, count, "loaded records");
                LoadOutcome::Loaded(count)
            }
            Err(err) => {
                warn!(key = self.key, %err, "stored records are unreadable, keeping current list");
                LoadOutcome::Unreadable
            }
        }
    }

    /// Appends `record` unless its id is already present.
    pub fn add(&self, record: R) -> Option<PendingSave> {
        self.mutate(|records| {
            if records.iter().any(|existing| existing.id() == record.id()) {
                debug!(id = %record.id(), "rejecting duplicate record id");
                return false;
            }
            records.push(record);
            true
        })
    }

    /// Replaces the record sharing `record`'s id, keeping its position.
    pub fn update(&self, record: R) -> Option<PendingSave> {
        self.mutate(|records| {
            match records.iter_mut().find(|existing| existing.id() == record.id()) {
                Some(slot) => {
                    *slot = record;
                    true
                }
                None => {
                    debug!(id = %record.id(), "update ignored, id not present");
                    false
                }
            }
        })
    }

    /// Applies `change` to the record with `id`; `change` reports whether it
    /// altered anything.
    pub fn modify(&self, id: &RecordId, change: impl FnOnce(&mut R) -> bool) -> Option<PendingSave> {
        self.mutate(|records| {
            records
                .iter_mut()
                .find(|existing| existing.id() == id)
                .map_or(false, change)
        })
    }

    /// Removes every record whose id is `id`.
    pub fn delete(&self, id: &RecordId) -> Option<PendingSave> {
        self.mutate(|records| {
            let before = records.len();
            records.retain(|record| record.id() != id);
            if records.len() == before {
                debug!(%id, "delete ignored, id not present");
            }
            records.len() != before
        })
    }

    fn mutate(&self, op: impl FnOnce(&mut Vec<R>) -> bool) -> Option<PendingSave> {
        let (revision, payload) = {
            let mut state = self.write();
            if !op(&mut state.records) {
                return None;
            }
            state.revision += 1;
            (state.revision, serde_json::to_string(&state.records))
        };
        Some(self.dispatch(revision, payload))
    }

    fn dispatch(&self, revision: u64, payload: serde_json::Result<String>) -> PendingSave {
        let payload = match payload {
            Ok(payload) => payload,
            Err(err) => {
                error!(key = self.key, %err, "failed to serialize records");
                return PendingSave::failed(err.into());
            }
        };
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                error!(key = self.key, %err, "no async runtime, write lost");
                return PendingSave::failed(CoreError::Background(err.to_string()));
            }
        };
        let key = self.key;
        let storage = Arc::clone(&self.storage);
        let persisted = Arc::clone(&self.persisted);
        PendingSave::spawned(runtime.spawn(async move {
            let mut written = persisted.lock().await;
            if *written > revision {
                debug!(key, revision, newer = *written, "skipping stale snapshot");
                return Ok(());
            }
            match storage.set(key, payload).await {
                Ok(()) => {
                    *written = revision;
                    debug!(key, revision, "persisted records");
                    Ok(())
                }
                Err(err) => {
                    error!(key, revision, %err, "failed to persist records");
                    Err(err.into())
                }
            }
        }))
    }

    fn read(&self) -> RwLockReadGuard<'_, State<R>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, State<R>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use tally_domain::Category;

    use super::*;
    use crate::storage::{InMemoryStorage, CATEGORIES_KEY};

    #[tokio::test]
    async fn older_snapshot_arriving_late_is_not_written() {
        let storage = Arc::new(InMemoryStorage::new());
        let store = RecordStore::<Category>::new(CATEGORIES_KEY, storage.clone());

        let newer = store.dispatch(2, Ok(r#"[{"id":"2","name":"Newer"}]"#.to_string()));
        let older = store.dispatch(1, Ok(r#"[{"id":"1","name":"Older"}]"#.to_string()));
        newer.wait().await.expect("newer written");
        older.wait().await.expect("stale snapshot settles without error");

        let stored = storage.raw(CATEGORIES_KEY).await.expect("value stored");
        assert!(stored.contains("Newer"));
        assert_eq!(*store.persisted.lock().await, 2);
    }

    #[tokio::test]
    async fn snapshot_of_same_revision_is_still_written() {
        let storage = Arc::new(InMemoryStorage::new());
        let store = RecordStore::<Category>::new(CATEGORIES_KEY, storage.clone());

        store
            .dispatch(1, Ok("[]".to_string()))
            .wait()
            .await
            .expect("first write");
        storage.reject_writes(true);
        let retried = store.dispatch(1, Ok("[]".to_string())).wait().await;
        assert!(matches!(retried, Err(CoreError::Storage(_))));
    }
}
