//! Job store: the canonical in-memory collection plus its durable copy.
//!
//! The store is built by [`JobStore::initialize`], which loads the persisted
//! collection; there is no way to obtain an unloaded store. Every mutation
//! writes the whole collection back before returning. Storage failures never
//! reach the caller: they are logged, recorded in [`PersistenceStatus`], and
//! the in-memory collection stays authoritative for the rest of the session.
//!
//! Loading never discards a stored element. Records with a missing, blank or
//! duplicate id get a fresh one, and elements that are not records at all are
//! written back untouched after the records.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use jobtracker_applications::{JobDraft, JobPatch, JobRecord, JobStats, compute_stats};
use jobtracker_core::{Entity, JobId};

use crate::slot::{DurableSlot, SlotError};

/// Fixed key of the persisted collection.
pub const STORAGE_KEY: &str = "jobApplications";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Slot(#[from] SlotError),
    #[error("persisted collection is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
    #[error("persisted collection is not a JSON array")]
    NotAnArray,
    #[error("failed to serialize job collection: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Outcome of the most recent load or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceStatus {
    Healthy,
    /// The durable copy may be stale; `reason` is the last failure.
    Degraded { reason: String },
}

impl PersistenceStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, PersistenceStatus::Healthy)
    }
}

/// A persisted collection as read back from its slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedCollection {
    /// Records in storage order, with unique ids.
    pub jobs: Vec<JobRecord>,
    /// Elements that could not be read as records, kept verbatim.
    pub retained: Vec<Value>,
    /// Records that were given a fresh id.
    pub rekeyed: usize,
}

/// Decode a persisted collection.
///
/// Only a document that is not a JSON array is an error. Every element ends
/// up either in `jobs` or in `retained`.
pub fn decode_collection(raw: &str) -> Result<DecodedCollection, StoreError> {
    let value: Value = serde_json::from_str(raw).map_err(StoreError::Malformed)?;
    let Value::Array(elements) = value else {
        return Err(StoreError::NotAnArray);
    };

    let mut seen = HashSet::with_capacity(elements.len());
    let mut decoded = DecodedCollection {
        jobs: Vec::with_capacity(elements.len()),
        ..DecodedCollection::default()
    };
    for (index, element) in elements.into_iter().enumerate() {
        let Value::Object(mut fields) = element else {
            warn!(index, "keeping persisted element that is not a job record");
            decoded.retained.push(element);
            continue;
        };

        let stored = fields.get("id").and_then(stored_id);
        let id = match stored {
            Some(id) if !seen.contains(&id) => id,
            stored => {
                let id = unused_id(&seen);
                warn!(
                    index,
                    stored_id = stored.as_ref().map(JobId::as_str),
                    job_id = %id,
                    "persisted job has a missing or duplicate id; assigning a new one"
                );
                decoded.rekeyed += 1;
                id
            }
        };
        fields.insert("id".to_string(), Value::String(id.to_string()));

        match serde_json::from_value::<JobRecord>(Value::Object(fields.clone())) {
            Ok(job) => {
                seen.insert(id);
                decoded.jobs.push(job);
            }
            Err(err) => {
                warn!(index, error = %err, "keeping persisted element that is not a job record");
                decoded.retained.push(Value::Object(fields));
            }
        }
    }
    Ok(decoded)
}

/// Id of a stored element: a non-blank string, or a number as older clients
/// wrote timestamps.
fn stored_id(value: &Value) -> Option<JobId> {
    match value {
        Value::String(raw) => raw.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn unused_id(seen: &HashSet<JobId>) -> JobId {
    loop {
        let id = JobId::generate();
        if !seen.contains(&id) {
            return id;
        }
    }
}

/// Serialize a collection to its durable form (a JSON array of records).
pub fn encode_collection(jobs: &[JobRecord]) -> Result<String, StoreError> {
    serde_json::to_string(jobs).map_err(StoreError::Serialize)
}

/// Like [`encode_collection`], with `retained` elements appended after the
/// records.
fn encode_with_retained(jobs: &[JobRecord], retained: &[Value]) -> Result<String, StoreError> {
    if retained.is_empty() {
        return encode_collection(jobs);
    }
    let mut elements = jobs
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::Serialize)?;
    elements.extend(retained.iter().cloned());
    serde_json::to_string(&elements).map_err(StoreError::Serialize)
}

fn load<S: DurableSlot>(slot: &S, key: &str) -> Result<DecodedCollection, StoreError> {
    match slot.read(key)? {
        Some(raw) => decode_collection(&raw),
        None => Ok(DecodedCollection::default()),
    }
}

/// Owner of the job collection.
#[derive(Debug)]
pub struct JobStore<S> {
    slot: S,
    key: String,
    jobs: Vec<JobRecord>,
    retained: Vec<Value>,
    persistence: PersistenceStatus,
}

impl<S: DurableSlot> JobStore<S> {
    /// Load the collection stored under [`STORAGE_KEY`].
    pub fn initialize(slot: S) -> Self {
        Self::initialize_with_key(slot, STORAGE_KEY)
    }

    /// Load the collection stored under `key`.
    ///
    /// Unreadable or malformed content yields an empty store in the
    /// `Degraded` state; this never fails.
    pub fn initialize_with_key(slot: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let (decoded, persistence) = match load(&slot, &key) {
            Ok(decoded) => {
                info!(
                    key = %key,
                    count = decoded.jobs.len(),
                    rekeyed = decoded.rekeyed,
                    retained = decoded.retained.len(),
                    "loaded job collection"
                );
                (decoded, PersistenceStatus::Healthy)
            }
            Err(err) => {
                error!(key = %key, error = %err, "failed to load job collection; starting empty");
                (
                    DecodedCollection::default(),
                    PersistenceStatus::Degraded {
                        reason: err.to_string(),
                    },
                )
            }
        };

        Self {
            slot,
            key,
            jobs: decoded.jobs,
            retained: decoded.retained,
            persistence,
        }
    }

    /// Current collection, in storage order (not a display order).
    pub fn list(&self) -> &[JobRecord] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get_by_id(&self, id: &JobId) -> Option<&JobRecord> {
        self.jobs.iter().find(|job| job.id() == id)
    }

    /// Add a record built from `draft`.
    ///
    /// The draft is not validated here; callers run
    /// [`jobtracker_applications::validate`] first.
    pub fn create(&mut self, draft: JobDraft) -> JobRecord {
        let id = self.fresh_id();
        let record = JobRecord::new(id, draft, Utc::now());
        debug!(job_id = %record.id(), "creating job");
        self.jobs.push(record.clone());
        self.persist();
        record
    }

    /// Merge `patch` into the record with `id`.
    ///
    /// Returns the updated record, or `None` (and writes nothing) when no
    /// record has that id.
    pub fn update(&mut self, id: &JobId, patch: JobPatch) -> Option<JobRecord> {
        let Some(job) = self.jobs.iter_mut().find(|job| job.id() == id) else {
            debug!(job_id = %id, "update ignored: job not found");
            return None;
        };
        job.apply_patch(patch);
        let updated = job.clone();
        self.persist();
        Some(updated)
    }

    /// Remove the record with `id`, returning it if it existed.
    ///
    /// The collection is written back either way.
    pub fn delete(&mut self, id: &JobId) -> Option<JobRecord> {
        let removed = self
            .jobs
            .iter()
            .position(|job| job.id() == id)
            .map(|index| self.jobs.remove(index));
        if removed.is_none() {
            debug!(job_id = %id, "delete ignored: job not found");
        }
        self.persist();
        removed
    }

    pub fn stats(&self) -> JobStats {
        compute_stats(&self.jobs)
    }

    pub fn persistence_status(&self) -> &PersistenceStatus {
        &self.persistence
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    fn fresh_id(&self) -> JobId {
        loop {
            let id = JobId::generate();
            if self.get_by_id(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        let result = encode_with_retained(&self.jobs, &self.retained)
            .and_then(|payload| self.slot.write(&self.key, &payload).map_err(StoreError::from));

        match result {
            Ok(()) => {
                debug!(key = %self.key, count = self.jobs.len(), "persisted job collection");
                self.persistence = PersistenceStatus::Healthy;
            }
            Err(err) => {
                error!(
                    key = %self.key,
                    error = %err,
                    "failed to persist job collection; keeping in-memory state"
                );
                self.persistence = PersistenceStatus::Degraded {
                    reason: err.to_string(),
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use jobtracker_applications::ApplicationStatus;
    use proptest::prelude::*;

    use crate::slot::InMemorySlot;

    /// Slot whose reads and writes can be made to fail.
    #[derive(Debug, Default)]
    struct FlakySlot {
        inner: InMemorySlot,
        fail_reads: bool,
        fail_writes: AtomicBool,
    }

    impl DurableSlot for FlakySlot {
        fn read(&self, key: &str) -> Result<Option<String>, SlotError> {
            if self.fail_reads {
                return Err(SlotError::Unavailable("storage disabled".to_string()));
            }
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), SlotError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(SlotError::Unavailable("quota exceeded".to_string()));
            }
            self.inner.write(key, value)
        }
    }

    fn google() -> JobDraft {
        JobDraft::new("Google", "SWE", "2024-01-10", ApplicationStatus::Applied)
    }

    fn meta() -> JobDraft {
        JobDraft::new("Meta", "PM", "2024-02-05", ApplicationStatus::Interview)
    }

    fn new_store() -> JobStore<Arc<InMemorySlot>> {
        JobStore::initialize(Arc::new(InMemorySlot::new()))
    }

    #[test]
    fn empty_slot_initializes_healthy_and_empty() {
        let store = new_store();
        assert!(store.is_empty());
        assert!(store.persistence_status().is_healthy());
        assert_eq!(store.key(), STORAGE_KEY);
    }

    #[test]
    fn create_then_get_returns_input_plus_identity() {
        let mut store = new_store();
        let created = store.create(google());

        let fetched = store.get_by_id(created.id()).unwrap();
        assert_eq!(fetched, &created);
        assert!(!fetched.id().as_str().is_empty());
        assert_eq!(fetched.to_draft(), google());
        assert!(fetched.created_at() > chrono::DateTime::<Utc>::default());
        assert_eq!(store.slot().write_count(), 1);
    }

    #[test]
    fn create_assigns_unique_ids() {
        let mut store = new_store();
        let ids: HashSet<_> = (0..50).map(|_| store.create(google()).id().clone()).collect();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn empty_update_keeps_content_but_still_persists() {
        let mut store = new_store();
        let created = store.create(google());
        let writes = store.slot().write_count();

        let updated = store.update(created.id(), JobPatch::default()).unwrap();
        assert_eq!(updated, created);
        assert_eq!(store.slot().write_count(), writes + 1);
    }

    #[test]
    fn update_preserves_id_and_created_at() {
        let mut store = new_store();
        let created = store.create(google());

        let updated = store
            .update(
                created.id(),
                JobPatch {
                    status: Some(ApplicationStatus::Selected),
                    job_role: Some("Staff SWE".to_string()),
                    ..JobPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.id(), created.id());
        assert_eq!(updated.created_at(), created.created_at());
        assert_eq!(updated.status(), Some(ApplicationStatus::Selected));
        assert_eq!(updated.job_role(), "Staff SWE");
        assert_eq!(updated.company_name(), "Google");
        assert_eq!(store.get_by_id(created.id()), Some(&updated));
    }

    #[test]
    fn update_of_unknown_id_is_a_silent_no_op() {
        let mut store = new_store();
        store.create(google());
        let before = store.list().to_vec();
        let writes = store.slot().write_count();

        let missing: JobId = "missing".parse().unwrap();
        assert!(store.update(&missing, JobPatch::default()).is_none());
        assert_eq!(store.list(), before.as_slice());
        assert_eq!(store.slot().write_count(), writes);
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let mut store = new_store();
        let first = store.create(google());
        store.create(meta());

        let removed = store.delete(first.id()).unwrap();
        assert_eq!(removed.id(), first.id());
        assert_eq!(store.len(), 1);
        assert!(store.get_by_id(first.id()).is_none());

        assert!(store.delete(first.id()).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.slot().write_count(), 4);
    }

    #[test]
    fn stats_reflect_collection() {
        let mut store = new_store();
        store.create(google());
        store.create(meta());
        let stats = store.stats();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.interview, 1);
        assert_eq!(stats.selected, 0);
        assert_eq!(stats.rejected, 0);
    }

    #[test]
    fn read_failure_starts_empty_and_degraded() {
        let slot = FlakySlot {
            fail_reads: true,
            ..FlakySlot::default()
        };
        let store = JobStore::initialize(slot);
        assert!(store.is_empty());
        match store.persistence_status() {
            PersistenceStatus::Degraded { reason } => assert!(reason.contains("storage disabled")),
            PersistenceStatus::Healthy => panic!("Expected degraded start on read failure"),
        }
    }

    #[test]
    fn malformed_content_starts_empty_and_degraded() {
        for raw in ["{not json", "{\"id\":\"1\"}", "null"] {
            let store = JobStore::initialize(InMemorySlot::with_value(STORAGE_KEY, raw));
            assert!(store.is_empty(), "expected empty store for {raw:?}");
            assert!(!store.persistence_status().is_healthy());
        }
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let mut store = JobStore::initialize(FlakySlot::default());
        store.create(google());
        store.slot().fail_writes.store(true, Ordering::SeqCst);

        let created = store.create(meta());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_by_id(created.id()), Some(&created));
        assert!(!store.persistence_status().is_healthy());

        let persisted = decode_collection(&store.slot().inner.read(STORAGE_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(persisted.jobs.len(), 1);

        store.slot().fail_writes.store(false, Ordering::SeqCst);
        store.delete(created.id());
        assert!(store.persistence_status().is_healthy());
    }

    fn persisted_elements(slot: &InMemorySlot) -> Vec<Value> {
        let raw = slot.read(STORAGE_KEY).unwrap().unwrap();
        match serde_json::from_str(&raw).unwrap() {
            Value::Array(elements) => elements,
            other => panic!("Expected a persisted array, got {other:?}"),
        }
    }

    #[test]
    fn load_then_create_keeps_every_stored_id() {
        let raw = r#"[
            {"id":"1","companyName":"Stripe","jobRole":"SRE","applicationDate":"2024-03-01","status":"Offer"},
            {"id":"2","companyName":null,"jobRole":"PM","applicationDate":"2024-03-02","status":"Applied"},
            {"id":"3","companyName":"Meta","jobRole":"PM","applicationDate":"2024-03-03","status":"Interview","createdAt":1704880000000},
            {"id":"4","companyName":"Google","jobRole":"SWE","applicationDate":"2024-03-04","status":"Rejected","createdAt":"2024-03-04T00:00:00.000Z"}
        ]"#;
        let slot = Arc::new(InMemorySlot::with_value(STORAGE_KEY, raw));
        let mut store = JobStore::initialize(Arc::clone(&slot));
        assert_eq!(store.len(), 4);
        assert!(store.persistence_status().is_healthy());

        let created = store.create(google());
        let elements = persisted_elements(&slot);
        let ids: Vec<_> = elements.iter().map(|e| e["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", created.id().as_str()]);
        assert_eq!(elements[0]["status"], "Offer");
        assert_eq!(elements[1]["companyName"], "");
        assert!(elements[2]["createdAt"].as_str().unwrap().starts_with("2024-01-10T09:46:40"));
    }

    #[test]
    fn blank_and_duplicate_ids_are_rekeyed_not_dropped() {
        let raw = r#"[
            {"id":"","companyName":"A"},
            {"id":"","companyName":"B"},
            {"companyName":"C"},
            {"id":7,"companyName":"D"},
            {"id":"7","companyName":"E"}
        ]"#;
        let decoded = decode_collection(raw).unwrap();
        assert_eq!(decoded.rekeyed, 4);
        assert!(decoded.retained.is_empty());

        let companies: Vec<_> = decoded.jobs.iter().map(|j| j.company_name()).collect();
        assert_eq!(companies, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(decoded.jobs[3].id().as_str(), "7");

        let ids: HashSet<_> = decoded.jobs.iter().map(|j| j.id().clone()).collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| !id.as_str().trim().is_empty()));
    }

    #[test]
    fn elements_that_are_not_records_survive_the_next_write() {
        let raw = r#"[42,{"id":"1","companyName":"Google"},"note",null]"#;
        let slot = Arc::new(InMemorySlot::with_value(STORAGE_KEY, raw));
        let mut store = JobStore::initialize(Arc::clone(&slot));
        assert_eq!(store.len(), 1);

        let created = store.create(meta());
        let elements = persisted_elements(&slot);
        assert_eq!(elements.len(), 5);
        assert_eq!(elements[0]["id"], "1");
        assert_eq!(elements[1]["id"], created.id().as_str());
        assert_eq!(&elements[2..], &[Value::from(42), Value::from("note"), Value::Null]);

        let reloaded = JobStore::initialize(slot);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn reinitializing_from_the_same_slot_restores_the_collection() {
        let slot = Arc::new(InMemorySlot::new());
        let mut store = JobStore::initialize(Arc::clone(&slot));
        store.create(google());
        store.create(meta());
        let expected = store.list().to_vec();

        let reloaded = JobStore::initialize(slot);
        assert_eq!(reloaded.list(), expected.as_slice());
    }

    fn arb_draft() -> impl Strategy<Value = JobDraft> {
        (
            "[A-Za-z0-9 \"',]{1,16}",
            "[A-Za-z0-9 ]{1,16}",
            (2000i32..2030, 1u32..13, 1u32..29),
            prop::sample::select(ApplicationStatus::ALL.to_vec()),
        )
            .prop_map(|(company, role, (y, m, d), status)| {
                JobDraft::new(company, role, format!("{y:04}-{m:02}-{d:02}"), status)
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 128,
            ..ProptestConfig::default()
        })]

        /// Property: encode then decode yields the same records.
        #[test]
        fn persisted_collection_round_trips(drafts in prop::collection::vec(arb_draft(), 0..16)) {
            let mut store = new_store();
            for draft in drafts {
                store.create(draft);
            }

            let decoded = decode_collection(&encode_collection(store.list()).unwrap()).unwrap();
            prop_assert_eq!(decoded.jobs.as_slice(), store.list());
            prop_assert_eq!(decoded.rekeyed, 0);
        }
    }
}
