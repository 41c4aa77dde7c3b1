//! The journal's single source of truth.
//!
//! [`HappinessStore`] owns the record collection, mirrors every change into a
//! [`DurableSlot`] before it becomes visible, and keeps the continuous-day
//! streak up to date. UI surfaces hold a reference to one store, read
//! [`HappinessSnapshot`]s and register listeners through [`HappinessStore::subscribe`].
//!
//! Mutations never return errors. A failed write leaves the previous collection
//! in place and is reported through the snapshot's `error` field; unknown ids
//! are silent no-ops.
//!
//! ```rust
//! use happiness_core::clock::SystemClock;
//! use happiness_core::config::StoreConfig;
//! use happiness_core::durable_slot::MemorySlot;
//! use happiness_core::happiness_model::{Emotion, NewRecord};
//! use happiness_core::happiness_store::HappinessStore;
//!
//! let mut store = HappinessStore::open(MemorySlot::new(), SystemClock, StoreConfig::default());
//! let id = store
//!     .add_record(NewRecord::new("Coffee with an old friend", Emotion::Grateful))
//!     .map(|r| r.id)
//!     .unwrap_or_default();
//! store.like_record(&id);
//!
//! assert_eq!(store.get_record(&id).map(|r| r.likes), Some(1));
//! assert_eq!(store.streak(), 1);
//! ```

use chrono::NaiveDate;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::durable_slot::DurableSlot;
use crate::error::StoreError;
use crate::happiness_model::{Comment, Emotion, HappinessRecord, HappinessSnapshot, NewRecord};
use crate::streak;

/// Shown when no display name has been saved yet.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// How many entries the home list shows.
pub const RECENT_LIMIT: usize = 10;

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&HappinessSnapshot)>;

pub struct HappinessStore<S: DurableSlot, C: Clock = SystemClock> {
    slot: S,
    clock: C,
    config: StoreConfig,
    records: Vec<HappinessRecord>,
    loading: bool,
    error: Option<String>,
    streak: u32,
    retired: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl<S: DurableSlot, C: Clock> HappinessStore<S, C> {
    /// Rehydrates the collection from `slot`.
    ///
    /// A blob that does not parse is logged and replaced by an empty
    /// collection; it is not reported as an error. A slot that cannot be read
    /// at all also starts empty, with the failure left in `error`.
    pub fn open(slot: S, clock: C, config: StoreConfig) -> Self {
        let mut store = Self {
            slot,
            clock,
            config,
            records: Vec::new(),
            loading: true,
            error: None,
            streak: 0,
            retired: false,
            listeners: Vec::new(),
            next_subscription: 0,
        };

        match store.rehydrate() {
            Ok(records) => {
                info!("Loaded {} happiness records", records.len());
                store.records = records;
            }
            Err(StoreError::Serialization(e)) => {
                warn!("Error parsing happiness records from storage, starting empty: {e}");
            }
            Err(e) => {
                warn!("Error reading happiness records from storage, starting empty: {e}");
                store.error = Some(format!("Could not load saved records: {e}"));
            }
        }

        store.loading = false;
        store.streak = streak::continuous_streak(&store.records, &store.clock);
        store
    }

    fn rehydrate(&self) -> Result<Vec<HappinessRecord>, StoreError> {
        match self.slot.get(&self.config.records_key)? {
            Some(blob) => Ok(serde_json::from_str(&blob)?),
            None => Ok(Vec::new()),
        }
    }

    // ---- reads ----

    /// Records in stored order: newest insertion first.
    pub fn records(&self) -> &[HappinessRecord] {
        &self.records
    }

    pub fn get_record(&self, id: &str) -> Option<&HappinessRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn total_records(&self) -> usize {
        self.records.len()
    }

    pub fn is_retired(&self) -> bool {
        self.retired
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn snapshot(&self) -> HappinessSnapshot {
        HappinessSnapshot {
            records: self.records.clone(),
            loading: self.loading,
            error: self.error.clone(),
            streak: self.streak,
        }
    }

    /// Up to `limit` records, newest first by creation time, optionally
    /// keeping a single emotion. The list view asks for [`RECENT_LIMIT`].
    pub fn recent_records(&self, filter: Option<Emotion>, limit: usize) -> Vec<&HappinessRecord> {
        let mut recent: Vec<&HappinessRecord> = self
            .records
            .iter()
            .filter(|r| filter.map_or(true, |e| r.emotion == e))
            .collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        recent
    }

    pub fn records_on(&self, date: NaiveDate) -> Vec<&HappinessRecord> {
        streak::records_on(&self.records, date, &self.clock)
    }

    pub fn records_in_month(&self, year: i32, month: u32) -> Vec<&HappinessRecord> {
        streak::records_in_month(&self.records, year, month, &self.clock)
    }

    // ---- mutations ----

    /// Prepends a new record and persists the collection.
    ///
    /// Returns the stored record, or `None` when the write failed.
    pub fn add_record(&mut self, draft: NewRecord) -> Option<HappinessRecord> {
        self.begin(true)?;

        let record = HappinessRecord {
            id: Uuid::new_v4().to_string(),
            text: draft.text,
            emotion: draft.emotion,
            created_at: self.clock.now(),
            image_url: draft.image_url,
            likes: 0,
            comments: Vec::new(),
        };

        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record.clone());
        next.extend(self.records.iter().cloned());

        debug!("Adding happiness record {}", record.id);
        self.commit(next, "Failed to add the happiness record")
            .then_some(record)
    }

    /// Appends a comment to the record with `record_id`. No-op if absent.
    pub fn add_comment(&mut self, record_id: &str, text: &str, author: &str) -> Option<Comment> {
        let cleared = self.begin(true)?;

        let Some(index) = self.position(record_id) else {
            self.finish_unchanged(cleared);
            return None;
        };

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            author: author.to_string(),
            created_at: self.clock.now(),
        };

        let mut next = self.records.clone();
        next[index].comments.push(comment.clone());

        debug!("Adding comment {} to record {record_id}", comment.id);
        self.commit(next, "Failed to add the comment")
            .then_some(comment)
    }

    /// Adds one like. No-op if the id is unknown.
    ///
    /// Returns `false` only when the like could not be saved.
    pub fn like_record(&mut self, id: &str) -> bool {
        let Some(cleared) = self.begin(false) else {
            return false;
        };

        let Some(index) = self.position(id) else {
            self.finish_unchanged(cleared);
            return true;
        };

        let mut next = self.records.clone();
        next[index].likes = next[index].likes.saturating_add(1);

        debug!("Liking record {id}");
        self.commit(next, "Failed to update likes")
    }

    /// Removes the record with `id`. No-op if the id is unknown.
    pub fn delete_record(&mut self, id: &str) {
        let Some(cleared) = self.begin(true) else {
            return;
        };

        let Some(index) = self.position(id) else {
            self.finish_unchanged(cleared);
            return;
        };

        let mut next = self.records.clone();
        next.remove(index);

        debug!("Deleting record {id}");
        self.commit(next, "Failed to delete the happiness record");
    }

    /// Wipes the durable slot, display name included.
    ///
    /// The in-memory collection is left alone and the store stops accepting
    /// changes; the host restarts it (see [`HappinessStore::into_slot`]) to
    /// come back empty.
    pub fn reset(&mut self) -> bool {
        match self.slot.clear() {
            Ok(()) => {
                info!("Durable storage cleared; store retired until restart");
                self.retired = true;
                true
            }
            Err(e) => {
                warn!("Failed to clear durable storage: {e}");
                self.error = Some("Failed to reset saved data".to_string());
                self.notify();
                false
            }
        }
    }

    /// Tears the store down, handing back its slot for a fresh [`HappinessStore::open`].
    pub fn into_slot(self) -> S {
        self.slot
    }

    // ---- display name ----

    pub fn display_name(&self) -> String {
        match self.slot.get(&self.config.display_name_key) {
            Ok(Some(name)) => name,
            Ok(None) => DEFAULT_DISPLAY_NAME.to_string(),
            Err(e) => {
                warn!("Error reading display name: {e}");
                DEFAULT_DISPLAY_NAME.to_string()
            }
        }
    }

    /// Saves `name` as given. Names that are blank once trimmed are ignored.
    pub fn set_display_name(&mut self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        if self.retired {
            self.refuse();
            return false;
        }

        match self.slot.set(&self.config.display_name_key, name) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to save display name: {e}");
                self.error = Some("Failed to save the display name".to_string());
                self.notify();
                false
            }
        }
    }

    // ---- subscriptions ----

    /// Registers `listener` to receive a snapshot after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&HappinessSnapshot) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _)| *sub != id);
        self.listeners.len() != before
    }

    // ---- internals ----

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    /// Enters a mutation. Returns whether an old error was cleared, or `None`
    /// when the store is retired and the mutation must not run.
    fn begin(&mut self, clear_error: bool) -> Option<bool> {
        if self.retired {
            self.refuse();
            return None;
        }
        let cleared = clear_error && self.error.take().is_some();
        self.loading = true;
        Some(cleared)
    }

    fn refuse(&mut self) {
        warn!("Mutation refused: {}", StoreError::Retired);
        self.error = Some(StoreError::Retired.to_string());
        self.notify();
    }

    fn finish_unchanged(&mut self, cleared: bool) {
        self.loading = false;
        if cleared {
            self.notify();
        }
    }

    /// Persists `next` and swaps it in. On failure the current collection stays.
    fn commit(&mut self, next: Vec<HappinessRecord>, failure: &str) -> bool {
        let result = self.persist(&next);
        self.loading = false;

        match result {
            Ok(()) => {
                self.records = next;
                self.streak = streak::continuous_streak(&self.records, &self.clock);
                self.notify();
                true
            }
            Err(e) => {
                warn!("{failure}: {e}");
                self.error = Some(failure.to_string());
                self.notify();
                false
            }
        }
    }

    fn persist(&self, records: &[HappinessRecord]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(records)?;
        self.slot.set(&self.config.records_key, &blob)
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}
