//! Event store: events ordered by date ascending.
//!
//! # Invariants
//! - Titles are normalized (trimmed) on add and update; blank titles are
//!   rejected with `InvalidInput` and never stored.
//! - `toggle_reminder` goes through the same path as `update`.

use crate::model::event::{Event, EventType};
use crate::model::record::{normalize_title, RecordId};
use crate::search::filter::{filter_events, EventFilter};
use crate::storage::BlobStore;
use crate::store::record_store::{
    ListenerId, PersistenceError, RecordStore, StoreConfig, StoreResult,
};
use chrono::{DateTime, Duration, Utc};
use log::info;

/// Blob key holding the events collection.
pub const EVENTS_STORAGE_KEY: &str = "events_storage_v1";

/// Example events inserted into an empty store: title, day offset, type,
/// reminder.
const SEED_EVENTS: &[(&str, i64, EventType, bool)] = &[
    ("Cuma's Birthday", 2, EventType::Birthday, true),
    ("Team Meeting", 1, EventType::Meeting, false),
    ("Weekend Match", 7, EventType::Sport, true),
];

impl StoreConfig {
    /// Events defaults: fixed events key, seeding on.
    pub fn events() -> Self {
        Self::new(EVENTS_STORAGE_KEY).seed_if_empty(true)
    }
}

pub struct EventStore<B: BlobStore> {
    inner: RecordStore<Event, B>,
}

impl<B: BlobStore> EventStore<B> {
    /// Creates an empty store over `blob` without loading anything.
    pub fn new(blob: B) -> Self {
        Self::with_key(blob, EVENTS_STORAGE_KEY)
    }

    pub fn with_key(blob: B, key: impl Into<String>) -> Self {
        Self {
            inner: RecordStore::new(blob, key),
        }
    }

    /// Creates and initializes a store per `config`.
    pub fn open(blob: B, config: &StoreConfig) -> Self {
        let mut store = Self::with_key(blob, config.storage_key.clone());
        store.initialize(config.seed_if_empty);
        store
    }

    /// Loads persisted events, seeding examples relative to now when the
    /// result is empty and `seed_if_empty` is set.
    pub fn initialize(&mut self, seed_if_empty: bool) {
        self.initialize_at(seed_if_empty, Utc::now());
    }

    /// `initialize` with an explicit reference time for the seed dates.
    pub fn initialize_at(&mut self, seed_if_empty: bool, now: DateTime<Utc>) {
        let loaded = self.inner.load();
        if loaded == 0 && seed_if_empty {
            self.seed(now);
        }
    }

    /// Creates, stores and returns a new event.
    ///
    /// # Errors
    /// - `InvalidInput` when `title` is blank after trimming.
    pub fn add(
        &mut self,
        title: &str,
        date: DateTime<Utc>,
        kind: EventType,
        has_reminder: bool,
    ) -> StoreResult<Event> {
        let title = normalize_title(title)?;
        self.inner
            .insert(Event::new(title, date, kind, has_reminder))
    }

    /// Replaces the stored event with the same id, title normalized.
    ///
    /// # Errors
    /// - `NotFound` when the id is unknown (including after deletion).
    /// - `InvalidInput` when the new title is blank.
    pub fn update(&mut self, event: &Event) -> StoreResult<()> {
        let mut replacement = event.clone();
        replacement.title = normalize_title(&event.title)?;
        self.inner.replace(replacement)
    }

    /// Removes the first stored event equal to `event` field by field.
    pub fn delete(&mut self, event: &Event) -> bool {
        self.inner.remove(event)
    }

    pub fn delete_by_id(&mut self, id: RecordId) -> bool {
        self.inner.remove_by_id(id)
    }

    /// Flips `has_reminder`, returning the updated event, or `None` when
    /// no event has this id.
    pub fn toggle_reminder(&mut self, id: RecordId) -> Option<Event> {
        let mut event = self.inner.get(id)?.clone();
        event.has_reminder = !event.has_reminder;
        self.update(&event).ok()?;
        Some(event)
    }

    /// Current events, ordered by date ascending.
    pub fn events(&self) -> &[Event] {
        self.inner.records()
    }

    pub fn get(&self, id: RecordId) -> Option<&Event> {
        self.inner.get(id)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Events whose title or type label contains `text`.
    pub fn search(&self, text: &str) -> Vec<&Event> {
        self.filter(&EventFilter::text(text))
    }

    pub fn filter(&self, filter: &EventFilter) -> Vec<&Event> {
        filter_events(self.inner.records(), filter)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[Event]) + 'static) -> ListenerId {
        self.inner.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.inner.unsubscribe(id)
    }

    pub fn last_persistence_error(&self) -> Option<&PersistenceError> {
        self.inner.last_persistence_error()
    }

    pub fn blob(&self) -> &B {
        self.inner.blob()
    }

    fn seed(&mut self, now: DateTime<Utc>) {
        let seeds = SEED_EVENTS
            .iter()
            .map(|&(title, days, kind, reminder)| {
                Event::new(title.to_string(), now + Duration::days(days), kind, reminder)
            })
            .collect::<Vec<_>>();
        let count = seeds.len();
        if self.inner.insert_all(seeds).is_ok() {
            info!("event=store_seed module=store status=ok kind=event count={count}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EventStore;
    use crate::model::event::EventType;
    use crate::storage::MemoryBlobStore;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn seed_titles_follow_date_order() {
        let now = Utc.with_ymd_and_hms(2025, 9, 24, 12, 0, 0).unwrap();
        let mut store = EventStore::new(MemoryBlobStore::new());
        store.initialize_at(true, now);

        let summary = store
            .events()
            .iter()
            .map(|event| (event.title.as_str(), event.date - now, event.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("Team Meeting", Duration::days(1), EventType::Meeting),
                ("Cuma's Birthday", Duration::days(2), EventType::Birthday),
                ("Weekend Match", Duration::days(7), EventType::Sport),
            ]
        );
    }

    #[test]
    fn toggle_reminder_flips_twice_back_to_original() {
        let mut store = EventStore::new(MemoryBlobStore::new());
        let created = store
            .add("Dentist", Utc::now(), EventType::Other, false)
            .unwrap();

        let toggled = store.toggle_reminder(created.id()).unwrap();
        assert!(toggled.has_reminder);
        assert!(store.get(created.id()).unwrap().has_reminder);

        store.toggle_reminder(created.id()).unwrap();
        assert!(!store.get(created.id()).unwrap().has_reminder);
    }
}
