use chrono::{Duration, TimeZone, Utc};
use eventdeck_core::{
    BlobError, BlobResult, BlobStore, Event, EventStore, EventType, MemoryBlobStore,
    PersistenceError, RecordValidationError, StoreConfig, StoreError, EVENTS_STORAGE_KEY,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Blob store whose reads or writes can be switched to fail.
#[derive(Clone, Default)]
struct FlakyBlobStore {
    inner: MemoryBlobStore,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
}

impl BlobStore for FlakyBlobStore {
    fn get(&self, key: &str) -> BlobResult<Option<Vec<u8>>> {
        if self.fail_reads.get() {
            return Err(BlobError::Io(std::io::Error::other("disk unplugged")));
        }
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &[u8]) -> BlobResult<()> {
        if self.fail_writes.get() {
            return Err(BlobError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }
}

fn base_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 24, 9, 30, 0).unwrap()
}

fn empty_store() -> EventStore<MemoryBlobStore> {
    let mut store = EventStore::new(MemoryBlobStore::new());
    store.initialize(false);
    store
}

fn titles(store: &EventStore<impl BlobStore>) -> Vec<String> {
    store.events().iter().map(|e| e.title.clone()).collect()
}

fn is_sorted_by_date(events: &[Event]) -> bool {
    events.windows(2).all(|pair| pair[0].date <= pair[1].date)
}

#[test]
fn add_orders_events_by_date_ascending() {
    let now = base_time();
    let mut store = empty_store();

    store
        .add("plus two", now + Duration::days(2), EventType::Birthday, true)
        .unwrap();
    store
        .add("plus one", now + Duration::days(1), EventType::Meeting, false)
        .unwrap();
    store
        .add("plus seven", now + Duration::days(7), EventType::Sport, true)
        .unwrap();

    assert_eq!(titles(&store), vec!["plus one", "plus two", "plus seven"]);
}

#[test]
fn any_add_sequence_keeps_collection_sorted() {
    let now = base_time();
    let mut store = empty_store();
    let offsets = [5_i64, -3, 0, 12, -3, 7, 1, 0, -10, 4];

    for (index, hours) in offsets.iter().enumerate() {
        store
            .add(
                &format!("event {index}"),
                now + Duration::hours(*hours),
                EventType::Other,
                false,
            )
            .unwrap();
        assert!(is_sorted_by_date(store.events()));
    }
    assert_eq!(store.len(), offsets.len());
}

#[test]
fn equal_dates_keep_insertion_order() {
    let now = base_time();
    let mut store = empty_store();
    store.add("first", now, EventType::Other, false).unwrap();
    store.add("second", now, EventType::Other, false).unwrap();
    store
        .add("earlier", now - Duration::minutes(1), EventType::Other, false)
        .unwrap();
    store.add("third", now, EventType::Other, false).unwrap();

    assert_eq!(titles(&store), vec!["earlier", "first", "second", "third"]);
}

#[test]
fn add_trims_title_and_assigns_unique_ids() {
    let mut store = empty_store();
    let a = store
        .add("  Lunch \n", base_time(), EventType::Other, false)
        .unwrap();
    let b = store.add("Lunch", base_time(), EventType::Other, false).unwrap();

    assert_eq!(a.title, "Lunch");
    assert_ne!(a.id(), b.id());
    assert_eq!(store.get(a.id()), Some(&a));
}

#[test]
fn add_with_blank_title_never_inserts_or_saves() {
    let blob = MemoryBlobStore::new();
    let mut store = EventStore::new(blob.clone());
    store.initialize(false);

    for title in ["", "   ", "\n\t "] {
        let err = store
            .add(title, base_time(), EventType::Meeting, true)
            .unwrap_err();
        assert_eq!(err, StoreError::InvalidInput(RecordValidationError::BlankTitle));
    }
    assert!(store.is_empty());
    assert!(blob.raw(EVENTS_STORAGE_KEY).is_none());
}

#[test]
fn update_replaces_fields_in_place_and_resorts() {
    let now = base_time();
    let mut store = empty_store();
    let early = store.add("early", now, EventType::Other, false).unwrap();
    store
        .add("late", now + Duration::days(1), EventType::Other, false)
        .unwrap();

    let mut moved = early.clone();
    moved.title = "  moved ".to_string();
    moved.date = now + Duration::days(3);
    moved.kind = EventType::Holiday;
    store.update(&moved).unwrap();

    assert_eq!(titles(&store), vec!["late", "moved"]);
    let stored = store.get(early.id()).unwrap();
    assert_eq!(stored.kind, EventType::Holiday);
    assert_eq!(stored.title, "moved");
}

#[test]
fn update_persists_the_normalized_title() {
    let blob = MemoryBlobStore::new();
    let mut store = EventStore::new(blob.clone());
    store.initialize(false);
    let event = store.add("Dentist", base_time(), EventType::Other, false).unwrap();

    let mut padded = event.clone();
    padded.title = "\t Dentist at 9 \n".to_string();
    store.update(&padded).unwrap();

    let saved: serde_json::Value =
        serde_json::from_slice(&blob.raw(EVENTS_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved[0]["title"], "Dentist at 9");
}

#[test]
fn update_with_blank_title_is_rejected() {
    let mut store = empty_store();
    let event = store.add("keep me", base_time(), EventType::Other, false).unwrap();

    let mut blanked = event.clone();
    blanked.title = "   ".to_string();
    assert!(matches!(
        store.update(&blanked),
        Err(StoreError::InvalidInput(RecordValidationError::BlankTitle))
    ));
    assert_eq!(store.get(event.id()).unwrap().title, "keep me");
}

#[test]
fn delete_then_update_does_not_resurrect() {
    let mut store = empty_store();
    let event = store.add("gone soon", base_time(), EventType::Other, false).unwrap();

    assert!(store.delete_by_id(event.id()));
    assert_eq!(store.update(&event), Err(StoreError::NotFound(event.id())));
    assert!(store.toggle_reminder(event.id()).is_none());
    assert!(store.is_empty());
}

#[test]
fn delete_by_value_and_missing_deletes_are_noops() {
    let mut store = empty_store();
    let event = store.add("value", base_time(), EventType::Sport, true).unwrap();
    let other = store.add("other", base_time(), EventType::Sport, true).unwrap();

    assert!(store.delete(&event));
    assert!(!store.delete(&event));
    assert!(!store.delete_by_id(event.id()));
    assert_eq!(store.events(), &[other][..]);
}

#[test]
fn toggle_reminder_on_unknown_id_leaves_collection_unchanged() {
    let mut store = empty_store();
    store.add("only", base_time(), EventType::Other, true).unwrap();
    let before = store.events().to_vec();

    assert!(store.toggle_reminder(uuid::Uuid::new_v4()).is_none());
    assert_eq!(store.events(), before.as_slice());
}

#[test]
fn persisted_collection_round_trips_into_a_new_store() {
    let now = base_time();
    let blob = MemoryBlobStore::new();
    let mut first = EventStore::new(blob.clone());
    first.initialize(false);
    first
        .add("B-day", now + Duration::days(2), EventType::Birthday, true)
        .unwrap();
    first
        .add("Standup", now + Duration::hours(3), EventType::Meeting, false)
        .unwrap();

    let mut second = EventStore::new(blob);
    second.initialize(true);

    assert_eq!(second.events(), first.events());
}

#[test]
fn blob_uses_documented_wire_shape() {
    let blob = MemoryBlobStore::new();
    let mut store = EventStore::new(blob.clone());
    store.initialize(false);
    let event = store
        .add("Standup", base_time(), EventType::Meeting, true)
        .unwrap();

    let raw = blob.raw(EVENTS_STORAGE_KEY).expect("events blob written");
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "id": event.id().to_string(),
            "title": "Standup",
            "date": "2025-09-24T09:30:00Z",
            "type": "meeting",
            "hasReminder": true
        }])
    );
}

#[test]
fn corrupt_blob_initializes_empty_and_records_decode_error() {
    let blob = MemoryBlobStore::with_entry(EVENTS_STORAGE_KEY, b"{not json".to_vec());
    let mut store = EventStore::new(blob);
    store.initialize(false);

    assert!(store.is_empty());
    assert!(matches!(
        store.last_persistence_error(),
        Some(PersistenceError::Decode(_))
    ));
}

#[test]
fn corrupt_blob_with_seeding_falls_back_to_examples() {
    let blob = MemoryBlobStore::with_entry(EVENTS_STORAGE_KEY, b"[{\"id\": 7}]".to_vec());
    let store = EventStore::open(blob, &StoreConfig::events());

    assert_eq!(store.len(), 3);
    assert!(store.last_persistence_error().is_none());
}

#[test]
fn load_drops_blank_titles_and_duplicate_ids_and_sorts() {
    let id = "11111111-2222-4333-8444-555555555555";
    let other = "66666666-2222-4333-8444-555555555555";
    let raw = serde_json::json!([
        {"id": id, "title": "later", "date": "2025-09-30T00:00:00Z", "type": "other", "hasReminder": false},
        {"id": other, "title": "  ", "date": "2025-09-01T00:00:00Z", "type": "other", "hasReminder": false},
        {"id": id, "title": "dup", "date": "2025-09-02T00:00:00Z", "type": "sport", "hasReminder": true},
        {"id": other, "title": "sooner", "date": "2025-09-10T00:00:00Z", "type": "holiday", "hasReminder": true}
    ]);
    let blob = MemoryBlobStore::with_entry(EVENTS_STORAGE_KEY, serde_json::to_vec(&raw).unwrap());
    let mut store = EventStore::new(blob);
    store.initialize(false);

    assert_eq!(titles(&store), vec!["sooner", "later"]);
}

#[test]
fn load_accepts_capitalized_type_labels_and_rewrites_lowercase() {
    let raw = serde_json::json!([
        {"id": "11111111-2222-4333-8444-555555555555", "title": "Cake", "date": "2025-10-02T00:00:00Z", "type": "Birthday", "hasReminder": true},
        {"id": "66666666-2222-4333-8444-555555555555", "title": "Derby", "date": "2025-10-01T00:00:00Z", "type": "sport", "hasReminder": false}
    ]);
    let blob = MemoryBlobStore::with_entry(EVENTS_STORAGE_KEY, serde_json::to_vec(&raw).unwrap());
    let mut store = EventStore::new(blob.clone());
    store.initialize(false);

    assert!(store.last_persistence_error().is_none());
    assert_eq!(titles(&store), vec!["Derby", "Cake"]);
    assert_eq!(store.events()[1].kind, EventType::Birthday);

    let cake = store.events()[1].clone();
    store.toggle_reminder(cake.id()).unwrap();
    let saved: serde_json::Value =
        serde_json::from_slice(&blob.raw(EVENTS_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(saved[1]["type"], "birthday");
}

#[test]
fn seeding_only_happens_on_empty_store() {
    let now = base_time();
    let blob = MemoryBlobStore::new();
    let mut seeded = EventStore::new(blob.clone());
    seeded.initialize_at(true, now);
    assert_eq!(
        titles(&seeded),
        vec!["Team Meeting", "Cuma's Birthday", "Weekend Match"]
    );
    assert!(blob.raw(EVENTS_STORAGE_KEY).is_some());

    let mut reopened = EventStore::new(blob);
    reopened.initialize_at(true, now + Duration::days(30));
    assert_eq!(reopened.events(), seeded.events());

    let mut unseeded = EventStore::new(MemoryBlobStore::new());
    unseeded.initialize(false);
    assert!(unseeded.is_empty());
}

#[test]
fn failed_save_keeps_mutation_and_next_save_clears_error() {
    let blob = FlakyBlobStore::default();
    let mut store = EventStore::new(blob.clone());
    store.initialize(false);

    blob.fail_writes.set(true);
    let kept = store.add("offline", base_time(), EventType::Other, false).unwrap();
    assert_eq!(store.len(), 1);
    assert!(matches!(
        store.last_persistence_error(),
        Some(PersistenceError::Blob(BlobError::Io(_)))
    ));

    blob.fail_writes.set(false);
    store.toggle_reminder(kept.id()).unwrap();
    assert!(store.last_persistence_error().is_none());
    assert!(blob.inner.raw(EVENTS_STORAGE_KEY).is_some());
}

#[test]
fn failed_read_starts_empty_and_store_stays_usable() {
    let blob = FlakyBlobStore::default();
    blob.fail_reads.set(true);
    let mut store = EventStore::new(blob);
    store.initialize(false);

    assert!(store.is_empty());
    assert!(store.last_persistence_error().is_some());
    store.add("still works", base_time(), EventType::Other, false).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn subscribers_receive_post_mutation_collection() {
    let mut store = empty_store();
    let snapshots = Rc::new(RefCell::new(Vec::<Vec<String>>::new()));
    let sink = Rc::clone(&snapshots);
    store.subscribe(move |events: &[Event]| {
        sink.borrow_mut()
            .push(events.iter().map(|e| e.title.clone()).collect());
    });

    let now = base_time();
    let b = store.add("b", now + Duration::days(1), EventType::Other, false).unwrap();
    store.add("a", now, EventType::Other, false).unwrap();
    store.toggle_reminder(b.id()).unwrap();
    store.delete_by_id(b.id());
    let _ = store.add(" ", now, EventType::Other, false);

    assert_eq!(
        *snapshots.borrow(),
        vec![
            vec!["b".to_string()],
            vec!["a".to_string(), "b".to_string()],
            vec!["a".to_string(), "b".to_string()],
            vec!["a".to_string()],
        ]
    );
}

#[test]
fn search_matches_title_or_type() {
    let now = base_time();
    let mut store = empty_store();
    store.add("Team Meeting", now, EventType::Meeting, false).unwrap();
    store
        .add("Grandma", now + Duration::days(1), EventType::Birthday, true)
        .unwrap();

    let hits = store.search("BIRTH");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Grandma");
    assert_eq!(store.search("").len(), 2);
    assert!(store.search("dentist").is_empty());
}
