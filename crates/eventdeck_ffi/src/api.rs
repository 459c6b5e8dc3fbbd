//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose event and note CRUD to Dart via FRB as flat envelopes.
//! - Own the process-wide store directory and access lock.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Calls are serialized through one lock; each call loads the stores
//!   from disk, applies one operation and saves.
//! - Dates cross the boundary as Unix epoch milliseconds (UTC).

use chrono::{DateTime, TimeZone, Utc};
use eventdeck_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Event, EventStore, EventType, FileBlobStore, Note, NoteStore, RecordId, StoreConfig,
};
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

const STORE_DIR_ENV: &str = "EVENTDECK_DATA_DIR";
const STORE_DIR_NAME: &str = "eventdeck";
static STORE_DIR: OnceLock<PathBuf> = OnceLock::new();
static STORE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for the same pair; conflicting re-init returns an error.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the directory holding the event and note blobs.
///
/// # FFI contract
/// - `dir` must be an absolute path; it is created on first write.
/// - Must run before any store call; later calls with another directory
///   are rejected.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store_dir(dir: String) -> String {
    let trimmed = dir.trim();
    if trimmed.is_empty() || !Path::new(trimmed).is_absolute() {
        return format!("store dir must be an absolute path, got `{trimmed}`");
    }
    let wanted = PathBuf::from(trimmed);
    let active = STORE_DIR.get_or_init(|| wanted.clone());
    if *active == wanted {
        String::new()
    } else {
        format!(
            "store dir already set to `{}`; refusing to switch to `{}`",
            active.display(),
            wanted.display()
        )
    }
}

/// Event row as rendered by the list and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventItem {
    pub id: String,
    pub title: String,
    pub date_epoch_ms: i64,
    /// Wire value (`birthday|meeting|holiday|sport|other`).
    pub kind: String,
    /// Display label (`Birthday`, ...).
    pub kind_label: String,
    pub has_reminder: bool,
    /// Medium date + short time in the device zone.
    pub formatted_date: String,
}

/// Note row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub date_epoch_ms: i64,
}

/// Ordered event list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListResponse {
    pub ok: bool,
    /// Events ordered by date ascending.
    pub items: Vec<EventItem>,
    pub message: String,
}

/// Note list envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    pub ok: bool,
    /// Notes ordered newest first.
    pub items: Vec<NoteItem>,
    pub message: String,
}

/// Generic action envelope for single-record mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether the operation took effect and was saved.
    pub ok: bool,
    /// Id of the affected record, when there was one.
    pub record_id: Option<String>,
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, record_id: RecordId) -> Self {
        Self {
            ok: true,
            record_id: Some(record_id.to_string()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            record_id: None,
            message: message.into(),
        }
    }
}

/// Loads events, seeding examples into an empty store when asked.
///
/// # FFI contract
/// - Call once at app start; other calls never seed.
/// - Corrupt stored data yields an empty list, not an error.
#[flutter_rust_bridge::frb(sync)]
pub fn events_bootstrap(seed_if_empty: bool) -> EventListResponse {
    with_events(seed_if_empty, |store| Ok(to_event_items(store.events().iter())))
        .map_or_else(event_list_failure, event_list_success)
}

/// Lists all events ordered by date ascending.
#[flutter_rust_bridge::frb(sync)]
pub fn events_list() -> EventListResponse {
    with_events(false, |store| Ok(to_event_items(store.events().iter())))
        .map_or_else(event_list_failure, event_list_success)
}

/// Lists events whose title or type label contains `text`
/// (case-insensitive). Blank text lists everything.
#[flutter_rust_bridge::frb(sync)]
pub fn events_search(text: String) -> EventListResponse {
    with_events(false, |store| Ok(to_event_items(store.search(&text))))
        .map_or_else(event_list_failure, event_list_success)
}

/// Adds an event. Blank titles are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn event_add(
    title: String,
    date_epoch_ms: i64,
    kind: String,
    has_reminder: bool,
) -> ActionResponse {
    let result = parse_event_fields(date_epoch_ms, &kind).and_then(|(date, kind)| {
        with_events(false, |store| {
            let event = store
                .add(&title, date, kind, has_reminder)
                .map_err(|err| err.to_string())?;
            saved(store.last_persistence_error().map(ToString::to_string))?;
            Ok(event.id())
        })
    });
    action_response("Event created.", "event_add", result)
}

/// Replaces every editable field of the event with `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn event_update(
    id: String,
    title: String,
    date_epoch_ms: i64,
    kind: String,
    has_reminder: bool,
) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        let (date, kind) = parse_event_fields(date_epoch_ms, &kind)?;
        with_events(false, |store| {
            let mut event = store
                .get(id)
                .cloned()
                .ok_or_else(|| format!("event not found: {id}"))?;
            event.title = title.clone();
            event.date = date;
            event.kind = kind;
            event.has_reminder = has_reminder;
            store.update(&event).map_err(|err| err.to_string())?;
            saved(store.last_persistence_error().map(ToString::to_string))?;
            Ok(id)
        })
    });
    action_response("Event updated.", "event_update", result)
}

/// Deletes the event with `id`; deleting a missing event fails softly.
#[flutter_rust_bridge::frb(sync)]
pub fn event_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_events(false, |store| {
            if !store.delete_by_id(id) {
                return Err(format!("event not found: {id}"));
            }
            saved(store.last_persistence_error().map(ToString::to_string))?;
            Ok(id)
        })
    });
    action_response("Event deleted.", "event_delete", result)
}

/// Flips the reminder flag of the event with `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn event_toggle_reminder(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_events(false, |store| {
            let event = store
                .toggle_reminder(id)
                .ok_or_else(|| format!("event not found: {id}"))?;
            saved(store.last_persistence_error().map(ToString::to_string))?;
            Ok(event.id())
        })
    });
    action_response("Reminder toggled.", "event_toggle_reminder", result)
}

/// Lists notes newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_list() -> NoteListResponse {
    match with_notes(|store| Ok(store.notes().iter().map(to_note_item).collect::<Vec<_>>())) {
        Ok(items) => NoteListResponse {
            ok: true,
            message: count_message(items.len()),
            items,
        },
        Err(err) => NoteListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("notes_list failed: {err}"),
        },
    }
}

/// Adds a note stamped now. Blank titles are rejected.
#[flutter_rust_bridge::frb(sync)]
pub fn note_add(title: String, content: String) -> ActionResponse {
    let result = with_notes(|store| {
        let note = store.add(&title, &content).map_err(|err| err.to_string())?;
        saved(store.last_persistence_error().map(ToString::to_string))?;
        Ok(note.id())
    });
    action_response("Note created.", "note_add", result)
}

/// Replaces title and content of the note with `id`, refreshing its date.
#[flutter_rust_bridge::frb(sync)]
pub fn note_update(id: String, title: String, content: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_notes(|store| {
            store
                .update(id, &title, &content)
                .map_err(|err| err.to_string())?;
            saved(store.last_persistence_error().map(ToString::to_string))?;
            Ok(id)
        })
    });
    action_response("Note updated.", "note_update", result)
}

/// Deletes the note with `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: String) -> ActionResponse {
    let result = parse_id(&id).and_then(|id| {
        with_notes(|store| {
            if !store.delete_by_id(id) {
                return Err(format!("note not found: {id}"));
            }
            saved(store.last_persistence_error().map(ToString::to_string))?;
            Ok(id)
        })
    });
    action_response("Note deleted.", "note_delete", result)
}

fn resolve_store_dir() -> PathBuf {
    STORE_DIR
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(STORE_DIR_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(STORE_DIR_NAME)
        })
        .clone()
}

fn with_events<T>(
    seed_if_empty: bool,
    f: impl FnOnce(&mut EventStore<FileBlobStore>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK
        .lock()
        .map_err(|_| "store lock poisoned".to_string())?;
    let config = StoreConfig::events().seed_if_empty(seed_if_empty);
    let mut store = EventStore::open(FileBlobStore::new(resolve_store_dir()), &config);
    f(&mut store)
}

fn with_notes<T>(
    f: impl FnOnce(&mut NoteStore<FileBlobStore>) -> Result<T, String>,
) -> Result<T, String> {
    let _guard = STORE_LOCK
        .lock()
        .map_err(|_| "store lock poisoned".to_string())?;
    let mut store = NoteStore::open(
        FileBlobStore::new(resolve_store_dir()),
        &StoreConfig::notes(),
    );
    f(&mut store)
}

fn saved(save_error: Option<String>) -> Result<(), String> {
    match save_error {
        Some(err) => {
            warn!("event=ffi_save module=ffi status=error error={err}");
            Err(format!("change not saved: {err}"))
        }
        None => Ok(()),
    }
}

fn parse_id(raw: &str) -> Result<RecordId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid record id `{raw}`"))
}

fn parse_event_fields(
    date_epoch_ms: i64,
    kind: &str,
) -> Result<(DateTime<Utc>, EventType), String> {
    let date = Utc
        .timestamp_millis_opt(date_epoch_ms)
        .single()
        .ok_or_else(|| format!("date out of range: {date_epoch_ms}"))?;
    let kind = kind.parse::<EventType>().map_err(|err| err.to_string())?;
    Ok((date, kind))
}

fn action_response(
    success_message: &str,
    operation: &str,
    result: Result<RecordId, String>,
) -> ActionResponse {
    match result {
        Ok(id) => ActionResponse::success(success_message, id),
        Err(err) => ActionResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn event_list_success(events: Vec<EventItem>) -> EventListResponse {
    EventListResponse {
        ok: true,
        message: count_message(events.len()),
        items: events,
    }
}

fn event_list_failure(err: String) -> EventListResponse {
    EventListResponse {
        ok: false,
        items: Vec::new(),
        message: format!("events failed: {err}"),
    }
}

fn count_message(count: usize) -> String {
    if count == 0 {
        "No items.".to_string()
    } else {
        format!("{count} item(s).")
    }
}

fn to_event_items<'a>(events: impl IntoIterator<Item = &'a Event>) -> Vec<EventItem> {
    events.into_iter().map(to_event_item).collect()
}

fn to_event_item(event: &Event) -> EventItem {
    EventItem {
        id: event.id().to_string(),
        title: event.title.clone(),
        date_epoch_ms: event.date.timestamp_millis(),
        kind: event.kind.as_str().to_string(),
        kind_label: event.kind.label().to_string(),
        has_reminder: event.has_reminder,
        formatted_date: event.formatted_date(),
    }
}

fn to_note_item(note: &Note) -> NoteItem {
    NoteItem {
        id: note.id().to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        date_epoch_ms: note.date.timestamp_millis(),
    }
}
