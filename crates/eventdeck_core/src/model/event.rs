//! Event record.
//!
//! # Invariants
//! - `id` is assigned once by `EventStore::add` and never changes.
//! - Collections of events are ordered by `date` ascending.
//!
//! Wire shape: `{"id","title","date","type","hasReminder"}` with `date` in
//! RFC 3339 and `type` as the lowercase category name. Capitalized labels
//! are still read, as older blobs wrote them.

use crate::model::record::{Record, RecordId};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Closed set of event categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    #[serde(alias = "Birthday")]
    Birthday,
    #[serde(alias = "Meeting")]
    Meeting,
    #[serde(alias = "Holiday")]
    Holiday,
    #[serde(alias = "Sport")]
    Sport,
    #[default]
    #[serde(alias = "Other")]
    Other,
}

impl EventType {
    /// All categories in picker order.
    pub const ALL: [EventType; 5] = [
        EventType::Birthday,
        EventType::Meeting,
        EventType::Holiday,
        EventType::Sport,
        EventType::Other,
    ];

    /// Wire value, as written in the persisted blob.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Birthday => "birthday",
            Self::Meeting => "meeting",
            Self::Holiday => "holiday",
            Self::Sport => "sport",
            Self::Other => "other",
        }
    }

    /// Human-facing label for list rows and pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Birthday => "Birthday",
            Self::Meeting => "Meeting",
            Self::Holiday => "Holiday",
            Self::Sport => "Sport",
            Self::Other => "Other",
        }
    }
}

impl Display for EventType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when text names no known event category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEventTypeError(pub String);

impl Display for ParseEventTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown event type `{}`; expected birthday|meeting|holiday|sport|other",
            self.0
        )
    }
}

impl Error for ParseEventTypeError {}

impl FromStr for EventType {
    type Err = ParseEventTypeError;

    /// Accepts the wire value or the label, case-insensitive.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| ParseEventTypeError(value.to_string()))
    }
}

/// A dated, categorized event with an optional reminder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    id: RecordId,
    /// Trimmed, non-empty display title.
    pub title: String,
    pub date: DateTime<Utc>,
    /// Serialized as `type`.
    #[serde(rename = "type")]
    pub kind: EventType,
    pub has_reminder: bool,
}

impl Event {
    /// Builds a new event with a fresh id. Title normalization is the
    /// caller's job; `EventStore::add` is the only production caller.
    pub(crate) fn new(
        title: String,
        date: DateTime<Utc>,
        kind: EventType,
        has_reminder: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            date,
            kind,
            has_reminder,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Medium date with short time, in the host's local zone.
    pub fn formatted_date(&self) -> String {
        self.formatted_date_in(&Local)
    }

    /// Medium date with short time, e.g. `Sep 26, 2025 at 3:04 PM`.
    pub fn formatted_date_in<Tz>(&self, zone: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.date
            .with_timezone(zone)
            .format("%b %-d, %Y at %-I:%M %p")
            .to_string()
    }
}

impl Record for Event {
    const KIND: &'static str = "event";

    fn id(&self) -> RecordId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        a.date.cmp(&b.date)
    }
}
