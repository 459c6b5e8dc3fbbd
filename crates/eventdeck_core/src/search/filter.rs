//! Case-insensitive event filtering.
//!
//! # Invariants
//! - Filtering never reorders: hits keep collection (date) order.
//! - A blank text query matches every event.

use crate::model::event::{Event, EventType};

/// Filter options for event lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Matched against the title and the type label, case-insensitive.
    pub text: String,
    /// Restrict to one category.
    pub kind: Option<EventType>,
    /// Keep only events with a reminder set.
    pub reminders_only: bool,
}

impl EventFilter {
    /// Text-only filter, as typed into the search box.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        if self.kind.is_some_and(|kind| kind != event.kind) {
            return false;
        }
        if self.reminders_only && !event.has_reminder {
            return false;
        }

        let needle = self.text.trim().to_lowercase();
        needle.is_empty()
            || event.title.to_lowercase().contains(&needle)
            || event.kind.label().to_lowercase().contains(&needle)
    }
}

/// Returns the events matching `filter`, in their original order.
pub fn filter_events<'a>(events: &'a [Event], filter: &EventFilter) -> Vec<&'a Event> {
    events.iter().filter(|event| filter.matches(event)).collect()
}
