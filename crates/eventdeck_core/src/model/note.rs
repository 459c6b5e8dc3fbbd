//! Note record: a titled body of text, newest first.

use crate::model::record::{Record, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    id: RecordId,
    pub title: String,
    /// Trimmed body; may be empty.
    pub content: String,
    /// Creation time, refreshed on every edit.
    pub date: DateTime<Utc>,
}

impl Note {
    pub(crate) fn new(title: String, content: String, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            content,
            date,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }
}

impl Record for Note {
    const KIND: &'static str = "note";

    fn id(&self) -> RecordId {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.date.cmp(&a.date)
    }
}
