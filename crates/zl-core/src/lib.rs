#![forbid(unsafe_code)]

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The reserved "epoch zero" instant flagging an unparseable or missing date.
///
/// Events carrying this instant stay in the document; only their sort key is
/// degenerate.
#[must_use]
pub fn sentinel_instant() -> NaiveDateTime {
    NaiveDateTime::UNIX_EPOCH
}

/// Why a block ended up with the sentinel date.
///
/// Both variants render a human-readable notice that the extractor prepends
/// to the event content; the two messages are deliberately distinct so the
/// author can tell "forgot the field" from "typoed the value".
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum DateFieldError {
    #[error("Error: no `date:` field found in this event block")]
    MissingField,
    #[error("Error: could not parse date \"{token}\"")]
    Unparseable { token: String },
}

/// A single timeline entry, immutable once produced by the parser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Normalized start instant; [`sentinel_instant`] denotes a parse failure.
    pub date: NaiveDateTime,
    /// Optional end instant for duration events.
    pub end_date: Option<NaiveDateTime>,
    /// Overrides default formatting (set for quarter/month-name inputs).
    pub display_label: Option<String>,
    /// True when the source token included a time-of-day component.
    pub has_explicit_time: bool,
    /// One of the configured category names, or `None`.
    pub category: Option<String>,
    /// Swimlane name; the configured default when the block names none.
    pub lane: String,
    /// Remaining markdown body, error notice prepended on sentinel dates.
    pub content: String,
    /// Absolute byte offset of the block start in the original document.
    pub source_start: usize,
    /// Absolute byte offset one past the block end in the original document.
    pub source_end: usize,
}

impl Event {
    /// Whether the start date parsed successfully.
    #[must_use]
    pub fn has_valid_date(&self) -> bool {
        self.date != sentinel_instant()
    }

    /// Whether this event spans a duration worth connecting.
    #[must_use]
    pub fn is_duration(&self) -> bool {
        self.end_date.is_some_and(|end| end > self.date)
    }

    /// Human-readable label: the explicit display label when present,
    /// otherwise `DD.MM.YYYY` with an ` HH:MM` suffix for timed events.
    #[must_use]
    pub fn label(&self) -> String {
        if let Some(label) = &self.display_label {
            return label.clone();
        }
        if self.has_explicit_time {
            self.date.format("%d.%m.%Y %H:%M").to_string()
        } else {
            self.date.format("%d.%m.%Y").to_string()
        }
    }
}

/// A parsed document. Ephemeral: rebuilt wholesale on every parse call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Document {
    /// Title consumed from a leading `title:` line or ATX heading.
    pub title: Option<String>,
    /// Absolute byte offset where the body starts in the raw input.
    pub body_offset: usize,
    /// Events in source order.
    pub events: Vec<Event>,
}

impl Document {
    /// Index of the event whose source span contains `offset`, if any.
    ///
    /// Used by editor integrations to map a cursor position back to the
    /// timeline entry it belongs to.
    #[must_use]
    pub fn event_at_offset(&self, offset: usize) -> Option<usize> {
        self.events
            .iter()
            .position(|event| event.source_start <= offset && offset < event.source_end)
    }
}

/// Metadata enumerations injected into the extractor.
///
/// Explicit configuration rather than module constants so embedders and test
/// suites can swap in alternate enumerations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// Recognized `class:` values; anything else is silently dropped.
    pub categories: Vec<String>,
    /// Lane assigned when a block carries no `group:`/`lane:` line.
    pub default_lane: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            categories: ["info", "milestone", "danger", "success", "warning"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            default_lane: "Default".to_string(),
        }
    }
}

impl ExtractorConfig {
    /// Canonical category name for `value`, matched case-insensitively.
    #[must_use]
    pub fn canonical_category(&self, value: &str) -> Option<String> {
        let value = value.trim();
        self.categories
            .iter()
            .find(|known| known.eq_ignore_ascii_case(value))
            .cloned()
    }
}

/// Result of a layout phase A pass. Produced fresh on every call; never
/// mutates the underlying events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LayoutResult {
    /// Events sorted chronologically (see phase A tie-break rules).
    pub order: Vec<Event>,
    /// Distinct lane names in first-seen document order.
    pub lanes: Vec<String>,
    /// Lane name to declaration index.
    pub lane_index: BTreeMap<String, usize>,
    /// Position in `order` where a "today" marker belongs.
    pub today_insert_index: usize,
    /// True when the caller requested lanes and more than one lane exists.
    pub lane_mode_active: bool,
}

/// Truncate an instant to midnight for date-only comparisons.
#[must_use]
pub fn normalize_to_midnight(instant: NaiveDateTime) -> NaiveDate {
    instant.date()
}
