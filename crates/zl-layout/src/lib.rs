#![forbid(unsafe_code)]

//! Timeline layout.
//!
//! Two explicit phases with no state carried between calls:
//!
//! - **Phase A** ([`compute_order`]): chronological ordering, lane
//!   assignment, and the "today" marker position. Pure; safe to re-run on
//!   every keystroke.
//! - **Phase B** ([`compute_connectors`]): duration and per-lane connector
//!   geometry. Requires the vertical offsets the render collaborator
//!   measures after painting the sorted events, so the pipeline is
//!   order → render → measure → connectors. Re-entrant and idempotent.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zl_core::{Event, LayoutResult, normalize_to_midnight};

/// Caller-tunable layout knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Request parallel-lane rendering. Only takes effect when the document
    /// actually declares more than one lane.
    pub lane_mode: bool,
    /// Duration connectors shorter than this are not drawn.
    pub min_connector_height: f32,
    /// Subtracted from lane connector heights to meet the event anchor.
    pub lane_anchor_adjust: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            lane_mode: false,
            min_connector_height: 12.0,
            lane_anchor_adjust: 8.0,
        }
    }
}

/// Per-event vertical geometry supplied by the render collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Measurements {
    /// Top offset of each rendered event, indexed like `LayoutResult::order`.
    pub offsets: Vec<f32>,
    /// Bottom edge of the last rendered item.
    pub content_bottom: f32,
}

/// Vertical span of a duration connector, anchored at the sorted index of
/// the event that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationConnector {
    pub event_index: usize,
    pub top: f32,
    pub bottom: f32,
}

impl DurationConnector {
    #[must_use]
    pub fn height(self) -> f32 {
        self.bottom - self.top
    }
}

/// Connector between consecutive events sharing a lane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneConnector {
    pub event_index: usize,
    pub lane_index: usize,
    pub height: f32,
}

/// Phase B output. Rebuilt from scratch on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConnectorLayout {
    pub duration: Vec<DurationConnector>,
    pub lane: Vec<LaneConnector>,
}

/// Phase A: sort events, assign lanes, and place the today marker.
///
/// Ties on equal dates keep original parse order; in lane mode the lane
/// declaration index becomes the secondary key. `today` is a parameter
/// rather than a clock read so callers and tests control it.
#[must_use]
pub fn compute_order(events: &[Event], options: &LayoutOptions, today: NaiveDate) -> LayoutResult {
    let lanes = collect_lanes(events);
    let lane_index: BTreeMap<String, usize> = lanes
        .iter()
        .enumerate()
        .map(|(index, lane)| (lane.clone(), index))
        .collect();

    // A single-lane document is always rendered linearly, even when the
    // caller asked for lanes.
    let lane_mode_active = options.lane_mode && lanes.len() > 1;

    let mut order: Vec<Event> = events.to_vec();
    if lane_mode_active {
        order.sort_by_key(|event| (event.date, lane_index.get(&event.lane).copied()));
    } else {
        order.sort_by_key(|event| event.date);
    }

    let today_insert_index = today_marker_index(&order, today);

    debug!(
        events = order.len(),
        lanes = lanes.len(),
        lane_mode_active,
        today_insert_index,
        "computed event order"
    );

    LayoutResult {
        order,
        lanes,
        lane_index,
        today_insert_index,
        lane_mode_active,
    }
}

/// Distinct lane names in first-seen document order.
fn collect_lanes(events: &[Event]) -> Vec<String> {
    let mut lanes: Vec<String> = Vec::new();
    for event in events {
        if !lanes.contains(&event.lane) {
            lanes.push(event.lane.clone());
        }
    }
    lanes
}

/// First sorted position whose midnight-normalized date is `>= today`,
/// skipping sentinel-dated events; end of list when none qualifies.
fn today_marker_index(order: &[Event], today: NaiveDate) -> usize {
    order
        .iter()
        .position(|event| event.has_valid_date() && normalize_to_midnight(event.date) >= today)
        .unwrap_or(order.len())
}

/// Phase B: resolve connector geometry from rendered measurements.
///
/// Degenerate inputs (no events, all sentinel dates, measurement count not
/// matching the order) produce empty connector sets rather than errors.
#[must_use]
pub fn compute_connectors(
    layout: &LayoutResult,
    measurements: &Measurements,
    options: &LayoutOptions,
) -> ConnectorLayout {
    if measurements.offsets.len() != layout.order.len() {
        debug!(
            expected = layout.order.len(),
            got = measurements.offsets.len(),
            "measurement count mismatch; skipping connectors"
        );
        return ConnectorLayout::default();
    }

    let duration = duration_connectors(layout, measurements, options);
    let lane = if layout.lane_mode_active {
        lane_connectors(layout, measurements, options)
    } else {
        Vec::new()
    };

    debug!(
        duration = duration.len(),
        lane = lane.len(),
        "computed connector geometry"
    );

    ConnectorLayout { duration, lane }
}

fn duration_connectors(
    layout: &LayoutResult,
    measurements: &Measurements,
    options: &LayoutOptions,
) -> Vec<DurationConnector> {
    let mut connectors = Vec::new();

    for (index, event) in layout.order.iter().enumerate() {
        if !event.is_duration() {
            continue;
        }
        let Some(end_date) = event.end_date else {
            continue;
        };

        // First later event that has reached the end date bounds the span;
        // otherwise the connector runs to the bottom of the content.
        let bottom = layout.order[index + 1..]
            .iter()
            .position(|later| later.date >= end_date)
            .map_or(measurements.content_bottom, |found| {
                measurements.offsets[index + 1 + found]
            });

        let connector = DurationConnector {
            event_index: index,
            top: measurements.offsets[index],
            bottom,
        };
        if connector.height() >= options.min_connector_height {
            connectors.push(connector);
        }
    }

    connectors
}

fn lane_connectors(
    layout: &LayoutResult,
    measurements: &Measurements,
    options: &LayoutOptions,
) -> Vec<LaneConnector> {
    let mut connectors = Vec::new();

    for (index, event) in layout.order.iter().enumerate() {
        let Some(&lane_index) = layout.lane_index.get(&event.lane) else {
            continue;
        };
        // The last event in a lane has no outgoing connector.
        let Some(next) = layout.order[index + 1..]
            .iter()
            .position(|later| later.lane == event.lane)
        else {
            continue;
        };
        let next_offset = measurements.offsets[index + 1 + next];
        let height = next_offset - measurements.offsets[index] - options.lane_anchor_adjust;
        if height > 0.0 {
            connectors.push(LaneConnector {
                event_index: index,
                lane_index,
                height,
            });
        }
    }

    connectors
}
