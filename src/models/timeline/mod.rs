//! Derived, never-persisted view of a trip's schedule.
//!
//! These values are rebuilt from the canonical trip/day/group/event records
//! on every read; see `services::schedule`.

use serde::Serialize;

use crate::models::day::Day;
use crate::models::event::Event;
use crate::models::group::GroupId;
use crate::models::palette::PaletteColor;

/// One group's events within a single time slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupColumn {
    pub group_id: GroupId,
    pub group_name: String,
    pub color: PaletteColor,
    pub events: Vec<Event>,
}

/// Every event of a day sharing one time label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSlot {
    pub time: String,
    /// Events without a group, rendered full-width above the columns.
    pub shared_events: Vec<Event>,
    /// Per-group columns in roster order. Groups with nothing in this slot
    /// are absent.
    pub group_columns: Vec<GroupColumn>,
}

impl TimeSlot {
    pub fn has_shared_events(&self) -> bool {
        !self.shared_events.is_empty()
    }

    pub fn has_grouped_events(&self) -> bool {
        !self.group_columns.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.group_columns.len()
    }

    pub fn event_count(&self) -> usize {
        self.shared_events.len()
            + self
                .group_columns
                .iter()
                .map(|column| column.events.len())
                .sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTimeline {
    pub day: Day,
    pub slots: Vec<TimeSlot>,
}

impl DayTimeline {
    pub fn max_columns(&self) -> usize {
        self.slots
            .iter()
            .map(TimeSlot::column_count)
            .max()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripTimeline {
    pub days: Vec<DayTimeline>,
    /// Uniform column count for the whole trip, already clamped.
    pub column_count: usize,
}

impl TripTimeline {
    pub fn day(&self, day_number: u32) -> Option<&DayTimeline> {
        self.days
            .iter()
            .find(|timeline| timeline.day.day_number == day_number)
    }
}
