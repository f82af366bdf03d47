//! Trip-wide column count.

use crate::models::timeline::DayTimeline;

/// Fewest columns a trip layout uses, even when no day is split.
pub const MIN_TRIP_COLUMNS: usize = 2;
/// Most columns a trip layout uses; wider slots wrap.
pub const MAX_TRIP_COLUMNS: usize = 4;

/// Widest slot across every day, clamped to the layout bounds.
pub fn trip_column_count<'a>(days: impl IntoIterator<Item = &'a DayTimeline>) -> usize {
    let widest = days
        .into_iter()
        .map(DayTimeline::max_columns)
        .max()
        .unwrap_or(0);
    clamp_columns(widest)
}

pub fn clamp_columns(count: usize) -> usize {
    count.clamp(MIN_TRIP_COLUMNS, MAX_TRIP_COLUMNS)
}
