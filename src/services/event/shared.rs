use rusqlite::{self, Row};

use crate::models::day::DayId;
use crate::models::event::{Event, EventCategory, EventId};
use crate::models::group::GroupId;
use crate::models::trip::TripId;
use crate::services::database::shared::to_local_datetime;

pub(crate) const EVENT_COLUMNS: &str = "id, day_id, trip_id, group_id, time, title, description,
    location, category, order_index, created_at, updated_at";

pub(crate) fn map_event_row(row: &Row<'_>) -> Result<Event, rusqlite::Error> {
    let category: String = row.get(8)?;
    let category = EventCategory::from_token(&category).unwrap_or_else(|| {
        log::warn!("Unknown event category '{}', using default", category);
        EventCategory::default()
    });

    Ok(Event {
        id: EventId(row.get(0)?),
        day_id: DayId(row.get(1)?),
        trip_id: TripId(row.get(2)?),
        group_id: row.get::<_, Option<i64>>(3)?.map(GroupId),
        time: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        title: row.get(5)?,
        description: row.get(6)?,
        location: row.get(7)?,
        category,
        order_index: row.get(9)?,
        created_at: Some(to_local_datetime(row.get(10)?)?),
        updated_at: Some(to_local_datetime(row.get(11)?)?),
    })
}
