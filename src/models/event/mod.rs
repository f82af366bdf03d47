// Event module
// Scheduled itinerary activity, optionally owned by a traveler group

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::day::DayId;
use crate::models::group::GroupId;
use crate::models::trip::TripId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EventId> for i64 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

/// Kind of activity, used by the rendering layer to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Transport,
    Food,
    Shopping,
    #[default]
    Sight,
    Fun,
    Stay,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        EventCategory::Transport,
        EventCategory::Food,
        EventCategory::Shopping,
        EventCategory::Sight,
        EventCategory::Fun,
        EventCategory::Stay,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Shopping => "shopping",
            Self::Sight => "sight",
            Self::Fun => "fun",
            Self::Stay => "stay",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.token().eq_ignore_ascii_case(token))
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A persisted itinerary event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub day_id: DayId,
    pub trip_id: TripId,
    /// `None` means the event applies to every group in its slot.
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Clock time (`HH:MM`) or a free-form slot label such as "Morning".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "type", default)]
    pub category: EventCategory,
    #[serde(default)]
    pub order_index: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Local>>,
}

impl Event {
    /// Whether the event is shown to all groups.
    pub fn is_shared(&self) -> bool {
        self.group_id.is_none()
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }

    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }
}

/// Input for "add event". Built through [`EventBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub day_id: DayId,
    pub trip_id: TripId,
    pub group_id: Option<GroupId>,
    pub time: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub category: EventCategory,
    /// Left unset to append after the day's last event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
}

impl EventDraft {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)
    }
}

/// Builder for event drafts with optional fields
pub struct EventBuilder {
    day_id: Option<DayId>,
    trip_id: Option<TripId>,
    group_id: Option<GroupId>,
    time: String,
    title: Option<String>,
    description: Option<String>,
    location: Option<String>,
    category: EventCategory,
    order_index: Option<i64>,
}

impl EventBuilder {
    pub fn new() -> Self {
        Self {
            day_id: None,
            trip_id: None,
            group_id: None,
            time: String::new(),
            title: None,
            description: None,
            location: None,
            category: EventCategory::default(),
            order_index: None,
        }
    }

    /// Attach the event to a day of a trip
    pub fn day(mut self, trip_id: TripId, day_id: DayId) -> Self {
        self.trip_id = Some(trip_id);
        self.day_id = Some(day_id);
        self
    }

    pub fn group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn category(mut self, category: EventCategory) -> Self {
        self.category = category;
        self
    }

    pub fn order_index(mut self, order_index: i64) -> Self {
        self.order_index = Some(order_index);
        self
    }

    pub fn build(self) -> Result<EventDraft, String> {
        let title = self.title.ok_or("Event title is required")?;
        let day_id = self.day_id.ok_or("Event day is required")?;
        let trip_id = self.trip_id.ok_or("Event trip is required")?;

        let draft = EventDraft {
            day_id,
            trip_id,
            group_id: self.group_id,
            time: self.time,
            title,
            description: self.description,
            location: self.location,
            category: self.category,
            order_index: self.order_index,
        };

        draft.validate()?;
        Ok(draft)
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Event title cannot be empty".to_string());
    }
    Ok(())
}

/// A missing or null time label becomes the empty-string slot.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
