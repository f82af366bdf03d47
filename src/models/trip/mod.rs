// Trip module
// Top-level itinerary container

use std::fmt;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(pub i64);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TripId> for i64 {
    fn from(id: TripId) -> Self {
        id.0
    }
}

/// A persisted trip. Owns its days and groups; deleting it deletes both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: TripId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Local>>,
}

impl Trip {
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.title, self.start_date, self.end_date)
    }

    /// Number of calendar days covered by the date range, inclusive.
    pub fn length_in_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Input for creating a trip; the store assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDraft {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl TripDraft {
    pub fn new(title: impl Into<String>, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            start_date,
            end_date,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_fields(&self.title, self.start_date, self.end_date)
    }
}

fn validate_fields(title: &str, start: NaiveDate, end: NaiveDate) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Trip title cannot be empty".to_string());
    }

    if end < start {
        return Err("Trip end date must not be before its start date".to_string());
    }

    Ok(())
}
