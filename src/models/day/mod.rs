// Day module
// One calendar day of a trip

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::palette::PaletteColor;
use crate::models::trip::TripId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayId(pub i64);

impl fmt::Display for DayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DayId> for i64 {
    fn from(id: DayId) -> Self {
        id.0
    }
}

/// Theme used for days created without an explicit one.
pub const DEFAULT_DAY_THEME: PaletteColor = PaletteColor::Green;

/// Day themes fall back to green rather than the group default.
pub fn theme_from_token(token: &str) -> PaletteColor {
    PaletteColor::from_token_or(token, DEFAULT_DAY_THEME)
}

fn deserialize_theme<'de, D>(deserializer: D) -> Result<PaletteColor, D::Error>
where
    D: Deserializer<'de>,
{
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(token.as_deref().map_or(DEFAULT_DAY_THEME, theme_from_token))
}

/// A persisted day. `day_number` orders days for display; numbers are not
/// compacted when a sibling is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub id: DayId,
    pub trip_id: TripId,
    pub day_number: u32,
    #[serde(rename = "date")]
    pub date_label: String,
    pub title: String,
    #[serde(default = "default_theme", deserialize_with = "deserialize_theme")]
    pub theme: PaletteColor,
    #[serde(default)]
    pub is_split: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Local>>,
}

impl Day {
    pub fn validate(&self) -> Result<(), String> {
        validate_fields(self.day_number, &self.title)
    }
}

/// Input for "add day". The sequence number is normally left unset so the
/// next free number is assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDraft {
    pub trip_id: TripId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_number: Option<u32>,
    #[serde(rename = "date")]
    pub date_label: String,
    pub title: String,
    #[serde(default = "default_theme", deserialize_with = "deserialize_theme")]
    pub theme: PaletteColor,
    pub is_split: bool,
}

impl DayDraft {
    pub fn new(trip_id: TripId, date_label: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            trip_id,
            day_number: None,
            date_label: date_label.into(),
            title: title.into(),
            theme: DEFAULT_DAY_THEME,
            is_split: false,
        }
    }

    pub fn theme(mut self, theme: PaletteColor) -> Self {
        self.theme = theme;
        self
    }

    pub fn split(mut self, is_split: bool) -> Self {
        self.is_split = is_split;
        self
    }

    pub fn day_number(mut self, day_number: u32) -> Self {
        self.day_number = Some(day_number);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        validate_fields(self.day_number.unwrap_or(1), &self.title)
    }
}

/// Next sequence number after the highest existing one. Gaps left by
/// deletions are never reused.
pub fn next_day_number<'a>(days: impl IntoIterator<Item = &'a Day>) -> u32 {
    days.into_iter()
        .map(|day| day.day_number)
        .max()
        .map_or(1, |max| max + 1)
}

fn default_theme() -> PaletteColor {
    DEFAULT_DAY_THEME
}

fn validate_fields(day_number: u32, title: &str) -> Result<(), String> {
    if day_number == 0 {
        return Err("Day numbers start at 1".to_string());
    }

    if title.trim().is_empty() {
        return Err("Day title cannot be empty".to_string());
    }

    Ok(())
}
