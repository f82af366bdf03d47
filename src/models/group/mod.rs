//! Traveler groups.
//!
//! A group is a named cohort that follows its own agenda on split days.
//! Events reference groups optionally; an event without a group applies to
//! everyone in that time slot.

use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::palette::PaletteColor;
use crate::models::trip::TripId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<GroupId> for i64 {
    fn from(id: GroupId) -> Self {
        id.0
    }
}

/// Maximum length of a group's display name.
pub const MAX_GROUP_NAME_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub trip_id: TripId,
    pub name: String,
    pub color: PaletteColor,
    /// Creation order; roster order follows it.
    pub order_index: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Local>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Local>>,
}

impl Group {
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        validate_name(&self.name)
    }
}

/// Input for creating a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDraft {
    pub trip_id: TripId,
    pub name: String,
    pub color: PaletteColor,
    pub order_index: i64,
}

impl GroupDraft {
    pub fn validate(&self) -> Result<(), GroupValidationError> {
        validate_name(&self.name)
    }
}

impl From<&Group> for GroupDraft {
    fn from(group: &Group) -> Self {
        Self {
            trip_id: group.trip_id,
            name: group.name.clone(),
            color: group.color,
            order_index: group.order_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupValidationError {
    EmptyName,
    NameTooLong,
}

impl fmt::Display for GroupValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Group name cannot be empty"),
            Self::NameTooLong => write!(
                f,
                "Group name must be {} characters or less",
                MAX_GROUP_NAME_LEN
            ),
        }
    }
}

impl std::error::Error for GroupValidationError {}

fn validate_name(name: &str) -> Result<(), GroupValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(GroupValidationError::EmptyName);
    }
    if name.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(GroupValidationError::NameTooLong);
    }
    Ok(())
}
