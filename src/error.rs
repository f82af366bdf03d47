//! Error kinds surfaced by the itinerary core.
//!
//! Storage services work with `anyhow` internally; everything that crosses the
//! store boundary is converted into [`ItineraryError`] so callers can decide
//! between retrying, rolling back, or reporting.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::models::event::EventId;
use crate::models::group::GroupId;

/// Which kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Trip,
    Day,
    Group,
    Event,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Trip => "trip",
            Self::Day => "day",
            Self::Group => "group",
            Self::Event => "event",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ItineraryError {
    /// A mutation targeted a record that does not exist.
    #[error("{kind} with id {id} not found")]
    NotFound { kind: RecordKind, id: i64 },

    /// An event points at a group missing from the roster. Recovered locally
    /// and only ever logged.
    #[error("event {event_id} references unknown group {group_id}")]
    DataIntegrity { event_id: EventId, group_id: GroupId },

    #[error("invalid {kind}: {message}")]
    Validation { kind: RecordKind, message: String },

    #[error("storage request timed out after {0:?}")]
    Timeout(Duration),

    #[error("storage failure: {0:#}")]
    StorageFailure(#[source] anyhow::Error),
}

impl ItineraryError {
    pub fn not_found(kind: RecordKind, id: impl Into<i64>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(kind: RecordKind, message: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            message: message.into(),
        }
    }

    /// Convert an error coming out of a storage service. Typed errors raised
    /// inside the service (NotFound, Validation) are recovered from the chain.
    pub fn from_storage(err: anyhow::Error) -> Self {
        match err.downcast::<ItineraryError>() {
            Ok(typed) => typed,
            Err(other) => Self::StorageFailure(other),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type StoreResult<T> = std::result::Result<T, ItineraryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_not_found_message() {
        let err = ItineraryError::not_found(RecordKind::Group, 7);
        assert_eq!(err.to_string(), "group with id 7 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_from_storage_recovers_typed_error_through_context() {
        let inner: anyhow::Result<()> = Err(ItineraryError::not_found(RecordKind::Day, 3).into());
        let wrapped = inner.context("Failed to delete day").unwrap_err();

        let err = ItineraryError::from_storage(wrapped);
        assert!(matches!(
            err,
            ItineraryError::NotFound {
                kind: RecordKind::Day,
                id: 3
            }
        ));
    }

    #[test]
    fn test_from_storage_wraps_untyped_error() {
        let err = ItineraryError::from_storage(anyhow::anyhow!("disk full"));
        assert!(matches!(err, ItineraryError::StorageFailure(_)));
        assert_eq!(err.to_string(), "storage failure: disk full");
    }
}
