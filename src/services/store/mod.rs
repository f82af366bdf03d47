//! Persistence boundary.
//!
//! [`ItineraryStore`] is the only thing the session layer knows about storage.
//! Calls are blocking; the session runs them off the async executor and
//! bounds them with a timeout. Every method returns the record as the store
//! persisted it (server ids and timestamps included).

mod sqlite;
mod supabase;

pub use sqlite::SqliteStore;
pub use supabase::SupabaseStore;

use std::path::PathBuf;

use anyhow::Context;

use crate::error::{ItineraryError, StoreResult};
use crate::models::day::{Day, DayDraft, DayId};
use crate::models::event::{Event, EventDraft, EventId};
use crate::models::group::{Group, GroupDraft, GroupId};
use crate::models::settings::{AppConfig, StorageBackend};
use crate::models::trip::{Trip, TripDraft, TripId};
use crate::services::snapshot::TripSnapshot;

#[cfg_attr(test, mockall::automock)]
pub trait ItineraryStore: Send + Sync {
    fn get_trip(&self, id: TripId) -> StoreResult<Trip>;
    fn create_trip(&self, draft: &TripDraft) -> StoreResult<Trip>;
    fn update_trip(&self, trip: &Trip) -> StoreResult<Trip>;
    fn delete_trip(&self, id: TripId) -> StoreResult<()>;

    /// Roster in `order_index` order.
    fn list_groups(&self, trip_id: TripId) -> StoreResult<Vec<Group>>;
    fn create_group(&self, draft: &GroupDraft) -> StoreResult<Group>;
    fn update_group(&self, group: &Group) -> StoreResult<Group>;
    /// Must leave no event referencing the removed group.
    fn delete_group(&self, id: GroupId) -> StoreResult<()>;

    /// Days in `day_number` order.
    fn list_days(&self, trip_id: TripId) -> StoreResult<Vec<Day>>;
    fn create_day(&self, draft: &DayDraft) -> StoreResult<Day>;
    fn update_day(&self, day: &Day) -> StoreResult<Day>;
    fn delete_day(&self, id: DayId) -> StoreResult<()>;

    fn list_events_for_day(&self, day_id: DayId) -> StoreResult<Vec<Event>>;
    fn list_events_for_trip(&self, trip_id: TripId) -> StoreResult<Vec<Event>>;
    fn create_event(&self, draft: &EventDraft) -> StoreResult<Event>;
    fn update_event(&self, event: &Event) -> StoreResult<Event>;
    fn delete_event(&self, id: EventId) -> StoreResult<()>;
}

/// Read a whole trip (trip, roster, days, events) into one snapshot.
pub fn load_trip(store: &dyn ItineraryStore, trip_id: TripId) -> StoreResult<TripSnapshot> {
    let trip = store.get_trip(trip_id)?;
    let groups = store.list_groups(trip_id)?;
    let days = store.list_days(trip_id)?;
    let events = store.list_events_for_trip(trip_id)?;

    log::info!(
        "Loaded trip {} ({} groups, {} days, {} events)",
        trip_id,
        groups.len(),
        days.len(),
        events.len()
    );

    Ok(TripSnapshot::new(trip, groups, days, events))
}

/// Open the store selected by the configuration.
pub fn open_store(config: &AppConfig) -> StoreResult<Box<dyn ItineraryStore>> {
    match config.storage.backend {
        StorageBackend::Sqlite => {
            let path = match &config.storage.database_path {
                Some(path) => path.clone(),
                None => default_database_path().map_err(ItineraryError::from_storage)?,
            };
            log::info!("Using SQLite store at {}", path.display());
            Ok(Box::new(SqliteStore::open(&path)?))
        }
        StorageBackend::Supabase => {
            log::info!(
                "Using Supabase store at {}",
                config.supabase.url.as_deref().unwrap_or_default()
            );
            Ok(Box::new(SupabaseStore::new(
                &config.supabase,
                config.storage.timeout(),
            )?))
        }
    }
}

fn default_database_path() -> anyhow::Result<PathBuf> {
    let dirs = crate::services::config::project_dirs()
        .context("Could not determine the data directory")?;
    let data_dir = dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    Ok(data_dir.join("itinerary.db"))
}
