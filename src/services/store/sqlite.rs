use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;

use super::ItineraryStore;
use crate::error::{ItineraryError, RecordKind, StoreResult};
use crate::models::day::{Day, DayDraft, DayId};
use crate::models::event::{Event, EventDraft, EventId};
use crate::models::group::{Group, GroupDraft, GroupId};
use crate::models::trip::{Trip, TripDraft, TripId};
use crate::services::database::Database;
use crate::services::day::DayService;
use crate::services::event::EventService;
use crate::services::group::GroupService;
use crate::services::trip::TripService;

/// [`ItineraryStore`] over a local SQLite file.
pub struct SqliteStore {
    db: Mutex<Database>,
}

impl SqliteStore {
    /// Open (or create) the database file and bring its schema up to date.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::new(&path.to_string_lossy()).map_err(ItineraryError::from_storage)?;
        db.initialize_schema()
            .map_err(ItineraryError::from_storage)?;
        Ok(Self::from_database(db))
    }

    pub fn in_memory() -> StoreResult<Self> {
        let db = Database::in_memory().map_err(ItineraryError::from_storage)?;
        Ok(Self::from_database(db))
    }

    pub fn from_database(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }

    fn db(&self) -> StoreResult<MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| ItineraryError::StorageFailure(anyhow!("database lock poisoned")))
    }
}

impl ItineraryStore for SqliteStore {
    fn get_trip(&self, id: TripId) -> StoreResult<Trip> {
        let db = self.db()?;
        TripService::new(db.connection())
            .get(id)
            .map_err(ItineraryError::from_storage)?
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Trip, id))
    }

    fn create_trip(&self, draft: &TripDraft) -> StoreResult<Trip> {
        let db = self.db()?;
        TripService::new(db.connection())
            .create(draft)
            .map_err(ItineraryError::from_storage)
    }

    fn update_trip(&self, trip: &Trip) -> StoreResult<Trip> {
        let db = self.db()?;
        TripService::new(db.connection())
            .update(trip)
            .map_err(ItineraryError::from_storage)
    }

    fn delete_trip(&self, id: TripId) -> StoreResult<()> {
        let db = self.db()?;
        TripService::new(db.connection())
            .delete(id)
            .map_err(ItineraryError::from_storage)
    }

    fn list_groups(&self, trip_id: TripId) -> StoreResult<Vec<Group>> {
        let db = self.db()?;
        GroupService::new(db.connection())
            .list_by_trip(trip_id)
            .map_err(ItineraryError::from_storage)
    }

    fn create_group(&self, draft: &GroupDraft) -> StoreResult<Group> {
        let db = self.db()?;
        GroupService::new(db.connection())
            .create(draft)
            .map_err(ItineraryError::from_storage)
    }

    fn update_group(&self, group: &Group) -> StoreResult<Group> {
        let db = self.db()?;
        GroupService::new(db.connection())
            .update(group)
            .map_err(ItineraryError::from_storage)
    }

    fn delete_group(&self, id: GroupId) -> StoreResult<()> {
        let db = self.db()?;
        GroupService::new(db.connection())
            .delete(id)
            .map_err(ItineraryError::from_storage)
    }

    fn list_days(&self, trip_id: TripId) -> StoreResult<Vec<Day>> {
        let db = self.db()?;
        DayService::new(db.connection())
            .list_by_trip(trip_id)
            .map_err(ItineraryError::from_storage)
    }

    fn create_day(&self, draft: &DayDraft) -> StoreResult<Day> {
        let db = self.db()?;
        DayService::new(db.connection())
            .create(draft)
            .map_err(ItineraryError::from_storage)
    }

    fn update_day(&self, day: &Day) -> StoreResult<Day> {
        let db = self.db()?;
        DayService::new(db.connection())
            .update(day)
            .map_err(ItineraryError::from_storage)
    }

    fn delete_day(&self, id: DayId) -> StoreResult<()> {
        let db = self.db()?;
        DayService::new(db.connection())
            .delete(id)
            .map_err(ItineraryError::from_storage)
    }

    fn list_events_for_day(&self, day_id: DayId) -> StoreResult<Vec<Event>> {
        let db = self.db()?;
        EventService::new(db.connection())
            .list_by_day(day_id)
            .map_err(ItineraryError::from_storage)
    }

    fn list_events_for_trip(&self, trip_id: TripId) -> StoreResult<Vec<Event>> {
        let db = self.db()?;
        EventService::new(db.connection())
            .list_by_trip(trip_id)
            .map_err(ItineraryError::from_storage)
    }

    fn create_event(&self, draft: &EventDraft) -> StoreResult<Event> {
        let db = self.db()?;
        EventService::new(db.connection())
            .create(draft)
            .map_err(ItineraryError::from_storage)
    }

    fn update_event(&self, event: &Event) -> StoreResult<Event> {
        let db = self.db()?;
        EventService::new(db.connection())
            .update(event)
            .map_err(ItineraryError::from_storage)
    }

    fn delete_event(&self, id: EventId) -> StoreResult<()> {
        let db = self.db()?;
        EventService::new(db.connection())
            .delete(id)
            .map_err(ItineraryError::from_storage)
    }
}
