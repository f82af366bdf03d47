//! An open trip: the published snapshot plus the store it syncs with.
//!
//! Mutations are serialized by an async mutex. Each one is applied to the
//! snapshot first, then persisted on a blocking task bounded by a timeout.
//! On success the provisional record is swapped for the persisted one; on
//! failure or timeout the snapshot that was current before the mutation is
//! published again and the error is returned.
//!
//! A timed-out store call cannot be cancelled and may still complete; the
//! next [`TripSession::refresh`] picks up whatever it wrote.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use crate::error::{ItineraryError, RecordKind, StoreResult};
use crate::models::day::{next_day_number, Day, DayDraft, DayId};
use crate::models::event::{Event, EventDraft, EventId};
use crate::models::group::{Group, GroupDraft, GroupId};
use crate::models::palette::PaletteColor;
use crate::models::settings::{AppConfig, DEFAULT_STORAGE_TIMEOUT_MS};
use crate::models::timeline::{DayTimeline, TripTimeline};
use crate::models::trip::{Trip, TripId};
use crate::services::roster::RosterManager;
use crate::services::schedule::{self, ReconcileOptions};
use crate::services::snapshot::{SnapshotCell, TripSnapshot};
use crate::services::store::{load_trip, ItineraryStore};

/// Knobs for a session, normally taken from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub timeout: Duration,
    pub palette: Vec<PaletteColor>,
    pub reconcile: ReconcileOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_STORAGE_TIMEOUT_MS),
            palette: PaletteColor::ALL.to_vec(),
            reconcile: ReconcileOptions::default(),
        }
    }
}

impl From<&AppConfig> for SessionOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: config.storage.timeout(),
            palette: config.roster.effective_palette(),
            reconcile: ReconcileOptions {
                sort_chronologically: config.display.sort_chronologically,
            },
        }
    }
}

pub struct TripSession {
    store: Arc<dyn ItineraryStore>,
    trip_id: TripId,
    cell: Arc<SnapshotCell>,
    roster: RosterManager,
    mutation: Mutex<()>,
    options: SessionOptions,
}

impl TripSession {
    /// Load a trip from the store and open a session on it.
    pub async fn load(
        store: Arc<dyn ItineraryStore>,
        trip_id: TripId,
        options: SessionOptions,
    ) -> StoreResult<Self> {
        let snapshot = run_store(&store, options.timeout, move |store| load_trip(store, trip_id)).await?;

        let cell = Arc::new(SnapshotCell::new(snapshot));
        let roster = RosterManager::new(Arc::clone(&cell), options.palette.clone());

        Ok(Self {
            store,
            trip_id,
            cell,
            roster,
            mutation: Mutex::new(()),
            options,
        })
    }

    /// Re-read the whole trip and publish it.
    pub async fn refresh(&self) -> StoreResult<()> {
        let _guard = self.mutation.lock().await;
        let trip_id = self.trip_id;
        let snapshot = self.persist(move |store| load_trip(store, trip_id)).await?;
        self.cell.store(Arc::new(snapshot));
        Ok(())
    }

    pub fn snapshot(&self) -> Arc<TripSnapshot> {
        self.cell.load()
    }

    pub fn timeline(&self) -> TripTimeline {
        schedule::reconcile_trip(&self.snapshot(), self.options.reconcile)
    }

    pub fn day_timeline(&self, day_id: DayId) -> Option<DayTimeline> {
        let snapshot = self.snapshot();
        let day = snapshot.day(day_id)?;
        Some(schedule::reconcile_snapshot_day(
            &snapshot,
            day,
            self.options.reconcile,
        ))
    }

    pub async fn add_group(&self, name: &str) -> StoreResult<Group> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        let provisional = self.roster.add(name)?;
        let draft = GroupDraft::from(&provisional);

        match self.persist(move |store| store.create_group(&draft)).await {
            Ok(persisted) => {
                self.roster.confirm(provisional.id, persisted.clone())?;
                log::info!("Added group '{}' ({})", persisted.name, persisted.id);
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "add group", err)),
        }
    }

    pub async fn rename_group(&self, id: GroupId, name: &str) -> StoreResult<Group> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        let renamed = self.roster.rename(id, name)?;
        match self.persist(move |store| store.update_group(&renamed)).await {
            Ok(persisted) => {
                self.roster.confirm(id, persisted.clone())?;
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "rename group", err)),
        }
    }

    /// Remove a group. Its events stay on the itinerary as shared events.
    pub async fn remove_group(&self, id: GroupId) -> StoreResult<()> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        let removed = self.roster.remove(id)?;
        match self.persist(move |store| store.delete_group(id)).await {
            Ok(()) => {
                log::info!("Removed group '{}' ({})", removed.name, id);
                Ok(())
            }
            Err(err) => Err(self.roll_back(known_good, "remove group", err)),
        }
    }

    /// Add a day. Without an explicit number it goes after the last day.
    pub async fn add_day(&self, mut draft: DayDraft) -> StoreResult<Day> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        draft.trip_id = self.trip_id;
        let provisional = self.cell.update(|snapshot| {
            let day_number = draft
                .day_number
                .unwrap_or_else(|| next_day_number(&snapshot.days));
            draft.day_number = Some(day_number);
            draft
                .validate()
                .map_err(|e| ItineraryError::validation(RecordKind::Day, e))?;

            let day = Day {
                id: DayId(snapshot.provisional_id()),
                trip_id: draft.trip_id,
                day_number,
                date_label: draft.date_label.clone(),
                title: draft.title.trim().to_string(),
                theme: draft.theme,
                is_split: draft.is_split,
                created_at: None,
                updated_at: None,
            };
            snapshot.upsert_day(day.clone());
            Ok(day)
        })?;

        match self.persist(move |store| store.create_day(&draft)).await {
            Ok(persisted) => {
                self.cell.update(|snapshot| {
                    snapshot.confirm_day(provisional.id, persisted.clone());
                    Ok(())
                })?;
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "add day", err)),
        }
    }

    pub async fn update_day(&self, day: Day) -> StoreResult<Day> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        self.cell.update(|snapshot| {
            if snapshot.day(day.id).is_none() {
                return Err(ItineraryError::not_found(RecordKind::Day, day.id));
            }
            day.validate()
                .map_err(|e| ItineraryError::validation(RecordKind::Day, e))?;
            snapshot.upsert_day(day.clone());
            Ok(())
        })?;

        match self.persist(move |store| store.update_day(&day)).await {
            Ok(persisted) => {
                self.cell.update(|snapshot| {
                    snapshot.upsert_day(persisted.clone());
                    Ok(())
                })?;
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "update day", err)),
        }
    }

    /// Delete a day and its events. Remaining days keep their numbers.
    pub async fn delete_day(&self, id: DayId) -> StoreResult<()> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        self.cell.update(|snapshot| snapshot.remove_day(id))?;
        match self.persist(move |store| store.delete_day(id)).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.roll_back(known_good, "delete day", err)),
        }
    }

    pub async fn add_event(&self, mut draft: EventDraft) -> StoreResult<Event> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        draft.trip_id = self.trip_id;
        let provisional = self.cell.update(|snapshot| {
            check_event_refs(snapshot, draft.day_id, draft.group_id)?;
            draft
                .validate()
                .map_err(|e| ItineraryError::validation(RecordKind::Event, e))?;

            let order_index = draft
                .order_index
                .unwrap_or_else(|| snapshot.next_order_index(draft.day_id));
            draft.order_index = Some(order_index);

            let event = Event {
                id: EventId(snapshot.provisional_id()),
                day_id: draft.day_id,
                trip_id: draft.trip_id,
                group_id: draft.group_id,
                time: draft.time.clone(),
                title: draft.title.trim().to_string(),
                description: draft.description.clone(),
                location: draft.location.clone(),
                category: draft.category,
                order_index,
                created_at: None,
                updated_at: None,
            };
            snapshot.upsert_event(event.clone());
            Ok(event)
        })?;

        match self.persist(move |store| store.create_event(&draft)).await {
            Ok(persisted) => {
                self.cell.update(|snapshot| {
                    snapshot.confirm_event(provisional.id, persisted.clone());
                    Ok(())
                })?;
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "add event", err)),
        }
    }

    pub async fn update_event(&self, event: Event) -> StoreResult<Event> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        self.cell.update(|snapshot| {
            if snapshot.event(event.id).is_none() {
                return Err(ItineraryError::not_found(RecordKind::Event, event.id));
            }
            check_event_refs(snapshot, event.day_id, event.group_id)?;
            event
                .validate()
                .map_err(|e| ItineraryError::validation(RecordKind::Event, e))?;
            snapshot.upsert_event(event.clone());
            Ok(())
        })?;

        match self.persist(move |store| store.update_event(&event)).await {
            Ok(persisted) => {
                self.cell.update(|snapshot| {
                    snapshot.upsert_event(persisted.clone());
                    Ok(())
                })?;
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "update event", err)),
        }
    }

    pub async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        self.cell.update(|snapshot| snapshot.remove_event(id))?;
        match self.persist(move |store| store.delete_event(id)).await {
            Ok(()) => Ok(()),
            Err(err) => Err(self.roll_back(known_good, "delete event", err)),
        }
    }

    pub async fn update_trip(&self, trip: Trip) -> StoreResult<Trip> {
        let _guard = self.mutation.lock().await;
        let known_good = self.cell.load();

        if trip.id != self.trip_id {
            return Err(ItineraryError::not_found(RecordKind::Trip, trip.id));
        }
        trip.validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Trip, e))?;
        self.cell.update(|snapshot| {
            snapshot.trip = trip.clone();
            Ok(())
        })?;

        match self.persist(move |store| store.update_trip(&trip)).await {
            Ok(persisted) => {
                self.cell.update(|snapshot| {
                    snapshot.trip = persisted.clone();
                    Ok(())
                })?;
                Ok(persisted)
            }
            Err(err) => Err(self.roll_back(known_good, "update trip", err)),
        }
    }

    async fn persist<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn ItineraryStore) -> StoreResult<T> + Send + 'static,
    {
        run_store(&self.store, self.options.timeout, op).await
    }

    fn roll_back(
        &self,
        known_good: Arc<TripSnapshot>,
        action: &str,
        err: ItineraryError,
    ) -> ItineraryError {
        log::warn!("Failed to {}: {}; rolling back", action, err);
        self.cell.store(known_good);
        err
    }
}

/// Run a blocking store call off the executor, bounded by `timeout`.
async fn run_store<T, F>(store: &Arc<dyn ItineraryStore>, timeout: Duration, op: F) -> StoreResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn ItineraryStore) -> StoreResult<T> + Send + 'static,
{
    let store = Arc::clone(store);
    let task = tokio::task::spawn_blocking(move || op(store.as_ref()));

    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(ItineraryError::StorageFailure(
            anyhow::Error::new(join_error).context("Storage task failed"),
        )),
        Err(_) => Err(ItineraryError::Timeout(timeout)),
    }
}

/// An event may only point at a day of this trip and a group in the roster.
fn check_event_refs(
    snapshot: &TripSnapshot,
    day_id: DayId,
    group_id: Option<GroupId>,
) -> StoreResult<()> {
    if snapshot.day(day_id).is_none() {
        return Err(ItineraryError::not_found(RecordKind::Day, day_id));
    }
    if let Some(group_id) = group_id {
        if snapshot.group(group_id).is_none() {
            return Err(ItineraryError::not_found(RecordKind::Group, group_id));
        }
    }
    Ok(())
}
