use std::time::Duration;

use anyhow::{anyhow, Context};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use super::ItineraryStore;
use crate::error::{ItineraryError, RecordKind, StoreResult};
use crate::models::day::{next_day_number, Day, DayDraft, DayId};
use crate::models::event::{Event, EventDraft, EventId};
use crate::models::group::{Group, GroupDraft, GroupId};
use crate::models::settings::SupabaseSettings;
use crate::models::trip::{Trip, TripDraft, TripId};

const TRIPS: &str = "trips";
const GROUPS: &str = "groups";
const DAYS: &str = "days";
const EVENTS: &str = "events";

/// [`ItineraryStore`] over a Supabase project's PostgREST endpoint.
///
/// The blocking client must be created and dropped outside an async context.
/// Requests give up after the configured storage timeout.
pub struct SupabaseStore {
    client: Client,
    timeout: Duration,
    base_url: String,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(settings: &SupabaseSettings, timeout: Duration) -> StoreResult<Self> {
        let (Some(url), Some(anon_key)) = (settings.url.as_deref(), settings.anon_key.as_deref())
        else {
            return Err(ItineraryError::StorageFailure(anyhow!(
                "Supabase url and anon key must both be configured"
            )));
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build Supabase HTTP client")
            .map_err(ItineraryError::StorageFailure)?;

        Ok(Self {
            client,
            timeout,
            base_url: url.trim().trim_end_matches('/').to_string(),
            anon_key: anon_key.trim().to_string(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("Prefer", "return=representation")
    }

    fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> StoreResult<Vec<T>> {
        let response = builder
            .send()
            .with_context(|| format!("Network error during {}", what))
            .map_err(ItineraryError::StorageFailure)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ItineraryError::StorageFailure(anyhow!(
                "{} failed with HTTP status {}: {}",
                what,
                status,
                body
            )));
        }

        response
            .json::<Vec<T>>()
            .with_context(|| format!("Unexpected response body for {}", what))
            .map_err(ItineraryError::StorageFailure)
    }

    fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filter: (&str, String),
        order: &str,
    ) -> StoreResult<Vec<T>> {
        let builder = self
            .request(Method::GET, table)
            .query(&[("select", "*".to_string()), (filter.0, filter.1), ("order", order.to_string())]);
        self.send(builder, &format!("select from {}", table))
    }

    fn insert<T: DeserializeOwned, B: Serialize>(&self, table: &str, body: &B) -> StoreResult<T> {
        let builder = self.request(Method::POST, table).json(&[body]);
        let rows = self.send::<T>(builder, &format!("insert into {}", table))?;
        rows.into_iter().next().ok_or_else(|| {
            ItineraryError::StorageFailure(anyhow!("insert into {} returned no row", table))
        })
    }

    fn patch<T: DeserializeOwned>(
        &self,
        table: &str,
        kind: RecordKind,
        id: i64,
        body: Value,
    ) -> StoreResult<T> {
        let builder = self
            .request(Method::PATCH, table)
            .query(&[("id", eq(id))])
            .json(&body);
        let rows = self.send::<T>(builder, &format!("update of {}", table))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ItineraryError::not_found(kind, id))
    }

    fn remove(&self, table: &str, kind: RecordKind, id: i64) -> StoreResult<()> {
        let builder = self.request(Method::DELETE, table).query(&[("id", eq(id))]);
        let rows = self.send::<Value>(builder, &format!("delete from {}", table))?;
        if rows.is_empty() {
            return Err(ItineraryError::not_found(kind, id));
        }
        Ok(())
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

fn trip_patch(trip: &Trip) -> Value {
    json!({
        "title": trip.title.trim(),
        "start_date": trip.start_date,
        "end_date": trip.end_date,
    })
}

fn group_patch(group: &Group) -> Value {
    json!({
        "name": group.name.trim(),
        "color": group.color,
        "order_index": group.order_index,
    })
}

fn day_patch(day: &Day) -> Value {
    json!({
        "day_number": day.day_number,
        "date": day.date_label,
        "title": day.title.trim(),
        "theme": day.theme,
        "is_split": day.is_split,
    })
}

fn event_patch(event: &Event) -> Value {
    json!({
        "day_id": event.day_id,
        "group_id": event.group_id,
        "time": event.time,
        "title": event.title.trim(),
        "description": event.description,
        "location": event.location,
        "type": event.category,
        "order_index": event.order_index,
    })
}

fn validation<E: ToString>(kind: RecordKind) -> impl FnOnce(E) -> ItineraryError {
    move |err| ItineraryError::validation(kind, err.to_string())
}

impl ItineraryStore for SupabaseStore {
    fn get_trip(&self, id: TripId) -> StoreResult<Trip> {
        self.select::<Trip>(TRIPS, ("id", eq(id)), "id.asc")?
            .into_iter()
            .next()
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Trip, id))
    }

    fn create_trip(&self, draft: &TripDraft) -> StoreResult<Trip> {
        draft.validate().map_err(validation(RecordKind::Trip))?;
        self.insert(TRIPS, draft)
    }

    fn update_trip(&self, trip: &Trip) -> StoreResult<Trip> {
        trip.validate().map_err(validation(RecordKind::Trip))?;
        self.patch(TRIPS, RecordKind::Trip, trip.id.0, trip_patch(trip))
    }

    fn delete_trip(&self, id: TripId) -> StoreResult<()> {
        self.remove(TRIPS, RecordKind::Trip, id.0)
    }

    fn list_groups(&self, trip_id: TripId) -> StoreResult<Vec<Group>> {
        self.select(GROUPS, ("trip_id", eq(trip_id)), "order_index.asc,id.asc")
    }

    fn create_group(&self, draft: &GroupDraft) -> StoreResult<Group> {
        draft.validate().map_err(validation(RecordKind::Group))?;
        self.insert(GROUPS, draft)
    }

    fn update_group(&self, group: &Group) -> StoreResult<Group> {
        group.validate().map_err(validation(RecordKind::Group))?;
        self.patch(GROUPS, RecordKind::Group, group.id.0, group_patch(group))
    }

    fn delete_group(&self, id: GroupId) -> StoreResult<()> {
        let detach = self
            .request(Method::PATCH, EVENTS)
            .query(&[("group_id", eq(id))])
            .json(&json!({ "group_id": null }));
        let detached = self.send::<Value>(detach, "detach of group events")?;
        if !detached.is_empty() {
            log::info!("Detached {} event(s) from removed group {}", detached.len(), id);
        }

        self.remove(GROUPS, RecordKind::Group, id.0)
    }

    fn list_days(&self, trip_id: TripId) -> StoreResult<Vec<Day>> {
        self.select(DAYS, ("trip_id", eq(trip_id)), "day_number.asc,id.asc")
    }

    fn create_day(&self, draft: &DayDraft) -> StoreResult<Day> {
        draft.validate().map_err(validation(RecordKind::Day))?;
        let mut draft = draft.clone();
        if draft.day_number.is_none() {
            let days = self.list_days(draft.trip_id)?;
            draft.day_number = Some(next_day_number(&days));
        }
        self.insert(DAYS, &draft)
    }

    fn update_day(&self, day: &Day) -> StoreResult<Day> {
        day.validate().map_err(validation(RecordKind::Day))?;
        self.patch(DAYS, RecordKind::Day, day.id.0, day_patch(day))
    }

    fn delete_day(&self, id: DayId) -> StoreResult<()> {
        self.remove(DAYS, RecordKind::Day, id.0)
    }

    fn list_events_for_day(&self, day_id: DayId) -> StoreResult<Vec<Event>> {
        self.select(EVENTS, ("day_id", eq(day_id)), "order_index.asc,id.asc")
    }

    fn list_events_for_trip(&self, trip_id: TripId) -> StoreResult<Vec<Event>> {
        self.select(
            EVENTS,
            ("trip_id", eq(trip_id)),
            "day_id.asc,order_index.asc,id.asc",
        )
    }

    fn create_event(&self, draft: &EventDraft) -> StoreResult<Event> {
        draft.validate().map_err(validation(RecordKind::Event))?;
        let mut draft = draft.clone();
        if draft.order_index.is_none() {
            let next = self
                .list_events_for_day(draft.day_id)?
                .iter()
                .map(|event| event.order_index)
                .max()
                .map_or(0, |max| max + 1);
            draft.order_index = Some(next);
        }
        self.insert(EVENTS, &draft)
    }

    fn update_event(&self, event: &Event) -> StoreResult<Event> {
        event.validate().map_err(validation(RecordKind::Event))?;
        self.patch(EVENTS, RecordKind::Event, event.id.0, event_patch(event))
    }

    fn delete_event(&self, id: EventId) -> StoreResult<()> {
        self.remove(EVENTS, RecordKind::Event, id.0)
    }
}
