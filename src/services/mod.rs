// Service module exports
// SQLite services per table, stores, reconciliation and session state

pub mod config;
pub mod database;
pub mod day;
pub mod event;
pub mod group;
pub mod map;
pub mod roster;
pub mod schedule;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod style;
pub mod trip;
