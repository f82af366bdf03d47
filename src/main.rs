// Trip itinerary command line entry point
// Loads one trip and prints its reconciled timeline as JSON

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use itinerary::models::settings::AppConfig;
use itinerary::models::trip::TripId;
use itinerary::services::config;
use itinerary::services::session::{SessionOptions, TripSession};
use itinerary::services::store::{self, ItineraryStore};
use itinerary::ItineraryError;

fn main() -> Result<()> {
    // The filter level lives in the config, so logging starts after the load
    // attempt. Anything the loader itself logs is dropped.
    let config = config::load();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(startup_log_level(&config)),
    )
    .init();

    let config = config.map_err(|err| {
        log::error!("Failed to load configuration: {:#}", err);
        err
    })?;
    log::info!("Starting itinerary");

    let trip_id = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: itinerary <trip-id>"))?
        .parse::<i64>()
        .map(TripId)
        .context("Trip id must be an integer")?;

    // Opened outside the runtime: the blocking HTTP client must not be
    // created or dropped on an async thread.
    let store: Arc<dyn ItineraryStore> = Arc::from(store::open_store(&config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let timeline = runtime.block_on(async {
        let session =
            TripSession::load(Arc::clone(&store), trip_id, SessionOptions::from(&config)).await?;
        Ok::<_, ItineraryError>(session.timeline())
    })?;

    println!(
        "{}",
        serde_json::to_string_pretty(&timeline).context("Failed to serialize timeline")?
    );
    Ok(())
}

fn startup_log_level(config: &Result<AppConfig>) -> String {
    match config {
        Ok(config) => config.log_level.clone(),
        Err(_) => "info".to_string(),
    }
}
