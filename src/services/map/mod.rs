//! Map search links for event locations.

use anyhow::{anyhow, Context, Result};

const MAP_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Search URL for a free-form location. Blank locations have no link.
pub fn map_search_url(location: &str) -> Option<String> {
    let location = location.trim();
    if location.is_empty() {
        return None;
    }
    Some(format!("{}{}", MAP_SEARCH_BASE, urlencoding::encode(location)))
}

/// Open the location in the system browser.
pub fn open_in_browser(location: &str) -> Result<()> {
    let url = map_search_url(location).ok_or_else(|| anyhow!("Location is empty"))?;
    log::info!("Opening map for '{}'", location.trim());
    webbrowser::open(&url).with_context(|| format!("Failed to open {}", url))?;
    Ok(())
}
