//! Loading and saving `AppConfig` as TOML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;

use crate::models::settings::AppConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "Itinerary", "Itinerary")
}

/// `config.toml` in the platform config directory.
pub fn default_config_path() -> Result<PathBuf> {
    let dirs = project_dirs().ok_or_else(|| anyhow!("Could not determine the config directory"))?;
    Ok(dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the config from its default location, with environment overrides.
pub fn load() -> Result<AppConfig> {
    let path = default_config_path()?;
    load_from(&path)
}

/// Load a config file. A missing file yields the defaults; environment
/// variables override the Supabase credentials either way.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let mut config: AppConfig = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?
    } else {
        log::info!("No config at {}, using defaults", path.display());
        AppConfig::default()
    };

    apply_env_overrides(&mut config);
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

pub fn save_to(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

fn apply_env_overrides(config: &mut AppConfig) {
    if let Some(url) = non_empty_env(SUPABASE_URL_ENV) {
        config.supabase.url = Some(url);
    }
    if let Some(key) = non_empty_env(SUPABASE_ANON_KEY_ENV) {
        config.supabase.anon_key = Some(key);
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
