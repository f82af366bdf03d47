// Settings module
// Application configuration persisted as TOML

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::models::palette::PaletteColor;

/// Default timeout for a single storage round-trip.
pub const DEFAULT_STORAGE_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub storage: StorageSettings,
    pub supabase: SupabaseSettings,
    pub display: DisplaySettings,
    pub roster: RosterSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            storage: StorageSettings::default(),
            supabase: SupabaseSettings::default(),
            display: DisplaySettings::default(),
            roster: RosterSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.timeout_ms == 0 {
            return Err("storage.timeout_ms must be greater than zero".to_string());
        }

        if self.storage.backend == StorageBackend::Supabase && !self.supabase.is_configured() {
            return Err("supabase backend selected but url/anon_key are missing".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Supabase,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// Unset means the platform data directory.
    pub database_path: Option<PathBuf>,
    pub timeout_ms: u64,
}

impl StorageSettings {
    /// Bound for one store round-trip. Also used as the HTTP client timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_path: None,
            timeout_ms: DEFAULT_STORAGE_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupabaseSettings {
    pub url: Option<String>,
    pub anon_key: Option<String>,
}

impl SupabaseSettings {
    pub fn is_configured(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.trim().is_empty());
        filled(&self.url) && filled(&self.anon_key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Sort each day's events by clock time before building slots.
    pub sort_chronologically: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterSettings {
    /// Round-robin palette for new groups. Empty means every palette color.
    pub palette: Vec<PaletteColor>,
}

impl RosterSettings {
    pub fn effective_palette(&self) -> Vec<PaletteColor> {
        if self.palette.is_empty() {
            PaletteColor::ALL.to_vec()
        } else {
            self.palette.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage.backend, StorageBackend::Sqlite);
        assert_eq!(config.roster.effective_palette().len(), 11);
    }

    #[test]
    fn test_supabase_backend_requires_credentials() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackend::Supabase;
        assert!(config.validate().is_err());

        config.supabase.url = Some("https://demo.supabase.co".to_string());
        config.supabase.anon_key = Some("anon".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.storage.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_custom_palette_is_used() {
        let roster = RosterSettings {
            palette: vec![PaletteColor::Red, PaletteColor::Blue],
        };
        assert_eq!(
            roster.effective_palette(),
            vec![PaletteColor::Red, PaletteColor::Blue]
        );
    }
}
