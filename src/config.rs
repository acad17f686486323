use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub location: LocationConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,       // Backend root, no trailing slash
    pub timeout_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LocationConfig {
    pub auto_locate: bool, // Use IP geolocation if true
    pub manual_lat: f64,   // Latitude used if auto_locate is false
    pub manual_lon: f64,   // Longitude used if auto_locate is false
    pub radius_km: f64,    // Initial map search radius
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UiConfig {
    pub page_limit: u32,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig {
                base_url: "http://localhost:8000/api".to_string(),
                timeout_seconds: 15,
            },
            location: LocationConfig {
                auto_locate: true,
                manual_lat: 28.6139,
                manual_lon: 77.2090,
                radius_km: 5.0,
            },
            ui: UiConfig {
                page_limit: 12,
                tick_rate_ms: 150,
            },
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        let config_path = "config.toml";

        if let Ok(content) = fs::read_to_string(config_path) {
            match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => warn!("Failed to parse config.toml: {}. Using defaults.", e),
            }
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(config_path, toml_string).is_err() {
                    warn!("Could not write default config.toml to disk.");
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.api.timeout_seconds, 15);
        assert_eq!(back.ui.page_limit, 12);
        assert!(back.location.auto_locate);
    }
}
