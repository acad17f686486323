//! User location resolution for provider search.
//!
//! The search runs with or without a location; what changes is the quality
//! of distance sorting and the map view. Resolution happens once at startup:
//! either the coordinate configured in `config.toml`, or IP geolocation
//! (IpApi) when `auto_locate` is on. Failure is not an error here — the
//! caller gets `None`, shows a degraded-accuracy warning, and the map stays
//! in its world view.

use crate::config::LocationConfig;
use crate::models::Coordinate;
use ipgeolocate::{Locator, Service};
use tracing::{info, warn};

/// Resolves the user's coordinate, or `None` when geolocation is
/// unavailable.
///
/// With `auto_locate` off, the manual coordinate from the config is used as
/// long as it is valid. With it on, the [IpApi](https://ip-api.com/)
/// service supplies an approximate position; lookup or parse failures
/// degrade to `None` rather than falling back to a made-up point, so the
/// UI can surface the warning the search semantics require.
pub async fn resolve(config: &LocationConfig) -> Option<Coordinate> {
    if !config.auto_locate {
        let manual = Coordinate::new(config.manual_lat, config.manual_lon);
        if manual.is_valid() {
            info!("Using manual location ({}, {})", manual.latitude, manual.longitude);
            return Some(manual);
        }
        warn!(
            "Manual location ({}, {}) is out of range; searching without a location.",
            config.manual_lat, config.manual_lon
        );
        return None;
    }

    match Locator::get("1.1.1.1", Service::IpApi).await {
        Ok(loc) => {
            let lat = loc.latitude.parse::<f64>().ok()?;
            let lon = loc.longitude.parse::<f64>().ok()?;
            let coord = Coordinate::new(lat, lon);
            if !coord.is_valid() {
                warn!("Geolocation returned out-of-range coordinate ({}, {})", lat, lon);
                return None;
            }
            info!("Geolocation successful - ({}, {})", lat, lon);
            Some(coord)
        }
        Err(e) => {
            warn!("Geolocation service failed: {}. Distance sorting will be degraded.", e);
            None
        }
    }
}
