//! Geodesic helpers shared by the map view and provider display.

use crate::models::Coordinate;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers, via the
/// haversine formula. NaN inputs propagate; callers validate coordinates
/// with [`Coordinate::is_valid`] first.
#[inline]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Tile-map zoom level that keeps a radius disc framed in the viewport:
/// `clamp(round(16 - log2(radius_km)), 12, 17)`. A presentation heuristic,
/// not exact viewport fitting.
pub fn zoom_from_radius(radius_km: f64) -> u8 {
    let zoom = (16.0 - radius_km.log2()).round();
    zoom.clamp(12.0, 17.0) as u8
}

/// Half-spans in degrees for a canvas window that covers `radius_km` around
/// `center`, with a little margin so the disc never touches the border.
/// 1° latitude ≈ 111 km; 1° longitude shrinks by cos(latitude).
pub fn canvas_span(center: Coordinate, radius_km: f64) -> (f64, f64) {
    let margin = 1.3;
    let lat_span = radius_km * margin / 111.0;
    let cos_lat = center.latitude.to_radians().cos().abs().max(0.01);
    let lon_span = radius_km * margin / (111.0 * cos_lat);
    (lat_span, lon_span)
}

/// External turn-by-turn directions link. The client only constructs and
/// surfaces this URL; nothing is fetched from it.
pub fn directions_url(origin: Coordinate, dest: Coordinate) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&origin={},{}&destination={},{}",
        origin.latitude, origin.longitude, dest.latitude, dest.longitude
    )
}

pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{}m away", (km * 1000.0).round() as i64)
    } else {
        format!("{:.1}km away", km)
    }
}

pub fn format_availability(days: u32) -> String {
    match days {
        0 => "Available today".to_string(),
        1 => "Available tomorrow".to_string(),
        n => format!("Available in {} days", n),
    }
}
