use chrono::{DateTime, Utc};
use crate::models::Item;

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance at which the proximity signal bottoms out
pub const PROXIMITY_SCALE_KM: f64 = 10.0;

/// Reports this many days apart or closer earn the recency bonus
pub const RECENCY_WINDOW_DAYS: f64 = 7.0;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two items in kilometers, if both carry valid coordinates
pub fn item_distance_km(a: &Item, b: &Item) -> Option<f64> {
    let (lat1, lon1) = a.coordinates()?;
    let (lat2, lon2) = b.coordinates()?;
    Some(haversine_distance(lat1, lon1, lat2, lon2))
}

/// Distance normalized onto [0, 1]: 0 at the same point, 1 at 10 km or more.
///
/// Missing coordinates on either side count as maximum distance.
#[inline]
pub fn normalized_distance(distance_km: Option<f64>) -> f64 {
    match distance_km {
        Some(d) => (d / PROXIMITY_SCALE_KM).min(1.0),
        None => 1.0,
    }
}

/// Absolute difference between two timestamps in fractional days
#[inline]
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (a - b).num_milliseconds().abs() as f64 / 1000.0 / SECONDS_PER_DAY
}

#[inline]
pub fn within_recency_window(days: f64) -> bool {
    days <= RECENCY_WINDOW_DAYS
}
