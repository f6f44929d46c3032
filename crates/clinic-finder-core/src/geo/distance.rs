//! Great-circle distance.

use crate::models::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two points given in decimal degrees.
///
/// Symmetric in its two points and exactly zero for identical points. The
/// intermediate term is clamped to [0, 1] so antipodal pairs cannot produce NaN.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // Absolute deltas keep the result bit-identical when the points are swapped.
    let d_lat = (lat2 - lat1).abs().to_radians();
    let d_lon = (lon2 - lon1).abs().to_radians();

    let sin_lat = (d_lat / 2.0).sin();
    let sin_lon = (d_lon / 2.0).sin();
    let a = sin_lat * sin_lat
        + lat1.to_radians().cos() * lat2.to_radians().cos() * sin_lon * sin_lon;
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// [`haversine_km`] over [`Coordinates`].
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    haversine_km(from.latitude, from.longitude, to.latitude, to.longitude)
}
