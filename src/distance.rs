use crate::catalog::Coordinate;

/// Mean Earth radius, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers (haversine).
#[inline]
pub fn haversine_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = to.lng.to_radians() - from.lng.to_radians();

    let half_dlat = (dlat / 2.0).sin();
    let half_dlon = (dlon / 2.0).sin();
    let a = half_dlat * half_dlat + lat1.cos() * lat2.cos() * half_dlon * half_dlon;

    // Round-off can push `a` just outside [0, 1].
    let c = 2.0 * a.max(0.0).min(1.0).sqrt().asin();

    c * EARTH_RADIUS_KM
}

/// Human readable distance, the way the recommendations are displayed.
pub fn distance_label(distance_km: f64) -> String {
    format!("{:.1} km away", distance_km)
}
