// src/services/geo.rs
// DOCUMENTATION: Great-circle distance between coordinates
// PURPOSE: Distance of each result from the search origin

use geo_types::Point;

/// Earth radius in meters (spherical approximation)
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Distance between two points in meters
/// DOCUMENTATION: Haversine formula. Points are (x = longitude, y = latitude) in degrees.
/// Longitude wraparound is not special-cased.
pub fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let lat1 = a.y().to_radians();
    let lat2 = b.y().to_radians();
    let d_lat = lat2 - lat1;
    let d_lon = (b.x() - a.x()).to_radians();

    let h = hsin(d_lat) + lat1.cos() * lat2.cos() * hsin(d_lon);

    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

/// haversin(θ)
fn hsin(theta: f64) -> f64 {
    (theta / 2.0).sin().powi(2)
}
