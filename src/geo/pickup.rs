use serde::{Deserialize, Serialize};

use super::branches::Branch;

pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const DEFAULT_RADIUS_KM: f64 = 5.0;
pub const MIN_RADIUS_KM: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        valid.then_some(Self { lat, lng })
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Radius actually searched: the default when absent or not a number, never below the floor.
pub fn effective_radius(requested: Option<f64>) -> f64 {
    match requested {
        Some(r) if r.is_finite() => r.max(MIN_RADIUS_KM),
        _ => DEFAULT_RADIUS_KM,
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Branches with known coordinates inside `radius_km` of `origin`, nearest first.
/// The radius is checked against the distance as reported, rounded to two decimals.
pub fn nearby_branches(
    origin: Coordinates,
    branches: &[Branch],
    radius_km: f64,
) -> Vec<(&Branch, f64)> {
    let mut hits: Vec<_> = branches
        .iter()
        .filter_map(|branch| {
            let distance = haversine_km(origin, branch.coordinates()?);
            (round2(distance) <= radius_km).then_some((branch, distance))
        })
        .collect();

    hits.sort_by(|a, b| a.1.total_cmp(&b.1));
    hits
}
