//! Great-circle distances between restaurants and delivery locations

use crate::record::OrderRecord;
use crate::stats::{mean, round2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Mean Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance in kilometers between two (lat, lon) points in degrees
pub fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    let (lat1, lon1) = (from.0.to_radians(), from.1.to_radians());
    let (lat2, lon2) = (to.0.to_radians(), to.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // clamp guards asin against rounding just above 1.0
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// Restaurant-to-delivery distance of one order
pub fn delivery_distance(record: &OrderRecord) -> f64 {
    haversine_km(
        (record.restaurant_latitude, record.restaurant_longitude),
        (record.delivery_latitude, record.delivery_longitude),
    )
}

/// Distance column, aligned index-for-index with `records`
pub fn delivery_distances(records: &[OrderRecord]) -> Vec<f64> {
    records.iter().map(delivery_distance).collect()
}

/// Mean delivery distance over all orders, rounded to two decimals
pub fn average_distance(records: &[OrderRecord]) -> f64 {
    round2(mean(&delivery_distances(records)))
}

/// Mean delivery distance of one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CityDistance {
    pub city: String,
    pub mean_distance_km: f64,
}

/// Mean delivery distance per city, ordered by city
pub fn average_distance_by_city(records: &[OrderRecord]) -> Vec<CityDistance> {
    let mut by_city: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for (record, distance) in records.iter().zip(delivery_distances(records)) {
        by_city.entry(record.city.as_str()).or_default().push(distance);
    }

    by_city
        .into_iter()
        .map(|(city, distances)| CityDistance {
            city: city.to_string(),
            mean_distance_km: mean(&distances),
        })
        .collect()
}
