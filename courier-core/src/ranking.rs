//! Fastest and slowest delivery people per city

use crate::record::{OrderRecord, CITY_TYPES};
use crate::stats::mean;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default number of delivery people listed per city
pub const DEFAULT_TOP_N: usize = 10;

/// Ranking direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speed {
    /// Lowest mean delivery time first
    Fastest,
    /// Highest mean delivery time first
    Slowest,
}

/// One ranked delivery person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RankedCourier {
    pub city: String,
    pub delivery_person_id: String,
    pub mean_time_min: f64,
}

/// Rank delivery people by mean delivery time within each known city type.
///
/// Returns at most `top_n` entries per city, cities in [`CITY_TYPES`] order.
/// Equal means are listed in ascending delivery person id order.
pub fn top_couriers(records: &[OrderRecord], speed: Speed, top_n: usize) -> Vec<RankedCourier> {
    let mut ranked = Vec::new();
    for city in CITY_TYPES {
        let mut city_means = courier_means(records, city);
        // sort_by is stable
        match speed {
            Speed::Fastest => city_means.sort_by(|a, b| a.1.total_cmp(&b.1)),
            Speed::Slowest => city_means.sort_by(|a, b| b.1.total_cmp(&a.1)),
        }
        ranked.extend(
            city_means
                .into_iter()
                .take(top_n)
                .map(|(id, mean_time_min)| RankedCourier {
                    city: city.to_string(),
                    delivery_person_id: id.to_string(),
                    mean_time_min,
                }),
        );
    }
    ranked
}

/// Mean delivery time per delivery person in one city, ordered by delivery person id
fn courier_means<'a>(records: &'a [OrderRecord], city: &str) -> Vec<(&'a str, f64)> {
    let mut minutes: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.city == city) {
        minutes
            .entry(record.delivery_person_id.as_str())
            .or_default()
            .push(f64::from(record.time_taken_min));
    }

    minutes
        .into_iter()
        .map(|(id, values)| (id, mean(&values)))
        .collect()
}
