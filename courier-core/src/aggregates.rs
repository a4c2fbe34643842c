//! Aggregation views over clean order records
//!
//! Every function here is derived from its input and never modifies it.
//!
//! Global invariants enforced:
//! - Grouped outputs are ordered by ascending group key
//! - No I/O and no filtering beyond the documented grouping
//! - Standard deviations follow the conventions in [`crate::stats`]

use crate::record::{Dimension, Measure, OrderRecord};
use crate::stats::{median, MeanStd};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Orders placed on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub orders: usize,
}

/// Orders placed in one week of the year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WeeklyCount {
    pub week: u32,
    pub orders: usize,
}

/// Share of all orders placed under one traffic density
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrafficShare {
    pub traffic: String,
    pub orders: usize,
    pub share: f64,
}

/// Orders per (city, traffic density) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CityTrafficCount {
    pub city: String,
    pub traffic: String,
    pub orders: usize,
}

/// Weekly order volume against the number of distinct delivery people
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WeeklyCourierLoad {
    pub week: u32,
    pub orders: usize,
    pub delivery_people: usize,
    pub orders_per_delivery_person: f64,
}

/// Median delivery location for a (city, traffic density) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MedianLocation {
    pub city: String,
    pub traffic: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Mean rating of one delivery person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CourierRating {
    pub delivery_person_id: String,
    pub mean_rating: f64,
}

/// Mean and standard deviation for one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupStats {
    /// Group key values, one per grouping dimension
    pub keys: Vec<String>,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

/// Statistics of one measure grouped by one or more dimensions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GroupedStats {
    pub dimensions: Vec<Dimension>,
    pub groups: Vec<GroupStats>,
}

/// Which bound [`extremum`] reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

/// Week of the year with Sunday as the first day of the week.
///
/// Days before the first Sunday of January fall in week 0.
pub fn week_of_year(date: NaiveDate) -> u32 {
    (date.ordinal0() + 7 - date.weekday().num_days_from_sunday()) / 7
}

/// Order count per order date
pub fn orders_per_day(records: &[OrderRecord]) -> Vec<DailyCount> {
    count_by(records, |r| r.order_date)
        .into_iter()
        .map(|(date, orders)| DailyCount { date, orders })
        .collect()
}

/// Order count per week of the year
pub fn orders_per_week(records: &[OrderRecord]) -> Vec<WeeklyCount> {
    count_by(records, |r| week_of_year(r.order_date))
        .into_iter()
        .map(|(week, orders)| WeeklyCount { week, orders })
        .collect()
}

/// Fraction of orders per traffic density; shares sum to 1 over the categories present
pub fn traffic_order_share(records: &[OrderRecord]) -> Vec<TrafficShare> {
    let total = records.len() as f64;
    count_by(records, |r| r.traffic.as_str())
        .into_iter()
        .map(|(traffic, orders)| TrafficShare {
            traffic: traffic.to_string(),
            orders,
            share: orders as f64 / total,
        })
        .collect()
}

/// Order count per (city, traffic density)
pub fn orders_by_city_and_traffic(records: &[OrderRecord]) -> Vec<CityTrafficCount> {
    count_by(records, |r| (r.city.as_str(), r.traffic.as_str()))
        .into_iter()
        .map(|((city, traffic), orders)| CityTrafficCount {
            city: city.to_string(),
            traffic: traffic.to_string(),
            orders,
        })
        .collect()
}

/// Orders per distinct delivery person, week by week
pub fn orders_per_courier_per_week(records: &[OrderRecord]) -> Vec<WeeklyCourierLoad> {
    let orders = count_by(records, |r| week_of_year(r.order_date));

    let mut couriers: BTreeMap<u32, BTreeSet<&str>> = BTreeMap::new();
    for record in records {
        couriers
            .entry(week_of_year(record.order_date))
            .or_default()
            .insert(record.delivery_person_id.as_str());
    }

    // inner join on week
    orders
        .into_iter()
        .filter_map(|(week, order_count)| {
            let people = couriers.get(&week)?.len();
            Some(WeeklyCourierLoad {
                week,
                orders: order_count,
                delivery_people: people,
                orders_per_delivery_person: order_count as f64 / people as f64,
            })
        })
        .collect()
}

/// Median delivery latitude/longitude per (city, traffic density)
pub fn median_location_by_city_and_traffic(records: &[OrderRecord]) -> Vec<MedianLocation> {
    let mut groups: BTreeMap<(&str, &str), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.city.as_str(), record.traffic.as_str()))
            .or_default();
        entry.0.push(record.delivery_latitude);
        entry.1.push(record.delivery_longitude);
    }

    groups
        .into_iter()
        .map(|((city, traffic), (lats, lons))| MedianLocation {
            city: city.to_string(),
            traffic: traffic.to_string(),
            latitude: median(&lats),
            longitude: median(&lons),
        })
        .collect()
}

/// Mean and standard deviation of the rating, grouped by one dimension
pub fn rating_stats_by(records: &[OrderRecord], dimension: Dimension) -> GroupedStats {
    stats_by(records, &[dimension], |r| r.rating)
}

/// Mean and standard deviation of the delivery time, grouped by one or more dimensions
pub fn time_stats_by(records: &[OrderRecord], dimensions: &[Dimension]) -> GroupedStats {
    stats_by(records, dimensions, |r| f64::from(r.time_taken_min))
}

/// Mean rating per delivery person
pub fn average_rating_by_courier(records: &[OrderRecord]) -> Vec<CourierRating> {
    rating_stats_by(records, Dimension::DeliveryPerson)
        .groups
        .into_iter()
        .map(|group| CourierRating {
            delivery_person_id: group.keys.into_iter().next().unwrap_or_default(),
            mean_rating: group.mean,
        })
        .collect()
}

/// Number of distinct delivery people
pub fn distinct_couriers(records: &[OrderRecord]) -> usize {
    records
        .iter()
        .map(|r| r.delivery_person_id.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// Smallest or largest value of a numeric column; `None` on an empty dataset
pub fn extremum(records: &[OrderRecord], measure: Measure, which: Extremum) -> Option<f64> {
    let values = records.iter().map(|r| measure.value(r));
    match which {
        Extremum::Min => values.reduce(f64::min),
        Extremum::Max => values.reduce(f64::max),
    }
}

/// Mean and standard deviation of the delivery time for one festival flag,
/// rounded to two decimals
pub fn festival_time_stats(records: &[OrderRecord], festival: &str) -> MeanStd {
    let minutes: Vec<f64> = records
        .iter()
        .filter(|r| r.festival == festival)
        .map(|r| f64::from(r.time_taken_min))
        .collect();
    MeanStd::of(&minutes).rounded()
}

/// Count records per key, ordered by key
fn count_by<'a, K, F>(records: &'a [OrderRecord], key: F) -> BTreeMap<K, usize>
where
    K: Ord,
    F: Fn(&'a OrderRecord) -> K,
{
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(key(record)).or_insert(0) += 1;
    }
    counts
}

fn stats_by<F>(records: &[OrderRecord], dimensions: &[Dimension], value: F) -> GroupedStats
where
    F: Fn(&OrderRecord) -> f64,
{
    let mut groups: BTreeMap<Vec<&str>, Vec<f64>> = BTreeMap::new();
    for record in records {
        let keys = dimensions.iter().map(|d| d.value(record)).collect();
        groups.entry(keys).or_default().push(value(record));
    }

    let groups = groups
        .into_iter()
        .map(|(keys, values)| {
            let stats = MeanStd::of(&values);
            GroupStats {
                keys: keys.into_iter().map(str::to_string).collect(),
                count: values.len(),
                mean: stats.mean,
                std: stats.std,
            }
        })
        .collect();

    GroupedStats {
        dimensions: dimensions.to_vec(),
        groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::{on, order};

    fn sample() -> Vec<OrderRecord> {
        vec![
            on(order("1", "p1", "Urban", "Low", 25), 2022, 3, 19),
            on(order("2", "p2", "Urban", "Low", 35), 2022, 3, 19),
            on(order("3", "p1", "Metropolitian", "Jam", 40), 2022, 3, 20),
            on(order("4", "p3", "Semi-Urban", "High", 48), 2022, 3, 27),
        ]
    }

    #[test]
    fn test_week_of_year_sunday_start() {
        // 2022-01-01 is a Saturday, 2022-01-02 the first Sunday
        assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 1, 1).unwrap()), 0);
        assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 1, 2).unwrap()), 1);
        assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 1, 8).unwrap()), 1);
        assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 1, 9).unwrap()), 2);
        // 2022-03-19 (Sat) and 2022-03-20 (Sun)
        assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 3, 19).unwrap()), 11);
        assert_eq!(week_of_year(NaiveDate::from_ymd_opt(2022, 3, 20).unwrap()), 12);
    }

    #[test]
    fn test_orders_per_day() {
        let days = orders_per_day(&sample());
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2022, 3, 19).unwrap());
        assert_eq!(days[0].orders, 2);
        assert_eq!(days[2].orders, 1);
    }

    #[test]
    fn test_orders_per_week() {
        let weeks = orders_per_week(&sample());
        let pairs: Vec<(u32, usize)> = weeks.iter().map(|w| (w.week, w.orders)).collect();
        assert_eq!(pairs, vec![(11, 2), (12, 1), (13, 1)]);
    }

    #[test]
    fn test_traffic_share_sums_to_one() {
        let shares = traffic_order_share(&sample());
        let total: f64 = shares.iter().map(|s| s.share).sum();
        assert!((total - 1.0).abs() < 1e-12);
        let low = shares.iter().find(|s| s.traffic == "Low").unwrap();
        assert_eq!(low.orders, 2);
        assert_eq!(low.share, 0.5);
    }

    #[test]
    fn test_traffic_share_empty() {
        assert!(traffic_order_share(&[]).is_empty());
    }

    #[test]
    fn test_orders_by_city_and_traffic() {
        let counts = orders_by_city_and_traffic(&sample());
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[0].city, "Metropolitian");
        let urban_low = counts
            .iter()
            .find(|c| c.city == "Urban" && c.traffic == "Low")
            .unwrap();
        assert_eq!(urban_low.orders, 2);
    }

    #[test]
    fn test_orders_per_courier_per_week() {
        let mut records = sample();
        records.push(on(order("5", "p1", "Urban", "Low", 30), 2022, 3, 19));
        let load = orders_per_courier_per_week(&records);
        // week 11: orders 1, 2, 5 by p1 and p2
        assert_eq!(load[0].week, 11);
        assert_eq!(load[0].orders, 3);
        assert_eq!(load[0].delivery_people, 2);
        assert_eq!(load[0].orders_per_delivery_person, 1.5);
    }

    #[test]
    fn test_median_location() {
        let mut a = order("1", "p1", "Urban", "Low", 25);
        a.delivery_latitude = 10.0;
        a.delivery_longitude = 70.0;
        let mut b = order("2", "p2", "Urban", "Low", 25);
        b.delivery_latitude = 12.0;
        b.delivery_longitude = 74.0;
        let locations = median_location_by_city_and_traffic(&[a, b]);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].latitude, 11.0);
        assert_eq!(locations[0].longitude, 72.0);
    }

    #[test]
    fn test_time_stats_by_city_and_traffic() {
        let records = vec![
            order("1", "p1", "Urban", "Low", 25),
            order("2", "p2", "Urban", "Low", 35),
        ];
        let stats = time_stats_by(&records, &[Dimension::City, Dimension::Traffic]);
        assert_eq!(stats.dimensions, vec![Dimension::City, Dimension::Traffic]);
        assert_eq!(stats.groups.len(), 1);
        let group = &stats.groups[0];
        assert_eq!(group.keys, vec!["Urban".to_string(), "Low".to_string()]);
        assert_eq!(group.count, 2);
        assert_eq!(group.mean, 30.0);
        assert!((group.std - 50.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_singleton_group_std_is_nan() {
        let stats = rating_stats_by(&sample(), Dimension::Traffic);
        let jam = stats.groups.iter().find(|g| g.keys[0] == "Jam").unwrap();
        assert_eq!(jam.count, 1);
        assert!(jam.std.is_nan());
    }

    #[test]
    fn test_average_rating_by_courier() {
        let mut records = sample();
        records[2].rating = 3.5;
        let ratings = average_rating_by_courier(&records);
        assert_eq!(ratings[0].delivery_person_id, "p1");
        assert_eq!(ratings[0].mean_rating, 4.0);
        assert_eq!(ratings.len(), 3);
    }

    #[test]
    fn test_distinct_couriers() {
        assert_eq!(distinct_couriers(&sample()), 3);
        assert_eq!(distinct_couriers(&[]), 0);
    }

    #[test]
    fn test_extremum() {
        let mut records = sample();
        records[0].age = 20;
        records[3].age = 39;
        records[1].vehicle_condition = 0;
        assert_eq!(extremum(&records, Measure::Age, Extremum::Min), Some(20.0));
        assert_eq!(extremum(&records, Measure::Age, Extremum::Max), Some(39.0));
        assert_eq!(
            extremum(&records, Measure::VehicleCondition, Extremum::Min),
            Some(0.0)
        );
        assert_eq!(extremum(&[], Measure::Age, Extremum::Max), None);
    }

    #[test]
    fn test_festival_time_stats() {
        let mut records = sample();
        records[0].festival = "Yes".to_string();
        records[1].festival = "Yes".to_string();
        let yes = festival_time_stats(&records, "Yes");
        assert_eq!(yes.mean, 30.0);
        assert_eq!(yes.std, 7.07);
        let no = festival_time_stats(&records, "No");
        assert_eq!(no.mean, 44.0);
    }

    #[test]
    fn test_aggregates_do_not_mutate_input() {
        let records = sample();
        let before = records.clone();
        let _ = orders_per_day(&records);
        let _ = time_stats_by(&records, &[Dimension::City]);
        let _ = median_location_by_city_and_traffic(&records);
        assert_eq!(records, before);
    }
}
