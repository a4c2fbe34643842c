//! Page views - every metric one dashboard page shows, as plain data
//!
//! Views are assembled from the aggregation functions only; they never read
//! files or filter records themselves.

use crate::aggregates::{
    self, CityTrafficCount, CourierRating, DailyCount, Extremum, GroupedStats, MedianLocation,
    TrafficShare, WeeklyCount, WeeklyCourierLoad,
};
use crate::geo::{self, CityDistance};
use crate::ranking::{self, RankedCourier, Speed};
use crate::record::{Dimension, Measure, OrderRecord};
use crate::stats::MeanStd;
use serde::{Deserialize, Serialize};

/// Festival flag values as they appear in the export
pub const FESTIVAL_YES: &str = "Yes";
pub const FESTIVAL_NO: &str = "No";

/// Dashboard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Company,
    Delivery,
    Restaurant,
}

impl Page {
    pub fn title(&self) -> &'static str {
        match self {
            Page::Company => "Company Vision",
            Page::Delivery => "Delivery Vision",
            Page::Restaurant => "Restaurant Vision",
        }
    }
}

/// Order volume over time, by traffic, and by location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CompanyView {
    pub orders_per_day: Vec<DailyCount>,
    pub traffic_share: Vec<TrafficShare>,
    pub orders_by_city_and_traffic: Vec<CityTrafficCount>,
    pub orders_per_week: Vec<WeeklyCount>,
    pub orders_per_delivery_person_per_week: Vec<WeeklyCourierLoad>,
    pub median_locations: Vec<MedianLocation>,
}

/// Delivery people: ages, vehicles, ratings, speed rankings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DeliveryView {
    pub oldest_age: Option<f64>,
    pub youngest_age: Option<f64>,
    pub best_vehicle_condition: Option<f64>,
    pub worst_vehicle_condition: Option<f64>,
    pub rating_by_delivery_person: Vec<CourierRating>,
    pub rating_by_traffic: GroupedStats,
    pub rating_by_weather: GroupedStats,
    pub fastest: Vec<RankedCourier>,
    pub slowest: Vec<RankedCourier>,
}

/// Restaurants: distances and delivery-time distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RestaurantView {
    pub delivery_people: usize,
    pub average_distance_km: f64,
    pub festival_time: MeanStd,
    pub non_festival_time: MeanStd,
    /// Rendered as a bar chart with error bars
    pub time_by_city: GroupedStats,
    /// Rendered as a table
    pub time_by_city_and_order_type: GroupedStats,
    pub distance_by_city: Vec<CityDistance>,
    pub time_by_city_and_traffic: GroupedStats,
}

/// One assembled page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum PageView {
    Company(CompanyView),
    Delivery(DeliveryView),
    Restaurant(RestaurantView),
}

impl PageView {
    pub fn page(&self) -> Page {
        match self {
            PageView::Company(_) => Page::Company,
            PageView::Delivery(_) => Page::Delivery,
            PageView::Restaurant(_) => Page::Restaurant,
        }
    }
}

/// Assemble the requested page
pub fn build(page: Page, records: &[OrderRecord], top_n: usize) -> PageView {
    match page {
        Page::Company => PageView::Company(company_view(records)),
        Page::Delivery => PageView::Delivery(delivery_view(records, top_n)),
        Page::Restaurant => PageView::Restaurant(restaurant_view(records)),
    }
}

pub fn company_view(records: &[OrderRecord]) -> CompanyView {
    CompanyView {
        orders_per_day: aggregates::orders_per_day(records),
        traffic_share: aggregates::traffic_order_share(records),
        orders_by_city_and_traffic: aggregates::orders_by_city_and_traffic(records),
        orders_per_week: aggregates::orders_per_week(records),
        orders_per_delivery_person_per_week: aggregates::orders_per_courier_per_week(records),
        median_locations: aggregates::median_location_by_city_and_traffic(records),
    }
}

pub fn delivery_view(records: &[OrderRecord], top_n: usize) -> DeliveryView {
    DeliveryView {
        oldest_age: aggregates::extremum(records, Measure::Age, Extremum::Max),
        youngest_age: aggregates::extremum(records, Measure::Age, Extremum::Min),
        best_vehicle_condition: aggregates::extremum(
            records,
            Measure::VehicleCondition,
            Extremum::Max,
        ),
        worst_vehicle_condition: aggregates::extremum(
            records,
            Measure::VehicleCondition,
            Extremum::Min,
        ),
        rating_by_delivery_person: aggregates::average_rating_by_courier(records),
        rating_by_traffic: aggregates::rating_stats_by(records, Dimension::Traffic),
        rating_by_weather: aggregates::rating_stats_by(records, Dimension::Weather),
        fastest: ranking::top_couriers(records, Speed::Fastest, top_n),
        slowest: ranking::top_couriers(records, Speed::Slowest, top_n),
    }
}

pub fn restaurant_view(records: &[OrderRecord]) -> RestaurantView {
    RestaurantView {
        delivery_people: aggregates::distinct_couriers(records),
        average_distance_km: geo::average_distance(records),
        festival_time: aggregates::festival_time_stats(records, FESTIVAL_YES),
        non_festival_time: aggregates::festival_time_stats(records, FESTIVAL_NO),
        time_by_city: aggregates::time_stats_by(records, &[Dimension::City]),
        time_by_city_and_order_type: aggregates::time_stats_by(
            records,
            &[Dimension::City, Dimension::OrderType],
        ),
        distance_by_city: geo::average_distance_by_city(records),
        time_by_city_and_traffic: aggregates::time_stats_by(
            records,
            &[Dimension::City, Dimension::Traffic],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::order;

    fn sample() -> Vec<OrderRecord> {
        let mut fest = order("3", "p3", "Metropolitian", "Jam", 45);
        fest.festival = "Yes".to_string();
        vec![
            order("1", "p1", "Urban", "Low", 25),
            order("2", "p2", "Urban", "Low", 35),
            fest,
        ]
    }

    #[test]
    fn test_build_dispatches_by_page() {
        let records = sample();
        for page in [Page::Company, Page::Delivery, Page::Restaurant] {
            assert_eq!(build(page, &records, 10).page(), page);
        }
    }

    #[test]
    fn test_delivery_view_bounds() {
        let mut records = sample();
        records[0].age = 22;
        records[2].vehicle_condition = 0;
        let view = delivery_view(&records, 10);
        assert_eq!(view.oldest_age, Some(30.0));
        assert_eq!(view.youngest_age, Some(22.0));
        assert_eq!(view.best_vehicle_condition, Some(2.0));
        assert_eq!(view.worst_vehicle_condition, Some(0.0));
        assert_eq!(view.fastest.len(), 3);
    }

    #[test]
    fn test_restaurant_view_festival_split() {
        let view = restaurant_view(&sample());
        assert_eq!(view.delivery_people, 3);
        assert_eq!(view.festival_time.mean, 45.0);
        assert!(view.festival_time.std.is_nan());
        assert_eq!(view.non_festival_time.mean, 30.0);
        assert_eq!(view.non_festival_time.std, 7.07);
        assert_eq!(view.time_by_city.groups.len(), 2);
    }

    #[test]
    fn test_empty_dataset_views() {
        let company = company_view(&[]);
        assert!(company.orders_per_day.is_empty());
        let delivery = delivery_view(&[], 10);
        assert_eq!(delivery.oldest_age, None);
        assert!(delivery.fastest.is_empty());
        let restaurant = restaurant_view(&[]);
        assert_eq!(restaurant.delivery_people, 0);
        assert!(restaurant.average_distance_km.is_nan());
    }
}
