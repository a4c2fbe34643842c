//! Order records - raw CSV rows and their cleaned, typed form

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used by the `Order_Date` column
pub const ORDER_DATE_FORMAT: &str = "%d-%m-%Y";

/// Traffic density categories, in the order the dashboards list them
pub const TRAFFIC_CATEGORIES: &[&str] = &["Low", "Medium", "High", "Jam"];

/// City types ranked by the top-N speed lists, in output order.
///
/// `Metropolitian` is the dataset's own spelling and is matched exactly.
pub const CITY_TYPES: &[&str] = &["Metropolitian", "Urban", "Semi-Urban"];

/// One row of the order export, exactly as it appears on disk.
///
/// Text columns are kept verbatim (including surrounding whitespace) because
/// the missing-data sentinels are whitespace-sensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOrder {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Delivery_person_ID")]
    pub delivery_person_id: String,
    #[serde(rename = "Delivery_person_Age")]
    pub delivery_person_age: String,
    #[serde(rename = "Delivery_person_Ratings")]
    pub delivery_person_ratings: String,
    #[serde(rename = "Restaurant_latitude")]
    pub restaurant_latitude: f64,
    #[serde(rename = "Restaurant_longitude")]
    pub restaurant_longitude: f64,
    #[serde(rename = "Delivery_location_latitude")]
    pub delivery_location_latitude: f64,
    #[serde(rename = "Delivery_location_longitude")]
    pub delivery_location_longitude: f64,
    #[serde(rename = "Order_Date")]
    pub order_date: String,
    #[serde(rename = "Time_Orderd")]
    pub time_ordered: String,
    #[serde(rename = "Time_Order_picked")]
    pub time_order_picked: String,
    #[serde(rename = "Weatherconditions")]
    pub weather_conditions: String,
    #[serde(rename = "Road_traffic_density")]
    pub road_traffic_density: String,
    #[serde(rename = "Vehicle_condition")]
    pub vehicle_condition: i64,
    #[serde(rename = "Type_of_order")]
    pub type_of_order: String,
    #[serde(rename = "Type_of_vehicle")]
    pub type_of_vehicle: String,
    #[serde(rename = "multiple_deliveries")]
    pub multiple_deliveries: String,
    #[serde(rename = "Festival")]
    pub festival: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Time_taken(min)")]
    pub time_taken: String,
}

/// A cleaned order: trimmed text, typed numbers, parsed date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OrderRecord {
    pub id: String,
    pub delivery_person_id: String,
    pub age: u32,
    pub rating: f64,
    pub restaurant_latitude: f64,
    pub restaurant_longitude: f64,
    pub delivery_latitude: f64,
    pub delivery_longitude: f64,
    pub order_date: NaiveDate,
    pub time_ordered: String,
    pub time_order_picked: String,
    pub weather: String,
    pub traffic: String,
    pub vehicle_condition: i64,
    pub order_type: String,
    pub vehicle_type: String,
    pub multiple_deliveries: u32,
    pub festival: String,
    pub city: String,
    pub time_taken_min: u32,
}

impl From<&OrderRecord> for RawOrder {
    /// Render a clean record back into the export's textual form.
    ///
    /// Normalizing the result yields the original record again.
    fn from(record: &OrderRecord) -> Self {
        RawOrder {
            id: record.id.clone(),
            delivery_person_id: record.delivery_person_id.clone(),
            delivery_person_age: record.age.to_string(),
            delivery_person_ratings: record.rating.to_string(),
            restaurant_latitude: record.restaurant_latitude,
            restaurant_longitude: record.restaurant_longitude,
            delivery_location_latitude: record.delivery_latitude,
            delivery_location_longitude: record.delivery_longitude,
            order_date: record.order_date.format(ORDER_DATE_FORMAT).to_string(),
            time_ordered: record.time_ordered.clone(),
            time_order_picked: record.time_order_picked.clone(),
            weather_conditions: record.weather.clone(),
            road_traffic_density: record.traffic.clone(),
            vehicle_condition: record.vehicle_condition,
            type_of_order: record.order_type.clone(),
            type_of_vehicle: record.vehicle_type.clone(),
            multiple_deliveries: record.multiple_deliveries.to_string(),
            festival: record.festival.clone(),
            city: record.city.clone(),
            time_taken: record.time_taken_min.to_string(),
        }
    }
}

/// Categorical columns usable as grouping keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    City,
    Traffic,
    Weather,
    OrderType,
    VehicleType,
    Festival,
    DeliveryPerson,
}

impl Dimension {
    pub fn value<'a>(&self, record: &'a OrderRecord) -> &'a str {
        match self {
            Dimension::City => &record.city,
            Dimension::Traffic => &record.traffic,
            Dimension::Weather => &record.weather,
            Dimension::OrderType => &record.order_type,
            Dimension::VehicleType => &record.vehicle_type,
            Dimension::Festival => &record.festival,
            Dimension::DeliveryPerson => &record.delivery_person_id,
        }
    }

    /// Column name in the source export
    pub fn column(&self) -> &'static str {
        match self {
            Dimension::City => "City",
            Dimension::Traffic => "Road_traffic_density",
            Dimension::Weather => "Weatherconditions",
            Dimension::OrderType => "Type_of_order",
            Dimension::VehicleType => "Type_of_vehicle",
            Dimension::Festival => "Festival",
            Dimension::DeliveryPerson => "Delivery_person_ID",
        }
    }
}

/// Numeric columns usable for extremum metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Age,
    Rating,
    VehicleCondition,
    MultipleDeliveries,
    TimeTaken,
}

impl Measure {
    pub fn value(&self, record: &OrderRecord) -> f64 {
        match self {
            Measure::Age => f64::from(record.age),
            Measure::Rating => record.rating,
            Measure::VehicleCondition => record.vehicle_condition as f64,
            Measure::MultipleDeliveries => f64::from(record.multiple_deliveries),
            Measure::TimeTaken => f64::from(record.time_taken_min),
        }
    }
}

/// Fixture builders shared by unit tests across modules
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    pub fn order(id: &str, courier: &str, city: &str, traffic: &str, minutes: u32) -> OrderRecord {
        OrderRecord {
            id: id.to_string(),
            delivery_person_id: courier.to_string(),
            age: 30,
            rating: 4.5,
            restaurant_latitude: 22.745049,
            restaurant_longitude: 75.892471,
            delivery_latitude: 22.765049,
            delivery_longitude: 75.912471,
            order_date: NaiveDate::from_ymd_opt(2022, 3, 19).unwrap(),
            time_ordered: "11:30:00".to_string(),
            time_order_picked: "11:45:00".to_string(),
            weather: "conditions Sunny".to_string(),
            traffic: traffic.to_string(),
            vehicle_condition: 2,
            order_type: "Snack".to_string(),
            vehicle_type: "motorcycle".to_string(),
            multiple_deliveries: 0,
            festival: "No".to_string(),
            city: city.to_string(),
            time_taken_min: minutes,
        }
    }

    pub fn on(mut record: OrderRecord, y: i32, m: u32, d: u32) -> OrderRecord {
        record.order_date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        record
    }
}
