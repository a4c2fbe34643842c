//! Dataset normalizer - raw export rows to clean order records
//!
//! Steps, in order:
//! 1. Trim surrounding whitespace from text columns
//! 2. Drop rows whose age is the missing sentinel
//! 3. Coerce age and rating
//! 4. Parse the order date (`DD-MM-YYYY`)
//! 5. Drop rows with missing multiple deliveries, weather, or city
//! 6. Coerce multiple deliveries
//! 7. Extract the minute count from the time-taken text
//!
//! Sentinels are literal markers embedded in the export and are matched
//! exactly. A blank or otherwise unexpected value is not "missing"; it fails
//! coercion instead.

use crate::error::NormalizeError;
use crate::record::{OrderRecord, RawOrder, ORDER_DATE_FORMAT};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Missing age marker, compared against the untrimmed column
pub const MISSING_AGE: &str = "NaN ";

/// Missing multiple-deliveries marker, compared against the untrimmed column
pub const MISSING_MULTIPLE_DELIVERIES: &str = "NaN ";

/// Missing weather marker, compared after trimming
pub const MISSING_WEATHER: &str = "conditions NaN";

/// Missing city marker, compared after trimming
pub const MISSING_CITY: &str = "NaN";

/// Normalization knobs
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeOptions {
    /// Fail on a time-taken field without digits instead of dropping the row
    pub strict_time_taken: bool,
}

/// Row accounting for one normalization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NormalizeSummary {
    pub rows_read: usize,
    pub missing_age: usize,
    pub missing_multiple_deliveries: usize,
    pub missing_weather: usize,
    pub missing_city: usize,
    pub rejected_time_taken: usize,
    pub rows_kept: usize,
}

impl NormalizeSummary {
    /// Rows removed for any reason
    pub fn rows_dropped(&self) -> usize {
        self.rows_read - self.rows_kept
    }
}

/// Normalized dataset plus its row accounting
#[derive(Debug, Clone)]
pub struct Normalized {
    pub records: Vec<OrderRecord>,
    pub summary: NormalizeSummary,
}

/// Why a row left the dataset without being an error
enum Dropped {
    MissingAge,
    MissingMultipleDeliveries,
    MissingWeather,
    MissingCity,
    EmptyTimeTaken,
}

/// Normalize with default options
pub fn normalize(raw: Vec<RawOrder>) -> Result<Normalized, NormalizeError> {
    normalize_with_options(raw, NormalizeOptions::default())
}

/// Normalize raw rows into clean records.
///
/// Sentinel rows are dropped; rows that fail coercion abort the run with the
/// first error, identified by its 1-based row number.
pub fn normalize_with_options(
    raw: Vec<RawOrder>,
    options: NormalizeOptions,
) -> Result<Normalized, NormalizeError> {
    let mut summary = NormalizeSummary {
        rows_read: raw.len(),
        ..NormalizeSummary::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for (index, row) in raw.into_iter().enumerate() {
        match normalize_row(index + 1, row, options)? {
            Ok(record) => records.push(record),
            Err(Dropped::MissingAge) => summary.missing_age += 1,
            Err(Dropped::MissingMultipleDeliveries) => summary.missing_multiple_deliveries += 1,
            Err(Dropped::MissingWeather) => summary.missing_weather += 1,
            Err(Dropped::MissingCity) => summary.missing_city += 1,
            Err(Dropped::EmptyTimeTaken) => summary.rejected_time_taken += 1,
        }
    }

    summary.rows_kept = records.len();
    debug!(
        rows_read = summary.rows_read,
        rows_kept = summary.rows_kept,
        "normalized order export"
    );

    Ok(Normalized { records, summary })
}

/// First run of ASCII digits in the time-taken text
pub fn minute_digits(text: &str) -> Option<&str> {
    static DIGITS_RE: OnceLock<Regex> = OnceLock::new();
    let digits_re = DIGITS_RE.get_or_init(|| Regex::new(r"\d+").unwrap());
    digits_re.find(text).map(|m| m.as_str())
}

/// Extract the first run of digits as a minute count.
///
/// Returns `None` when the text has no digits or the run overflows `u32`.
/// Normalization tells the two apart: an overflowing run is an
/// [`NormalizeError::InvalidTimeTaken`], not a missing minute count.
pub fn extract_minutes(text: &str) -> Option<u32> {
    minute_digits(text)?.parse().ok()
}

/// Parse an order date in the export's `DD-MM-YYYY` format
pub fn parse_order_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), ORDER_DATE_FORMAT).ok()
}

fn normalize_row(
    row_number: usize,
    raw: RawOrder,
    options: NormalizeOptions,
) -> Result<Result<OrderRecord, Dropped>, NormalizeError> {
    // 1. trim
    let id = raw.id.trim().to_string();
    let delivery_person_id = raw.delivery_person_id.trim().to_string();
    let traffic = raw.road_traffic_density.trim().to_string();
    let order_type = raw.type_of_order.trim().to_string();
    let vehicle_type = raw.type_of_vehicle.trim().to_string();
    let festival = raw.festival.trim().to_string();
    let city = raw.city.trim().to_string();
    let weather = raw.weather_conditions.trim().to_string();

    // 2. missing age
    if raw.delivery_person_age == MISSING_AGE {
        return Ok(Err(Dropped::MissingAge));
    }

    // 3. age and rating
    let age = raw
        .delivery_person_age
        .trim()
        .parse::<u32>()
        .map_err(|_| NormalizeError::InvalidAge {
            row: row_number,
            order_id: id.clone(),
            value: raw.delivery_person_age.clone(),
        })?;
    let rating = raw
        .delivery_person_ratings
        .trim()
        .parse::<f64>()
        .map_err(|_| NormalizeError::InvalidRating {
            row: row_number,
            order_id: id.clone(),
            value: raw.delivery_person_ratings.clone(),
        })?;

    // 4. order date
    let order_date =
        parse_order_date(&raw.order_date).ok_or_else(|| NormalizeError::InvalidDate {
            row: row_number,
            order_id: id.clone(),
            value: raw.order_date.clone(),
        })?;

    // 5. remaining sentinels
    if raw.multiple_deliveries == MISSING_MULTIPLE_DELIVERIES {
        return Ok(Err(Dropped::MissingMultipleDeliveries));
    }
    if weather == MISSING_WEATHER {
        return Ok(Err(Dropped::MissingWeather));
    }
    if city == MISSING_CITY {
        return Ok(Err(Dropped::MissingCity));
    }

    // 6. multiple deliveries
    let multiple_deliveries = raw
        .multiple_deliveries
        .trim()
        .parse::<u32>()
        .map_err(|_| NormalizeError::InvalidMultipleDeliveries {
            row: row_number,
            order_id: id.clone(),
            value: raw.multiple_deliveries.clone(),
        })?;

    // 7. minutes
    let time_taken_min = match minute_digits(&raw.time_taken) {
        Some(digits) => digits
            .parse::<u32>()
            .map_err(|_| NormalizeError::InvalidTimeTaken {
                row: row_number,
                order_id: id.clone(),
                value: raw.time_taken.clone(),
            })?,
        None if options.strict_time_taken => {
            return Err(NormalizeError::EmptyTimeTaken {
                row: row_number,
                order_id: id,
                value: raw.time_taken,
            });
        }
        None => {
            warn!(
                row = row_number,
                order_id = %id,
                value = %raw.time_taken,
                "dropping order without a minute count in time taken"
            );
            return Ok(Err(Dropped::EmptyTimeTaken));
        }
    };

    Ok(Ok(OrderRecord {
        id,
        delivery_person_id,
        age,
        rating,
        restaurant_latitude: raw.restaurant_latitude,
        restaurant_longitude: raw.restaurant_longitude,
        delivery_latitude: raw.delivery_location_latitude,
        delivery_longitude: raw.delivery_location_longitude,
        order_date,
        time_ordered: raw.time_ordered.trim().to_string(),
        time_order_picked: raw.time_order_picked.trim().to_string(),
        weather,
        traffic,
        vehicle_condition: raw.vehicle_condition,
        order_type,
        vehicle_type,
        multiple_deliveries,
        festival,
        city,
        time_taken_min,
    }))
}
