//! Reporting and output generation
//!
//! Renderers consume page views only; nothing here touches records.
//!
//! Global invariants enforced:
//! - Deterministic output ordering
//! - Undefined statistics print as `n/a` in text and `null` in JSON

use crate::aggregates::GroupedStats;
use crate::normalize::NormalizeSummary;
use crate::pipeline::Dataset;
use crate::ranking::RankedCourier;
use crate::views::{CompanyView, DeliveryView, PageView, RestaurantView};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A rendered page plus the context it was computed under
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PageReport {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
    pub traffic_selection: Vec<String>,
    pub traffic_filter_applied: bool,
    pub orders: usize,
    pub normalization: NormalizeSummary,
    pub view: PageView,
}

impl PageReport {
    pub fn new(
        view: PageView,
        dataset: &Dataset,
        until: Option<NaiveDate>,
        traffic_selection: &[String],
    ) -> Self {
        PageReport {
            title: view.page().title().to_string(),
            until,
            traffic_selection: traffic_selection.to_vec(),
            traffic_filter_applied: dataset.traffic_filter_applied,
            orders: dataset.records.len(),
            normalization: dataset.summary.clone(),
            view,
        }
    }
}

/// How grouped delivery-time statistics are handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// One labelled point per group, mean as value and std as error bar
    Chart,
    /// The grouped rows as they are
    Table,
}

/// One bar of a chart-ready series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,
}

/// Grouped statistics in one of the two rendering modes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "data", rename_all = "snake_case")]
pub enum TimeStatsView {
    Chart(Vec<ChartPoint>),
    Table(GroupedStats),
}

impl TimeStatsView {
    pub fn new(stats: &GroupedStats, mode: RenderMode) -> Self {
        match mode {
            RenderMode::Chart => TimeStatsView::Chart(chart_points(stats)),
            RenderMode::Table => TimeStatsView::Table(stats.clone()),
        }
    }
}

/// Chart-ready points: label is the joined group key, error bar is the std
pub fn chart_points(stats: &GroupedStats) -> Vec<ChartPoint> {
    stats
        .groups
        .iter()
        .map(|group| ChartPoint {
            label: group.keys.join(" / "),
            value: group.mean,
            error: (!group.std.is_nan()).then_some(group.std),
        })
        .collect()
}

/// Render a page report as JSON output
pub fn render_json(report: &PageReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Render a page report as text output
pub fn render_text(report: &PageReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n", report.title));
    let until = report
        .until
        .map(|d| d.format("%d-%m-%Y").to_string())
        .unwrap_or_else(|| "none".to_string());
    output.push_str(&format!(
        "orders: {}  cutoff: {}  traffic: {}{}\n",
        report.orders,
        until,
        report.traffic_selection.join(","),
        if report.traffic_filter_applied {
            ""
        } else {
            " (not applied)"
        }
    ));
    let n = &report.normalization;
    output.push_str(&format!(
        "rows read: {}  kept: {}  dropped: {} (age {}, multiple deliveries {}, weather {}, city {}, time taken {})\n",
        n.rows_read,
        n.rows_kept,
        n.rows_dropped(),
        n.missing_age,
        n.missing_multiple_deliveries,
        n.missing_weather,
        n.missing_city,
        n.rejected_time_taken
    ));

    match &report.view {
        PageView::Company(view) => render_company(&mut output, view),
        PageView::Delivery(view) => render_delivery(&mut output, view),
        PageView::Restaurant(view) => render_restaurant(&mut output, view),
    }

    output
}

fn render_company(output: &mut String, view: &CompanyView) {
    section(output, "Orders by day");
    output.push_str(&format!("{:<12} {}\n", "DATE", "ORDERS"));
    for day in &view.orders_per_day {
        output.push_str(&format!("{:<12} {}\n", day.date, day.orders));
    }

    section(output, "Orders by road traffic density");
    output.push_str(&format!("{:<10} {:<8} {}\n", "TRAFFIC", "ORDERS", "SHARE"));
    for share in &view.traffic_share {
        output.push_str(&format!(
            "{:<10} {:<8} {:.2}%\n",
            share.traffic,
            share.orders,
            share.share * 100.0
        ));
    }

    section(output, "Orders by city and type of traffic");
    output.push_str(&format!("{:<16} {:<10} {}\n", "CITY", "TRAFFIC", "ORDERS"));
    for count in &view.orders_by_city_and_traffic {
        output.push_str(&format!(
            "{:<16} {:<10} {}\n",
            truncate_or_pad(&count.city, 16),
            count.traffic,
            count.orders
        ));
    }

    section(output, "Orders by week");
    output.push_str(&format!("{:<6} {}\n", "WEEK", "ORDERS"));
    for week in &view.orders_per_week {
        output.push_str(&format!("{:<6} {}\n", format!("{:02}", week.week), week.orders));
    }

    section(output, "Orders by delivery person by week");
    output.push_str(&format!(
        "{:<6} {:<8} {:<8} {}\n",
        "WEEK", "ORDERS", "PEOPLE", "PER PERSON"
    ));
    for load in &view.orders_per_delivery_person_per_week {
        output.push_str(&format!(
            "{:<6} {:<8} {:<8} {}\n",
            format!("{:02}", load.week),
            load.orders,
            load.delivery_people,
            fmt_num(load.orders_per_delivery_person)
        ));
    }

    section(output, "Median delivery location by city and traffic");
    output.push_str(&format!(
        "{:<16} {:<10} {:<12} {}\n",
        "CITY", "TRAFFIC", "LATITUDE", "LONGITUDE"
    ));
    for location in &view.median_locations {
        output.push_str(&format!(
            "{:<16} {:<10} {:<12.6} {:.6}\n",
            truncate_or_pad(&location.city, 16),
            location.traffic,
            location.latitude,
            location.longitude
        ));
    }
}

fn render_delivery(output: &mut String, view: &DeliveryView) {
    section(output, "Overall metrics");
    output.push_str(&format!("oldest delivery person:   {}\n", fmt_opt(view.oldest_age)));
    output.push_str(&format!("youngest delivery person: {}\n", fmt_opt(view.youngest_age)));
    output.push_str(&format!(
        "best vehicle condition:   {}\n",
        fmt_opt(view.best_vehicle_condition)
    ));
    output.push_str(&format!(
        "worst vehicle condition:  {}\n",
        fmt_opt(view.worst_vehicle_condition)
    ));

    section(output, "Average rating by delivery person");
    output.push_str(&format!("{:<20} {}\n", "DELIVERY PERSON", "RATING"));
    for rating in &view.rating_by_delivery_person {
        output.push_str(&format!(
            "{:<20} {}\n",
            truncate_or_pad(&rating.delivery_person_id, 20),
            fmt_num(rating.mean_rating)
        ));
    }

    section(output, "Rating by type of traffic");
    render_grouped_table(output, &view.rating_by_traffic);

    section(output, "Rating by weather conditions");
    render_grouped_table(output, &view.rating_by_weather);

    section(output, "Fastest delivery people");
    render_ranking(output, &view.fastest);

    section(output, "Slowest delivery people");
    render_ranking(output, &view.slowest);
}

fn render_restaurant(output: &mut String, view: &RestaurantView) {
    section(output, "Overall metrics");
    output.push_str(&format!("delivery people:          {}\n", view.delivery_people));
    output.push_str(&format!(
        "average distance (km):    {}\n",
        fmt_num(view.average_distance_km)
    ));
    output.push_str(&format!(
        "time with festival:       {} ± {}\n",
        fmt_num(view.festival_time.mean),
        fmt_num(view.festival_time.std)
    ));
    output.push_str(&format!(
        "time without festival:    {} ± {}\n",
        fmt_num(view.non_festival_time.mean),
        fmt_num(view.non_festival_time.std)
    ));

    section(output, "Delivery time by city");
    render_time_stats(output, &TimeStatsView::new(&view.time_by_city, RenderMode::Chart));

    section(output, "Delivery time by city and type of order");
    render_time_stats(
        output,
        &TimeStatsView::new(&view.time_by_city_and_order_type, RenderMode::Table),
    );

    section(output, "Average distance by city");
    output.push_str(&format!("{:<16} {}\n", "CITY", "DISTANCE (KM)"));
    for distance in &view.distance_by_city {
        output.push_str(&format!(
            "{:<16} {}\n",
            truncate_or_pad(&distance.city, 16),
            fmt_num(distance.mean_distance_km)
        ));
    }

    section(output, "Delivery time by city and type of traffic");
    render_grouped_table(output, &view.time_by_city_and_traffic);
}

/// Render grouped statistics in either mode
pub fn render_time_stats(output: &mut String, view: &TimeStatsView) {
    match view {
        TimeStatsView::Chart(points) => {
            for point in points {
                let error = point.error.map(fmt_num).unwrap_or_else(|| "n/a".to_string());
                output.push_str(&format!(
                    "{:<32} {:>8} ± {}\n",
                    truncate_or_pad(&point.label, 32),
                    fmt_num(point.value),
                    error
                ));
            }
        }
        TimeStatsView::Table(stats) => render_grouped_table(output, stats),
    }
}

fn render_grouped_table(output: &mut String, stats: &GroupedStats) {
    for dimension in &stats.dimensions {
        output.push_str(&format!("{:<24} ", dimension.column()));
    }
    output.push_str(&format!("{:<6} {:<8} {}\n", "N", "MEAN", "STD"));

    for group in &stats.groups {
        for key in &group.keys {
            output.push_str(&format!("{:<24} ", truncate_or_pad(key, 24)));
        }
        output.push_str(&format!(
            "{:<6} {:<8} {}\n",
            group.count,
            fmt_num(group.mean),
            fmt_num(group.std)
        ));
    }
}

fn render_ranking(output: &mut String, ranked: &[RankedCourier]) {
    output.push_str(&format!(
        "{:<16} {:<20} {}\n",
        "CITY", "DELIVERY PERSON", "MEAN TIME (MIN)"
    ));
    for entry in ranked {
        output.push_str(&format!(
            "{:<16} {:<20} {}\n",
            truncate_or_pad(&entry.city, 16),
            truncate_or_pad(&entry.delivery_person_id, 20),
            fmt_num(entry.mean_time_min)
        ));
    }
}

fn section(output: &mut String, title: &str) {
    output.push_str(&format!("\n## {}\n", title));
}

/// Two decimals, or `n/a` for undefined values
fn fmt_num(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
