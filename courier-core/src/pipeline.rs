//! Load → normalize → filter, shared by every page

use crate::config::ResolvedConfig;
use crate::filter::{self, TrafficSelection};
use crate::loader;
use crate::normalize::{self, NormalizeOptions, NormalizeSummary};
use crate::record::{OrderRecord, RawOrder};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{debug, warn};

/// Settings for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    /// Exclusive upper bound on order date
    pub until: Option<NaiveDate>,
    pub traffic: TrafficSelection,
    /// When false the traffic selection is carried along but not applied
    pub apply_traffic_filter: bool,
    pub normalize: NormalizeOptions,
}

/// Filtered dataset ready for the aggregation functions
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<OrderRecord>,
    pub summary: NormalizeSummary,
    /// Orders removed by the date cutoff
    pub excluded_by_date: usize,
    /// Orders removed by the traffic selection
    pub excluded_by_traffic: usize,
    pub traffic_filter_applied: bool,
}

impl Pipeline {
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Pipeline {
            until: config.until,
            traffic: config.traffic.clone(),
            apply_traffic_filter: config.apply_traffic_filter,
            normalize: NormalizeOptions::default(),
        }
    }

    /// Read an export from disk and run the pipeline over it
    pub fn load(&self, path: &Path) -> Result<Dataset> {
        let raw = loader::load_raw(path)?;
        self.run(raw)
            .with_context(|| format!("failed to normalize {}", path.display()))
    }

    /// Normalize raw rows, then apply the date cutoff and the traffic selection
    pub fn run(&self, raw: Vec<RawOrder>) -> Result<Dataset> {
        let normalized = normalize::normalize_with_options(raw, self.normalize)?;
        let mut records = normalized.records;

        let mut excluded_by_date = 0;
        if let Some(cutoff) = self.until {
            let before = records.len();
            records = filter::before_date(&records, cutoff);
            excluded_by_date = before - records.len();
            debug!(%cutoff, excluded = excluded_by_date, "applied date cutoff");
        }

        let mut excluded_by_traffic = 0;
        if self.apply_traffic_filter {
            let before = records.len();
            records = filter::by_traffic(&records, &self.traffic);
            excluded_by_traffic = before - records.len();
            debug!(excluded = excluded_by_traffic, "applied traffic selection");
        } else if !self.traffic.is_all() {
            warn!(
                selected = ?self.traffic.categories(),
                "traffic selection is not applied to page data; set apply_traffic_filter to restrict it"
            );
        }

        Ok(Dataset {
            records,
            summary: normalized.summary,
            excluded_by_date,
            excluded_by_traffic,
            traffic_filter_applied: self.apply_traffic_filter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::{on, order};

    fn raw() -> Vec<RawOrder> {
        vec![
            RawOrder::from(&on(order("1", "p1", "Urban", "Low", 20), 2022, 3, 1)),
            RawOrder::from(&on(order("2", "p2", "Urban", "Jam", 30), 2022, 4, 1)),
            RawOrder::from(&on(order("3", "p3", "Urban", "Jam", 40), 2022, 4, 10)),
        ]
    }

    #[test]
    fn test_default_pipeline_keeps_everything() {
        let dataset = Pipeline::default().run(raw()).unwrap();
        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.summary.rows_kept, 3);
        assert_eq!(dataset.excluded_by_date, 0);
        assert!(!dataset.traffic_filter_applied);
    }

    #[test]
    fn test_date_cutoff() {
        let pipeline = Pipeline {
            until: NaiveDate::from_ymd_opt(2022, 4, 3),
            ..Pipeline::default()
        };
        let dataset = pipeline.run(raw()).unwrap();
        assert_eq!(dataset.records.len(), 2);
        assert_eq!(dataset.excluded_by_date, 1);
    }

    #[test]
    fn test_narrowed_selection_is_inert_by_default() {
        let pipeline = Pipeline {
            traffic: TrafficSelection::new(&["Low"]).unwrap(),
            ..Pipeline::default()
        };
        let dataset = pipeline.run(raw()).unwrap();
        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.excluded_by_traffic, 0);
    }

    #[test]
    fn test_selection_applied_when_enabled() {
        let pipeline = Pipeline {
            traffic: TrafficSelection::new(&["Low"]).unwrap(),
            apply_traffic_filter: true,
            ..Pipeline::default()
        };
        let dataset = pipeline.run(raw()).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(dataset.records[0].traffic, "Low");
        assert_eq!(dataset.excluded_by_traffic, 2);
        assert!(dataset.traffic_filter_applied);
    }
}
