//! Dataset filters applied once, upstream of the aggregation functions

use crate::record::{OrderRecord, TRAFFIC_CATEGORIES};
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Keep orders placed strictly before `cutoff`
pub fn before_date(records: &[OrderRecord], cutoff: NaiveDate) -> Vec<OrderRecord> {
    records
        .iter()
        .filter(|r| r.order_date < cutoff)
        .cloned()
        .collect()
}

/// Traffic densities picked in the traffic multi-select
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSelection {
    categories: Vec<String>,
}

impl Default for TrafficSelection {
    /// Every known category, as the multi-select starts out
    fn default() -> Self {
        TrafficSelection {
            categories: TRAFFIC_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl TrafficSelection {
    /// Build a selection from category names; unknown names are rejected
    pub fn new<S: AsRef<str>>(categories: &[S]) -> Result<Self> {
        let mut selected = Vec::new();
        for category in categories {
            let category = category.as_ref().trim();
            if !TRAFFIC_CATEGORIES.contains(&category) {
                anyhow::bail!(
                    "unknown traffic category {:?} (expected one of: {})",
                    category,
                    TRAFFIC_CATEGORIES.join(", ")
                );
            }
            if !selected.iter().any(|s: &String| s == category) {
                selected.push(category.to_string());
            }
        }
        Ok(TrafficSelection {
            categories: selected,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn contains(&self, traffic: &str) -> bool {
        self.categories.iter().any(|c| c == traffic)
    }

    /// True when every known category is selected
    pub fn is_all(&self) -> bool {
        TRAFFIC_CATEGORIES.iter().all(|c| self.contains(c))
    }
}

/// Keep orders whose traffic density is in the selection
pub fn by_traffic(records: &[OrderRecord], selection: &TrafficSelection) -> Vec<OrderRecord> {
    records
        .iter()
        .filter(|r| selection.contains(&r.traffic))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::testing::{on, order};

    #[test]
    fn test_before_date_is_exclusive() {
        let records = vec![
            on(order("1", "p", "Urban", "Low", 10), 2022, 4, 2),
            on(order("2", "p", "Urban", "Low", 10), 2022, 4, 3),
            on(order("3", "p", "Urban", "Low", 10), 2022, 4, 4),
        ];
        let cutoff = NaiveDate::from_ymd_opt(2022, 4, 3).unwrap();
        let kept = before_date(&records, cutoff);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "1");
    }

    #[test]
    fn test_default_selection_is_all_categories() {
        let selection = TrafficSelection::default();
        assert!(selection.is_all());
        assert_eq!(selection.categories(), &["Low", "Medium", "High", "Jam"]);
    }

    #[test]
    fn test_selection_rejects_unknown_category() {
        let err = TrafficSelection::new(&["Low", "Gridlock"]).unwrap_err();
        assert!(err.to_string().contains("Gridlock"));
    }

    #[test]
    fn test_selection_dedups_and_trims() {
        let selection = TrafficSelection::new(&["Jam ", "Jam", "Low"]).unwrap();
        assert_eq!(selection.categories(), &["Jam", "Low"]);
        assert!(!selection.is_all());
    }

    #[test]
    fn test_by_traffic() {
        let records = vec![
            order("1", "p", "Urban", "Low", 10),
            order("2", "p", "Urban", "Jam", 10),
            order("3", "p", "Urban", "High", 10),
        ];
        let selection = TrafficSelection::new(&["Jam", "High"]).unwrap();
        let kept = by_traffic(&records, &selection);
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }
}
