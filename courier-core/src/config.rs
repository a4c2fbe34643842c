//! Configuration file support for courier
//!
//! Loads dashboard settings from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.courierrc.json` in the working directory
//! 3. `courier.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::filter::TrafficSelection;
use crate::normalize::parse_order_date;
use crate::ranking::DEFAULT_TOP_N;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// courier configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourierConfig {
    /// Order export to read when no path is given on the command line
    #[serde(default)]
    pub data: Option<PathBuf>,

    /// Exclusive date cutoff in `DD-MM-YYYY` form
    #[serde(default)]
    pub until: Option<String>,

    /// Traffic densities picked in the traffic selection (default: all four)
    #[serde(default)]
    pub traffic: Option<Vec<String>>,

    /// Restrict pages to the traffic selection (default: false, selection is informational)
    #[serde(default)]
    pub apply_traffic_filter: bool,

    /// Delivery people listed per city in the speed rankings (default: 10)
    #[serde(default)]
    pub top: Option<usize>,
}

/// Resolved configuration with parsed values
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub data: Option<PathBuf>,
    pub until: Option<NaiveDate>,
    pub traffic: TrafficSelection,
    pub apply_traffic_filter: bool,
    pub top_n: usize,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl CourierConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref until) = self.until {
            if parse_order_date(until).is_none() {
                anyhow::bail!("until must be a DD-MM-YYYY date (got {:?})", until);
            }
        }

        if let Some(ref traffic) = self.traffic {
            if traffic.is_empty() {
                anyhow::bail!("traffic must select at least one category");
            }
            TrafficSelection::new(traffic).context("invalid traffic selection")?;
        }

        if let Some(top) = self.top {
            if top == 0 {
                anyhow::bail!("top must be at least 1 (got {})", top);
            }
        }

        Ok(())
    }

    /// Resolve config into parsed form ready for use
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let until = self.until.as_deref().and_then(parse_order_date);
        let traffic = match &self.traffic {
            Some(categories) => TrafficSelection::new(categories)?,
            None => TrafficSelection::default(),
        };

        Ok(ResolvedConfig {
            data: self.data.clone(),
            until,
            traffic,
            apply_traffic_filter: self.apply_traffic_filter,
            top_n: self.top.unwrap_or(DEFAULT_TOP_N),
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        CourierConfig::default().resolve()
    }
}

/// Discover and load a config file from the project root
///
/// Search order:
/// 1. `.courierrc.json`
/// 2. `courier.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(project_root: &Path) -> Result<Option<(CourierConfig, PathBuf)>> {
    for name in [".courierrc.json", "courier.config.json"] {
        let path = project_root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<CourierConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: CourierConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config for a project
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config from the project root.
/// Returns default config if nothing is found.
pub fn load_and_resolve(project_root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(project_root)? {
            Some((config, path)) => (config, Some(path)),
            None => (CourierConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = CourierConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert!(resolved.data.is_none());
        assert!(resolved.until.is_none());
        assert!(resolved.traffic.is_all());
        assert!(!resolved.apply_traffic_filter);
        assert_eq!(resolved.top_n, 10);
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "data": "data/train.csv",
            "until": "03-04-2022",
            "traffic": ["Low", "Jam"],
            "apply_traffic_filter": true,
            "top": 5
        }"#;
        let config: CourierConfig = serde_json::from_str(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.data, Some(PathBuf::from("data/train.csv")));
        assert_eq!(resolved.until, NaiveDate::from_ymd_opt(2022, 4, 3));
        assert_eq!(resolved.traffic.categories(), &["Low", "Jam"]);
        assert!(resolved.apply_traffic_filter);
        assert_eq!(resolved.top_n, 5);
    }

    #[test]
    fn test_reject_unknown_fields() {
        let json = r#"{"unknown_field": true}"#;
        let result: Result<CourierConfig, _> = serde_json::from_str(json);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_iso_until() {
        let json = r#"{"until": "2022-04-03"}"#;
        let config: CourierConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unknown_traffic() {
        let json = r#"{"traffic": ["Low", "Gridlock"]}"#;
        let config: CourierConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_empty_traffic() {
        let json = r#"{"traffic": []}"#;
        let config: CourierConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_zero_top() {
        let json = r#"{"top": 0}"#;
        let config: CourierConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discover_courierrc() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".courierrc.json");
        fs::write(&config_path, r#"{"top": 3}"#).unwrap();

        let (config, path) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.top, Some(3));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".courierrc.json"), r#"{"top": 1}"#).unwrap();
        fs::write(dir.path().join("courier.config.json"), r#"{"top": 2}"#).unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.top, Some(1), ".courierrc.json should take priority");
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"until": "01-03-2022"}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.until, NaiveDate::from_ymd_opt(2022, 3, 1));
        assert_eq!(resolved.config_path, Some(config_path));
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert!(resolved.config_path.is_none());
        assert_eq!(resolved.top_n, 10);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("courier.config.json");
        fs::write(&config_path, r#"{"top": 0}"#).unwrap();
        let err = load_and_resolve(dir.path(), None).unwrap_err();
        assert!(format!("{:#}", err).contains("courier.config.json"));
    }
}
