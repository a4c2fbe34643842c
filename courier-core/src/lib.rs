//! courier core library - cleaning and aggregation for delivery-logistics order exports

#![deny(warnings)]

// Global invariants enforced in this crate:
// - The dataset is read once per run and never written back
// - Normalization is the only place raw text is interpreted
// - Aggregations are pure functions over clean records
// - No global mutable state, no threads, no async
// - Identical input yields byte-for-byte identical output

pub mod aggregates;
pub mod config;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod normalize;
pub mod pipeline;
pub mod ranking;
pub mod record;
pub mod report;
pub mod stats;
pub mod views;

pub use config::ResolvedConfig;
pub use error::NormalizeError;
pub use normalize::{normalize, Normalized, NormalizeSummary};
pub use pipeline::{Dataset, Pipeline};
pub use record::{Dimension, Measure, OrderRecord, RawOrder};
pub use report::{render_json, render_text, PageReport};
pub use views::{Page, PageView};

use anyhow::Result;
use std::path::Path;

/// Load an export, run the pipeline, and assemble one page
pub fn analyze(path: &Path, page: Page, config: &ResolvedConfig) -> Result<PageReport> {
    let pipeline = Pipeline::from_config(config);
    let dataset = pipeline.load(path)?;
    let view = views::build(page, &dataset.records, config.top_n);
    Ok(PageReport::new(
        view,
        &dataset,
        config.until,
        config.traffic.categories(),
    ))
}
