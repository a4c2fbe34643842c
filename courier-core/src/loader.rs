//! CSV input and the clean export

use crate::record::{OrderRecord, RawOrder};
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Read every row of an order export from disk
pub fn load_raw(path: &Path) -> Result<Vec<RawOrder>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open order export: {}", path.display()))?;
    let rows = read_raw(file).with_context(|| format!("failed to read {}", path.display()))?;
    debug!(path = %path.display(), rows = rows.len(), "loaded order export");
    Ok(rows)
}

/// Read raw rows from any CSV source with a header line
pub fn read_raw<R: Read>(reader: R) -> Result<Vec<RawOrder>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::None)
        .from_reader(reader);

    let mut rows = Vec::new();
    for (index, result) in csv_reader.deserialize::<RawOrder>().enumerate() {
        let row = result.with_context(|| format!("malformed CSV data at row {}", index + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write clean records in the export's column layout.
///
/// The output can be loaded and normalized again without changes.
pub fn write_clean<W: Write>(writer: W, records: &[OrderRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer
            .serialize(RawOrder::from(record))
            .with_context(|| format!("failed to write order {}", record.id))?;
    }
    csv_writer.flush().context("failed to flush clean export")?;
    Ok(())
}

/// Write clean records to a file, replacing it if present
pub fn write_clean_file(path: &Path, records: &[OrderRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    write_clean(file, records)?;
    debug!(path = %path.display(), rows = records.len(), "wrote clean export");
    Ok(())
}
