// src/table/write.rs

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::{fs::File, path::Path};
use tracing::{info, instrument};

use super::CombinedDataset;

/// Write `dataset` as comma-separated text with a header row and no index
/// column, replacing any existing file. An empty dataset gives an empty file.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
pub fn write_csv<P: AsRef<Path>>(dataset: &CombinedDataset, path: P) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).with_context(|| format!("creating {:?}", path))?;

    if dataset.columns.is_empty() {
        info!("no columns; wrote empty file");
        return Ok(());
    }

    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
    wtr.write_record(&dataset.columns)
        .with_context(|| format!("writing header to {:?}", path))?;
    for (i, row) in dataset.rows.iter().enumerate() {
        wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))
            .with_context(|| format!("writing row {} to {:?}", i, path))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;

    info!(rows = dataset.rows.len(), columns = dataset.columns.len(), "wrote csv");
    Ok(())
}
