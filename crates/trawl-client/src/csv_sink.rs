use std::path::{Path, PathBuf};

use trawl_core::error::AppError;
use trawl_core::models::{Record, RecordField};
use trawl_core::traits::RecordSink;

/// Writes each batch to a CSV file, replacing whatever was there.
///
/// The header is the union of the fields present in the batch, in
/// [`RecordField`] order. Records lacking a column get an empty cell.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    fn name(&self) -> &'static str {
        "csv"
    }

    async fn write_batch(&self, records: &[Record]) -> Result<u64, AppError> {
        let path = self.path.clone();
        let records = records.to_vec();

        let written = tokio::task::spawn_blocking(move || write_csv(&path, &records))
            .await
            .map_err(|e| AppError::CsvError(format!("CSV writer task failed: {e}")))??;

        tracing::info!(path = %self.path.display(), rows = written, "Data saved to CSV file");
        Ok(written)
    }
}

fn write_csv(path: &Path, records: &[Record]) -> Result<u64, AppError> {
    let to_err =
        |e: csv::Error| AppError::CsvError(format!("Failed to write {}: {e}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(to_err)?;
    let columns = RecordField::present_in(records);

    if !columns.is_empty() {
        writer
            .write_record(columns.iter().map(RecordField::as_str))
            .map_err(to_err)?;
    }

    for record in records {
        writer
            .write_record(columns.iter().map(|field| record.get(*field).unwrap_or("")))
            .map_err(to_err)?;
    }

    writer
        .flush()
        .map_err(|e| AppError::CsvError(format!("Failed to flush {}: {e}", path.display())))?;

    Ok(records.len() as u64)
}
