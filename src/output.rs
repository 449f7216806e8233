use std::path::Path;

use csv::WriterBuilder;

use crate::error::AppError;
use crate::models::job::JobRecord;

const HEADER: [&str; 4] = ["company", "title", "location", "url"];

/// Write records as CSV with a fixed header row, even when there are no
/// records. Returns the number of rows written.
pub fn write_csv<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a JobRecord>,
) -> Result<usize, AppError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(HEADER)?;

    let mut rows = 0;
    for record in records {
        writer.serialize(record)?;
        rows += 1;
    }
    writer.flush()?;

    tracing::info!("Saved {rows} jobs to {}", path.display());
    Ok(rows)
}
