//! CSV export of archived sessions.

use crate::{CompletedSessionRecord, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    category: &'static str,
    difficulty: &'static str,
    mode: &'static str,
    exercises: usize,
    planned_seconds: u32,
    started_at: String,
    ended_at: Option<String>,
    completed: bool,
    duration_seconds: u32,
}

impl From<&CompletedSessionRecord> for CsvRow {
    fn from(record: &CompletedSessionRecord) -> Self {
        CsvRow {
            id: record.id.to_string(),
            category: record.workout.category.slug(),
            difficulty: record.workout.difficulty.slug(),
            mode: record.workout.mode.slug(),
            exercises: record.workout.exercises.len(),
            planned_seconds: record.workout.total_duration_seconds,
            started_at: record.started_at.to_rfc3339(),
            ended_at: record.ended_at.map(|t| t.to_rfc3339()),
            completed: record.completed,
            duration_seconds: record.duration_seconds,
        }
    }
}

/// Write every record to `path` as CSV with a header row
///
/// The file is replaced, not appended to. Returns the number of rows written.
pub fn write_history_csv(records: &[CompletedSessionRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} sessions to {:?}", records.len(), path);
    Ok(records.len())
}
