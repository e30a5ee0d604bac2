//! Append-only session history log.
//!
//! Archived sessions are appended to a JSONL (JSON Lines) file with file
//! locking to ensure safe concurrent access. Entries are never edited; the
//! only removal is a bulk [`HistoryLog::clear`].

use crate::{CompletedSessionRecord, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// JSONL-backed history log
#[derive(Clone, Debug)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one record as a JSON line
    pub fn append(&self, record: &CompletedSessionRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended session {} to history", record.id);
        Ok(())
    }

    /// Read every record in insertion order
    ///
    /// Unparseable lines (e.g. a torn final write or stray non-UTF-8 bytes)
    /// are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<CompletedSessionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let mut reader = BufReader::new(&file);
        let mut records = Vec::new();
        let mut buf = Vec::new();
        let mut line_num = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_num += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    tracing::warn!("Skipping non-UTF-8 history line {}: {}", line_num, e);
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<CompletedSessionRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse history line {}: {}", line_num, e);
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} sessions from history", records.len());
        Ok(records)
    }

    /// Remove every record
    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }

        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.lock_exclusive()?;
        file.set_len(0)?;
        file.sync_all()?;
        file.unlock()?;

        tracing::info!("Cleared history at {:?}", self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Difficulty, Workout, WorkoutCategory, WorkoutMode};
    use chrono::Utc;
    use uuid::Uuid;

    fn create_test_record(completed: bool) -> CompletedSessionRecord {
        CompletedSessionRecord {
            id: Uuid::new_v4(),
            workout: Workout {
                name: "Yoga".into(),
                category: WorkoutCategory::Yoga,
                difficulty: Difficulty::Beginner,
                mode: WorkoutMode::Normal,
                exercises: vec![],
                total_duration_seconds: 300,
            },
            started_at: Utc::now(),
            ended_at: completed.then(Utc::now),
            completed,
            duration_seconds: 300,
        }
    }

    #[test]
    fn test_append_and_read_preserves_order() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(temp_dir.path().join("history.jsonl"));

        let first = create_test_record(true);
        let second = create_test_record(false);
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].id, second.id);
        assert!(!records[1].completed);
    }

    #[test]
    fn test_read_missing_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(temp_dir.path().join("nonexistent.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
        log.clear().unwrap();
    }

    #[test]
    fn test_corrupted_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");
        let log = HistoryLog::new(&path);

        log.append(&create_test_record(true)).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{ not json").unwrap();
        write!(file, r#"{{"id":"partial"#).unwrap();
        drop(file);

        assert_eq!(log.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_non_utf8_lines_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");
        let log = HistoryLog::new(&path);

        let first = create_test_record(true);
        log.append(&first).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\xff\xfe garbage\n").unwrap();
        drop(file);
        let last = create_test_record(false);
        log.append(&last).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, first.id);
        assert_eq!(records[1].id, last.id);
    }

    #[test]
    fn test_clear_empties_log() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(temp_dir.path().join("nested/history.jsonl"));

        for _ in 0..3 {
            log.append(&create_test_record(true)).unwrap();
        }
        log.clear().unwrap();
        assert!(log.read_all().unwrap().is_empty());

        log.append(&create_test_record(true)).unwrap();
        assert_eq!(log.read_all().unwrap().len(), 1);
    }
}
