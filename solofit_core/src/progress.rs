//! User progress and its persistence.
//!
//! [`UserProgress`] is the single mutable aggregate: preferences, points,
//! achievements and the archived history. A [`ProgressStore`] loads and
//! saves it. Points never decrease and achievements are only ever added.

use crate::history::HistoryLog;
use crate::{
    Achievement, AchievementType, CompletedSessionRecord, Difficulty, Error, Result,
    WorkoutDuration,
};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// User-facing settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub duration: WorkoutDuration,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
    #[serde(default)]
    pub voice_prompts_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            duration: WorkoutDuration::default(),
            sound_enabled: true,
            vibration_enabled: true,
            voice_prompts_enabled: false,
        }
    }
}

/// Everything persisted about a user
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct UserProgress {
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub achievements: Vec<Achievement>,
    /// Archived sessions in insertion order. Persisted separately as an append log.
    #[serde(skip)]
    pub history: Vec<CompletedSessionRecord>,
}

impl UserProgress {
    /// Types already earned
    pub fn earned_types(&self) -> BTreeSet<AchievementType> {
        self.achievements.iter().map(|a| a.kind).collect()
    }

    pub fn has_earned(&self, kind: AchievementType) -> bool {
        self.achievements.iter().any(|a| a.kind == kind)
    }

    /// Add points. The total only grows.
    pub fn add_points(&mut self, delta: u32) {
        self.total_points = self.total_points.saturating_add(delta);
    }

    /// Record achievements, ignoring any type already held
    ///
    /// Returns how many were actually added.
    pub fn record_achievements(&mut self, achievements: &[Achievement]) -> usize {
        let mut added = 0;
        for achievement in achievements {
            if !self.has_earned(achievement.kind) {
                self.achievements.push(achievement.clone());
                added += 1;
            }
        }
        added
    }

    pub fn archive(&mut self, record: CompletedSessionRecord) {
        self.history.push(record);
    }

    /// Completed (not stopped) sessions in insertion order
    pub fn completed_sessions(&self) -> impl Iterator<Item = &CompletedSessionRecord> {
        self.history.iter().filter(|r| r.completed)
    }

    /// Bulk reset of archived history. Points and achievements are kept.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }
}

/// Persistence provider for [`UserProgress`]
pub trait ProgressStore {
    /// Load progress, falling back to defaults when nothing usable is stored
    fn load(&self) -> Result<UserProgress>;

    /// Persist preferences, points and achievements
    fn save(&mut self, progress: &UserProgress) -> Result<()>;

    /// Append one archived session to the history log
    fn append_session(&mut self, record: &CompletedSessionRecord) -> Result<()>;

    /// Drop every archived session
    fn clear_history(&mut self) -> Result<()>;
}

/// In-memory store, for tests and embedding
#[derive(Clone, Debug, Default)]
pub struct MemoryProgressStore {
    progress: UserProgress,
    history: Vec<CompletedSessionRecord>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress(progress: UserProgress) -> Self {
        Self {
            history: progress.history.clone(),
            progress,
        }
    }

    /// What was last saved, with the appended history attached
    pub fn snapshot(&self) -> UserProgress {
        let mut progress = self.progress.clone();
        progress.history = self.history.clone();
        progress
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self) -> Result<UserProgress> {
        Ok(self.snapshot())
    }

    fn save(&mut self, progress: &UserProgress) -> Result<()> {
        self.progress = progress.clone();
        self.progress.history.clear();
        Ok(())
    }

    fn append_session(&mut self, record: &CompletedSessionRecord) -> Result<()> {
        self.history.push(record.clone());
        Ok(())
    }

    fn clear_history(&mut self) -> Result<()> {
        self.history.clear();
        Ok(())
    }
}

/// File-backed store: `progress.json` plus a `history.jsonl` append log
#[derive(Clone, Debug)]
pub struct FileProgressStore {
    state_path: PathBuf,
    history: HistoryLog,
}

impl FileProgressStore {
    pub fn new(state_path: impl Into<PathBuf>, history_path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: state_path.into(),
            history: HistoryLog::new(history_path),
        }
    }

    /// Standard file names inside a data directory
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(
            data_dir.join("progress.json"),
            data_dir.join("history.jsonl"),
        )
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    pub fn history_path(&self) -> &Path {
        self.history.path()
    }

    /// Load the state file with shared locking
    ///
    /// Returns default state if the file doesn't exist or its contents are
    /// corrupted. Failing to open or read it is an error, so a later save
    /// cannot overwrite progress that was only temporarily unreadable.
    fn load_state(&self) -> Result<UserProgress> {
        let path = &self.state_path;
        if !path.exists() {
            tracing::info!("No progress file found, using defaults");
            return Ok(UserProgress::default());
        }

        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = Vec::new();
        let read = std::io::BufReader::new(&file).read_to_end(&mut contents);
        file.unlock()?;
        read?;

        match serde_json::from_slice::<UserProgress>(&contents) {
            Ok(progress) => {
                tracing::debug!("Loaded progress from {:?}", path);
                Ok(progress)
            }
            Err(e) => {
                tracing::warn!("Failed to parse progress file {:?}: {}. Using defaults.", path, e);
                Ok(UserProgress::default())
            }
        }
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self) -> Result<UserProgress> {
        let mut progress = self.load_state()?;
        progress.history = self.history.read_all()?;
        Ok(progress)
    }

    /// Atomically writes state by writing a temp file, syncing, then renaming
    fn save(&mut self, progress: &UserProgress) -> Result<()> {
        let path = &self.state_path;
        let parent = path
            .parent()
            .ok_or_else(|| Error::Persistence(format!("{:?} has no parent directory", path)))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(progress)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved progress to {:?}", path);
        Ok(())
    }

    fn append_session(&mut self, record: &CompletedSessionRecord) -> Result<()> {
        self.history.append(record)
    }

    fn clear_history(&mut self) -> Result<()> {
        self.history.clear()
    }
}
