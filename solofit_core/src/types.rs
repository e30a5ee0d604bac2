//! Core domain types for SoloFit.
//!
//! This module defines the values shared across the system:
//! - Categories, difficulty tiers, durations and workout modes
//! - Exercises and composed workouts
//! - Archived session records
//! - Achievements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::Error;

// ============================================================================
// Enumerations
// ============================================================================

/// Workout category. Declaration order is the catalog order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutCategory {
    Warmup,
    ChestArms,
    Legs,
    Hiit,
    Stretching,
    Yoga,
}

impl WorkoutCategory {
    /// Every category, in catalog order
    pub const ALL: [WorkoutCategory; 6] = [
        WorkoutCategory::Warmup,
        WorkoutCategory::ChestArms,
        WorkoutCategory::Legs,
        WorkoutCategory::Hiit,
        WorkoutCategory::Stretching,
        WorkoutCategory::Yoga,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WorkoutCategory::Warmup => "Warm-up",
            WorkoutCategory::ChestArms => "Chest & Arms",
            WorkoutCategory::Legs => "Legs",
            WorkoutCategory::Hiit => "HIIT",
            WorkoutCategory::Stretching => "Stretching",
            WorkoutCategory::Yoga => "Bedtime Yoga",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            WorkoutCategory::Warmup => "warmup",
            WorkoutCategory::ChestArms => "chest_arms",
            WorkoutCategory::Legs => "legs",
            WorkoutCategory::Hiit => "hiit",
            WorkoutCategory::Stretching => "stretching",
            WorkoutCategory::Yoga => "yoga",
        }
    }
}

impl fmt::Display for WorkoutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for WorkoutCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "warmup" | "warm_up" => Ok(WorkoutCategory::Warmup),
            "chest_arms" | "chest_&_arms" | "chest" | "arms" => Ok(WorkoutCategory::ChestArms),
            "legs" => Ok(WorkoutCategory::Legs),
            "hiit" => Ok(WorkoutCategory::Hiit),
            "stretching" | "stretch" => Ok(WorkoutCategory::Stretching),
            "yoga" | "bedtime_yoga" => Ok(WorkoutCategory::Yoga),
            other => Err(Error::Other(format!("Unknown category: {}", other))),
        }
    }
}

/// Skill tier of an exercise, and the difficulty requested for a workout
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Advanced,
    ];

    /// Duration multiplier applied to an exercise's base seconds
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Beginner => 0.8,
            Difficulty::Intermediate => 1.0,
            Difficulty::Advanced => 1.3,
        }
    }

    /// Whether an exercise gated at `tier` is eligible at this difficulty.
    ///
    /// Inclusion is monotonic: a higher difficulty never drops a lower tier.
    pub fn admits(&self, tier: Difficulty) -> bool {
        tier <= *self
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(Error::Other(format!("Unknown difficulty: {}", other))),
        }
    }
}

/// Preset workout lengths offered to the user
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutDuration {
    Short,
    #[default]
    Medium,
    Long,
}

impl WorkoutDuration {
    pub const ALL: [WorkoutDuration; 3] = [
        WorkoutDuration::Short,
        WorkoutDuration::Medium,
        WorkoutDuration::Long,
    ];

    pub fn minutes(&self) -> u32 {
        match self {
            WorkoutDuration::Short => 10,
            WorkoutDuration::Medium => 15,
            WorkoutDuration::Long => 30,
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.minutes() == minutes)
    }
}

/// Whether the duration budget applies
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutMode {
    #[default]
    Normal,
    Challenge,
}

impl WorkoutMode {
    pub fn slug(&self) -> &'static str {
        match self {
            WorkoutMode::Normal => "normal",
            WorkoutMode::Challenge => "challenge",
        }
    }
}

// ============================================================================
// Exercises and Workouts
// ============================================================================

/// A catalog exercise. Never mutated after the catalog is built.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub description: String,
    pub base_duration_seconds: u32,
    pub category: WorkoutCategory,
    pub min_tier: Difficulty,
    #[serde(default)]
    pub tips: Vec<String>,
    pub voice_instruction: String,
}

impl Exercise {
    /// Base duration scaled by the difficulty multiplier, rounded to the nearest second
    pub fn adjusted_duration(&self, difficulty: Difficulty) -> u32 {
        (f64::from(self.base_duration_seconds) * difficulty.multiplier()).round() as u32
    }
}

/// A composed workout. Created once per session start and never mutated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub name: String,
    pub category: WorkoutCategory,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub mode: WorkoutMode,
    pub exercises: Vec<Exercise>,
    pub total_duration_seconds: u32,
}

impl Workout {
    /// Adjusted duration of the exercise at `index`, or 0 when out of range
    pub fn exercise_duration(&self, index: usize) -> u32 {
        self.exercises
            .get(index)
            .map(|e| e.adjusted_duration(self.difficulty))
            .unwrap_or(0)
    }

    /// Sum of adjusted durations of the exercises before `index`
    pub fn duration_before(&self, index: usize) -> u32 {
        (0..index.min(self.exercises.len()))
            .map(|i| self.exercise_duration(i))
            .sum()
    }

    /// A workout with no exercises cannot be started
    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }
}

// ============================================================================
// Session records
// ============================================================================

/// An archived session, appended to history on stop or completion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CompletedSessionRecord {
    pub id: Uuid,
    pub workout: Workout,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
    pub duration_seconds: u32,
}

// ============================================================================
// Achievements
// ============================================================================

/// Achievement kinds. Declaration order is the evaluation order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    FirstWorkout,
    Streak3,
    Streak7,
    AllCategories,
    MondayWarrior,
    ChallengeAccepted,
    Points100,
    Points500,
    Points1000,
}

impl AchievementType {
    pub const ALL: [AchievementType; 9] = [
        AchievementType::FirstWorkout,
        AchievementType::Streak3,
        AchievementType::Streak7,
        AchievementType::AllCategories,
        AchievementType::MondayWarrior,
        AchievementType::ChallengeAccepted,
        AchievementType::Points100,
        AchievementType::Points500,
        AchievementType::Points1000,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AchievementType::FirstWorkout => "First Workout",
            AchievementType::Streak3 => "3-Day Streak",
            AchievementType::Streak7 => "7-Day Streak",
            AchievementType::AllCategories => "All Categories",
            AchievementType::MondayWarrior => "Monday Warrior",
            AchievementType::ChallengeAccepted => "Challenge Accepted",
            AchievementType::Points100 => "100 Points",
            AchievementType::Points500 => "500 Points",
            AchievementType::Points1000 => "1000 Points",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AchievementType::FirstWorkout => "Complete your first workout.",
            AchievementType::Streak3 => "Train 3 days in a row.",
            AchievementType::Streak7 => "Train 7 days in a row.",
            AchievementType::AllCategories => "Complete a workout in every category.",
            AchievementType::MondayWarrior => "Train on a Monday.",
            AchievementType::ChallengeAccepted => "Finish a Challenge mode workout.",
            AchievementType::Points100 => "Earn 100 total points.",
            AchievementType::Points500 => "Earn 500 total points.",
            AchievementType::Points1000 => "Earn 1000 total points.",
        }
    }
}

/// An earned achievement
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub kind: AchievementType,
    pub earned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(seconds: u32) -> Exercise {
        Exercise {
            id: "squats".into(),
            name: "Squats".into(),
            description: String::new(),
            base_duration_seconds: seconds,
            category: WorkoutCategory::Legs,
            min_tier: Difficulty::Beginner,
            tips: vec![],
            voice_instruction: String::new(),
        }
    }

    #[test]
    fn test_adjusted_duration_rounds() {
        let ex = exercise(25);
        assert_eq!(ex.adjusted_duration(Difficulty::Beginner), 20);
        assert_eq!(ex.adjusted_duration(Difficulty::Intermediate), 25);
        // 32.5 rounds away from zero
        assert_eq!(ex.adjusted_duration(Difficulty::Advanced), 33);
        assert_eq!(exercise(35).adjusted_duration(Difficulty::Beginner), 28);
    }

    #[test]
    fn test_tier_admission_is_monotonic() {
        assert!(Difficulty::Beginner.admits(Difficulty::Beginner));
        assert!(!Difficulty::Beginner.admits(Difficulty::Intermediate));
        assert!(Difficulty::Intermediate.admits(Difficulty::Beginner));
        assert!(!Difficulty::Intermediate.admits(Difficulty::Advanced));
        for tier in Difficulty::ALL {
            assert!(Difficulty::Advanced.admits(tier));
        }
    }

    #[test]
    fn test_parse_category_and_difficulty() {
        assert_eq!("legs".parse::<WorkoutCategory>().unwrap(), WorkoutCategory::Legs);
        assert_eq!(
            "Chest-Arms".parse::<WorkoutCategory>().unwrap(),
            WorkoutCategory::ChestArms
        );
        assert!("swimming".parse::<WorkoutCategory>().is_err());
        assert_eq!("ADVANCED".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
    }

    #[test]
    fn test_duration_presets() {
        assert_eq!(WorkoutDuration::from_minutes(30), Some(WorkoutDuration::Long));
        assert_eq!(WorkoutDuration::from_minutes(12), None);
        assert_eq!(WorkoutDuration::default().minutes(), 15);
    }

    #[test]
    fn test_workout_duration_helpers() {
        let workout = Workout {
            name: "Legs".into(),
            category: WorkoutCategory::Legs,
            difficulty: Difficulty::Intermediate,
            mode: WorkoutMode::Normal,
            exercises: vec![exercise(40), exercise(30)],
            total_duration_seconds: 70,
        };
        assert_eq!(workout.exercise_duration(1), 30);
        assert_eq!(workout.exercise_duration(5), 0);
        assert_eq!(workout.duration_before(1), 40);
        assert_eq!(workout.duration_before(9), 70);
    }
}
