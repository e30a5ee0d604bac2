//! Achievement evaluation and points.
//!
//! Runs once per fully completed session. Stopped sessions never earn
//! points or achievements.
//!
//! Rules are a fixed table of independent predicates over a [`Facts`]
//! snapshot. Adding a new achievement means adding a variant and a row;
//! the evaluation loop does not change.

use crate::{Achievement, AchievementType, CompletedSessionRecord, Workout, WorkoutCategory, WorkoutMode};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc, Weekday};
use std::collections::BTreeSet;

/// Points thresholds, lowest first
pub const POINT_BADGES: [(u32, AchievementType); 3] = [
    (100, AchievementType::Points100),
    (500, AchievementType::Points500),
    (1000, AchievementType::Points1000),
];

/// Points earned for completing a workout
///
/// `exercises * 10 + max(1, minutes) * 5 + 20 if challenge`, where minutes
/// is the planned duration in whole minutes (truncated).
pub fn session_points(workout: &Workout) -> u32 {
    let exercises = workout.exercises.len() as u32 * 10;
    let minutes = (workout.total_duration_seconds / 60).max(1) * 5;
    let bonus = match workout.mode {
        WorkoutMode::Challenge => 20,
        WorkoutMode::Normal => 0,
    };
    exercises + minutes + bonus
}

/// Longest run of consecutive local calendar days with a completed session
pub fn longest_streak<Tz: TimeZone>(history: &[CompletedSessionRecord], tz: &Tz) -> u32 {
    let days: BTreeSet<NaiveDate> = history
        .iter()
        .filter(|r| r.completed)
        .map(|r| r.started_at.with_timezone(tz).date_naive())
        .collect();

    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }

    best
}

/// Inputs to one evaluation
#[derive(Clone, Copy, Debug)]
pub struct EvaluationContext<'a> {
    /// Full history, already including `just_finished`
    pub history: &'a [CompletedSessionRecord],
    pub just_finished: &'a CompletedSessionRecord,
    pub already_earned: &'a BTreeSet<AchievementType>,
    /// Running total before this session's points
    pub points_before: u32,
}

/// Result of one evaluation
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Evaluation {
    /// In rule-table order, none of them previously earned
    pub newly_earned: Vec<Achievement>,
    pub points_delta: u32,
    pub total_points: u32,
}

/// Everything the rules look at, computed once per evaluation
#[derive(Clone, Debug)]
pub struct Facts {
    pub completed_sessions: usize,
    pub longest_streak: u32,
    pub categories: BTreeSet<WorkoutCategory>,
    pub finished_weekday: Weekday,
    pub finished_mode: WorkoutMode,
    pub total_points: u32,
}

type Rule = fn(&Facts) -> bool;

/// The rule table. Row order is the order newly earned achievements are reported in.
const RULES: [(AchievementType, Rule); 9] = [
    (AchievementType::FirstWorkout, |f| f.completed_sessions == 1),
    (AchievementType::Streak3, |f| f.longest_streak >= 3),
    (AchievementType::Streak7, |f| f.longest_streak >= 7),
    (AchievementType::AllCategories, |f| {
        WorkoutCategory::ALL.iter().all(|c| f.categories.contains(c))
    }),
    (AchievementType::MondayWarrior, |f| {
        f.finished_weekday == Weekday::Mon
    }),
    (AchievementType::ChallengeAccepted, |f| {
        f.finished_mode == WorkoutMode::Challenge
    }),
    (AchievementType::Points100, |f| f.total_points >= 100),
    (AchievementType::Points500, |f| f.total_points >= 500),
    (AchievementType::Points1000, |f| f.total_points >= 1000),
];

impl Facts {
    pub fn gather<Tz: TimeZone>(ctx: &EvaluationContext<'_>, total_points: u32, tz: &Tz) -> Self {
        let completed = || ctx.history.iter().filter(|r| r.completed);

        Self {
            completed_sessions: completed().count(),
            longest_streak: longest_streak(ctx.history, tz),
            categories: completed().map(|r| r.workout.category).collect(),
            finished_weekday: ctx.just_finished.started_at.with_timezone(tz).weekday(),
            finished_mode: ctx.just_finished.workout.mode,
            total_points,
        }
    }
}

/// Evaluate a just-completed session
///
/// Calendar rules (streaks, Monday) use dates in `tz`. Newly earned
/// achievements carry `now` as their timestamp.
pub fn evaluate<Tz: TimeZone>(
    ctx: &EvaluationContext<'_>,
    tz: &Tz,
    now: DateTime<Utc>,
) -> Evaluation {
    if !ctx.just_finished.completed {
        tracing::warn!(
            "Skipping achievement evaluation for incomplete session {}",
            ctx.just_finished.id
        );
        return Evaluation {
            total_points: ctx.points_before,
            ..Default::default()
        };
    }

    let points_delta = session_points(&ctx.just_finished.workout);
    let total_points = ctx.points_before.saturating_add(points_delta);
    let facts = Facts::gather(ctx, total_points, tz);

    tracing::debug!("Evaluating achievements against {:?}", facts);

    let newly_earned: Vec<Achievement> = RULES
        .iter()
        .filter(|(kind, _)| !ctx.already_earned.contains(kind))
        .filter(|(_, rule)| rule(&facts))
        .map(|(kind, _)| Achievement {
            kind: *kind,
            earned_at: now,
        })
        .collect();

    for achievement in &newly_earned {
        tracing::info!("Achievement unlocked: {}", achievement.kind.title());
    }
    tracing::info!(
        "Session earned {} points (total {})",
        points_delta,
        total_points
    );

    Evaluation {
        newly_earned,
        points_delta,
        total_points,
    }
}
