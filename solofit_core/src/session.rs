//! Session engine: the per-second countdown state machine for one workout.
//!
//! ```text
//! Idle --start--> Active <--pause/resume--> Paused
//!                   |                         |
//!                   +--advance (last)--> Completed
//!                   +--------stop-------> Stopped <--stop--+
//! ```
//!
//! The engine never looks at a real timer. Something else calls [`SessionEngine::tick`]
//! once per second while the session is active, and stops calling it while paused.

use crate::clock::{Clock, SystemClock};
use crate::{CompletedSessionRecord, Error, Exercise, Result, Workout};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Default remaining-time threshold for countdown notifications
pub const DEFAULT_COUNTDOWN_SECONDS: u32 = 3;

/// Lifecycle state of a session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Active,
    Paused,
    Completed,
    Stopped,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Active => "active",
            SessionState::Paused => "paused",
            SessionState::Completed => "completed",
            SessionState::Stopped => "stopped",
        }
    }

    /// Active or paused: a workout is underway
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Active | SessionState::Paused)
    }

    /// Completed or stopped: the session has been archived
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Stopped)
    }
}

/// Observable changes emitted by the engine
///
/// These exist for the host to drive sound, haptics and display. Nothing in
/// the engine depends on them being handled.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionEvent {
    /// The first exercise is underway
    Started {
        exercise: String,
        duration_seconds: u32,
    },
    /// The current exercise is about to end
    Countdown { remaining_seconds: u32 },
    /// Moved on to the exercise at `index`
    ExerciseAdvanced {
        index: usize,
        exercise: String,
        duration_seconds: u32,
    },
    /// The last exercise finished; the record is ready for archiving
    Completed(CompletedSessionRecord),
    /// The user aborted; the record is ready for archiving
    Stopped(CompletedSessionRecord),
}

/// Runtime state for one workout
#[derive(Debug)]
pub struct SessionEngine<C: Clock = SystemClock> {
    clock: C,
    countdown_seconds: u32,
    state: SessionState,
    workout: Option<Workout>,
    started_at: Option<DateTime<Utc>>,
    current_index: usize,
    remaining_seconds: u32,
    elapsed_seconds: u32,
    progress: f64,
}

impl Default for SessionEngine<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> SessionEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            state: SessionState::Idle,
            workout: None,
            started_at: None,
            current_index: 0,
            remaining_seconds: 0,
            elapsed_seconds: 0,
            progress: 0.0,
        }
    }

    /// Set the countdown threshold (0 disables countdown events)
    pub fn with_countdown(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    /// Begin a workout. Only valid from `Idle`.
    pub fn start(&mut self, workout: Workout) -> Result<SessionEvent> {
        self.require("start", &[SessionState::Idle])?;
        if workout.is_empty() {
            tracing::warn!("Refusing to start empty {} workout", workout.category);
            return Err(Error::EmptyWorkout);
        }

        let first_duration = workout.exercise_duration(0);
        let first_name = workout.exercises[0].name.clone();

        self.started_at = Some(self.clock.now());
        self.current_index = 0;
        self.remaining_seconds = first_duration;
        self.elapsed_seconds = 0;
        self.progress = 0.0;
        self.state = SessionState::Active;

        tracing::info!(
            "Started {} session: {} exercises, {}s",
            workout.category,
            workout.exercises.len(),
            workout.total_duration_seconds
        );
        self.workout = Some(workout);

        Ok(SessionEvent::Started {
            exercise: first_name,
            duration_seconds: first_duration,
        })
    }

    /// Advance the clock by one second
    ///
    /// A no-op while paused. When the current exercise runs out the engine
    /// advances, which may complete the session.
    pub fn tick(&mut self) -> Result<Vec<SessionEvent>> {
        if self.state == SessionState::Paused {
            return Ok(Vec::new());
        }
        self.require("tick", &[SessionState::Active])?;

        let mut events = Vec::new();

        // Zero-length exercise: move on without consuming a second
        if self.remaining_seconds == 0 {
            events.push(self.advance_unchecked()?);
            return Ok(events);
        }

        self.remaining_seconds -= 1;
        self.elapsed_seconds += 1;
        self.recompute_progress();

        tracing::debug!(
            "Tick: exercise {} remaining {}s, elapsed {}s, progress {:.3}",
            self.current_index,
            self.remaining_seconds,
            self.elapsed_seconds,
            self.progress
        );

        if self.remaining_seconds == 0 {
            events.push(self.advance_unchecked()?);
        } else if self.remaining_seconds <= self.countdown_seconds {
            events.push(SessionEvent::Countdown {
                remaining_seconds: self.remaining_seconds,
            });
        }

        Ok(events)
    }

    /// Move to the next exercise, or complete the session after the last one
    ///
    /// Also serves as the manual "skip" action, so it is allowed while paused.
    pub fn advance(&mut self) -> Result<SessionEvent> {
        self.require("advance", &[SessionState::Active, SessionState::Paused])?;
        self.advance_unchecked()
    }

    /// Going back is not supported: the engine keeps no record of time spent
    /// within earlier exercises.
    ///
    /// Unavailable on the first exercise, and a no-op everywhere else.
    pub fn previous(&mut self) -> Result<()> {
        self.require("go back", &[SessionState::Active, SessionState::Paused])?;
        if self.current_index == 0 {
            return Err(Error::NavigationUnavailable(
                "already at the first exercise".into(),
            ));
        }
        tracing::debug!("Ignoring previous-exercise request at {}", self.current_index);
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.require("pause", &[SessionState::Active])?;
        self.state = SessionState::Paused;
        tracing::info!(
            "Paused with {}s remaining on exercise {}",
            self.remaining_seconds,
            self.current_index + 1
        );
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.require("resume", &[SessionState::Paused])?;
        self.state = SessionState::Active;
        tracing::info!(
            "Resumed with {}s remaining on exercise {}",
            self.remaining_seconds,
            self.current_index + 1
        );
        Ok(())
    }

    /// Abort the session. The record is archived with `completed = false`.
    pub fn stop(&mut self) -> Result<SessionEvent> {
        self.require("stop", &[SessionState::Active, SessionState::Paused])?;
        let record = self.archive(false, None)?;
        self.state = SessionState::Stopped;
        tracing::info!("Stopped session after {}s", self.elapsed_seconds);
        Ok(SessionEvent::Stopped(record))
    }

    fn advance_unchecked(&mut self) -> Result<SessionEvent> {
        let workout = self.loaded()?;
        let next = self.current_index + 1;

        if next < workout.exercises.len() {
            let duration = workout.exercise_duration(next);
            let exercise = workout.exercises[next].name.clone();

            self.current_index = next;
            self.remaining_seconds = duration;
            self.recompute_progress();

            tracing::info!("Advanced to exercise {}: {}", next + 1, exercise);
            Ok(SessionEvent::ExerciseAdvanced {
                index: next,
                exercise,
                duration_seconds: duration,
            })
        } else {
            let record = self.archive(true, Some(self.clock.now()))?;
            self.state = SessionState::Completed;
            self.progress = 1.0;

            tracing::info!("Completed session in {}s", self.elapsed_seconds);
            Ok(SessionEvent::Completed(record))
        }
    }

    fn archive(
        &self,
        completed: bool,
        ended_at: Option<DateTime<Utc>>,
    ) -> Result<CompletedSessionRecord> {
        Ok(CompletedSessionRecord {
            id: Uuid::new_v4(),
            workout: self.loaded()?.clone(),
            started_at: self.started_at.unwrap_or_else(|| self.clock.now()),
            ended_at,
            completed,
            duration_seconds: self.elapsed_seconds,
        })
    }

    /// The workout of a running or finished session
    fn loaded(&self) -> Result<&Workout> {
        self.workout.as_ref().ok_or(Error::InvalidTransition {
            operation: "use workout",
            state: self.state.as_str(),
        })
    }

    fn recompute_progress(&mut self) {
        let Some(workout) = self.workout.as_ref() else {
            return;
        };
        if workout.total_duration_seconds == 0 {
            self.progress = 0.0;
            return;
        }

        let current = workout.exercise_duration(self.current_index);
        let done = workout.duration_before(self.current_index)
            + current.saturating_sub(self.remaining_seconds);
        self.progress =
            (f64::from(done) / f64::from(workout.total_duration_seconds)).clamp(0.0, 1.0);
    }

    fn require(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            tracing::warn!("Rejected {} in {} state", operation, self.state.as_str());
            Err(Error::InvalidTransition {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn workout(&self) -> Option<&Workout> {
        self.workout.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.workout
            .as_ref()
            .and_then(|w| w.exercises.get(self.current_index))
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// 1-based position of the current exercise
    pub fn exercise_number(&self) -> usize {
        self.current_index + 1
    }

    pub fn total_exercises(&self) -> usize {
        self.workout.as_ref().map_or(0, |w| w.exercises.len())
    }

    pub fn is_last_exercise(&self) -> bool {
        self.total_exercises() > 0 && self.current_index + 1 == self.total_exercises()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    /// Fraction of the workout's planned time already worked, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.progress
    }
}

/// Format seconds as `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
