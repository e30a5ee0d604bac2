//! Host-facing orchestration.
//!
//! A [`Trainer`] owns the user's progress, the store it is persisted to and
//! at most one session. Every archived session is appended to the store;
//! completed ones are also evaluated for points and achievements. Save
//! failures never roll back memory: they are reported in the return value
//! and the next successful save carries the current state.

use crate::achievements::{evaluate, EvaluationContext};
use crate::catalog::{get_default_catalog, Catalog};
use crate::clock::{Clock, SystemClock, TickSource};
use crate::composer::{compose, WorkoutRequest};
use crate::progress::{Preferences, ProgressStore, UserProgress};
use crate::session::{SessionEngine, SessionEvent, SessionState, DEFAULT_COUNTDOWN_SECONDS};
use crate::{
    Achievement, CompletedSessionRecord, Difficulty, Error, Result, Workout, WorkoutCategory,
    WorkoutDuration, WorkoutMode,
};
use chrono::{Local, TimeZone};
use std::collections::VecDeque;

/// Whether the last persistence attempt succeeded
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    Failed(String),
}

impl SaveStatus {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveStatus::Saved)
    }
}

/// Result of archiving a session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionOutcome {
    pub record: CompletedSessionRecord,
    pub points_delta: u32,
    pub total_points: u32,
    /// Empty for stopped sessions
    pub newly_earned: Vec<Achievement>,
    pub save: SaveStatus,
}

/// Notifications for the host (display, sound, haptics)
#[derive(Clone, Debug, PartialEq)]
pub enum TrainerEvent {
    /// Progress within a running session
    Session(SessionEvent),
    AchievementUnlocked(Achievement),
    /// The session was archived, by completion or stop
    Finished(SessionOutcome),
}

/// Ties the composer, session engine, evaluator and store together
pub struct Trainer<S: ProgressStore, C: Clock + Clone = SystemClock, Tz: TimeZone = Local> {
    store: S,
    clock: C,
    tz: Tz,
    catalog: Catalog,
    countdown_seconds: u32,
    progress: UserProgress,
    /// Archived in memory but not yet accepted by the store's history log
    unappended: VecDeque<CompletedSessionRecord>,
    session: Option<SessionEngine<C>>,
}

impl<S: ProgressStore, C: Clock + Clone> Trainer<S, C, Local> {
    /// Load progress from `store`. Calendar rules use the local time zone.
    pub fn new(store: S, clock: C) -> Result<Self> {
        let progress = store.load()?;
        tracing::info!(
            "Loaded progress: {} points, {} achievements, {} sessions",
            progress.total_points,
            progress.achievements.len(),
            progress.history.len()
        );

        Ok(Self {
            store,
            clock,
            tz: Local,
            catalog: get_default_catalog().clone(),
            countdown_seconds: DEFAULT_COUNTDOWN_SECONDS,
            progress,
            unappended: VecDeque::new(),
            session: None,
        })
    }
}

impl<S: ProgressStore, C: Clock + Clone, Tz: TimeZone> Trainer<S, C, Tz> {
    /// Use `tz` for streak and weekday rules
    pub fn with_timezone<T: TimeZone>(self, tz: T) -> Trainer<S, C, T> {
        Trainer {
            store: self.store,
            clock: self.clock,
            tz,
            catalog: self.catalog,
            countdown_seconds: self.countdown_seconds,
            progress: self.progress,
            unappended: self.unappended,
            session: self.session,
        }
    }

    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Countdown threshold for sessions started from now on
    pub fn with_countdown(mut self, seconds: u32) -> Self {
        self.countdown_seconds = seconds;
        self
    }

    // ------------------------------------------------------------------------
    // Composition and session control
    // ------------------------------------------------------------------------

    pub fn compose(&self, request: WorkoutRequest) -> Workout {
        compose(&self.catalog, request)
    }

    /// A request built from the stored difficulty and duration preferences
    pub fn preferred_request(&self, category: WorkoutCategory, mode: WorkoutMode) -> WorkoutRequest {
        WorkoutRequest {
            category,
            difficulty: self.progress.preferences.difficulty,
            target_minutes: self.progress.preferences.duration.minutes(),
            mode,
        }
    }

    /// Start a new session. Fails while another session is running.
    pub fn start(&mut self, workout: Workout) -> Result<TrainerEvent> {
        if let Some(session) = &self.session {
            if session.state().is_running() {
                tracing::warn!("Rejected start while a session is {}", session.state().as_str());
                return Err(Error::InvalidTransition {
                    operation: "start",
                    state: session.state().as_str(),
                });
            }
        }

        let mut session =
            SessionEngine::new(self.clock.clone()).with_countdown(self.countdown_seconds);
        let event = session.start(workout)?;
        self.session = Some(session);
        Ok(TrainerEvent::Session(event))
    }

    /// Compose from preferences and start
    pub fn start_preferred(
        &mut self,
        category: WorkoutCategory,
        mode: WorkoutMode,
    ) -> Result<TrainerEvent> {
        let workout = self.compose(self.preferred_request(category, mode));
        self.start(workout)
    }

    pub fn pause(&mut self) -> Result<()> {
        self.session_mut("pause")?.pause()
    }

    pub fn resume(&mut self) -> Result<()> {
        self.session_mut("resume")?.resume()
    }

    pub fn previous(&mut self) -> Result<()> {
        self.session_mut("go back")?.previous()
    }

    /// Skip to the next exercise; skipping the last one completes the session
    pub fn skip(&mut self) -> Result<Vec<TrainerEvent>> {
        let event = self.session_mut("skip")?.advance()?;
        let mut events = Vec::new();
        self.dispatch(event, &mut events);
        Ok(events)
    }

    /// One second of session time
    pub fn tick(&mut self) -> Result<Vec<TrainerEvent>> {
        let session_events = self.session_mut("tick")?.tick()?;
        let mut events = Vec::new();
        for event in session_events {
            self.dispatch(event, &mut events);
        }
        Ok(events)
    }

    /// Abort the running session. It is archived but earns nothing.
    pub fn stop(&mut self) -> Result<SessionOutcome> {
        let event = self.session_mut("stop")?.stop()?;
        match event {
            SessionEvent::Stopped(record) => Ok(self.finalize(record)),
            other => Err(Error::Other(format!("Unexpected stop event: {:?}", other))),
        }
    }

    /// Tick the session from `ticker` for as long as it stays active
    ///
    /// Returns when the session leaves `Active` (completed, or paused or
    /// stopped from the observer) or the ticker runs out. The outcome is
    /// present only if the session completed during this call.
    pub fn run<T, F>(&mut self, ticker: &mut T, mut observer: F) -> Result<Option<SessionOutcome>>
    where
        T: TickSource,
        F: FnMut(&mut Self, &TrainerEvent),
    {
        ticker.reset();
        let mut outcome = None;

        while self.state() == SessionState::Active {
            if !ticker.wait_for_tick() {
                tracing::debug!("Tick source exhausted");
                break;
            }
            for event in self.tick()? {
                if let TrainerEvent::Finished(finished) = &event {
                    outcome = Some(finished.clone());
                }
                observer(&mut *self, &event);
            }
        }

        Ok(outcome)
    }

    fn dispatch(&mut self, event: SessionEvent, events: &mut Vec<TrainerEvent>) {
        match event {
            SessionEvent::Completed(record) | SessionEvent::Stopped(record) => {
                let outcome = self.finalize(record);
                events.extend(
                    outcome
                        .newly_earned
                        .iter()
                        .cloned()
                        .map(TrainerEvent::AchievementUnlocked),
                );
                events.push(TrainerEvent::Finished(outcome));
            }
            other => events.push(TrainerEvent::Session(other)),
        }
    }

    /// Archive a record, evaluate it if completed, then persist
    fn finalize(&mut self, record: CompletedSessionRecord) -> SessionOutcome {
        self.unappended.push_back(record.clone());
        self.progress.archive(record.clone());

        let mut points_delta = 0;
        let mut newly_earned = Vec::new();

        if record.completed {
            let already_earned = self.progress.earned_types();
            let ctx = EvaluationContext {
                history: &self.progress.history,
                just_finished: &record,
                already_earned: &already_earned,
                points_before: self.progress.total_points,
            };
            let evaluation = evaluate(&ctx, &self.tz, self.clock.now());

            self.progress.add_points(evaluation.points_delta);
            self.progress.record_achievements(&evaluation.newly_earned);
            points_delta = evaluation.points_delta;
            newly_earned = evaluation.newly_earned;
        }

        let save = self.persist();

        SessionOutcome {
            record,
            points_delta,
            total_points: self.progress.total_points,
            newly_earned,
            save,
        }
    }

    // ------------------------------------------------------------------------
    // Preferences and maintenance
    // ------------------------------------------------------------------------

    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> SaveStatus {
        self.update_preferences(|p| p.difficulty = difficulty)
    }

    pub fn set_duration(&mut self, duration: WorkoutDuration) -> SaveStatus {
        self.update_preferences(|p| p.duration = duration)
    }

    pub fn set_sound(&mut self, enabled: bool) -> SaveStatus {
        self.update_preferences(|p| p.sound_enabled = enabled)
    }

    pub fn set_vibration(&mut self, enabled: bool) -> SaveStatus {
        self.update_preferences(|p| p.vibration_enabled = enabled)
    }

    pub fn set_voice_prompts(&mut self, enabled: bool) -> SaveStatus {
        self.update_preferences(|p| p.voice_prompts_enabled = enabled)
    }

    fn update_preferences(&mut self, change: impl FnOnce(&mut Preferences)) -> SaveStatus {
        change(&mut self.progress.preferences);
        tracing::info!("Updated preferences: {:?}", self.progress.preferences);
        self.persist()
    }

    /// Drop archived history. Points and achievements are kept.
    pub fn reset_history(&mut self) -> SaveStatus {
        let removed = self.progress.history.len();
        self.progress.reset_history();
        self.unappended.clear();
        tracing::info!("Reset history ({} sessions removed)", removed);

        if let Err(e) = self.store.clear_history() {
            tracing::warn!("Failed to clear stored history: {}", e);
            return SaveStatus::Failed(e.to_string());
        }
        self.persist()
    }

    /// Write any unappended sessions, then the progress state
    ///
    /// Only reports `Saved` once both are in the store.
    fn persist(&mut self) -> SaveStatus {
        let flushed = self.flush_unappended();
        let saved = match self.store.save(&self.progress) {
            Ok(()) => SaveStatus::Saved,
            Err(e) => {
                tracing::warn!("Failed to save progress, keeping it in memory: {}", e);
                SaveStatus::Failed(e.to_string())
            }
        };

        match flushed {
            Err(e) => SaveStatus::Failed(e.to_string()),
            Ok(()) => saved,
        }
    }

    /// Append pending sessions oldest first, stopping at the first failure
    fn flush_unappended(&mut self) -> Result<()> {
        while let Some(record) = self.unappended.front() {
            if let Err(e) = self.store.append_session(record) {
                tracing::warn!(
                    "Failed to append session {} to history ({} pending): {}",
                    record.id,
                    self.unappended.len(),
                    e
                );
                return Err(e);
            }
            self.unappended.pop_front();
        }
        Ok(())
    }

    fn session_mut(&mut self, operation: &'static str) -> Result<&mut SessionEngine<C>> {
        self.session.as_mut().ok_or(Error::InvalidTransition {
            operation,
            state: SessionState::Idle.as_str(),
        })
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    /// Archived sessions still waiting to reach the store's history log
    pub fn unappended_sessions(&self) -> usize {
        self.unappended.len()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.progress.preferences
    }

    /// The current or most recent session
    pub fn session(&self) -> Option<&SessionEngine<C>> {
        self.session.as_ref()
    }

    /// `Idle` until a session has been started
    pub fn state(&self) -> SessionState {
        self.session
            .as_ref()
            .map_or(SessionState::Idle, SessionEngine::state)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }
}
