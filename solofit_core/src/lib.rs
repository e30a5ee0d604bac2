#![forbid(unsafe_code)]

//! Core domain model and business logic for SoloFit.
//!
//! This crate provides:
//! - Domain types (exercises, workouts, session records, achievements)
//! - The exercise catalog and workout composer
//! - The session engine and its time sources
//! - Achievement and points evaluation
//! - Persistence (progress state, history log, CSV export)
//! - The trainer that ties them together for a host application

pub mod types;
pub mod error;
pub mod catalog;
pub mod composer;
pub mod clock;
pub mod session;
pub mod achievements;
pub mod progress;
pub mod history;
pub mod trainer;
pub mod stats;
pub mod export;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog, CatalogProvider};
pub use composer::{compose, WorkoutRequest};
pub use clock::{Clock, IntervalTicker, ManualClock, StepTicker, SystemClock, TickSource};
pub use session::{format_clock, SessionEngine, SessionEvent, SessionState};
pub use achievements::{evaluate, Evaluation, EvaluationContext};
pub use progress::{FileProgressStore, MemoryProgressStore, Preferences, ProgressStore, UserProgress};
pub use trainer::{SaveStatus, SessionOutcome, Trainer, TrainerEvent};
pub use config::Config;
