use chrono::Local;
use clap::{Parser, Subcommand};
use solofit_core::achievements::longest_streak;
use solofit_core::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "solofit")]
#[command(about = "Solo home workout trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

/// Workout selection shared by `compose` and `start`
#[derive(clap::Args)]
struct WorkoutArgs {
    /// Category (warmup, chest_arms, legs, hiit, stretching, yoga)
    #[arg(long)]
    category: WorkoutCategory,

    /// Difficulty (beginner, intermediate, advanced); defaults to the saved preference
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Target length in minutes; defaults to the saved preference
    #[arg(long)]
    minutes: Option<u32>,

    /// Challenge mode: include every eligible exercise regardless of length
    #[arg(long)]
    challenge: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the workout that would be composed
    Compose {
        #[command(flatten)]
        workout: WorkoutArgs,

        /// Print the workout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose a workout and run it
    Start {
        #[command(flatten)]
        workout: WorkoutArgs,

        /// Run without waiting between ticks
        #[arg(long)]
        fast: bool,

        /// Stop the session after this many seconds
        #[arg(long, value_name = "SECONDS")]
        stop_after: Option<u64>,
    },

    /// List archived sessions, newest first
    History {
        /// Export the history to a CSV file instead
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Show earned and remaining achievements
    Achievements,

    /// Show totals and streaks (default)
    Stats,

    /// Show or change preferences
    Settings {
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Preferred length in minutes (10, 15 or 30)
        #[arg(long, value_parser = parse_duration)]
        duration: Option<WorkoutDuration>,

        #[arg(long, action = clap::ArgAction::Set)]
        sound: Option<bool>,

        #[arg(long, action = clap::ArgAction::Set)]
        vibration: Option<bool>,

        #[arg(long, action = clap::ArgAction::Set)]
        voice: Option<bool>,
    },

    /// Clear session history (points and achievements are kept)
    Reset,

    /// List the exercise catalog
    Catalog {
        #[arg(long)]
        category: Option<WorkoutCategory>,
    },
}

type CliTrainer = Trainer<FileProgressStore, SystemClock>;

fn main() -> ExitCode {
    solofit_core::logging::init_with_level("warn");

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let command = cli.command.unwrap_or(Commands::Stats);
    let open = || open_trainer(&data_dir, &config);

    match command {
        Commands::Catalog { category } => cmd_catalog(category),
        Commands::Compose { workout, json } => cmd_compose(&open()?, &workout, json),
        Commands::Start {
            workout,
            fast,
            stop_after,
        } => cmd_start(&mut open()?, &workout, fast, stop_after, &config),
        Commands::History { csv } => cmd_history(&open()?, csv.as_deref()),
        Commands::Achievements => cmd_achievements(&open()?),
        Commands::Stats => cmd_stats(&open()?),
        Commands::Settings {
            difficulty,
            duration,
            sound,
            vibration,
            voice,
        } => cmd_settings(&mut open()?, difficulty, duration, sound, vibration, voice),
        Commands::Reset => cmd_reset(&mut open()?),
    }
}

fn open_trainer(data_dir: &Path, config: &Config) -> Result<CliTrainer> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::CatalogValidation("Invalid catalog".into()));
    }

    std::fs::create_dir_all(data_dir)?;
    tracing::debug!("Using data directory {:?}", data_dir);

    let store = FileProgressStore::in_dir(data_dir);
    Ok(Trainer::new(store, SystemClock)?.with_countdown(config.session.countdown_seconds))
}

fn parse_duration(s: &str) -> std::result::Result<WorkoutDuration, String> {
    let minutes: u32 = s.parse().map_err(|_| format!("not a number: {}", s))?;
    WorkoutDuration::from_minutes(minutes)
        .ok_or_else(|| format!("duration must be 10, 15 or 30 minutes, got {}", minutes))
}

fn build_request(trainer: &CliTrainer, args: &WorkoutArgs) -> WorkoutRequest {
    let mode = if args.challenge {
        WorkoutMode::Challenge
    } else {
        WorkoutMode::Normal
    };
    let mut request = trainer.preferred_request(args.category, mode);
    if let Some(difficulty) = args.difficulty {
        request.difficulty = difficulty;
    }
    if let Some(minutes) = args.minutes {
        request.target_minutes = minutes;
    }
    request
}

fn cmd_compose(trainer: &CliTrainer, args: &WorkoutArgs, json: bool) -> Result<()> {
    let workout = trainer.compose(build_request(trainer, args));

    if json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
        return Ok(());
    }

    display_workout(&workout);
    if workout.is_empty() {
        println!("  No exercises fit the requested length.");
    }
    Ok(())
}

fn cmd_start(
    trainer: &mut CliTrainer,
    args: &WorkoutArgs,
    fast: bool,
    stop_after: Option<u64>,
    config: &Config,
) -> Result<()> {
    let workout = trainer.compose(build_request(trainer, args));
    display_workout(&workout);

    if let TrainerEvent::Session(SessionEvent::Started {
        exercise,
        duration_seconds,
    }) = trainer.start(workout)?
    {
        println!(
            "▶ 1/{} {} ({})",
            trainer.session().map_or(0, SessionEngine::total_exercises),
            exercise,
            format_clock(duration_seconds)
        );
    }

    let outcome = if fast {
        drive(trainer, StepTicker::unlimited(), stop_after, false)?
    } else {
        let ticker = IntervalTicker::new(config.session.tick_interval());
        drive(trainer, ticker, stop_after, true)?
    };

    display_outcome(&outcome);
    Ok(())
}

/// Run the session to completion, or stop it once `stop_after` ticks have passed
fn drive<T: TickSource>(
    trainer: &mut CliTrainer,
    ticker: T,
    stop_after: Option<u64>,
    live: bool,
) -> Result<SessionOutcome> {
    let mut ticker = Limited::new(ticker, stop_after);
    let completed = trainer.run(&mut ticker, |t, event| display_event(t, event, live))?;

    match completed {
        Some(outcome) => Ok(outcome),
        None => trainer.stop(),
    }
}

fn cmd_history(trainer: &CliTrainer, csv: Option<&Path>) -> Result<()> {
    let history = &trainer.progress().history;

    if let Some(path) = csv {
        let count = export::write_history_csv(history, path)?;
        println!("✓ Exported {} sessions to {}", count, path.display());
        return Ok(());
    }

    if history.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }

    for record in stats::sessions_newest_first(history) {
        let status = if record.completed { "✓" } else { "■" };
        println!(
            "{} {}  {:<13} {:<12} {:<9} {}",
            status,
            record.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            record.workout.category.display_name(),
            record.workout.difficulty.display_name(),
            record.workout.mode.slug(),
            format_clock(record.duration_seconds)
        );
    }
    Ok(())
}

fn cmd_achievements(trainer: &CliTrainer) -> Result<()> {
    let progress = trainer.progress();

    for kind in AchievementType::ALL {
        match progress.achievements.iter().find(|a| a.kind == kind) {
            Some(earned) => println!(
                "🏆 {:<18} earned {}",
                kind.title(),
                earned.earned_at.with_timezone(&Local).format("%Y-%m-%d")
            ),
            None => println!("   {:<18} {}", kind.title(), kind.description()),
        }
    }

    println!();
    println!("Points: {}", progress.total_points);
    if let Some(next) = stats::next_points_badge(progress.total_points) {
        println!("  {} more for {}", next.remaining, next.kind.title());
    }
    Ok(())
}

fn cmd_stats(trainer: &CliTrainer) -> Result<()> {
    let progress = trainer.progress();
    let history = &progress.history;

    println!("Workouts completed: {}", stats::completed_count(history));
    println!(
        "Total time:         {}",
        stats::format_total_time(stats::total_time_minutes(history))
    );
    println!("Points:             {}", progress.total_points);
    println!(
        "Longest streak:     {} days",
        longest_streak(history, trainer.timezone())
    );
    println!(
        "Achievements:       {}/{}",
        progress.achievements.len(),
        AchievementType::ALL.len()
    );

    if let Some(latest) = stats::latest_session(history) {
        println!(
            "Last workout:       {} on {}",
            latest.workout.category.display_name(),
            latest.started_at.with_timezone(&Local).format("%Y-%m-%d")
        );
    }

    let daily = stats::daily_minutes(history, trainer.timezone());
    if !daily.is_empty() {
        println!();
        println!("Recent days:");
        for (day, minutes) in daily.iter().rev().take(7).rev() {
            println!("  {}  {:>3} min", day, minutes);
        }
    }
    Ok(())
}

fn cmd_settings(
    trainer: &mut CliTrainer,
    difficulty: Option<Difficulty>,
    duration: Option<WorkoutDuration>,
    sound: Option<bool>,
    vibration: Option<bool>,
    voice: Option<bool>,
) -> Result<()> {
    let mut statuses = Vec::new();
    if let Some(difficulty) = difficulty {
        statuses.push(trainer.set_difficulty(difficulty));
    }
    if let Some(duration) = duration {
        statuses.push(trainer.set_duration(duration));
    }
    if let Some(enabled) = sound {
        statuses.push(trainer.set_sound(enabled));
    }
    if let Some(enabled) = vibration {
        statuses.push(trainer.set_vibration(enabled));
    }
    if let Some(enabled) = voice {
        statuses.push(trainer.set_voice_prompts(enabled));
    }
    for status in &statuses {
        warn_unsaved(status);
    }

    let prefs = trainer.preferences();
    println!("Difficulty:    {}", prefs.difficulty);
    println!("Duration:      {} min", prefs.duration.minutes());
    println!("Sound:         {}", on_off(prefs.sound_enabled));
    println!("Vibration:     {}", on_off(prefs.vibration_enabled));
    println!("Voice prompts: {}", on_off(prefs.voice_prompts_enabled));
    Ok(())
}

fn cmd_reset(trainer: &mut CliTrainer) -> Result<()> {
    let removed = trainer.progress().history.len();
    let status = trainer.reset_history();
    warn_unsaved(&status);
    println!(
        "✓ Cleared {} sessions (points and achievements kept)",
        removed
    );
    Ok(())
}

fn cmd_catalog(category: Option<WorkoutCategory>) -> Result<()> {
    let catalog = get_default_catalog();
    let categories: Vec<WorkoutCategory> = match category {
        Some(category) => vec![category],
        None => WorkoutCategory::ALL.to_vec(),
    };

    for category in categories {
        println!("{} ({})", category.display_name(), category.slug());
        for exercise in catalog.by_category(category) {
            println!(
                "  {:<24} {:>3}s  {}",
                exercise.name,
                exercise.base_duration_seconds,
                exercise.min_tier.slug()
            );
        }
    }
    Ok(())
}

fn display_workout(workout: &Workout) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  {} · {} · {}",
        workout.name,
        workout.difficulty,
        workout.mode.slug()
    );
    println!("╰─────────────────────────────────────────╯");
    for (i, exercise) in workout.exercises.iter().enumerate() {
        println!(
            "  {}. {:<24} {}",
            i + 1,
            exercise.name,
            format_clock(workout.exercise_duration(i))
        );
    }
    println!(
        "  Total: {} ({} exercises)",
        format_clock(workout.total_duration_seconds),
        workout.exercises.len()
    );
    println!();
}

fn display_event(trainer: &CliTrainer, event: &TrainerEvent, live: bool) {
    match event {
        TrainerEvent::Session(SessionEvent::ExerciseAdvanced {
            index,
            exercise,
            duration_seconds,
        }) => println!(
            "▶ {}/{} {} ({})",
            index + 1,
            trainer.session().map_or(0, SessionEngine::total_exercises),
            exercise,
            format_clock(*duration_seconds)
        ),
        TrainerEvent::Session(SessionEvent::Countdown { remaining_seconds }) if live => {
            println!("  {}…", remaining_seconds)
        }
        TrainerEvent::AchievementUnlocked(achievement) => println!(
            "🏆 Achievement unlocked: {} - {}",
            achievement.kind.title(),
            achievement.kind.description()
        ),
        _ => {}
    }
}

fn display_outcome(outcome: &SessionOutcome) {
    println!();
    if outcome.record.completed {
        println!(
            "✓ Workout complete in {}",
            format_clock(outcome.record.duration_seconds)
        );
        println!(
            "  +{} points (total {})",
            outcome.points_delta, outcome.total_points
        );
    } else {
        println!(
            "■ Workout stopped after {}",
            format_clock(outcome.record.duration_seconds)
        );
    }
    warn_unsaved(&outcome.save);
}

fn warn_unsaved(status: &SaveStatus) {
    if let SaveStatus::Failed(reason) = status {
        eprintln!("Warning: progress was not saved: {}", reason);
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "on"
    } else {
        "off"
    }
}

/// Passes ticks through from `inner` until an optional limit is reached
struct Limited<T> {
    inner: T,
    remaining: Option<u64>,
}

impl<T: TickSource> Limited<T> {
    fn new(inner: T, limit: Option<u64>) -> Self {
        Self {
            inner,
            remaining: limit,
        }
    }
}

impl<T: TickSource> TickSource for Limited<T> {
    fn wait_for_tick(&mut self) -> bool {
        match self.remaining {
            Some(0) => false,
            Some(ref mut n) => {
                *n -= 1;
                self.inner.wait_for_tick()
            }
            None => self.inner.wait_for_tick(),
        }
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}
