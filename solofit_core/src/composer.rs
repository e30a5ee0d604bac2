//! Workout composition from the exercise catalog.
//!
//! Selection is greedy over the catalog order with no reordering, so the
//! same catalog, category and difficulty always yield the same workout.

use crate::catalog::CatalogProvider;
use crate::{Difficulty, Workout, WorkoutCategory, WorkoutMode};

/// Parameters for a single composition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkoutRequest {
    pub category: WorkoutCategory,
    pub difficulty: Difficulty,
    pub target_minutes: u32,
    pub mode: WorkoutMode,
}

/// Compose a workout for the request
///
/// ## Selection
///
/// 1. Take the category's exercises eligible at the requested difficulty.
/// 2. **Normal** mode: accept an exercise only while the running total plus
///    its adjusted duration stays within `target_minutes * 60`; stop at the
///    first one that does not fit, or once the budget is reached.
/// 3. **Challenge** mode: accept every eligible exercise.
///
/// Never fails. A workout with no exercises is the signal that nothing fit;
/// the session engine refuses to start it.
pub fn compose(catalog: &impl CatalogProvider, request: WorkoutRequest) -> Workout {
    let WorkoutRequest {
        category,
        difficulty,
        target_minutes,
        mode,
    } = request;

    let budget = target_minutes.saturating_mul(60);
    let candidates = catalog.exercises(category, difficulty);

    let mut selected = Vec::with_capacity(candidates.len());
    let mut total = 0u32;

    for exercise in candidates {
        let duration = exercise.adjusted_duration(difficulty);

        match mode {
            WorkoutMode::Challenge => {
                total += duration;
                selected.push(exercise);
            }
            WorkoutMode::Normal => {
                if total + duration > budget {
                    break;
                }
                total += duration;
                selected.push(exercise);
                if total >= budget {
                    break;
                }
            }
        }
    }

    if selected.is_empty() {
        tracing::warn!(
            "Composed empty {} workout ({}, {} min, {:?})",
            category,
            difficulty,
            target_minutes,
            mode
        );
    } else {
        tracing::info!(
            "Composed {} workout: {} exercises, {}s of {}s budget ({:?})",
            category,
            selected.len(),
            total,
            budget,
            mode
        );
    }

    Workout {
        name: category.display_name().to_string(),
        category,
        difficulty,
        mode,
        exercises: selected,
        total_duration_seconds: total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{get_default_catalog, Catalog};
    use crate::Exercise;

    fn request(
        category: WorkoutCategory,
        difficulty: Difficulty,
        target_minutes: u32,
        mode: WorkoutMode,
    ) -> WorkoutRequest {
        WorkoutRequest {
            category,
            difficulty,
            target_minutes,
            mode,
        }
    }

    fn ids(workout: &Workout) -> Vec<&str> {
        workout.exercises.iter().map(|e| e.id.as_str()).collect()
    }

    fn custom_catalog(seconds: &[u32]) -> Catalog {
        Catalog::new(
            seconds
                .iter()
                .enumerate()
                .map(|(i, s)| Exercise {
                    id: format!("ex{}", i),
                    name: format!("Exercise {}", i),
                    description: String::new(),
                    base_duration_seconds: *s,
                    category: WorkoutCategory::Hiit,
                    min_tier: Difficulty::Beginner,
                    tips: vec![],
                    voice_instruction: String::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_beginner_legs_ten_minutes() {
        let workout = compose(
            get_default_catalog(),
            request(WorkoutCategory::Legs, Difficulty::Beginner, 10, WorkoutMode::Normal),
        );

        assert_eq!(ids(&workout), vec!["squats", "lunges", "calf_raises"]);
        assert_eq!(workout.total_duration_seconds, 32 + 28 + 20);
        assert_eq!(workout.name, "Legs");
    }

    #[test]
    fn test_normal_mode_stays_within_budget() {
        let catalog = get_default_catalog();
        for category in WorkoutCategory::ALL {
            for difficulty in Difficulty::ALL {
                for minutes in [1, 2, 3, 10] {
                    let workout =
                        compose(catalog, request(category, difficulty, minutes, WorkoutMode::Normal));
                    assert!(workout.total_duration_seconds <= minutes * 60);
                    let sum: u32 = (0..workout.exercises.len())
                        .map(|i| workout.exercise_duration(i))
                        .sum();
                    assert_eq!(sum, workout.total_duration_seconds);
                }
            }
        }
    }

    #[test]
    fn test_stops_at_first_exercise_that_does_not_fit() {
        // 60 + 50 = 110 fits; 70 would overflow 120 so selection ends,
        // even though the trailing 10 would still fit.
        let catalog = custom_catalog(&[60, 50, 70, 10]);
        let workout = compose(
            &catalog,
            request(WorkoutCategory::Hiit, Difficulty::Intermediate, 2, WorkoutMode::Normal),
        );
        assert_eq!(ids(&workout), vec!["ex0", "ex1"]);
        assert_eq!(workout.total_duration_seconds, 110);
    }

    #[test]
    fn test_stops_once_budget_reached() {
        let catalog = custom_catalog(&[30, 30, 10]);
        let workout = compose(
            &catalog,
            request(WorkoutCategory::Hiit, Difficulty::Intermediate, 1, WorkoutMode::Normal),
        );
        assert_eq!(ids(&workout), vec!["ex0", "ex1"]);
        assert_eq!(workout.total_duration_seconds, 60);
    }

    #[test]
    fn test_first_exercise_over_budget_yields_empty_workout() {
        let catalog = custom_catalog(&[90, 10]);
        let workout = compose(
            &catalog,
            request(WorkoutCategory::Hiit, Difficulty::Intermediate, 1, WorkoutMode::Normal),
        );
        assert!(workout.is_empty());
        assert_eq!(workout.total_duration_seconds, 0);
    }

    #[test]
    fn test_challenge_ignores_budget() {
        let catalog = get_default_catalog();
        for category in WorkoutCategory::ALL {
            for difficulty in Difficulty::ALL {
                let workout =
                    compose(catalog, request(category, difficulty, 0, WorkoutMode::Challenge));
                assert_eq!(
                    workout.exercises,
                    catalog.exercises(category, difficulty),
                    "challenge must include every eligible exercise"
                );
                assert_eq!(workout.mode, WorkoutMode::Challenge);
            }
        }
    }

    #[test]
    fn test_advanced_is_superset_of_lower_tiers() {
        let catalog = get_default_catalog();
        for category in WorkoutCategory::ALL {
            let lower: Vec<Workout> = [Difficulty::Beginner, Difficulty::Intermediate]
                .into_iter()
                .map(|d| compose(catalog, request(category, d, 0, WorkoutMode::Challenge)))
                .collect();
            let advanced = compose(
                catalog,
                request(category, Difficulty::Advanced, 0, WorkoutMode::Challenge),
            );
            let advanced_ids = ids(&advanced);
            for workout in &lower {
                for id in ids(workout) {
                    assert!(advanced_ids.contains(&id));
                }
            }
        }
    }

    #[test]
    fn test_composition_is_deterministic() {
        let catalog = get_default_catalog();
        let req = request(WorkoutCategory::Yoga, Difficulty::Advanced, 2, WorkoutMode::Normal);
        assert_eq!(compose(catalog, req), compose(catalog, req));
    }
}
