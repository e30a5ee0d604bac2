//! Default catalog of exercises.
//!
//! Exercises are grouped by category and gated by a minimum skill tier.
//! Order within a category is significant: the composer walks it greedily.

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Source of exercises for workout composition
///
/// Implementations must be pure and deterministic for fixed inputs.
pub trait CatalogProvider {
    /// Exercises of `category` eligible at `difficulty`, in catalog order
    fn exercises(&self, category: WorkoutCategory, difficulty: Difficulty) -> Vec<Exercise>;
}

/// An ordered, read-only table of exercises
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    exercises: Vec<Exercise>,
}

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

impl Catalog {
    pub fn new(exercises: Vec<Exercise>) -> Self {
        Self { exercises }
    }

    /// All exercises in catalog order
    pub fn all(&self) -> &[Exercise] {
        &self.exercises
    }

    /// Every exercise of a category regardless of tier
    pub fn by_category(&self, category: WorkoutCategory) -> impl Iterator<Item = &Exercise> {
        self.exercises.iter().filter(move |e| e.category == category)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = HashSet::new();

        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push(format!("Exercise '{}' has empty ID", exercise.name));
            } else if !seen.insert((exercise.category, exercise.id.as_str())) {
                errors.push(format!(
                    "Duplicate exercise ID '{}' in {}",
                    exercise.id, exercise.category
                ));
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if exercise.base_duration_seconds == 0 {
                errors.push(format!("Exercise '{}' has zero duration", exercise.id));
            }
        }

        for category in WorkoutCategory::ALL {
            if self.by_category(category).next().is_none() {
                errors.push(format!("Catalog has no {} exercises", category));
            }
        }

        errors
    }
}

impl CatalogProvider for Catalog {
    fn exercises(&self, category: WorkoutCategory, difficulty: Difficulty) -> Vec<Exercise> {
        self.by_category(category)
            .filter(|e| difficulty.admits(e.min_tier))
            .cloned()
            .collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn exercise(
    category: WorkoutCategory,
    id: &str,
    name: &str,
    description: &str,
    seconds: u32,
    min_tier: Difficulty,
    voice_instruction: &str,
    tips: &[&str],
) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        base_duration_seconds: seconds,
        category,
        min_tier,
        tips: tips.iter().map(|t| t.to_string()).collect(),
        voice_instruction: voice_instruction.into(),
    }
}

/// Builds the default catalog with the built-in exercises
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference.
pub fn build_default_catalog() -> Catalog {
    use Difficulty::*;
    use WorkoutCategory::*;

    let exercises = vec![
        // ====================================================================
        // Warm-up
        // ====================================================================
        exercise(
            Warmup,
            "march_in_place",
            "March in Place",
            "Slowly march in place, lifting your knees",
            30,
            Beginner,
            "Let's start with marching in place. Lift your knees higher for a better warm-up.",
            &["Keep your back straight", "Swing your arms naturally"],
        ),
        exercise(
            Warmup,
            "arm_circles",
            "Arm Circles",
            "Make circular motions with your arms forward and backward",
            20,
            Beginner,
            "Now arm circles. 10 forward, 10 backward.",
            &["Relax your shoulders", "Make big, controlled circles"],
        ),
        exercise(
            Warmup,
            "side_bends",
            "Side Bends",
            "Bend to the left and right, stretching your sides",
            25,
            Beginner,
            "Side bends. Breathe deeply and stretch your sides.",
            &["Don't lean forward or back", "Reach for the ceiling"],
        ),
        exercise(
            Warmup,
            "bodyweight_squats",
            "Bodyweight Squats",
            "Do shallow squats with no weight",
            30,
            Intermediate,
            "Bodyweight squats. Keep your knees behind your toes.",
            &["Keep your chest up", "Push through your heels"],
        ),
        exercise(
            Warmup,
            "jumping_jacks",
            "Jumping Jacks",
            "Light jumps to warm up the whole body",
            25,
            Advanced,
            "Finish the warm-up with jumping jacks. Raise your arms up.",
            &["Land softly on your feet", "Keep your core engaged"],
        ),
        // ====================================================================
        // Chest & Arms
        // ====================================================================
        exercise(
            ChestArms,
            "push_ups",
            "Push-ups",
            "Classic push-ups from the floor",
            45,
            Intermediate,
            "Push-ups. Keep your body straight, elbows close to your body.",
            &["Keep your elbows at 45°", "Don't let your hips sag"],
        ),
        exercise(
            ChestArms,
            "knee_push_ups",
            "Knee Push-ups",
            "Easier version of push-ups",
            40,
            Beginner,
            "Knee push-ups. Perfect for beginners.",
            &["Keep your body in a straight line", "Lower your chest to the floor"],
        ),
        exercise(
            ChestArms,
            "plank",
            "Plank",
            "Hold a plank to strengthen your core",
            30,
            Beginner,
            "Plank. Keep your body straight, tighten your abs.",
            &["Don't let your hips drop", "Look down, not forward"],
        ),
        exercise(
            ChestArms,
            "burpees",
            "Burpees",
            "A complex full-body exercise",
            35,
            Advanced,
            "Burpees. Squat, push-up, jump up.",
            &["Land softly", "Explode up on the jump"],
        ),
        exercise(
            ChestArms,
            "clap_push_ups",
            "Clap Push-ups",
            "Explosive push-ups with a clap",
            30,
            Advanced,
            "Clap push-ups. For advanced only!",
            &["Push hard off the ground", "Keep your core tight"],
        ),
        // ====================================================================
        // Legs
        // ====================================================================
        exercise(
            Legs,
            "squats",
            "Squats",
            "Deep squats with proper technique",
            40,
            Beginner,
            "Squats. Keep your knees behind your toes.",
            &["Keep your chest up", "Knees out, not in"],
        ),
        exercise(
            Legs,
            "lunges",
            "Lunges",
            "Alternate lunges forward",
            35,
            Beginner,
            "Lunges. Step forward, back knee to the floor.",
            &[
                "Keep your front knee above your ankle",
                "Don't let your back knee touch the floor",
            ],
        ),
        exercise(
            Legs,
            "jump_squats",
            "Jump Squats",
            "Squat down and jump up explosively",
            30,
            Intermediate,
            "Jump squats. Squat and jump up powerfully.",
            &["Land softly", "Explode up from the bottom"],
        ),
        exercise(
            Legs,
            "calf_raises",
            "Calf Raises",
            "Strengthen your calves",
            25,
            Beginner,
            "Calf raises. Slowly go up and down.",
            &["Pause at the top", "Keep your balance"],
        ),
        exercise(
            Legs,
            "bulgarian_split_squats",
            "Bulgarian Split Squats",
            "Squats with your back leg elevated",
            30,
            Advanced,
            "Bulgarian split squats. Back leg on a chair.",
            &["Keep your torso upright", "Push through your front heel"],
        ),
        // ====================================================================
        // HIIT
        // ====================================================================
        exercise(
            Hiit,
            "burpees",
            "Burpees",
            "Intense full-body exercise",
            30,
            Intermediate,
            "Burpees! Maximum intensity!",
            &["Move fast, but keep form", "Explode up on the jump"],
        ),
        exercise(
            Hiit,
            "jumping_jacks",
            "Jumping Jacks",
            "Jumping with arms and legs apart",
            25,
            Beginner,
            "Jumping jacks! Fast and intense!",
            &["Keep your arms straight", "Land softly"],
        ),
        exercise(
            Hiit,
            "mountain_climbers",
            "Mountain Climbers",
            "Running in place in a plank position",
            35,
            Intermediate,
            "Mountain climbers! Quickly bring your knees to your chest!",
            &["Keep your hips low", "Drive your knees quickly"],
        ),
        exercise(
            Hiit,
            "jump_squats",
            "Jump Squats",
            "Explosive jumps from a squat",
            30,
            Advanced,
            "Jump squats! Maximum power!",
            &["Explode up", "Land softly"],
        ),
        exercise(
            Hiit,
            "clap_push_ups",
            "Clap Push-ups",
            "Explosive push-ups",
            25,
            Advanced,
            "Clap push-ups! Explosive strength!",
            &["Push hard off the ground", "Keep your core tight"],
        ),
        // ====================================================================
        // Stretching
        // ====================================================================
        exercise(
            Stretching,
            "hamstring_stretch",
            "Hamstring Stretch",
            "Bend forward to stretch your hamstrings",
            30,
            Beginner,
            "Hamstring stretch. Keep your knees straight.",
            &["Don't bounce", "Relax your neck"],
        ),
        exercise(
            Stretching,
            "butterfly_stretch",
            "Butterfly Stretch",
            "Stretch your inner thighs by bringing your feet together",
            25,
            Beginner,
            "Butterfly stretch. Bring your feet together and lean forward.",
            &["Keep your back straight", "Gently press your knees down"],
        ),
        exercise(
            Stretching,
            "quad_stretch",
            "Quad Stretch",
            "Standing, pull your heel to your glute",
            20,
            Beginner,
            "Quad stretch. Pull your heel to your glute.",
            &["Keep your knees together", "Stand tall"],
        ),
        exercise(
            Stretching,
            "cat_cow",
            "Cat-Cow",
            "Stretch your back on all fours",
            30,
            Intermediate,
            "Cat-cow. Arch and round your back.",
            &["Move slowly", "Breathe deeply"],
        ),
        exercise(
            Stretching,
            "shoulder_stretch",
            "Shoulder Stretch",
            "Cross-body shoulder stretch",
            20,
            Intermediate,
            "Shoulder stretch. Cross your arms in front of your chest.",
            &["Don't pull too hard", "Relax your shoulders"],
        ),
        // ====================================================================
        // Bedtime Yoga
        // ====================================================================
        exercise(
            Yoga,
            "child_pose",
            "Child's Pose",
            "Relaxing pose for rest",
            45,
            Beginner,
            "Child's pose. Relax and breathe deeply.",
            &["Let your forehead rest on the mat", "Breathe slowly"],
        ),
        exercise(
            Yoga,
            "cat_pose",
            "Cat Pose",
            "Gentle back stretch",
            30,
            Beginner,
            "Cat pose. Round your back, lower your head.",
            &["Move with your breath", "Relax your neck"],
        ),
        exercise(
            Yoga,
            "downward_dog",
            "Downward Dog",
            "Full body stretch",
            40,
            Intermediate,
            "Downward dog. Push your hips back and up.",
            &["Press your heels down", "Spread your fingers wide"],
        ),
        exercise(
            Yoga,
            "warrior_pose",
            "Warrior Pose",
            "Strengthen your legs and balance",
            35,
            Intermediate,
            "Warrior pose. Wide lunge, arms to the sides.",
            &[
                "Keep your front knee above your ankle",
                "Reach through your fingertips",
            ],
        ),
        exercise(
            Yoga,
            "lotus_pose",
            "Lotus Pose",
            "Meditative pose to finish",
            60,
            Advanced,
            "Lotus pose. Sit comfortably, close your eyes, meditate.",
            &["Sit tall", "Relax your shoulders"],
        ),
    ];

    Catalog { exercises }
}
