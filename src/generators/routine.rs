// ABOUTME: Automatic weekly routine generation from the exercise catalog
// ABOUTME: Splits strength/cardio days by goal and estimates starting loads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Automatic routine generation.
//!
//! A five-day training week is assembled from the catalog: the goal decides
//! the strength/cardio day split, the per-day exercise count, the set/rep
//! scheme and cardio durations. Starting loads for strength work are a
//! fixed share of body weight keyed by name substrings.

use super::GeneratorError;
use crate::models::{Exercise, ExerciseCategory, Goal, GoalType};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Number of training days in a generated week
pub const TRAINING_DAYS: usize = 5;

/// Strength exercises sampled per day, by goal
const STRENGTH_EXERCISES_GAIN: usize = 6;
const STRENGTH_EXERCISES_DEFAULT: usize = 5;

/// Cardio exercises sampled per day (inclusive range)
const CARDIO_EXERCISES_MIN: usize = 2;
const CARDIO_EXERCISES_MAX: usize = 3;

/// Set/rep schemes: gain builds volume, loss favors reps, default balances
const SCHEME_GAIN: (u32, u32) = (4, 8);
const SCHEME_LOSS: (u32, u32) = (3, 12);
const SCHEME_DEFAULT: (u32, u32) = (3, 10);

/// Cardio minutes per exercise, by goal
const CARDIO_MINUTES_LOSS: u32 = 40;
const CARDIO_MINUTES_MAINTAIN: u32 = 30;
const CARDIO_MINUTES_GAIN: u32 = 20;

/// Starting load as a share of body weight, matched by name substring.
/// First match wins; order goes from the most specific lift down.
const LOAD_FACTORS: &[(&str, f64)] = &[
    ("deadlift", 0.9),
    ("squat", 0.8),
    ("bench", 0.6),
    ("press", 0.6),
    ("lunge", 0.6),
    ("row", 0.5),
    ("pulldown", 0.5),
    ("curl", 0.25),
];

/// Fallback load share for unrecognized strength exercises
const LOAD_FACTOR_DEFAULT: f64 = 0.3;

/// Loads are rounded down to the nearest half plate
const LOAD_INCREMENT_KG: f64 = 2.5;

/// What a generated day trains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayFocus {
    Strength,
    Cardio,
}

/// One prescribed exercise in a generated plan
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedExercise {
    pub exercise_id: Uuid,
    pub name: String,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub duration_minutes: Option<u32>,
    /// Estimated starting load; `None` for cardio or unknown body weight
    pub weight_kg: Option<f64>,
}

/// One training day in a generated plan
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDay {
    /// 0 = Monday .. 4 = Friday
    pub day_of_week: u8,
    pub focus: DayFocus,
    pub exercises: Vec<GeneratedExercise>,
}

/// A complete generated training week
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedRoutinePlan {
    pub name: String,
    pub description: String,
    pub days: Vec<GeneratedDay>,
}

/// Day-type pattern for the week: loss trades a strength day for cardio
fn day_pattern(goal_type: GoalType) -> [DayFocus; TRAINING_DAYS] {
    match goal_type {
        GoalType::WeightLoss => [
            DayFocus::Strength,
            DayFocus::Cardio,
            DayFocus::Strength,
            DayFocus::Cardio,
            DayFocus::Cardio,
        ],
        GoalType::WeightGain | GoalType::Maintain => [
            DayFocus::Strength,
            DayFocus::Cardio,
            DayFocus::Strength,
            DayFocus::Cardio,
            DayFocus::Strength,
        ],
    }
}

const fn strength_scheme(goal_type: GoalType) -> (u32, u32) {
    match goal_type {
        GoalType::WeightGain => SCHEME_GAIN,
        GoalType::WeightLoss => SCHEME_LOSS,
        GoalType::Maintain => SCHEME_DEFAULT,
    }
}

const fn cardio_minutes(goal_type: GoalType) -> u32 {
    match goal_type {
        GoalType::WeightLoss => CARDIO_MINUTES_LOSS,
        GoalType::Maintain => CARDIO_MINUTES_MAINTAIN,
        GoalType::WeightGain => CARDIO_MINUTES_GAIN,
    }
}

const fn strength_count(goal_type: GoalType) -> usize {
    match goal_type {
        GoalType::WeightGain => STRENGTH_EXERCISES_GAIN,
        GoalType::WeightLoss | GoalType::Maintain => STRENGTH_EXERCISES_DEFAULT,
    }
}

/// Estimate a starting load for a strength exercise
fn estimate_load(exercise_name: &str, bodyweight_kg: Option<f64>) -> Option<f64> {
    let bodyweight = bodyweight_kg?;
    let lowered = exercise_name.to_lowercase();
    let factor = LOAD_FACTORS
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map_or(LOAD_FACTOR_DEFAULT, |(_, factor)| *factor);

    let raw = bodyweight * factor;
    Some((raw / LOAD_INCREMENT_KG).floor() * LOAD_INCREMENT_KG)
}

/// Generate a five-day routine from the available exercises.
///
/// # Errors
///
/// Returns [`GeneratorError::EmptyPool`] when no exercises are given and
/// [`GeneratorError::MissingCategory`] when either category is absent:
/// every week mixes strength and cardio days, so both pools are required.
pub fn generate_routine(
    exercises: &[Exercise],
    goal: Option<&Goal>,
    bodyweight_kg: Option<f64>,
    rng: &mut impl Rng,
) -> Result<GeneratedRoutinePlan, GeneratorError> {
    if exercises.is_empty() {
        return Err(GeneratorError::EmptyPool);
    }

    let strength_pool: Vec<&Exercise> = exercises
        .iter()
        .filter(|e| e.category == ExerciseCategory::Strength)
        .collect();
    let cardio_pool: Vec<&Exercise> = exercises
        .iter()
        .filter(|e| e.category == ExerciseCategory::Cardio)
        .collect();

    if strength_pool.is_empty() {
        return Err(GeneratorError::MissingCategory("strength"));
    }
    if cardio_pool.is_empty() {
        return Err(GeneratorError::MissingCategory("cardio"));
    }

    let goal_type = goal.map(|g| g.goal_type).unwrap_or_default();
    let (sets, reps) = strength_scheme(goal_type);
    let minutes = cardio_minutes(goal_type);
    let per_day_strength = strength_count(goal_type).min(strength_pool.len());

    let days = day_pattern(goal_type)
        .iter()
        .enumerate()
        .map(|(day_index, focus)| {
            let exercises = match focus {
                DayFocus::Strength => strength_pool
                    .choose_multiple(rng, per_day_strength)
                    .map(|exercise| GeneratedExercise {
                        exercise_id: exercise.id,
                        name: exercise.name.clone(),
                        sets: Some(sets),
                        reps: Some(reps),
                        duration_minutes: None,
                        weight_kg: estimate_load(&exercise.name, bodyweight_kg),
                    })
                    .collect(),
                DayFocus::Cardio => {
                    let count = rng
                        .gen_range(CARDIO_EXERCISES_MIN..=CARDIO_EXERCISES_MAX)
                        .min(cardio_pool.len());
                    cardio_pool
                        .choose_multiple(rng, count)
                        .map(|exercise| GeneratedExercise {
                            exercise_id: exercise.id,
                            name: exercise.name.clone(),
                            sets: None,
                            reps: None,
                            duration_minutes: Some(minutes),
                            weight_kg: None,
                        })
                        .collect()
                }
            };

            GeneratedDay {
                day_of_week: day_index as u8,
                focus: *focus,
                exercises,
            }
        })
        .collect();

    Ok(GeneratedRoutinePlan {
        name: format!("Auto plan ({})", goal_type.as_str().replace('_', " ")),
        description: format!(
            "Generated 5-day week for a {} goal",
            goal_type.as_str().replace('_', " ")
        ),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn exercise(name: &str, category: ExerciseCategory) -> Exercise {
        Exercise {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            category,
            description: None,
            muscle_group: None,
            image_url: None,
            video_url: None,
            is_public: true,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Exercise> {
        vec![
            exercise("Back squat", ExerciseCategory::Strength),
            exercise("Deadlift", ExerciseCategory::Strength),
            exercise("Bench press", ExerciseCategory::Strength),
            exercise("Barbell row", ExerciseCategory::Strength),
            exercise("Overhead press", ExerciseCategory::Strength),
            exercise("Biceps curl", ExerciseCategory::Strength),
            exercise("Plank", ExerciseCategory::Strength),
            exercise("Treadmill run", ExerciseCategory::Cardio),
            exercise("Rowing machine", ExerciseCategory::Cardio),
            exercise("Cycling", ExerciseCategory::Cardio),
        ]
    }

    fn goal(goal_type: GoalType) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            goal_type,
            target_weight_kg: Some(75.0),
            starting_weight_kg: Some(82.0),
            daily_calorie_goal: Some(2200),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_weight_loss_has_fewer_strength_than_cardio_days() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let plan =
            generate_routine(&catalog(), Some(&goal(GoalType::WeightLoss)), Some(80.0), &mut rng)
                .unwrap();

        let strength = plan.days.iter().filter(|d| d.focus == DayFocus::Strength).count();
        let cardio = plan.days.iter().filter(|d| d.focus == DayFocus::Cardio).count();
        assert_eq!(strength, 2);
        assert_eq!(cardio, 3);
        assert!(strength < cardio);
    }

    #[test]
    fn test_gain_goal_uses_hypertrophy_scheme() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let plan =
            generate_routine(&catalog(), Some(&goal(GoalType::WeightGain)), Some(80.0), &mut rng)
                .unwrap();

        let strength_day = plan
            .days
            .iter()
            .find(|d| d.focus == DayFocus::Strength)
            .unwrap();
        assert_eq!(strength_day.exercises.len(), 6);
        for ex in &strength_day.exercises {
            assert_eq!(ex.sets, Some(4));
            assert_eq!(ex.reps, Some(8));
        }
    }

    #[test]
    fn test_single_category_pool_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let strength_only: Vec<Exercise> = catalog()
            .into_iter()
            .filter(|e| e.category == ExerciseCategory::Strength)
            .collect();

        let err = generate_routine(&strength_only, None, None, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::MissingCategory("cardio"));

        let err = generate_routine(&[], None, None, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::EmptyPool);
    }

    #[test]
    fn test_load_estimation_by_name() {
        // 80 kg squat -> 64 kg, rounded down to the 2.5 kg grid
        assert_eq!(estimate_load("Back squat", Some(80.0)), Some(62.5));
        assert_eq!(estimate_load("Deadlift", Some(80.0)), Some(70.0));
        // Unknown exercise falls back to the default share
        assert_eq!(estimate_load("Face pull machine thing", Some(80.0)), Some(22.5));
        // No body weight, no estimate
        assert_eq!(estimate_load("Back squat", None), None);
    }

    #[test]
    fn test_no_duplicate_exercises_within_a_day() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let plan = generate_routine(&catalog(), None, Some(80.0), &mut rng).unwrap();
        for day in &plan.days {
            let mut ids: Vec<Uuid> = day.exercises.iter().map(|e| e.exercise_id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), day.exercises.len());
        }
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let catalog = catalog();
        let mut rng_a = ChaCha8Rng::seed_from_u64(42);
        let mut rng_b = ChaCha8Rng::seed_from_u64(42);

        let plan_a = generate_routine(&catalog, None, Some(80.0), &mut rng_a).unwrap();
        let plan_b = generate_routine(&catalog, None, Some(80.0), &mut rng_b).unwrap();

        let ids_a: Vec<Vec<Uuid>> = plan_a
            .days
            .iter()
            .map(|d| d.exercises.iter().map(|e| e.exercise_id).collect())
            .collect();
        let ids_b: Vec<Vec<Uuid>> = plan_b
            .days
            .iter()
            .map(|d| d.exercises.iter().map(|e| e.exercise_id).collect())
            .collect();
        assert_eq!(ids_a, ids_b);
    }
}
