// ABOUTME: Automatic weekly meal plan generation from the food catalog
// ABOUTME: Splits the calorie target by meal and solves per-item quantities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Automatic meal plan generation.
//!
//! The daily calorie target comes from the goal (default 2000 kcal), is
//! split 25/35/30/10 across breakfast/lunch/dinner/snack, and each meal is
//! filled from macro-threshold food buckets. Quantities are solved from the
//! food's per-100g energy and clamped to a plausible gram range.

use super::GeneratorError;
use crate::models::{Food, Goal, GoalType, Meal};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// Days in a generated plan
pub const PLAN_DAYS: usize = 7;

/// Default daily calorie target when the goal does not carry one
pub const DEFAULT_DAILY_KCAL: f64 = 2000.0;

/// Calorie share per meal; must sum to 1.0 across the day
pub const MEAL_SHARES: [(Meal, f64); 4] = [
    (Meal::Breakfast, 0.25),
    (Meal::Lunch, 0.35),
    (Meal::Dinner, 0.30),
    (Meal::Snack, 0.10),
];

/// Bucket thresholds on per-100g macros
const PROTEIN_MIN_G: f64 = 15.0;
const CARB_MIN_G: f64 = 30.0;
const VEGETABLE_MAX_KCAL: f64 = 60.0;
const FAT_MIN_G: f64 = 10.0;

/// Solved quantities are clamped to this gram range
const MIN_QUANTITY_G: f64 = 30.0;
const MAX_QUANTITY_G: f64 = 400.0;

/// Macro split as percentages of daily energy
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MacroSplit {
    pub protein_pct: u8,
    pub carbs_pct: u8,
    pub fat_pct: u8,
}

/// Fixed macro presets by goal
#[must_use]
pub const fn macro_split(goal_type: GoalType) -> MacroSplit {
    match goal_type {
        GoalType::WeightLoss => MacroSplit {
            protein_pct: 40,
            carbs_pct: 30,
            fat_pct: 30,
        },
        GoalType::WeightGain => MacroSplit {
            protein_pct: 30,
            carbs_pct: 50,
            fat_pct: 20,
        },
        GoalType::Maintain => MacroSplit {
            protein_pct: 30,
            carbs_pct: 40,
            fat_pct: 30,
        },
    }
}

/// Food bucket used to compose meals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Protein,
    Carb,
    Vegetable,
    Fat,
}

impl Bucket {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Protein => "protein",
            Self::Carb => "carb",
            Self::Vegetable => "vegetable",
            Self::Fat => "fat",
        }
    }
}

/// Components that make up each meal; every component gets an equal share
/// of the meal's calories
const fn meal_components(meal: Meal) -> &'static [Bucket] {
    match meal {
        Meal::Breakfast => &[Bucket::Carb, Bucket::Protein],
        Meal::Lunch => &[Bucket::Protein, Bucket::Carb, Bucket::Vegetable],
        Meal::Dinner => &[Bucket::Protein, Bucket::Vegetable],
        Meal::Snack => &[Bucket::Fat],
    }
}

/// Candidate foods per bucket for one generation run
struct Buckets<'a> {
    protein: Vec<&'a Food>,
    carb: Vec<&'a Food>,
    vegetable: Vec<&'a Food>,
    fat: Vec<&'a Food>,
}

impl<'a> Buckets<'a> {
    fn build(foods: &'a [Food]) -> Self {
        let mut buckets = Self {
            protein: Vec::new(),
            carb: Vec::new(),
            vegetable: Vec::new(),
            fat: Vec::new(),
        };
        for food in foods {
            match classify(food) {
                Some(Bucket::Protein) => buckets.protein.push(food),
                Some(Bucket::Carb) => buckets.carb.push(food),
                Some(Bucket::Vegetable) => buckets.vegetable.push(food),
                Some(Bucket::Fat) => buckets.fat.push(food),
                None => {}
            }
        }
        buckets
    }

    fn pool(&self, bucket: Bucket) -> Result<&[&'a Food], GeneratorError> {
        let pool: &[&Food] = match bucket {
            Bucket::Protein => &self.protein,
            Bucket::Carb => &self.carb,
            Bucket::Vegetable => &self.vegetable,
            Bucket::Fat => &self.fat,
        };
        if pool.is_empty() {
            return Err(GeneratorError::EmptyBucket(bucket.as_str()));
        }
        Ok(pool)
    }
}

/// Classify a food into the first matching bucket
fn classify(food: &Food) -> Option<Bucket> {
    if food.protein_g >= PROTEIN_MIN_G {
        Some(Bucket::Protein)
    } else if food.carbs_g >= CARB_MIN_G {
        Some(Bucket::Carb)
    } else if food.kcal_per_100g < VEGETABLE_MAX_KCAL {
        Some(Bucket::Vegetable)
    } else if food.fat_g >= FAT_MIN_G {
        Some(Bucket::Fat)
    } else {
        None
    }
}

/// One food with its solved quantity
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMealItem {
    pub food_id: Uuid,
    pub food_name: String,
    pub quantity_g: f64,
    pub kcal: f64,
}

/// One meal slot of a generated day
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMeal {
    pub meal: Meal,
    /// Calorie share this meal should contribute
    pub target_kcal: f64,
    pub items: Vec<GeneratedMealItem>,
}

/// One day of a generated plan
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMealDay {
    /// 0 = Monday .. 6 = Sunday
    pub day_index: u8,
    pub meals: Vec<GeneratedMeal>,
}

/// A complete 7-day meal plan
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedMealPlan {
    pub daily_calorie_target: f64,
    pub macro_split: MacroSplit,
    pub days: Vec<GeneratedMealDay>,
}

/// Generate a 7-day meal plan from the available foods.
///
/// # Errors
///
/// Returns [`GeneratorError::EmptyFoodCatalog`] when no foods are given and
/// [`GeneratorError::EmptyBucket`] when a meal component has no candidates.
pub fn generate_meal_plan(
    foods: &[Food],
    goal: Option<&Goal>,
    rng: &mut impl Rng,
) -> Result<GeneratedMealPlan, GeneratorError> {
    if foods.is_empty() {
        return Err(GeneratorError::EmptyFoodCatalog);
    }

    let buckets = Buckets::build(foods);

    // Fail fast on any bucket a meal will need
    for meal in MEAL_SHARES.iter().map(|(meal, _)| *meal) {
        for bucket in meal_components(meal) {
            buckets.pool(*bucket)?;
        }
    }

    let goal_type = goal.map(|g| g.goal_type).unwrap_or_default();
    let daily_target = goal
        .and_then(|g| g.daily_calorie_goal)
        .map_or(DEFAULT_DAILY_KCAL, f64::from);

    let mut days = Vec::with_capacity(PLAN_DAYS);
    for day_index in 0..PLAN_DAYS {
        let mut meals = Vec::with_capacity(MEAL_SHARES.len());
        for (meal, share) in MEAL_SHARES {
            let target_kcal = daily_target * share;
            let components = meal_components(meal);
            let component_kcal = target_kcal / components.len() as f64;

            let mut items = Vec::with_capacity(components.len());
            for bucket in components {
                let pool = buckets.pool(*bucket)?;
                // Checked non-empty above
                let Some(food) = pool.choose(rng) else { continue };

                let quantity_g = (component_kcal / (food.kcal_per_100g / 100.0))
                    .clamp(MIN_QUANTITY_G, MAX_QUANTITY_G);
                items.push(GeneratedMealItem {
                    food_id: food.id,
                    food_name: food.name.clone(),
                    quantity_g,
                    kcal: food.kcal_for_quantity(quantity_g),
                });
            }

            meals.push(GeneratedMeal {
                meal,
                target_kcal,
                items,
            });
        }

        days.push(GeneratedMealDay {
            day_index: day_index as u8,
            meals,
        });
    }

    Ok(GeneratedMealPlan {
        daily_calorie_target: daily_target,
        macro_split: macro_split(goal_type),
        days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn food(name: &str, kcal: f64, protein: f64, carbs: f64, fat: f64) -> Food {
        Food {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            kcal_per_100g: kcal,
            protein_g: protein,
            carbs_g: carbs,
            fat_g: fat,
            is_public: true,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Food> {
        vec![
            food("Chicken breast", 165.0, 31.0, 0.0, 3.6),
            food("Eggs", 155.0, 13.0, 1.1, 11.0),
            food("White rice", 130.0, 2.7, 28.0, 0.3),
            food("Oats", 380.0, 13.0, 67.0, 7.0),
            food("Pasta", 160.0, 5.8, 31.0, 0.9),
            food("Broccoli", 34.0, 2.8, 7.0, 0.4),
            food("Spinach", 23.0, 2.9, 3.6, 0.4),
            food("Olive oil", 884.0, 0.0, 0.0, 100.0),
            food("Almonds", 579.0, 21.0, 22.0, 50.0),
        ]
    }

    fn goal(goal_type: GoalType, kcal: Option<u32>) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            goal_type,
            target_weight_kg: None,
            starting_weight_kg: None,
            daily_calorie_goal: kcal,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_meal_shares_sum_to_one() {
        let total: f64 = MEAL_SHARES.iter().map(|(_, share)| share).sum();
        assert!((total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_meal_targets_sum_to_daily_target_for_every_goal() {
        for goal_type in [GoalType::WeightLoss, GoalType::WeightGain, GoalType::Maintain] {
            let mut rng = ChaCha8Rng::seed_from_u64(3);
            let plan =
                generate_meal_plan(&catalog(), Some(&goal(goal_type, Some(2200))), &mut rng)
                    .unwrap();

            assert_eq!(plan.days.len(), PLAN_DAYS);
            for day in &plan.days {
                let day_total: f64 = day.meals.iter().map(|m| m.target_kcal).sum();
                assert!((day_total - 2200.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_default_calorie_target() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let plan = generate_meal_plan(&catalog(), None, &mut rng).unwrap();
        assert!((plan.daily_calorie_target - DEFAULT_DAILY_KCAL).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quantities_are_clamped() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let plan = generate_meal_plan(&catalog(), Some(&goal(GoalType::WeightGain, Some(3500))), &mut rng)
            .unwrap();

        for day in &plan.days {
            for meal in &day.meals {
                for item in &meal.items {
                    assert!(item.quantity_g >= MIN_QUANTITY_G);
                    assert!(item.quantity_g <= MAX_QUANTITY_G);
                }
            }
        }
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let err = generate_meal_plan(&[], None, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::EmptyFoodCatalog);
    }

    #[test]
    fn test_missing_bucket_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        // No low-calorie vegetable foods
        let foods = vec![
            food("Chicken breast", 165.0, 31.0, 0.0, 3.6),
            food("Oats", 380.0, 13.0, 67.0, 7.0),
            food("Olive oil", 884.0, 0.0, 0.0, 100.0),
        ];
        let err = generate_meal_plan(&foods, None, &mut rng).unwrap_err();
        assert_eq!(err, GeneratorError::EmptyBucket("vegetable"));
    }

    #[test]
    fn test_macro_presets() {
        let loss = macro_split(GoalType::WeightLoss);
        assert_eq!(loss.protein_pct + loss.carbs_pct + loss.fat_pct, 100);
        let gain = macro_split(GoalType::WeightGain);
        assert_eq!(gain.carbs_pct, 50);
    }
}
