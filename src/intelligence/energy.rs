// ABOUTME: Energy expenditure calculations for onboarding
// ABOUTME: Mifflin-St Jeor BMR plus activity-multiplier TDEE
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! BMR / TDEE calculations.
//!
//! Onboarding derives the default daily calorie goal from these numbers:
//! TDEE minus 500 kcal for loss, plus 300 kcal for gain, unchanged for
//! maintenance.

use crate::models::{ActivityLevel, GoalType, Sex};
use serde::Serialize;

/// Calorie adjustment applied to TDEE for a loss goal
pub const LOSS_ADJUSTMENT_KCAL: f64 = -500.0;
/// Calorie adjustment applied to TDEE for a gain goal
pub const GAIN_ADJUSTMENT_KCAL: f64 = 300.0;

/// Computed energy numbers returned by onboarding
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnergyProfile {
    /// Basal metabolic rate in kcal/day
    pub bmr_kcal: f64,
    /// Total daily energy expenditure in kcal/day
    pub tdee_kcal: f64,
    /// Suggested daily calorie goal for the chosen goal type
    pub daily_calorie_goal: u32,
}

/// TDEE multiplier for a self-reported activity level
#[must_use]
pub const fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::Light => 1.375,
        ActivityLevel::Moderate => 1.55,
        ActivityLevel::Active => 1.725,
        ActivityLevel::VeryActive => 1.9,
    }
}

/// Mifflin-St Jeor basal metabolic rate
#[must_use]
pub fn bmr(sex: Sex, weight_kg: f64, height_cm: f64, age_years: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Compute the full energy profile for a user and goal
#[must_use]
pub fn energy_profile(
    sex: Sex,
    weight_kg: f64,
    height_cm: f64,
    age_years: u32,
    activity_level: ActivityLevel,
    goal_type: GoalType,
) -> EnergyProfile {
    let bmr_kcal = bmr(sex, weight_kg, height_cm, age_years);
    let tdee_kcal = bmr_kcal * activity_multiplier(activity_level);

    let adjusted = match goal_type {
        GoalType::WeightLoss => tdee_kcal + LOSS_ADJUSTMENT_KCAL,
        GoalType::WeightGain => tdee_kcal + GAIN_ADJUSTMENT_KCAL,
        GoalType::Maintain => tdee_kcal,
    };

    EnergyProfile {
        bmr_kcal,
        tdee_kcal,
        // A goal under 1200 kcal/day is never suggested
        daily_calorie_goal: adjusted.max(1200.0).round() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mifflin_st_jeor_reference_values() {
        // 80 kg, 180 cm, 30 y male: 10*80 + 6.25*180 - 5*30 + 5 = 1780
        assert!((bmr(Sex::Male, 80.0, 180.0, 30) - 1780.0).abs() < f64::EPSILON);
        // Same stats, female: 1780 - 166 = 1614
        assert!((bmr(Sex::Female, 80.0, 180.0, 30) - 1614.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_goal_adjustments() {
        let loss = energy_profile(
            Sex::Male,
            80.0,
            180.0,
            30,
            ActivityLevel::Moderate,
            GoalType::WeightLoss,
        );
        let maintain = energy_profile(
            Sex::Male,
            80.0,
            180.0,
            30,
            ActivityLevel::Moderate,
            GoalType::Maintain,
        );
        assert_eq!(
            loss.daily_calorie_goal,
            (f64::from(maintain.daily_calorie_goal) + LOSS_ADJUSTMENT_KCAL).round() as u32
        );
    }

    #[test]
    fn test_calorie_floor() {
        // A tiny sedentary profile with a loss goal still gets >= 1200 kcal
        let profile = energy_profile(
            Sex::Female,
            45.0,
            150.0,
            70,
            ActivityLevel::Sedentary,
            GoalType::WeightLoss,
        );
        assert!(profile.daily_calorie_goal >= 1200);
    }
}
