// ABOUTME: Guideline-based recommendation engine over weekly statistics
// ABOUTME: Ordered threshold rules emitting prioritized advisory messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Scientific recommendations engine.
//!
//! A fixed, ordered list of threshold rules evaluated over aggregated
//! weekly statistics. Entirely deterministic: no state, no I/O. Each
//! triggered rule appends one [`Recommendation`]; when nothing fires and
//! the user has data, a low-priority on-track note is emitted instead.

use super::{Recommendation, RecommendationCategory, RecommendationPriority};
use crate::models::{Goal, GoalType};

/// WHO guidance: losing more than 1% of body weight per week is too fast
const MAX_SAFE_WEEKLY_LOSS_PCT: f64 = 0.01;

/// ACSM guideline: at least 150 minutes of moderate exercise per week
const ACSM_WEEKLY_EXERCISE_MINUTES: f64 = 150.0;

/// ISSN guidance: sustainable fat-loss deficits sit between 500 and 750
/// kcal per day
const ISSN_DEFICIT_MIN_KCAL: f64 = 500.0;
const ISSN_DEFICIT_MAX_KCAL: f64 = 750.0;

/// Lean-gain surplus band in kcal per day
const GAIN_SURPLUS_MIN_KCAL: f64 = 250.0;
const GAIN_SURPLUS_MAX_KCAL: f64 = 500.0;

/// Aggregated statistics the rules evaluate
#[derive(Debug, Clone, Default)]
pub struct WeeklyStats {
    /// Body weight at the start of the observation window
    pub starting_weight_kg: Option<f64>,
    /// Weight change over the last week (negative = loss)
    pub weekly_weight_change_kg: Option<f64>,
    /// Exercise sessions completed in the last week
    pub exercise_sessions: u32,
    /// Total exercise minutes in the last week
    pub exercise_minutes: f64,
    /// Average daily calorie deficit (consumed minus burned minus
    /// maintenance; positive = deficit, negative = surplus)
    pub avg_daily_deficit_kcal: Option<f64>,
}

/// Evaluate every rule in order and collect the triggered recommendations
#[must_use]
pub fn generate_recommendations(stats: &WeeklyStats, goal: Option<&Goal>) -> Vec<Recommendation> {
    // A brand-new user with no observations gets no advice rather than a
    // page of "do more" messages.
    if !has_observations(stats) {
        return Vec::new();
    }

    let mut recommendations = Vec::new();

    check_rapid_weight_loss(stats, &mut recommendations);
    check_exercise_volume(stats, &mut recommendations);
    check_calorie_deficit(stats, goal, &mut recommendations);
    check_calorie_surplus(stats, goal, &mut recommendations);

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            kind: "on_track".to_owned(),
            priority: RecommendationPriority::Low,
            category: RecommendationCategory::Progress,
            message: "Weight trend, training volume and energy balance all look \
                      sustainable this week. Keep the current program going."
                .to_owned(),
            scientific_basis: "Consistency with moderate, sustainable habits predicts \
                               long-term adherence better than aggressive short-term changes."
                .to_owned(),
        });
    }

    // Highest priority first, stable within equal priorities
    recommendations.sort_by(|a, b| b.priority.cmp(&a.priority));
    recommendations
}

fn has_observations(stats: &WeeklyStats) -> bool {
    stats.weekly_weight_change_kg.is_some()
        || stats.exercise_sessions > 0
        || stats.avg_daily_deficit_kcal.is_some()
}

/// Rule 1: weight loss faster than the WHO 1%/week guidance is a safety flag
fn check_rapid_weight_loss(stats: &WeeklyStats, out: &mut Vec<Recommendation>) {
    let (Some(starting), Some(change)) =
        (stats.starting_weight_kg, stats.weekly_weight_change_kg)
    else {
        return;
    };
    if starting <= 0.0 {
        return;
    }

    let max_safe_loss = starting * MAX_SAFE_WEEKLY_LOSS_PCT;
    if change < -max_safe_loss {
        out.push(Recommendation {
            kind: "rapid_weight_loss".to_owned(),
            priority: RecommendationPriority::High,
            category: RecommendationCategory::Safety,
            message: format!(
                "You lost {:.1} kg this week, which is faster than the recommended \
                 maximum of {max_safe_loss:.1} kg (1% of body weight). Slow down by \
                 raising daily intake slightly.",
                change.abs()
            ),
            scientific_basis: "WHO guidance caps sustainable weight loss at about 1% of \
                               body weight per week; faster loss increases muscle loss \
                               and rebound risk."
                .to_owned(),
        });
    }
}

/// Rule 2: under the ACSM 150-minute weekly activity floor
fn check_exercise_volume(stats: &WeeklyStats, out: &mut Vec<Recommendation>) {
    if stats.exercise_minutes >= ACSM_WEEKLY_EXERCISE_MINUTES {
        return;
    }

    out.push(Recommendation {
        kind: "low_exercise_volume".to_owned(),
        priority: RecommendationPriority::Medium,
        category: RecommendationCategory::Exercise,
        message: format!(
            "You logged {:.0} exercise minutes across {} sessions this week; aim for \
             at least {ACSM_WEEKLY_EXERCISE_MINUTES:.0} minutes of moderate activity.",
            stats.exercise_minutes, stats.exercise_sessions
        ),
        scientific_basis: "ACSM recommends a minimum of 150 minutes of moderate-intensity \
                           aerobic activity per week for general health."
            .to_owned(),
    });
}

/// Rule 3: for loss goals, the average daily deficit should sit in the ISSN
/// 500-750 kcal band
fn check_calorie_deficit(stats: &WeeklyStats, goal: Option<&Goal>, out: &mut Vec<Recommendation>) {
    let Some(goal) = goal else { return };
    if goal.goal_type != GoalType::WeightLoss {
        return;
    }
    let Some(deficit) = stats.avg_daily_deficit_kcal else {
        return;
    };

    if deficit > ISSN_DEFICIT_MAX_KCAL {
        out.push(Recommendation {
            kind: "deficit_too_aggressive".to_owned(),
            priority: RecommendationPriority::Medium,
            category: RecommendationCategory::Nutrition,
            message: format!(
                "Your average daily deficit of {deficit:.0} kcal exceeds the \
                 {ISSN_DEFICIT_MAX_KCAL:.0} kcal upper bound; add a small snack or a \
                 rest-day meal to protect lean mass."
            ),
            scientific_basis: "ISSN position stands recommend deficits of 500-750 kcal/day \
                               to preserve lean mass during fat loss."
                .to_owned(),
        });
    } else if deficit < ISSN_DEFICIT_MIN_KCAL {
        out.push(Recommendation {
            kind: "deficit_too_small".to_owned(),
            priority: RecommendationPriority::Medium,
            category: RecommendationCategory::Nutrition,
            message: format!(
                "Your average daily deficit of {deficit:.0} kcal is below the \
                 {ISSN_DEFICIT_MIN_KCAL:.0} kcal floor for steady fat loss; trim portions \
                 slightly or add one cardio session."
            ),
            scientific_basis: "ISSN position stands recommend deficits of 500-750 kcal/day \
                               for meaningful, sustainable fat loss."
                .to_owned(),
        });
    }
}

/// Rule 4: for gain goals, the surplus should stay in the lean-gain band
fn check_calorie_surplus(stats: &WeeklyStats, goal: Option<&Goal>, out: &mut Vec<Recommendation>) {
    let Some(goal) = goal else { return };
    if goal.goal_type != GoalType::WeightGain {
        return;
    }
    let Some(deficit) = stats.avg_daily_deficit_kcal else {
        return;
    };
    let surplus = -deficit;

    if surplus < GAIN_SURPLUS_MIN_KCAL {
        out.push(Recommendation {
            kind: "surplus_too_small".to_owned(),
            priority: RecommendationPriority::Medium,
            category: RecommendationCategory::Nutrition,
            message: format!(
                "Your average daily surplus of {surplus:.0} kcal is under the \
                 {GAIN_SURPLUS_MIN_KCAL:.0} kcal needed for steady muscle gain; add a \
                 protein-dense meal."
            ),
            scientific_basis: "Hypertrophy research supports a moderate surplus of roughly \
                               250-500 kcal/day for muscle gain with minimal fat."
                .to_owned(),
        });
    } else if surplus > GAIN_SURPLUS_MAX_KCAL {
        out.push(Recommendation {
            kind: "surplus_too_large".to_owned(),
            priority: RecommendationPriority::Medium,
            category: RecommendationCategory::Nutrition,
            message: format!(
                "Your average daily surplus of {surplus:.0} kcal is above the \
                 {GAIN_SURPLUS_MAX_KCAL:.0} kcal lean-gain ceiling; most of the extra \
                 energy will be stored as fat."
            ),
            scientific_basis: "Hypertrophy research supports a moderate surplus of roughly \
                               250-500 kcal/day for muscle gain with minimal fat."
                .to_owned(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn goal(goal_type: GoalType) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            goal_type,
            target_weight_kg: None,
            starting_weight_kg: Some(80.0),
            daily_calorie_goal: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn active_stats() -> WeeklyStats {
        WeeklyStats {
            starting_weight_kg: Some(80.0),
            weekly_weight_change_kg: Some(-0.5),
            exercise_sessions: 4,
            exercise_minutes: 200.0,
            avg_daily_deficit_kcal: Some(600.0),
        }
    }

    #[test]
    fn test_rapid_loss_emits_exactly_one_high_safety_entry() {
        // 1% of 80 kg is 0.8 kg; losing 1.2 kg trips the rule
        let mut stats = active_stats();
        stats.weekly_weight_change_kg = Some(-1.2);

        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightLoss)));
        let safety: Vec<_> = recs
            .iter()
            .filter(|r| {
                r.priority == RecommendationPriority::High
                    && r.category == RecommendationCategory::Safety
            })
            .collect();
        assert_eq!(safety.len(), 1);
        assert_eq!(safety[0].kind, "rapid_weight_loss");
    }

    #[test]
    fn test_slower_loss_does_not_trip_the_safety_rule() {
        // Exactly -1% must not fire; the rule requires strictly faster loss
        let mut stats = active_stats();
        stats.weekly_weight_change_kg = Some(-0.8);

        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightLoss)));
        assert!(recs
            .iter()
            .all(|r| r.category != RecommendationCategory::Safety));
    }

    #[test]
    fn test_low_exercise_volume_rule() {
        let mut stats = active_stats();
        stats.exercise_minutes = 90.0;
        stats.exercise_sessions = 2;

        let recs = generate_recommendations(&stats, None);
        assert!(recs.iter().any(|r| r.kind == "low_exercise_volume"
            && r.category == RecommendationCategory::Exercise));
    }

    #[test]
    fn test_deficit_band_for_loss_goal() {
        let mut stats = active_stats();
        stats.avg_daily_deficit_kcal = Some(900.0);
        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightLoss)));
        assert!(recs.iter().any(|r| r.kind == "deficit_too_aggressive"));

        stats.avg_daily_deficit_kcal = Some(200.0);
        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightLoss)));
        assert!(recs.iter().any(|r| r.kind == "deficit_too_small"));

        // In-band deficit stays quiet
        stats.avg_daily_deficit_kcal = Some(600.0);
        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightLoss)));
        assert!(recs
            .iter()
            .all(|r| r.category != RecommendationCategory::Nutrition));
    }

    #[test]
    fn test_deficit_rules_ignored_without_loss_goal() {
        let mut stats = active_stats();
        stats.avg_daily_deficit_kcal = Some(900.0);
        let recs = generate_recommendations(&stats, Some(&goal(GoalType::Maintain)));
        assert!(recs
            .iter()
            .all(|r| r.category != RecommendationCategory::Nutrition));
    }

    #[test]
    fn test_surplus_band_for_gain_goal() {
        let mut stats = active_stats();
        stats.avg_daily_deficit_kcal = Some(-100.0); // 100 kcal surplus
        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightGain)));
        assert!(recs.iter().any(|r| r.kind == "surplus_too_small"));

        stats.avg_daily_deficit_kcal = Some(-800.0); // 800 kcal surplus
        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightGain)));
        assert!(recs.iter().any(|r| r.kind == "surplus_too_large"));
    }

    #[test]
    fn test_on_track_note_when_nothing_fires() {
        let recs = generate_recommendations(&active_stats(), Some(&goal(GoalType::Maintain)));
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].kind, "on_track");
        assert_eq!(recs[0].priority, RecommendationPriority::Low);
    }

    #[test]
    fn test_no_data_produces_nothing() {
        let recs = generate_recommendations(&WeeklyStats::default(), None);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_output_sorted_by_priority() {
        let mut stats = active_stats();
        stats.weekly_weight_change_kg = Some(-2.0);
        stats.exercise_minutes = 30.0;

        let recs = generate_recommendations(&stats, Some(&goal(GoalType::WeightLoss)));
        assert!(recs.len() >= 2);
        assert_eq!(recs[0].priority, RecommendationPriority::High);
    }
}
