// ABOUTME: Route handler for guideline-based recommendations
// ABOUTME: Aggregates two weeks of logs into WeeklyStats and runs the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::AppResult;
use crate::intelligence::energy::{activity_multiplier, bmr};
use crate::intelligence::recommendations::{generate_recommendations, WeeklyStats};
use crate::routes::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Days of history aggregated into the weekly statistics
const OBSERVATION_WINDOW_DAYS: i64 = 14;

/// Recommendation routes handler
pub struct RecommendationRoutes;

impl RecommendationRoutes {
    /// Create all recommendation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/recommendations", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/recommendations
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let today = Utc::now().date_naive();
        let from = today - Duration::days(OBSERVATION_WINDOW_DAYS - 1);
        let logs = resources.database.list_daily_logs(auth.id, from, today).await?;
        let user = resources.database.get_user(auth.id).await?;
        let goal = resources.database.get_active_goal(auth.id).await?;

        // Weight trend: first and last weigh-in in the window, normalized
        // to a per-week rate
        let weighins: Vec<(chrono::NaiveDate, f64)> = logs
            .iter()
            .filter_map(|log| log.weight_kg.map(|w| (log.log_date, w)))
            .collect();
        let (starting_weight, weekly_change) = match (weighins.first(), weighins.last()) {
            (Some((first_date, first_w)), Some((last_date, last_w)))
                if first_date != last_date =>
            {
                let span_days = (*last_date - *first_date).num_days().max(1) as f64;
                (
                    Some(*first_w),
                    Some((last_w - first_w) * 7.0 / span_days),
                )
            }
            (Some((_, first_w)), _) => (Some(*first_w), None),
            _ => (None, None),
        };

        // Exercise volume over the most recent 7 days of the window
        let week_ago = today - Duration::days(6);
        let mut exercise_sessions = 0u32;
        let mut exercise_minutes = 0.0f64;
        for log in logs.iter().filter(|l| l.log_date >= week_ago) {
            let entries = resources.database.list_daily_exercises(log.id).await?;
            exercise_sessions += entries.len() as u32;
            exercise_minutes += entries
                .iter()
                .filter_map(|e| e.duration_minutes)
                .map(f64::from)
                .sum::<f64>();
        }

        // Average daily deficit against the profile's estimated expenditure
        let avg_daily_deficit = user.as_ref().and_then(|user| {
            let (weight, height, sex, age) = (
                user.weight_kg?,
                user.height_cm?,
                user.sex?,
                user.age(today)?,
            );
            let tdee = bmr(sex, weight, height, age) * activity_multiplier(user.activity_level);

            let days_with_intake: Vec<&crate::models::DailyLog> =
                logs.iter().filter(|l| l.calories_consumed > 0.0).collect();
            if days_with_intake.is_empty() {
                return None;
            }
            let avg_net: f64 = days_with_intake
                .iter()
                .map(|l| l.calories_consumed - l.calories_burned)
                .sum::<f64>()
                / days_with_intake.len() as f64;
            Some(tdee - avg_net)
        });

        let stats = WeeklyStats {
            starting_weight_kg: starting_weight,
            weekly_weight_change_kg: weekly_change,
            exercise_sessions,
            exercise_minutes,
            avg_daily_deficit_kcal: avg_daily_deficit,
        };

        let recommendations = generate_recommendations(&stats, goal.as_ref());
        Ok((StatusCode::OK, Json(recommendations)).into_response())
    }
}
