// ABOUTME: Route handlers for daily logs, meal items and completed exercises
// ABOUTME: Logs are lazily created on first write; milestones award achievements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::models::{DailyExercise, DailyLog, GoalType, Meal, MealItem};
use crate::routes::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Query parameters for the range listing
#[derive(Debug, Deserialize)]
pub struct LogRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Request body for updating a day's weight/notes
#[derive(Debug, Deserialize)]
pub struct UpsertLogBody {
    pub weight_kg: Option<f64>,
    pub notes: Option<String>,
}

/// Request body for logging a consumed food
#[derive(Debug, Deserialize)]
pub struct AddMealItemBody {
    pub food_id: Uuid,
    pub meal: Meal,
    pub quantity_g: f64,
}

/// Request body for logging a completed exercise
#[derive(Debug, Deserialize)]
pub struct AddExerciseBody {
    pub exercise_id: Uuid,
    pub duration_minutes: Option<u32>,
    pub calories_burned: Option<f64>,
}

/// A daily log joined with its items
#[derive(Debug, Serialize)]
pub struct DailyLogDetail {
    #[serde(flatten)]
    pub log: DailyLog,
    pub meals: Vec<MealItem>,
    pub exercises: Vec<DailyExercise>,
}

/// Log routes handler
pub struct LogRoutes;

impl LogRoutes {
    /// Create all log routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/logs", get(Self::handle_list))
            .route("/api/logs/:date", get(Self::handle_get))
            .route("/api/logs/:date", put(Self::handle_upsert))
            .route("/api/logs/:date/meals", post(Self::handle_add_meal))
            .route(
                "/api/logs/:date/meals/:item_id",
                delete(Self::handle_remove_meal),
            )
            .route("/api/logs/:date/exercises", post(Self::handle_add_exercise))
            .with_state(resources)
    }

    /// Handle GET /api/logs?from&to
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LogRangeQuery>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if query.from > query.to {
            return Err(AppError::invalid_input("from must not be after to"));
        }

        let logs = resources
            .database
            .list_daily_logs(auth.id, query.from, query.to)
            .await?;
        Ok((StatusCode::OK, Json(logs)).into_response())
    }

    /// Handle GET /api/logs/:date
    ///
    /// Reading a day that was never written returns an empty view without
    /// persisting anything; rows only appear when the user logs something.
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(date): Path<NaiveDate>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let Some(log) = resources.database.get_daily_log(auth.id, date).await? else {
            let empty = DailyLogDetail {
                log: DailyLog {
                    id: Uuid::nil(),
                    user_id: auth.id,
                    log_date: date,
                    weight_kg: None,
                    calories_consumed: 0.0,
                    calories_burned: 0.0,
                    notes: None,
                },
                meals: Vec::new(),
                exercises: Vec::new(),
            };
            return Ok((StatusCode::OK, Json(empty)).into_response());
        };

        let detail = DailyLogDetail {
            meals: resources.database.list_meal_items(log.id).await?,
            exercises: resources.database.list_daily_exercises(log.id).await?,
            log,
        };
        Ok((StatusCode::OK, Json(detail)).into_response())
    }

    /// Handle PUT /api/logs/:date
    async fn handle_upsert(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(date): Path<NaiveDate>,
        Json(body): Json<UpsertLogBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if let Some(weight) = body.weight_kg {
            if !(20.0..=400.0).contains(&weight) {
                return Err(AppError::invalid_input("weight_kg must be between 20 and 400"));
            }
        }

        let log = resources
            .database
            .upsert_daily_log(auth.id, date, body.weight_kg, body.notes.as_deref())
            .await?;

        Self::award_milestones(&resources, auth.id).await;
        Ok((StatusCode::OK, Json(log)).into_response())
    }

    /// Handle POST /api/logs/:date/meals
    async fn handle_add_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(date): Path<NaiveDate>,
        Json(body): Json<AddMealItemBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if body.quantity_g <= 0.0 || body.quantity_g > 5000.0 {
            return Err(AppError::invalid_input(
                "quantity_g must be between 0 and 5000",
            ));
        }

        let food = resources
            .database
            .get_food(body.food_id)
            .await?
            .ok_or_else(|| AppError::not_found("Food"))?;

        let item = resources
            .database
            .add_meal_item(auth.id, date, &food, body.meal, body.quantity_g)
            .await?;

        Self::award_milestones(&resources, auth.id).await;
        Ok((StatusCode::CREATED, Json(item)).into_response())
    }

    /// Handle DELETE /api/logs/:date/meals/:item_id
    async fn handle_remove_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((date, item_id)): Path<(NaiveDate, Uuid)>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources
            .database
            .remove_meal_item(auth.id, date, item_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/logs/:date/exercises
    async fn handle_add_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(date): Path<NaiveDate>,
        Json(body): Json<AddExerciseBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        resources
            .database
            .get_exercise(body.exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        let entry = resources
            .database
            .add_daily_exercise(
                auth.id,
                date,
                body.exercise_id,
                body.duration_minutes,
                body.calories_burned,
            )
            .await?;

        Self::award_milestones(&resources, auth.id).await;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Check milestone achievements after a log write.
    ///
    /// Best effort: a failed award must never fail the log write itself.
    async fn award_milestones(resources: &Arc<ServerResources>, user_id: Uuid) {
        if let Err(e) = Self::try_award_milestones(resources, user_id).await {
            tracing::warn!("Milestone check failed for {user_id}: {e}");
        }
    }

    async fn try_award_milestones(
        resources: &Arc<ServerResources>,
        user_id: Uuid,
    ) -> AppResult<()> {
        let database = &resources.database;

        if database.count_daily_logs_for_user(user_id).await? >= 1 {
            Self::award(resources, user_id, "first_log", "First entry", "You logged your first day.")
                .await?;
        }

        if database.count_daily_exercises_for_user(user_id).await? >= 10 {
            Self::award(
                resources,
                user_id,
                "ten_workouts",
                "Ten workouts",
                "You completed ten logged exercises.",
            )
            .await?;
        }

        // Seven consecutive logged days ending today
        let today = Utc::now().date_naive();
        let week = database
            .list_daily_logs(user_id, today - Duration::days(6), today)
            .await?;
        if week.len() == 7 {
            Self::award(
                resources,
                user_id,
                "week_streak",
                "Seven-day streak",
                "You logged seven days in a row.",
            )
            .await?;
        }

        // Goal weight reached, relative to the goal direction
        if let Some(goal) = database.get_active_goal(user_id).await? {
            if let (Some(target), Some(weight)) = (
                goal.target_weight_kg,
                database.get_user(user_id).await?.and_then(|u| u.weight_kg),
            ) {
                let reached = match goal.goal_type {
                    GoalType::WeightLoss => weight <= target,
                    GoalType::WeightGain => weight >= target,
                    GoalType::Maintain => false,
                };
                if reached {
                    Self::award(
                        resources,
                        user_id,
                        "goal_reached",
                        "Goal reached",
                        "You hit your target weight.",
                    )
                    .await?;
                }
            }
        }

        Ok(())
    }

    /// Award a badge and notify the user when it is new
    async fn award(
        resources: &Arc<ServerResources>,
        user_id: Uuid,
        code: &str,
        title: &str,
        description: &str,
    ) -> AppResult<()> {
        let newly_earned = resources
            .database
            .award_achievement(user_id, code, title, description)
            .await?;

        if newly_earned {
            tracing::info!("User {user_id} earned achievement {code}");
            resources
                .database
                .create_notification(user_id, "achievement", title, description)
                .await?;
        }
        Ok(())
    }
}
