// ABOUTME: Route handlers for goal CRUD and activation
// ABOUTME: One active goal per user; activation swaps atomically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalType};
use crate::routes::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for creating a goal
#[derive(Debug, Deserialize)]
pub struct CreateGoalBody {
    #[serde(default)]
    pub goal_type: GoalType,
    pub target_weight_kg: Option<f64>,
    pub daily_calorie_goal: Option<u32>,
    /// Created goals are active unless explicitly parked
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Request body for updating a goal
#[derive(Debug, Deserialize)]
pub struct UpdateGoalBody {
    pub goal_type: GoalType,
    pub target_weight_kg: Option<f64>,
    pub daily_calorie_goal: Option<u32>,
}

/// Goal routes handler
pub struct GoalRoutes;

impl GoalRoutes {
    /// Create all goal routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/goals", get(Self::handle_list))
            .route("/api/goals", post(Self::handle_create))
            .route("/api/goals/active", get(Self::handle_get_active))
            .route("/api/goals/:id", get(Self::handle_get))
            .route("/api/goals/:id", put(Self::handle_update))
            .route("/api/goals/:id", delete(Self::handle_delete))
            .route("/api/goals/:id/activate", post(Self::handle_activate))
            .with_state(resources)
    }

    /// Handle GET /api/goals
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let goals = resources.database.list_goals(auth.id).await?;
        Ok((StatusCode::OK, Json(goals)).into_response())
    }

    /// Handle GET /api/goals/active
    async fn handle_get_active(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let goal = resources
            .database
            .get_active_goal(auth.id)
            .await?
            .ok_or_else(|| AppError::not_found("Active goal"))?;
        Ok((StatusCode::OK, Json(goal)).into_response())
    }

    /// Handle POST /api/goals
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateGoalBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if let Some(kcal) = body.daily_calorie_goal {
            if !(800..=10_000).contains(&kcal) {
                return Err(AppError::invalid_input(
                    "daily_calorie_goal must be between 800 and 10000",
                ));
            }
        }

        let starting_weight = resources
            .database
            .get_user(auth.id)
            .await?
            .and_then(|u| u.weight_kg);

        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: auth.id,
            goal_type: body.goal_type,
            target_weight_kg: body.target_weight_kg,
            starting_weight_kg: starting_weight,
            daily_calorie_goal: body.daily_calorie_goal,
            is_active: body.is_active,
            created_at: Utc::now(),
        };
        resources.database.create_goal(&goal).await?;

        Ok((StatusCode::CREATED, Json(goal)).into_response())
    }

    /// Handle GET /api/goals/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let goal = resources
            .database
            .get_goal(goal_id)
            .await?
            .filter(|g| g.user_id == auth.id)
            .ok_or_else(|| AppError::not_found("Goal"))?;
        Ok((StatusCode::OK, Json(goal)).into_response())
    }

    /// Handle PUT /api/goals/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
        Json(body): Json<UpdateGoalBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources
            .database
            .update_goal(
                goal_id,
                auth.id,
                body.goal_type,
                body.target_weight_kg,
                body.daily_calorie_goal,
            )
            .await?;

        let goal = resources
            .database
            .get_goal(goal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        Ok((StatusCode::OK, Json(goal)).into_response())
    }

    /// Handle DELETE /api/goals/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources.database.delete_goal(goal_id, auth.id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/goals/:id/activate
    async fn handle_activate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(goal_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources.database.activate_goal(goal_id, auth.id).await?;

        let goal = resources
            .database
            .get_goal(goal_id)
            .await?
            .ok_or_else(|| AppError::not_found("Goal"))?;
        Ok((StatusCode::OK, Json(goal)).into_response())
    }
}
