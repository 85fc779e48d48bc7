// ABOUTME: Route handlers for meal plan generation and retrieval
// ABOUTME: The generator is pure; this route persists the returned plan
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::generators::meal_plan::generate_meal_plan;
use crate::routes::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Summary row for listing stored plans
#[derive(Debug, Serialize)]
pub struct MealPlanSummary {
    pub id: String,
    pub daily_calorie_target: f64,
    pub created_at: String,
}

/// Meal plan routes handler
pub struct MealPlanRoutes;

impl MealPlanRoutes {
    /// Create all meal plan routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/meal-plans", get(Self::handle_list))
            .route("/api/meal-plans/generate", post(Self::handle_generate))
            .route("/api/meal-plans/:id", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle POST /api/meal-plans/generate
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let foods = resources.database.list_foods(None).await?;
        let goal = resources.database.get_active_goal(auth.id).await?;

        let mut rng = ChaCha8Rng::from_entropy();
        let plan = generate_meal_plan(&foods, goal.as_ref(), &mut rng)?;

        let stored = resources.database.create_meal_plan(auth.id, &plan).await?;
        tracing::info!("Generated meal plan {} for user {}", stored.id, auth.id);

        Ok((StatusCode::CREATED, Json(stored)).into_response())
    }

    /// Handle GET /api/meal-plans
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let plans = resources.database.list_meal_plans(auth.id).await?;

        let summaries: Vec<MealPlanSummary> = plans
            .iter()
            .map(|plan| MealPlanSummary {
                id: plan.id.to_string(),
                daily_calorie_target: plan.daily_calorie_target,
                created_at: plan.created_at.to_rfc3339(),
            })
            .collect();
        Ok((StatusCode::OK, Json(summaries)).into_response())
    }

    /// Handle GET /api/meal-plans/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(plan_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let plan = resources
            .database
            .get_meal_plan(plan_id, auth.id)
            .await?
            .ok_or_else(|| AppError::not_found("Meal plan"))?;
        Ok((StatusCode::OK, Json(plan)).into_response())
    }
}
