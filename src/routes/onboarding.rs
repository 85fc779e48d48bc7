// ABOUTME: Route handlers for onboarding: body stats, energy numbers, initial goal
// ABOUTME: Computes BMR/TDEE and creates the active goal in one request
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::intelligence::energy::{energy_profile, EnergyProfile};
use crate::models::{ActivityLevel, Goal, GoalType, Sex};
use crate::routes::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request body for completing onboarding
#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub birth_year: i32,
    pub sex: Sex,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal_type: GoalType,
    pub target_weight_kg: Option<f64>,
}

/// Response carrying the computed numbers and the created goal
#[derive(Debug, Serialize)]
pub struct OnboardingResponse {
    pub energy: EnergyProfile,
    pub goal_id: String,
    pub goal_type: GoalType,
}

/// Onboarding routes handler
pub struct OnboardingRoutes;

impl OnboardingRoutes {
    /// Create all onboarding routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/onboarding", post(Self::handle_complete))
            .route("/api/onboarding", get(Self::handle_get))
            .with_state(resources)
    }

    fn validate(body: &OnboardingRequest) -> AppResult<()> {
        if !(20.0..=400.0).contains(&body.weight_kg) {
            return Err(AppError::invalid_input("weight_kg must be between 20 and 400"));
        }
        if !(80.0..=260.0).contains(&body.height_cm) {
            return Err(AppError::invalid_input("height_cm must be between 80 and 260"));
        }
        let current_year = Utc::now().format("%Y").to_string().parse::<i32>().unwrap_or(2025);
        if body.birth_year < 1900 || body.birth_year > current_year - 10 {
            return Err(AppError::invalid_input("birth_year is implausible"));
        }
        Ok(())
    }

    /// Handle POST /api/onboarding
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<OnboardingRequest>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        Self::validate(&body)?;

        let current_year = Utc::now().format("%Y").to_string().parse::<i32>().unwrap_or(2025);
        let age = u32::try_from(current_year - body.birth_year)
            .map_err(|_| AppError::invalid_input("birth_year is implausible"))?;

        let energy = energy_profile(
            body.sex,
            body.weight_kg,
            body.height_cm,
            age,
            body.activity_level,
            body.goal_type,
        );

        resources
            .database
            .update_user_profile(
                auth.id,
                Some(body.weight_kg),
                Some(body.height_cm),
                Some(body.birth_year),
                Some(body.sex),
                body.activity_level,
                true,
            )
            .await?;

        let goal = Goal {
            id: Uuid::new_v4(),
            user_id: auth.id,
            goal_type: body.goal_type,
            target_weight_kg: body.target_weight_kg,
            starting_weight_kg: Some(body.weight_kg),
            daily_calorie_goal: Some(energy.daily_calorie_goal),
            is_active: true,
            created_at: Utc::now(),
        };
        resources.database.create_goal(&goal).await?;

        tracing::info!("User {} completed onboarding", auth.id);

        let response = OnboardingResponse {
            energy,
            goal_id: goal.id.to_string(),
            goal_type: goal.goal_type,
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/onboarding - recompute energy numbers from the profile
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let user = resources
            .database
            .get_user(auth.id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let (Some(weight), Some(height), Some(sex), Some(age)) = (
            user.weight_kg,
            user.height_cm,
            user.sex,
            user.age(Utc::now().date_naive()),
        ) else {
            return Err(AppError::invalid_input(
                "Complete onboarding first to get energy numbers",
            ));
        };

        let goal_type = resources
            .database
            .get_active_goal(auth.id)
            .await?
            .map(|g| g.goal_type)
            .unwrap_or_default();

        let energy = energy_profile(sex, weight, height, age, user.activity_level, goal_type);
        Ok((StatusCode::OK, Json(energy)).into_response())
    }
}
