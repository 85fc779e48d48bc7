// ABOUTME: Route handlers for routine CRUD, nested exercises and auto-generation
// ABOUTME: Generation persists the routine and its exercises in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::generators::routine::generate_routine;
use crate::models::{Routine, RoutineExercise};
use crate::routes::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Request body for creating a routine
#[derive(Debug, Deserialize)]
pub struct CreateRoutineBody {
    pub name: String,
    pub description: Option<String>,
}

/// Request body for updating a routine
#[derive(Debug, Deserialize)]
pub struct UpdateRoutineBody {
    pub name: String,
    pub description: Option<String>,
}

/// Request body for adding an exercise to a routine
#[derive(Debug, Deserialize)]
pub struct AddExerciseBody {
    pub exercise_id: Uuid,
    pub day_of_week: Option<u8>,
    #[serde(default)]
    pub position: u32,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub weight_kg: Option<f64>,
}

/// Request body for updating a routine exercise prescription
#[derive(Debug, Deserialize, Default)]
pub struct UpdateExerciseBody {
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub weight_kg: Option<f64>,
    pub day_of_week: Option<u8>,
    pub position: Option<u32>,
}

/// Routine routes handler
pub struct RoutineRoutes;

impl RoutineRoutes {
    /// Create all routine routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/routines", get(Self::handle_list))
            .route("/api/routines", post(Self::handle_create))
            .route("/api/routines/generate", post(Self::handle_generate))
            .route("/api/routines/:id", get(Self::handle_get))
            .route("/api/routines/:id", put(Self::handle_update))
            .route("/api/routines/:id", delete(Self::handle_delete))
            .route(
                "/api/routines/:id/exercises",
                post(Self::handle_add_exercise),
            )
            .route(
                "/api/routines/:id/exercises/:exercise_row_id",
                put(Self::handle_update_exercise),
            )
            .route(
                "/api/routines/:id/exercises/:exercise_row_id",
                delete(Self::handle_remove_exercise),
            )
            .with_state(resources)
    }

    /// Handle GET /api/routines
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let routines = resources.database.list_routines(auth.id).await?;
        Ok((StatusCode::OK, Json(routines)).into_response())
    }

    /// Handle POST /api/routines
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateRoutineBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if body.name.trim().is_empty() {
            return Err(AppError::invalid_input("Routine name must not be empty"));
        }

        let now = Utc::now();
        let routine = Routine {
            id: Uuid::new_v4(),
            user_id: auth.id,
            name: body.name.trim().to_owned(),
            description: body.description,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        resources.database.create_routine(&routine).await?;

        Ok((StatusCode::CREATED, Json(routine)).into_response())
    }

    /// Handle POST /api/routines/generate
    ///
    /// Runs the rule-based generator over the catalog and the user's active
    /// goal, then persists routine plus exercises atomically.
    async fn handle_generate(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let exercises = resources.database.list_exercises(None, None).await?;
        let goal = resources.database.get_active_goal(auth.id).await?;
        let bodyweight = resources
            .database
            .get_user(auth.id)
            .await?
            .and_then(|u| u.weight_kg);

        let mut rng = ChaCha8Rng::from_entropy();
        let plan = generate_routine(&exercises, goal.as_ref(), bodyweight, &mut rng)?;

        let now = Utc::now();
        let routine = Routine {
            id: Uuid::new_v4(),
            user_id: auth.id,
            name: plan.name.clone(),
            description: Some(plan.description.clone()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let routine_id = routine.id;
        let rows: Vec<RoutineExercise> = plan
            .days
            .iter()
            .flat_map(|day| {
                day.exercises
                    .iter()
                    .enumerate()
                    .map(move |(position, exercise)| RoutineExercise {
                        id: Uuid::new_v4(),
                        routine_id,
                        exercise_id: exercise.exercise_id,
                        day_of_week: Some(day.day_of_week),
                        position: position as u32,
                        sets: exercise.sets,
                        reps: exercise.reps,
                        duration_minutes: exercise.duration_minutes,
                        weight_kg: exercise.weight_kg,
                    })
            })
            .collect();

        resources
            .database
            .create_routine_with_exercises(&routine, &rows)
            .await?;
        tracing::info!(
            "Generated routine {} with {} exercises for user {}",
            routine.id,
            rows.len(),
            auth.id
        );

        let stored = resources
            .database
            .get_routine(routine.id, auth.id)
            .await?
            .ok_or_else(|| AppError::internal("Generated routine vanished"))?;
        Ok((StatusCode::CREATED, Json(stored)).into_response())
    }

    /// Handle GET /api/routines/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(routine_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let routine = resources
            .database
            .get_routine(routine_id, auth.id)
            .await?
            .ok_or_else(|| AppError::not_found("Routine"))?;
        Ok((StatusCode::OK, Json(routine)).into_response())
    }

    /// Handle PUT /api/routines/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(routine_id): Path<Uuid>,
        Json(body): Json<UpdateRoutineBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if body.name.trim().is_empty() {
            return Err(AppError::invalid_input("Routine name must not be empty"));
        }

        resources
            .database
            .update_routine(routine_id, auth.id, body.name.trim(), body.description.as_deref())
            .await?;

        let routine = resources
            .database
            .get_routine(routine_id, auth.id)
            .await?
            .ok_or_else(|| AppError::not_found("Routine"))?;
        Ok((StatusCode::OK, Json(routine)).into_response())
    }

    /// Handle DELETE /api/routines/:id (soft delete)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(routine_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources.database.deactivate_routine(routine_id, auth.id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/routines/:id/exercises
    async fn handle_add_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(routine_id): Path<Uuid>,
        Json(body): Json<AddExerciseBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if let Some(day) = body.day_of_week {
            if day > 6 {
                return Err(AppError::invalid_input("day_of_week must be 0-6"));
            }
        }
        // The exercise must exist in the catalog
        resources
            .database
            .get_exercise(body.exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;

        let row = RoutineExercise {
            id: Uuid::new_v4(),
            routine_id,
            exercise_id: body.exercise_id,
            day_of_week: body.day_of_week,
            position: body.position,
            sets: body.sets,
            reps: body.reps,
            duration_minutes: body.duration_minutes,
            weight_kg: body.weight_kg,
        };
        resources.database.add_routine_exercise(auth.id, &row).await?;

        Ok((StatusCode::CREATED, Json(row)).into_response())
    }

    /// Handle PUT /api/routines/:id/exercises/:exercise_row_id
    async fn handle_update_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((routine_id, exercise_row_id)): Path<(Uuid, Uuid)>,
        Json(body): Json<UpdateExerciseBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if let Some(day) = body.day_of_week {
            if day > 6 {
                return Err(AppError::invalid_input("day_of_week must be 0-6"));
            }
        }

        resources
            .database
            .update_routine_exercise(
                auth.id,
                routine_id,
                exercise_row_id,
                body.sets,
                body.reps,
                body.duration_minutes,
                body.weight_kg,
                body.day_of_week,
                body.position,
            )
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle DELETE /api/routines/:id/exercises/:exercise_row_id
    async fn handle_remove_exercise(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path((routine_id, exercise_row_id)): Path<(Uuid, Uuid)>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources
            .database
            .remove_routine_exercise(auth.id, routine_id, exercise_row_id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
