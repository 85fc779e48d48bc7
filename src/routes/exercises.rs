// ABOUTME: Route handlers for the exercise catalog
// ABOUTME: Cached public reads, admin writes, optional wger enrichment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::external::wger_client::WgerExercise;
use crate::models::{Exercise, ExerciseCategory};
use crate::routes::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Maximum external matches returned by the wger proxy
const EXTERNAL_SEARCH_LIMIT: usize = 10;

/// Query parameters for listing exercises
#[derive(Debug, Deserialize, Default)]
pub struct ListExercisesQuery {
    /// Filter by category (`strength` / `cardio`)
    pub category: Option<String>,
    /// Name search term
    pub search: Option<String>,
}

/// Query parameters for the external search proxy
#[derive(Debug, Deserialize)]
pub struct ExternalSearchQuery {
    pub q: String,
}

/// Request body for creating or updating a catalog exercise
#[derive(Debug, Deserialize)]
pub struct ExerciseBody {
    pub name: String,
    pub category: ExerciseCategory,
    pub description: Option<String>,
    pub muscle_group: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

const fn default_true() -> bool {
    true
}

/// Response for the external search proxy: catalog matches plus wger
/// suggestions (empty when the collaborator is down)
#[derive(Debug, Serialize)]
pub struct ExternalSearchResponse {
    pub catalog: Vec<Exercise>,
    pub external: Vec<WgerExercise>,
}

/// Exercise routes handler
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create all exercise routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/exercises", get(Self::handle_list))
            .route("/api/exercises", post(Self::handle_create))
            .route(
                "/api/exercises/search-external",
                get(Self::handle_search_external),
            )
            .route("/api/exercises/:id", get(Self::handle_get))
            .route("/api/exercises/:id", put(Self::handle_update))
            .route("/api/exercises/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    fn cache_key(query: &ListExercisesQuery) -> String {
        format!(
            "exercises:list:{}:{}",
            query.category.as_deref().unwrap_or("all"),
            query.search.as_deref().unwrap_or("")
        )
    }

    /// Handle GET /api/exercises
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListExercisesQuery>,
    ) -> AppResult<Response> {
        resources.auth_middleware.authenticate_request(&headers).await?;

        let cache_key = Self::cache_key(&query);
        if let Some(cached) = resources.cache.get::<Vec<Exercise>>(&cache_key).await? {
            return Ok((StatusCode::OK, Json(cached)).into_response());
        }

        let category = query.category.as_deref().map(ExerciseCategory::parse);
        let exercises = resources
            .database
            .list_exercises(category, query.search.as_deref())
            .await?;

        resources.cache.set(&cache_key, &exercises).await?;
        Ok((StatusCode::OK, Json(exercises)).into_response())
    }

    /// Handle GET /api/exercises/search-external
    ///
    /// The wger collaborator is optional: any failure is logged and the
    /// response degrades to catalog-only matches.
    async fn handle_search_external(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ExternalSearchQuery>,
    ) -> AppResult<Response> {
        resources.auth_middleware.authenticate_request(&headers).await?;

        if query.q.trim().is_empty() {
            return Err(AppError::invalid_input("Search term must not be empty"));
        }

        let catalog = resources
            .database
            .list_exercises(None, Some(query.q.trim()))
            .await?;

        let external = match &resources.wger {
            Some(client) => match client
                .search_exercises(query.q.trim(), EXTERNAL_SEARCH_LIMIT)
                .await
            {
                Ok(results) => results,
                Err(e) => {
                    tracing::warn!("wger search failed, serving catalog only: {e}");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let response = ExternalSearchResponse { catalog, external };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/exercises/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
    ) -> AppResult<Response> {
        resources.auth_middleware.authenticate_request(&headers).await?;
        let exercise = resources
            .database
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle POST /api/exercises (admin)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ExerciseBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if body.name.trim().is_empty() {
            return Err(AppError::invalid_input("Exercise name must not be empty"));
        }

        let exercise = Exercise {
            id: Uuid::new_v4(),
            name: body.name.trim().to_owned(),
            category: body.category,
            description: body.description,
            muscle_group: body.muscle_group,
            image_url: body.image_url,
            video_url: body.video_url,
            is_public: body.is_public,
            created_by: Some(auth.id),
            created_at: Utc::now(),
        };
        resources.database.create_exercise(&exercise).await?;
        resources.cache.invalidate_pattern("exercises:*").await?;

        Ok((StatusCode::CREATED, Json(exercise)).into_response())
    }

    /// Handle PUT /api/exercises/:id (admin)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
        Json(body): Json<ExerciseBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        resources
            .database
            .update_exercise(
                exercise_id,
                body.name.trim(),
                body.category,
                body.description.as_deref(),
                body.muscle_group.as_deref(),
                body.image_url.as_deref(),
                body.video_url.as_deref(),
                body.is_public,
            )
            .await?;
        resources.cache.invalidate_pattern("exercises:*").await?;

        let exercise = resources
            .database
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::not_found("Exercise"))?;
        Ok((StatusCode::OK, Json(exercise)).into_response())
    }

    /// Handle DELETE /api/exercises/:id (admin)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(exercise_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        resources.database.delete_exercise(exercise_id).await?;
        resources.cache.invalidate_pattern("exercises:*").await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
