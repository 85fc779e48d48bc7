// ABOUTME: Route handlers for the food catalog
// ABOUTME: Cached public reads, admin writes with macro validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::models::Food;
use crate::routes::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Query parameters for listing foods
#[derive(Debug, Deserialize, Default)]
pub struct ListFoodsQuery {
    /// Name search term
    pub search: Option<String>,
}

/// Request body for creating or updating a catalog food
#[derive(Debug, Deserialize)]
pub struct FoodBody {
    pub name: String,
    pub kcal_per_100g: f64,
    #[serde(default)]
    pub protein_g: f64,
    #[serde(default)]
    pub carbs_g: f64,
    #[serde(default)]
    pub fat_g: f64,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

const fn default_true() -> bool {
    true
}

fn validate_food(body: &FoodBody) -> AppResult<()> {
    if body.name.trim().is_empty() {
        return Err(AppError::invalid_input("Food name must not be empty"));
    }
    if body.kcal_per_100g <= 0.0 || body.kcal_per_100g > 900.0 {
        return Err(AppError::invalid_input(
            "kcal_per_100g must be between 0 and 900",
        ));
    }
    for (field, value) in [
        ("protein_g", body.protein_g),
        ("carbs_g", body.carbs_g),
        ("fat_g", body.fat_g),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(AppError::invalid_input(format!(
                "{field} must be between 0 and 100 grams per 100g"
            )));
        }
    }
    Ok(())
}

/// Food routes handler
pub struct FoodRoutes;

impl FoodRoutes {
    /// Create all food routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/foods", get(Self::handle_list))
            .route("/api/foods", post(Self::handle_create))
            .route("/api/foods/:id", get(Self::handle_get))
            .route("/api/foods/:id", put(Self::handle_update))
            .route("/api/foods/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/foods
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListFoodsQuery>,
    ) -> AppResult<Response> {
        resources.auth_middleware.authenticate_request(&headers).await?;

        let cache_key = format!("foods:list:{}", query.search.as_deref().unwrap_or(""));
        if let Some(cached) = resources.cache.get::<Vec<Food>>(&cache_key).await? {
            return Ok((StatusCode::OK, Json(cached)).into_response());
        }

        let foods = resources
            .database
            .list_foods(query.search.as_deref())
            .await?;
        resources.cache.set(&cache_key, &foods).await?;
        Ok((StatusCode::OK, Json(foods)).into_response())
    }

    /// Handle GET /api/foods/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(food_id): Path<Uuid>,
    ) -> AppResult<Response> {
        resources.auth_middleware.authenticate_request(&headers).await?;
        let food = resources
            .database
            .get_food(food_id)
            .await?
            .ok_or_else(|| AppError::not_found("Food"))?;
        Ok((StatusCode::OK, Json(food)).into_response())
    }

    /// Handle POST /api/foods (admin)
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<FoodBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;
        validate_food(&body)?;

        let food = Food {
            id: Uuid::new_v4(),
            name: body.name.trim().to_owned(),
            kcal_per_100g: body.kcal_per_100g,
            protein_g: body.protein_g,
            carbs_g: body.carbs_g,
            fat_g: body.fat_g,
            is_public: body.is_public,
            created_by: Some(auth.id),
            created_at: Utc::now(),
        };
        resources.database.create_food(&food).await?;
        resources.cache.invalidate_pattern("foods:*").await?;

        Ok((StatusCode::CREATED, Json(food)).into_response())
    }

    /// Handle PUT /api/foods/:id (admin)
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(food_id): Path<Uuid>,
        Json(body): Json<FoodBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;
        validate_food(&body)?;

        resources
            .database
            .update_food(
                food_id,
                body.name.trim(),
                body.kcal_per_100g,
                body.protein_g,
                body.carbs_g,
                body.fat_g,
                body.is_public,
            )
            .await?;
        resources.cache.invalidate_pattern("foods:*").await?;

        let food = resources
            .database
            .get_food(food_id)
            .await?
            .ok_or_else(|| AppError::not_found("Food"))?;
        Ok((StatusCode::OK, Json(food)).into_response())
    }

    /// Handle DELETE /api/foods/:id (admin)
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(food_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        resources.database.delete_food(food_id).await?;
        resources.cache.invalidate_pattern("foods:*").await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
