// ABOUTME: Route handler for listing earned achievements
// ABOUTME: Awarding happens on log writes, not here
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::AppResult;
use crate::routes::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Achievement routes handler
pub struct AchievementRoutes;

impl AchievementRoutes {
    /// Create all achievement routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/achievements", get(Self::handle_list))
            .with_state(resources)
    }

    /// Handle GET /api/achievements
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let achievements = resources.database.list_achievements(auth.id).await?;
        Ok((StatusCode::OK, Json(achievements)).into_response())
    }
}
