// ABOUTME: Public route handler for site branding
// ABOUTME: Unauthenticated, cached read used by the SPA shell
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::AppResult;
use crate::models::BrandSettings;
use crate::routes::ServerResources;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

/// Brand routes handler
pub struct BrandRoutes;

impl BrandRoutes {
    /// Create all brand routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/brand", get(Self::handle_get))
            .with_state(resources)
    }

    /// Handle GET /api/brand (public)
    async fn handle_get(State(resources): State<Arc<ServerResources>>) -> AppResult<Response> {
        const CACHE_KEY: &str = "brand:settings";

        if let Some(cached) = resources.cache.get::<BrandSettings>(CACHE_KEY).await? {
            return Ok((StatusCode::OK, Json(cached)).into_response());
        }

        let settings = resources.database.get_brand_settings().await?;
        resources.cache.set(CACHE_KEY, &settings).await?;
        Ok((StatusCode::OK, Json(settings)).into_response())
    }
}
