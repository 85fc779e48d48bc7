// ABOUTME: Route handlers for client check-ins
// ABOUTME: Clients with a coach submit notes and weight; the coach is notified
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::routes::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Request body for submitting a check-in
#[derive(Debug, Deserialize, Default)]
pub struct CreateCheckInBody {
    pub note: Option<String>,
    pub weight_kg: Option<f64>,
}

/// Check-in routes handler
pub struct CheckInRoutes;

impl CheckInRoutes {
    /// Create all check-in routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/checkins", post(Self::handle_create))
            .route("/api/checkins", get(Self::handle_list))
            .with_state(resources)
    }

    /// Handle POST /api/checkins
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateCheckInBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let Some(coach_id) = auth.coach_id else {
            return Err(AppError::invalid_input(
                "Check-ins require an assigned coach",
            ));
        };

        if body.note.is_none() && body.weight_kg.is_none() {
            return Err(AppError::invalid_input(
                "A check-in needs a note or a weight",
            ));
        }
        if let Some(weight) = body.weight_kg {
            if !(20.0..=400.0).contains(&weight) {
                return Err(AppError::invalid_input("weight_kg must be between 20 and 400"));
            }
        }

        let checkin = resources
            .database
            .create_checkin(auth.id, coach_id, body.note.as_deref(), body.weight_kg)
            .await?;

        resources
            .database
            .create_notification(
                coach_id,
                "checkin",
                "New check-in",
                &format!("{} submitted a check-in", auth.email),
            )
            .await?;

        Ok((StatusCode::CREATED, Json(checkin)).into_response())
    }

    /// Handle GET /api/checkins - the client's own history
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let checkins = resources.database.list_checkins_for_client(auth.id).await?;
        Ok((StatusCode::OK, Json(checkins)).into_response())
    }
}
