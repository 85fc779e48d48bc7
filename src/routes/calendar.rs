// ABOUTME: Route handlers for the workout calendar
// ABOUTME: Scheduling routine instances on dates with completion tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::routes::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Query parameters for listing calendar entries
#[derive(Debug, Deserialize)]
pub struct CalendarRangeQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Request body for scheduling a routine
#[derive(Debug, Deserialize)]
pub struct ScheduleBody {
    pub routine_id: Uuid,
    pub date: NaiveDate,
}

/// Calendar routes handler
pub struct CalendarRoutes;

impl CalendarRoutes {
    /// Create all calendar routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/calendar", get(Self::handle_list))
            .route("/api/calendar", post(Self::handle_schedule))
            .route("/api/calendar/:id/complete", post(Self::handle_complete))
            .route("/api/calendar/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/calendar?from&to
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<CalendarRangeQuery>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        if query.from > query.to {
            return Err(AppError::invalid_input("from must not be after to"));
        }

        let entries = resources
            .database
            .list_scheduled_routines(auth.id, query.from, query.to)
            .await?;
        Ok((StatusCode::OK, Json(entries)).into_response())
    }

    /// Handle POST /api/calendar
    async fn handle_schedule(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<ScheduleBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let entry = resources
            .database
            .schedule_routine(auth.id, body.routine_id, body.date)
            .await?;
        Ok((StatusCode::CREATED, Json(entry)).into_response())
    }

    /// Handle POST /api/calendar/:id/complete
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(scheduled_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources
            .database
            .complete_scheduled_routine(scheduled_id, auth.id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle DELETE /api/calendar/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(scheduled_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources
            .database
            .delete_scheduled_routine(scheduled_id, auth.id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
