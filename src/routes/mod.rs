// ABOUTME: HTTP route handlers and router assembly for the /api surface
// ABOUTME: Holds the shared ServerResources state and cross-cutting layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Route handlers.
//!
//! Each resource module exposes `routes(resources) -> Router`; this module
//! merges them under `/api` and applies the cross-cutting layers: request
//! tracing, CORS for the SPA, a body-size limit and the fixed-window rate
//! limiter (tighter on `/api/auth/*`).

pub mod achievements;
pub mod admin;
pub mod auth;
pub mod brand;
pub mod calendar;
pub mod checkins;
pub mod coach;
pub mod exercises;
pub mod foods;
pub mod goals;
pub mod logs;
pub mod meal_plans;
pub mod messaging;
pub mod onboarding;
pub mod recommendations;
pub mod routines;

use crate::auth::AuthManager;
use crate::cache::Cache;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::AppError;
use crate::external::wger_client::WgerClient;
use crate::middleware::AuthMiddleware;
use crate::rate_limiting::{client_ip, FixedWindowLimiter, LimitScope};
use axum::extract::connect_info::ConnectInfo;
use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body size (1 MiB)
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Cache capacity for catalog reads
const CACHE_MAX_ENTRIES: usize = 512;

/// Shared state injected into every handler
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub auth_middleware: AuthMiddleware,
    pub cache: Cache,
    pub rate_limiter: Arc<FixedWindowLimiter>,
    pub config: Arc<ServerConfig>,
    /// External exercise database; `None` when disabled
    pub wger: Option<WgerClient>,
    pub started_at: Instant,
}

impl ServerResources {
    /// Assemble the shared state from its parts
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let database = Arc::new(database);
        let auth_manager = Arc::new(AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.jwt_expiry_hours,
        ));
        let auth_middleware = AuthMiddleware::new(Arc::clone(&auth_manager), Arc::clone(&database));
        let wger = config
            .wger
            .enabled
            .then(|| WgerClient::new(config.wger.clone()));

        Self {
            database,
            auth_manager,
            auth_middleware,
            cache: Cache::new(
                CACHE_MAX_ENTRIES,
                Duration::from_secs(config.cache_ttl_secs),
            ),
            rate_limiter: Arc::new(FixedWindowLimiter::new(config.rate_limit.clone())),
            config,
            wger,
            started_at: Instant::now(),
        }
    }
}

/// Build the complete application router
pub fn router(resources: Arc<ServerResources>) -> Router {
    let cors = match resources.config.frontend_url.as_deref() {
        Some(origin) => match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers(Any),
            Err(_) => {
                tracing::warn!("FRONTEND_URL is not a valid origin, allowing any");
                CorsLayer::permissive()
            }
        },
        None => CorsLayer::permissive(),
    };

    let health = Router::new()
        .route("/api/health", get(handle_health))
        .with_state(Arc::clone(&resources));

    Router::new()
        .merge(health)
        .merge(auth::AuthRoutes::routes(Arc::clone(&resources)))
        .merge(onboarding::OnboardingRoutes::routes(Arc::clone(&resources)))
        .merge(goals::GoalRoutes::routes(Arc::clone(&resources)))
        .merge(exercises::ExerciseRoutes::routes(Arc::clone(&resources)))
        .merge(foods::FoodRoutes::routes(Arc::clone(&resources)))
        .merge(routines::RoutineRoutes::routes(Arc::clone(&resources)))
        .merge(meal_plans::MealPlanRoutes::routes(Arc::clone(&resources)))
        .merge(logs::LogRoutes::routes(Arc::clone(&resources)))
        .merge(calendar::CalendarRoutes::routes(Arc::clone(&resources)))
        .merge(recommendations::RecommendationRoutes::routes(Arc::clone(&resources)))
        .merge(coach::CoachRoutes::routes(Arc::clone(&resources)))
        .merge(checkins::CheckInRoutes::routes(Arc::clone(&resources)))
        .merge(messaging::MessagingRoutes::routes(Arc::clone(&resources)))
        .merge(achievements::AchievementRoutes::routes(Arc::clone(&resources)))
        .merge(admin::AdminRoutes::routes(Arc::clone(&resources)))
        .merge(brand::BrandRoutes::routes(Arc::clone(&resources)))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&resources),
            rate_limit_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .fallback(handle_not_found)
}

/// GET /api/health
async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Response {
    let report = crate::health::health_report(&resources.database, resources.started_at).await;
    let status = match report.status {
        crate::health::HealthStatus::Healthy => StatusCode::OK,
        crate::health::HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report)).into_response()
}

async fn handle_not_found() -> Response {
    AppError::not_found("Endpoint").into_response()
}

/// Fixed-window rate limiting applied to every request; `/api/auth/*` runs
/// on the tighter auth window
async fn rate_limit_middleware(
    State(resources): State<Arc<ServerResources>>,
    request: Request,
    next: Next,
) -> Response {
    let scope = if request.uri().path().starts_with("/api/auth") {
        LimitScope::Auth
    } else {
        LimitScope::Api
    };

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let ip = client_ip(request.headers(), peer);

    match resources.rate_limiter.check(scope, &ip) {
        Ok(info) => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            if let Ok(value) = HeaderValue::from_str(&info.limit.to_string()) {
                headers.insert("x-ratelimit-limit", value);
            }
            if let Ok(value) = HeaderValue::from_str(&info.remaining.to_string()) {
                headers.insert("x-ratelimit-remaining", value);
            }
            response
        }
        Err(error) => {
            let retry_after = resources.config.rate_limit.window_seconds;
            let mut response = error.into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("retry-after", value);
            }
            response
        }
    }
}
