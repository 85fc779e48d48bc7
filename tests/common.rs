// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides in-memory database, router and session helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness
#![allow(dead_code)]

//! Shared test utilities for `forma_server` integration tests.

use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use forma_server::config::environment::{
    AuthConfig, DatabaseUrl, Environment, LogLevel, RateLimitConfig, ServerConfig, WgerConfig,
};
use forma_server::database::Database;
use forma_server::routes::{router, ServerResources};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard test configuration over an in-memory database
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        log_level: LogLevel::Warn,
        environment: Environment::Testing,
        database_url: DatabaseUrl::Memory,
        auth: AuthConfig {
            jwt_secret: "integration-test-secret-0123456789abcdef".to_owned(),
            jwt_expiry_hours: 24,
            refresh_expiry_days: 30,
        },
        rate_limit: RateLimitConfig {
            enabled: true,
            requests_per_window: 10_000,
            auth_requests_per_window: 10_000,
            window_seconds: 60,
        },
        frontend_url: None,
        cache_ttl_secs: 300,
        // External calls stay out of tests
        wger: WgerConfig {
            enabled: false,
            base_url: "https://wger.invalid/api/v2".to_owned(),
        },
    }
}

/// Build the full application over a fresh in-memory database
pub async fn test_app() -> (Router, Arc<ServerResources>) {
    init_test_logging();
    let config = Arc::new(test_config());
    let database = Database::new("sqlite::memory:")
        .await
        .expect("in-memory database");
    let resources = Arc::new(ServerResources::new(database, config));
    (router(Arc::clone(&resources)), resources)
}

/// Build a request with an optional bearer token and JSON body
pub fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Send a request through the router
pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.expect("response")
}

/// Read a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}

/// A registered user session for driving authed requests
pub struct TestSession {
    pub token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub email: String,
}

/// Register a user through the API and return their session.
///
/// The first registration in a fresh app becomes the admin.
pub async fn register_user(app: &Router, email: &str) -> TestSession {
    let response = send(
        app,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": email,
                "password": "correct-horse-battery",
                "display_name": "Test User",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    TestSession {
        token: body["token"].as_str().expect("token").to_owned(),
        refresh_token: body["refresh_token"]
            .as_str()
            .expect("refresh_token")
            .to_owned(),
        user_id: body["user"]["id"].as_str().expect("user id").to_owned(),
        email: email.to_owned(),
    }
}

/// Seed a mixed exercise catalog directly through the database handle
pub async fn seed_exercises(resources: &Arc<ServerResources>) {
    use chrono::Utc;
    use forma_server::models::{Exercise, ExerciseCategory};
    use uuid::Uuid;

    let names: [(&str, ExerciseCategory); 9] = [
        ("Back squat", ExerciseCategory::Strength),
        ("Deadlift", ExerciseCategory::Strength),
        ("Bench press", ExerciseCategory::Strength),
        ("Barbell row", ExerciseCategory::Strength),
        ("Overhead press", ExerciseCategory::Strength),
        ("Biceps curl", ExerciseCategory::Strength),
        ("Treadmill run", ExerciseCategory::Cardio),
        ("Rowing machine", ExerciseCategory::Cardio),
        ("Cycling", ExerciseCategory::Cardio),
    ];

    for (name, category) in names {
        resources
            .database
            .create_exercise(&Exercise {
                id: Uuid::new_v4(),
                name: name.to_owned(),
                category,
                description: None,
                muscle_group: None,
                image_url: None,
                video_url: None,
                is_public: true,
                created_by: None,
                created_at: Utc::now(),
            })
            .await
            .expect("seed exercise");
    }
}

/// Seed a food catalog that fills every generator bucket
pub async fn seed_foods(resources: &Arc<ServerResources>) {
    use chrono::Utc;
    use forma_server::models::Food;
    use uuid::Uuid;

    let foods: [(&str, f64, f64, f64, f64); 7] = [
        ("Chicken breast", 165.0, 31.0, 0.0, 3.6),
        ("Eggs", 155.0, 13.0, 1.1, 11.0),
        ("Oats", 380.0, 13.0, 67.0, 7.0),
        ("Pasta", 160.0, 5.8, 31.0, 0.9),
        ("Broccoli", 34.0, 2.8, 7.0, 0.4),
        ("Spinach", 23.0, 2.9, 3.6, 0.4),
        ("Olive oil", 884.0, 0.0, 0.0, 100.0),
    ];

    for (name, kcal, protein, carbs, fat) in foods {
        resources
            .database
            .create_food(&Food {
                id: Uuid::new_v4(),
                name: name.to_owned(),
                kcal_per_100g: kcal,
                protein_g: protein,
                carbs_g: carbs,
                fat_g: fat,
                is_public: true,
                created_by: None,
                created_at: Utc::now(),
            })
            .await
            .expect("seed food");
    }
}
