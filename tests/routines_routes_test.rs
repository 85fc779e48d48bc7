// ABOUTME: Integration tests for routine CRUD and transactional generation
// ABOUTME: Covers the create-then-fetch contract and generator day patterns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, register_user, request, seed_exercises, send, test_app};

#[tokio::test]
async fn test_create_and_fetch_routine() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/routines",
            Some(&session.token),
            Some(serde_json::json!({ "name": "Leg Day" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["name"], serde_json::json!("Leg Day"));
    assert_eq!(created["is_active"], serde_json::json!(true));
    let routine_id = created["id"].as_str().unwrap().to_owned();

    // Fetching it back returns the routine with an empty exercise list
    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/api/routines/{routine_id}"),
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], serde_json::json!("Leg Day"));
    assert_eq!(fetched["exercises"], serde_json::json!([]));
}

#[tokio::test]
async fn test_routines_are_owned() {
    let (app, _resources) = test_app().await;
    let owner = register_user(&app, "owner@example.com").await;
    let other = register_user(&app, "other@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/routines",
            Some(&owner.token),
            Some(serde_json::json!({ "name": "Push Day" })),
        ),
    )
    .await;
    let routine_id = body_json(response).await["id"].as_str().unwrap().to_owned();

    // Someone else cannot read it
    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/api/routines/{routine_id}"),
            Some(&other.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soft_delete_hides_routine() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/routines",
            Some(&session.token),
            Some(serde_json::json!({ "name": "Pull Day" })),
        ),
    )
    .await;
    let routine_id = body_json(response).await["id"].as_str().unwrap().to_owned();

    let response = send(
        &app,
        request(
            Method::DELETE,
            &format!("/api/routines/{routine_id}"),
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Gone from the list and from direct fetch
    let response = send(
        &app,
        request(Method::GET, "/api/routines", Some(&session.token), None),
    )
    .await;
    assert_eq!(body_json(response).await, serde_json::json!([]));

    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/api/routines/{routine_id}"),
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_generate_routine_weight_loss_pattern() {
    let (app, resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;
    seed_exercises(&resources).await;

    // Loss goal drives the 2 strength / 3 cardio split
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/goals",
            Some(&session.token),
            Some(serde_json::json!({ "goal_type": "weight_loss" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/routines/generate",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let generated = body_json(response).await;

    let exercises = generated["exercises"].as_array().unwrap();
    assert!(!exercises.is_empty());

    // Strength rows carry sets/reps, cardio rows carry duration; count
    // distinct days of each kind
    let mut strength_days = std::collections::HashSet::new();
    let mut cardio_days = std::collections::HashSet::new();
    for row in exercises {
        let day = row["day_of_week"].as_u64().unwrap();
        if row["sets"].is_null() {
            cardio_days.insert(day);
        } else {
            strength_days.insert(day);
        }
    }
    assert_eq!(strength_days.len(), 2);
    assert_eq!(cardio_days.len(), 3);
}

#[tokio::test]
async fn test_generate_without_catalog_is_bad_request() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/routines/generate",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_exercise_to_routine() {
    let (app, resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;
    seed_exercises(&resources).await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/routines",
            Some(&session.token),
            Some(serde_json::json!({ "name": "Custom" })),
        ),
    )
    .await;
    let routine_id = body_json(response).await["id"].as_str().unwrap().to_owned();

    let response = send(
        &app,
        request(Method::GET, "/api/exercises", Some(&session.token), None),
    )
    .await;
    let catalog = body_json(response).await;
    let exercise_id = catalog[0]["id"].as_str().unwrap().to_owned();

    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/api/routines/{routine_id}/exercises"),
            Some(&session.token),
            Some(serde_json::json!({
                "exercise_id": exercise_id,
                "day_of_week": 0,
                "sets": 3,
                "reps": 10,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/api/routines/{routine_id}"),
            Some(&session.token),
            None,
        ),
    )
    .await;
    let fetched = body_json(response).await;
    assert_eq!(fetched["exercises"].as_array().unwrap().len(), 1);
}
