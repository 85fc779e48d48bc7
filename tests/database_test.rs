// ABOUTME: Database-level tests for transactional writes and invariants
// ABOUTME: Covers generation atomicity, goal activation and calendar flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

mod common;

use chrono::{NaiveDate, Utc};
use common::{init_test_logging, seed_exercises, test_app};
use forma_server::models::{Goal, GoalType, Routine, RoutineExercise, User};
use uuid::Uuid;

fn routine_for(user_id: Uuid, name: &str) -> Routine {
    let now = Utc::now();
    Routine {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_owned(),
        description: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

fn goal_for(user_id: Uuid, goal_type: GoalType, active: bool) -> Goal {
    Goal {
        id: Uuid::new_v4(),
        user_id,
        goal_type,
        target_weight_kg: None,
        starting_weight_kg: None,
        daily_calorie_goal: None,
        is_active: active,
        created_at: Utc::now(),
    }
}

async fn create_user(database: &forma_server::database::Database, email: &str) -> Uuid {
    let user = User::new(email.to_owned(), "hash".to_owned(), None);
    database.create_user(&user).await.unwrap()
}

#[tokio::test]
async fn test_routine_with_exercises_is_atomic() {
    init_test_logging();
    let (_app, resources) = test_app().await;
    let database = &resources.database;
    let user_id = create_user(database, "a@example.com").await;

    let routine = routine_for(user_id, "Broken");
    // Second row references a nonexistent exercise: the FK violation must
    // roll the whole write back, including the routine row itself
    let rows = vec![
        RoutineExercise {
            id: Uuid::new_v4(),
            routine_id: routine.id,
            exercise_id: Uuid::new_v4(),
            day_of_week: Some(0),
            position: 0,
            sets: Some(3),
            reps: Some(10),
            duration_minutes: None,
            weight_kg: None,
        },
    ];

    let result = database.create_routine_with_exercises(&routine, &rows).await;
    assert!(result.is_err());

    let stored = database.get_routine(routine.id, user_id).await.unwrap();
    assert!(stored.is_none(), "routine row survived a failed child insert");
}

#[tokio::test]
async fn test_routine_with_valid_exercises_persists_together() {
    init_test_logging();
    let (_app, resources) = test_app().await;
    seed_exercises(&resources).await;
    let database = &resources.database;
    let user_id = create_user(database, "a@example.com").await;

    let catalog = database.list_exercises(None, None).await.unwrap();
    let routine = routine_for(user_id, "Full");
    let rows: Vec<RoutineExercise> = catalog
        .iter()
        .take(3)
        .enumerate()
        .map(|(i, exercise)| RoutineExercise {
            id: Uuid::new_v4(),
            routine_id: routine.id,
            exercise_id: exercise.id,
            day_of_week: Some(0),
            position: i as u32,
            sets: Some(3),
            reps: Some(10),
            duration_minutes: None,
            weight_kg: None,
        })
        .collect();

    database
        .create_routine_with_exercises(&routine, &rows)
        .await
        .unwrap();

    let stored = database.get_routine(routine.id, user_id).await.unwrap().unwrap();
    assert_eq!(stored.exercises.len(), 3);
}

#[tokio::test]
async fn test_goal_activation_swaps_atomically() {
    init_test_logging();
    let (_app, resources) = test_app().await;
    let database = &resources.database;
    let user_id = create_user(database, "a@example.com").await;

    let first = goal_for(user_id, GoalType::WeightLoss, true);
    database.create_goal(&first).await.unwrap();
    let second = goal_for(user_id, GoalType::Maintain, true);
    database.create_goal(&second).await.unwrap();

    // Creating the second active goal deactivated the first
    let active = database.get_active_goal(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, second.id);

    // Re-activating the first swaps back
    database.activate_goal(first.id, user_id).await.unwrap();
    let active = database.get_active_goal(user_id).await.unwrap().unwrap();
    assert_eq!(active.id, first.id);

    let goals = database.list_goals(user_id).await.unwrap();
    assert_eq!(goals.iter().filter(|g| g.is_active).count(), 1);
}

#[tokio::test]
async fn test_calendar_schedule_and_complete() {
    init_test_logging();
    let (_app, resources) = test_app().await;
    let database = &resources.database;
    let user_id = create_user(database, "a@example.com").await;

    let routine = routine_for(user_id, "Plan");
    database.create_routine(&routine).await.unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let scheduled = database
        .schedule_routine(user_id, routine.id, date)
        .await
        .unwrap();

    let entries = database
        .list_scheduled_routines(user_id, date, date)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].completed);

    database
        .complete_scheduled_routine(scheduled.id, user_id)
        .await
        .unwrap();
    let entries = database
        .list_scheduled_routines(user_id, date, date)
        .await
        .unwrap();
    assert!(entries[0].completed);
    assert!(entries[0].completed_at.is_some());

    // Scheduling someone else's routine is rejected
    let other_id = create_user(database, "b@example.com").await;
    let result = database.schedule_routine(other_id, routine.id, date).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_expired_invite_is_rejected() {
    init_test_logging();
    let (_app, resources) = test_app().await;
    let database = &resources.database;
    let coach_id = create_user(database, "coach@example.com").await;
    let client_id = create_user(database, "client@example.com").await;

    let token_hash = forma_server::auth::hash_token("expired-token");
    database
        .create_invite(
            coach_id,
            &token_hash,
            None,
            Utc::now() - chrono::Duration::hours(1),
        )
        .await
        .unwrap();

    let result = database.accept_invite(&token_hash, client_id).await;
    assert!(result.is_err());

    // The client was not linked
    let client = database.get_user(client_id).await.unwrap().unwrap();
    assert!(client.coach_id.is_none());
}

#[tokio::test]
async fn test_file_backed_database_survives_reconnect() {
    init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("forma.db").display());

    let user_id = {
        let database = forma_server::database::Database::new(&url).await.unwrap();
        create_user(&database, "persist@example.com").await
    };

    // A fresh connection sees the committed row; migrations are idempotent
    let database = forma_server::database::Database::new(&url).await.unwrap();
    let user = database.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.email, "persist@example.com");
}

#[tokio::test]
async fn test_daily_log_unique_per_user_and_date() {
    init_test_logging();
    let (_app, resources) = test_app().await;
    let database = &resources.database;
    let user_id = create_user(database, "a@example.com").await;

    let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
    let first = database.get_or_create_daily_log(user_id, date).await.unwrap();
    let second = database.get_or_create_daily_log(user_id, date).await.unwrap();
    assert_eq!(first.id, second.id);

    assert_eq!(database.count_daily_logs_for_user(user_id).await.unwrap(), 1);
}
