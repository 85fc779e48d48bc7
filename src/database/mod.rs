// ABOUTME: Database handle over a sqlx SQLite pool with startup migrations
// ABOUTME: Per-resource query methods live in the sibling modules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Database layer.
//!
//! A single [`Database`] struct owns the connection pool; each resource
//! module adds its query methods through `impl Database` blocks and an
//! idempotent `migrate_*` function. Multi-table writes (routine plus its
//! exercises, log aggregates plus items, goal activation) run inside
//! explicit transactions so a mid-loop failure cannot leave a parent row
//! without its children.

mod achievements;
mod brand;
mod calendar;
mod checkins;
mod exercises;
mod foods;
mod goals;
mod invites;
mod logs;
mod meal_plans;
mod messaging;
mod routines;
mod tokens;
mod users;

pub use meal_plans::StoredMealPlan;
pub use routines::RoutineWithExercises;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Shared database handle
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to the database and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration statement fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // In-memory SQLite gives every pool connection its own database, so
        // the pool must be pinned to a single connection there.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let database = Self { pool };
        database.migrate().await?;
        Ok(database)
    }

    /// Run all schema migrations (idempotent)
    ///
    /// # Errors
    ///
    /// Returns an error if any DDL statement fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_tokens().await?;
        self.migrate_goals().await?;
        self.migrate_exercises().await?;
        self.migrate_foods().await?;
        self.migrate_routines().await?;
        self.migrate_logs().await?;
        self.migrate_meal_plans().await?;
        self.migrate_calendar().await?;
        self.migrate_messaging().await?;
        self.migrate_achievements().await?;
        self.migrate_checkins().await?;
        self.migrate_invites().await?;
        self.migrate_brand().await?;
        tracing::info!("Database migrations complete");
        Ok(())
    }

    /// Access the underlying pool (transactions, tests)
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lightweight connectivity probe for health reporting
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Short backend descriptor for startup logs
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        "sqlite"
    }
}
