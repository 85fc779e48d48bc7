// ABOUTME: Goal database operations
// ABOUTME: Enforces the single-active-goal invariant inside a transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Goal, GoalType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_goal(row: &SqliteRow) -> Result<Goal, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let goal_type: String = row.try_get("goal_type")?;

    Ok(Goal {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        goal_type: GoalType::parse(&goal_type),
        target_weight_kg: row.try_get("target_weight_kg")?,
        starting_weight_kg: row.try_get("starting_weight_kg")?,
        daily_calorie_goal: row
            .try_get::<Option<i64>, _>("daily_calorie_goal")?
            .and_then(|v| u32::try_from(v).ok()),
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Create the goals table
    pub(super) async fn migrate_goals(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS goals (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                goal_type TEXT NOT NULL CHECK (goal_type IN ('weight_loss', 'weight_gain', 'maintain')),
                target_weight_kg REAL,
                starting_weight_kg REAL,
                daily_calorie_goal INTEGER,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id, is_active)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a goal; when `activate` is set, every other goal the user has
    /// is deactivated in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the writes fail.
    pub async fn create_goal(&self, goal: &Goal) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        if goal.is_active {
            sqlx::query("UPDATE goals SET is_active = 0 WHERE user_id = $1")
                .bind(goal.user_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r"
            INSERT INTO goals (
                id, user_id, goal_type, target_weight_kg, starting_weight_kg,
                daily_calorie_goal, is_active, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(goal.id.to_string())
        .bind(goal.user_id.to_string())
        .bind(goal.goal_type.as_str())
        .bind(goal.target_weight_kg)
        .bind(goal.starting_weight_kg)
        .bind(goal.daily_calorie_goal.map(i64::from))
        .bind(goal.is_active)
        .bind(goal.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Fetch a goal by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_goal(&self, goal_id: Uuid) -> AppResult<Option<Goal>> {
        let row = sqlx::query("SELECT * FROM goals WHERE id = $1")
            .bind(goal_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_goal).transpose().map_err(Into::into)
    }

    /// Fetch the user's active goal, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_active_goal(&self, user_id: Uuid) -> AppResult<Option<Goal>> {
        let row = sqlx::query(
            "SELECT * FROM goals WHERE user_id = $1 AND is_active = 1 ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_goal).transpose().map_err(Into::into)
    }

    /// List all goals for a user, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_goals(&self, user_id: Uuid) -> AppResult<Vec<Goal>> {
        let rows = sqlx::query("SELECT * FROM goals WHERE user_id = $1 ORDER BY created_at DESC")
            .bind(user_id.to_string())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_goal).collect::<Result<_, _>>().map_err(Into::into)
    }

    /// Update a goal's targets
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the goal does not belong to the user.
    pub async fn update_goal(
        &self,
        goal_id: Uuid,
        user_id: Uuid,
        goal_type: GoalType,
        target_weight_kg: Option<f64>,
        daily_calorie_goal: Option<u32>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE goals SET goal_type = $3, target_weight_kg = $4, daily_calorie_goal = $5
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(goal_id.to_string())
        .bind(user_id.to_string())
        .bind(goal_type.as_str())
        .bind(target_weight_kg)
        .bind(daily_calorie_goal.map(i64::from))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Goal"));
        }
        Ok(())
    }

    /// Make a goal the user's active one, deactivating the rest
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the goal does not belong to the user.
    pub async fn activate_goal(&self, goal_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE goals SET is_active = 1 WHERE id = $1 AND user_id = $2",
        )
        .bind(goal_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Goal"));
        }

        sqlx::query("UPDATE goals SET is_active = 0 WHERE user_id = $1 AND id != $2")
            .bind(user_id.to_string())
            .bind(goal_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Delete a goal
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the goal does not belong to the user.
    pub async fn delete_goal(&self, goal_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM goals WHERE id = $1 AND user_id = $2")
            .bind(goal_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Goal"));
        }
        Ok(())
    }
}
