// ABOUTME: Persisted generated meal plans
// ABOUTME: Stores the plan document as JSON; the generator itself has no side effects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::generators::meal_plan::GeneratedMealPlan;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

/// A stored meal plan document
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredMealPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub daily_calorie_target: f64,
    pub plan: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Database {
    /// Create the meal plans table
    pub(super) async fn migrate_meal_plans(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meal_plans (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                daily_calorie_target REAL NOT NULL,
                plan_json TEXT NOT NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_meal_plans_user ON meal_plans(user_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Persist a generated plan for later retrieval
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the insert fails.
    pub async fn create_meal_plan(
        &self,
        user_id: Uuid,
        plan: &GeneratedMealPlan,
    ) -> AppResult<StoredMealPlan> {
        let stored = StoredMealPlan {
            id: Uuid::new_v4(),
            user_id,
            daily_calorie_target: plan.daily_calorie_target,
            plan: serde_json::to_value(plan)?,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO meal_plans (id, user_id, daily_calorie_target, plan_json, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(stored.id.to_string())
        .bind(user_id.to_string())
        .bind(stored.daily_calorie_target)
        .bind(stored.plan.to_string())
        .bind(stored.created_at)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Fetch a stored plan, checking ownership
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored JSON is corrupt.
    pub async fn get_meal_plan(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<StoredMealPlan>> {
        let row = sqlx::query("SELECT * FROM meal_plans WHERE id = $1 AND user_id = $2")
            .bind(plan_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else { return Ok(None) };

        let id: String = row.try_get("id")?;
        let plan_json: String = row.try_get("plan_json")?;

        Ok(Some(StoredMealPlan {
            id: Uuid::parse_str(&id).map_err(|e| AppError::database(e.to_string()))?,
            user_id,
            daily_calorie_target: row.try_get("daily_calorie_target")?,
            plan: serde_json::from_str(&plan_json)?,
            created_at: row.try_get("created_at")?,
        }))
    }

    /// List a user's stored plans, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_meal_plans(&self, user_id: Uuid) -> AppResult<Vec<StoredMealPlan>> {
        let rows = sqlx::query(
            "SELECT * FROM meal_plans WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let id: String = row.try_get("id")?;
                let plan_json: String = row.try_get("plan_json")?;
                Ok(StoredMealPlan {
                    id: Uuid::parse_str(&id)
                        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                    user_id,
                    daily_calorie_target: row.try_get("daily_calorie_target")?,
                    plan: serde_json::from_str(&plan_json)
                        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect::<Result<_, sqlx::Error>>()
            .map_err(Into::into)
    }
}
