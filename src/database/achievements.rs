// ABOUTME: Achievement database operations
// ABOUTME: Idempotent awarding keyed by a per-user unique code
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::AppResult;
use crate::models::Achievement;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_achievement(row: &SqliteRow) -> Result<Achievement, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;

    Ok(Achievement {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        code: row.try_get("code")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        earned_at: row.try_get("earned_at")?,
    })
}

impl Database {
    /// Create the achievements table
    pub(super) async fn migrate_achievements(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS achievements (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                code TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                earned_at DATETIME NOT NULL,
                UNIQUE (user_id, code)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Award an achievement once; repeat awards are silently ignored.
    ///
    /// Returns `true` when the badge was newly earned.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails for reasons other than the
    /// uniqueness guard.
    pub async fn award_achievement(
        &self,
        user_id: Uuid,
        code: &str,
        title: &str,
        description: &str,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r"
            INSERT OR IGNORE INTO achievements (id, user_id, code, title, description, earned_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(code)
        .bind(title)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's achievements, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_achievements(&self, user_id: Uuid) -> AppResult<Vec<Achievement>> {
        let rows = sqlx::query(
            "SELECT * FROM achievements WHERE user_id = $1 ORDER BY earned_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_achievement)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }
}
