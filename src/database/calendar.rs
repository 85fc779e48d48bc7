// ABOUTME: Scheduled routine database operations
// ABOUTME: Calendar instances of routines with completion tracking
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::ScheduledRoutine;
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_scheduled(row: &SqliteRow) -> Result<ScheduledRoutine, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;
    let routine_id: String = row.try_get("routine_id")?;

    Ok(ScheduledRoutine {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        routine_id: Uuid::parse_str(&routine_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        scheduled_date: row.try_get("scheduled_date")?,
        completed: row.try_get("completed")?,
        completed_at: row.try_get("completed_at")?,
    })
}

impl Database {
    /// Create the scheduled routines table
    pub(super) async fn migrate_calendar(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS scheduled_routines (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                routine_id TEXT NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
                scheduled_date DATE NOT NULL,
                completed BOOLEAN NOT NULL DEFAULT 0,
                completed_at DATETIME
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_scheduled_routines_user_date ON scheduled_routines(user_id, scheduled_date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Plan a routine for a date
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the routine is not the user's.
    pub async fn schedule_routine(
        &self,
        user_id: Uuid,
        routine_id: Uuid,
        scheduled_date: NaiveDate,
    ) -> AppResult<ScheduledRoutine> {
        // Ownership check doubles as an existence check
        if self.get_routine(routine_id, user_id).await?.is_none() {
            return Err(AppError::not_found("Routine"));
        }

        let scheduled = ScheduledRoutine {
            id: Uuid::new_v4(),
            user_id,
            routine_id,
            scheduled_date,
            completed: false,
            completed_at: None,
        };

        sqlx::query(
            r"
            INSERT INTO scheduled_routines (id, user_id, routine_id, scheduled_date, completed)
            VALUES ($1, $2, $3, $4, 0)
            ",
        )
        .bind(scheduled.id.to_string())
        .bind(user_id.to_string())
        .bind(routine_id.to_string())
        .bind(scheduled_date)
        .execute(&self.pool)
        .await?;

        Ok(scheduled)
    }

    /// List planned routines in an inclusive date range
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_scheduled_routines(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<ScheduledRoutine>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM scheduled_routines
            WHERE user_id = $1 AND scheduled_date BETWEEN $2 AND $3
            ORDER BY scheduled_date
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_scheduled)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Mark a planned routine as completed
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the entry is not the user's.
    pub async fn complete_scheduled_routine(
        &self,
        scheduled_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE scheduled_routines SET completed = 1, completed_at = $3
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(scheduled_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Scheduled routine"));
        }
        Ok(())
    }

    /// Remove a planned routine from the calendar
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the entry is not the user's.
    pub async fn delete_scheduled_routine(
        &self,
        scheduled_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM scheduled_routines WHERE id = $1 AND user_id = $2",
        )
        .bind(scheduled_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Scheduled routine"));
        }
        Ok(())
    }
}
