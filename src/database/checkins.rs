// ABOUTME: Check-in database operations
// ABOUTME: Client-submitted weekly check-ins with coach comments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::CheckIn;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_checkin(row: &SqliteRow) -> Result<CheckIn, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let client_id: String = row.try_get("client_id")?;
    let coach_id: String = row.try_get("coach_id")?;

    Ok(CheckIn {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        client_id: Uuid::parse_str(&client_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        coach_id: Uuid::parse_str(&coach_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        note: row.try_get("note")?,
        weight_kg: row.try_get("weight_kg")?,
        coach_comment: row.try_get("coach_comment")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Create the check-ins table
    pub(super) async fn migrate_checkins(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS checkins (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                coach_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                note TEXT,
                weight_kg REAL,
                coach_comment TEXT,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_checkins_coach ON checkins(coach_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Record a client check-in for their coach
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_checkin(
        &self,
        client_id: Uuid,
        coach_id: Uuid,
        note: Option<&str>,
        weight_kg: Option<f64>,
    ) -> AppResult<CheckIn> {
        let checkin = CheckIn {
            id: Uuid::new_v4(),
            client_id,
            coach_id,
            note: note.map(ToOwned::to_owned),
            weight_kg,
            coach_comment: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO checkins (id, client_id, coach_id, note, weight_kg, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(checkin.id.to_string())
        .bind(client_id.to_string())
        .bind(coach_id.to_string())
        .bind(note)
        .bind(weight_kg)
        .bind(checkin.created_at)
        .execute(&self.pool)
        .await?;

        Ok(checkin)
    }

    /// Check-ins submitted by one client, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_checkins_for_client(&self, client_id: Uuid) -> AppResult<Vec<CheckIn>> {
        let rows = sqlx::query(
            "SELECT * FROM checkins WHERE client_id = $1 ORDER BY created_at DESC",
        )
        .bind(client_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_checkin)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Check-ins addressed to a coach across all their clients, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_checkins_for_coach(&self, coach_id: Uuid) -> AppResult<Vec<CheckIn>> {
        let rows = sqlx::query(
            "SELECT * FROM checkins WHERE coach_id = $1 ORDER BY created_at DESC",
        )
        .bind(coach_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_checkin)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Attach a coach comment to a check-in addressed to this coach
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the check-in is not addressed to the
    /// coach.
    pub async fn comment_on_checkin(
        &self,
        checkin_id: Uuid,
        coach_id: Uuid,
        comment: &str,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE checkins SET coach_comment = $3 WHERE id = $1 AND coach_id = $2",
        )
        .bind(checkin_id.to_string())
        .bind(coach_id.to_string())
        .bind(comment)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Check-in"));
        }
        Ok(())
    }
}
