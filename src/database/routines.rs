// ABOUTME: Routine and routine-exercise database operations
// ABOUTME: Generated routines persist routine plus exercises in one transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Routine, RoutineExercise};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

/// A routine joined with its exercise prescriptions
#[derive(Debug, Clone, serde::Serialize)]
pub struct RoutineWithExercises {
    #[serde(flatten)]
    pub routine: Routine,
    pub exercises: Vec<RoutineExercise>,
}

fn row_to_routine(row: &SqliteRow) -> Result<Routine, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;

    Ok(Routine {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_routine_exercise(row: &SqliteRow) -> Result<RoutineExercise, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let routine_id: String = row.try_get("routine_id")?;
    let exercise_id: String = row.try_get("exercise_id")?;

    Ok(RoutineExercise {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        routine_id: Uuid::parse_str(&routine_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        exercise_id: Uuid::parse_str(&exercise_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        day_of_week: row
            .try_get::<Option<i64>, _>("day_of_week")?
            .and_then(|v| u8::try_from(v).ok()),
        position: row
            .try_get::<i64, _>("position")
            .map(|v| u32::try_from(v).unwrap_or(0))?,
        sets: row
            .try_get::<Option<i64>, _>("sets")?
            .and_then(|v| u32::try_from(v).ok()),
        reps: row
            .try_get::<Option<i64>, _>("reps")?
            .and_then(|v| u32::try_from(v).ok()),
        duration_minutes: row
            .try_get::<Option<i64>, _>("duration_minutes")?
            .and_then(|v| u32::try_from(v).ok()),
        weight_kg: row.try_get("weight_kg")?,
    })
}

async fn insert_routine_exercise<'e, E>(executor: E, re: &RoutineExercise) -> AppResult<()>
where
    E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
{
    sqlx::query(
        r"
        INSERT INTO routine_exercises (
            id, routine_id, exercise_id, day_of_week, position,
            sets, reps, duration_minutes, weight_kg
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ",
    )
    .bind(re.id.to_string())
    .bind(re.routine_id.to_string())
    .bind(re.exercise_id.to_string())
    .bind(re.day_of_week.map(i64::from))
    .bind(i64::from(re.position))
    .bind(re.sets.map(i64::from))
    .bind(re.reps.map(i64::from))
    .bind(re.duration_minutes.map(i64::from))
    .bind(re.weight_kg)
    .execute(executor)
    .await?;
    Ok(())
}

impl Database {
    /// Create the routines and routine_exercises tables
    pub(super) async fn migrate_routines(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS routines (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                description TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS routine_exercises (
                id TEXT PRIMARY KEY,
                routine_id TEXT NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                day_of_week INTEGER CHECK (day_of_week BETWEEN 0 AND 6),
                position INTEGER NOT NULL DEFAULT 0,
                sets INTEGER,
                reps INTEGER,
                duration_minutes INTEGER,
                weight_kg REAL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_routines_user ON routines(user_id, is_active)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_routine_exercises_routine ON routine_exercises(routine_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a bare routine
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_routine(&self, routine: &Routine) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO routines (id, user_id, name, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(routine.id.to_string())
        .bind(routine.user_id.to_string())
        .bind(&routine.name)
        .bind(&routine.description)
        .bind(routine.is_active)
        .bind(routine.created_at)
        .bind(routine.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a routine together with its exercise rows in one transaction.
    ///
    /// A failure on any exercise insert rolls the routine back too, so a
    /// generated plan is never half-persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if any insert fails.
    pub async fn create_routine_with_exercises(
        &self,
        routine: &Routine,
        exercises: &[RoutineExercise],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO routines (id, user_id, name, description, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(routine.id.to_string())
        .bind(routine.user_id.to_string())
        .bind(&routine.name)
        .bind(&routine.description)
        .bind(routine.is_active)
        .bind(routine.created_at)
        .bind(routine.updated_at)
        .execute(&mut *tx)
        .await?;

        for re in exercises {
            insert_routine_exercise(&mut *tx, re).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Fetch a routine with its exercises, checking ownership
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn get_routine(
        &self,
        routine_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<RoutineWithExercises>> {
        let row = sqlx::query(
            "SELECT * FROM routines WHERE id = $1 AND user_id = $2 AND is_active = 1",
        )
        .bind(routine_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let routine = row_to_routine(&row)?;

        let exercise_rows = sqlx::query(
            r"
            SELECT * FROM routine_exercises
            WHERE routine_id = $1
            ORDER BY day_of_week, position
            ",
        )
        .bind(routine_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let exercises = exercise_rows
            .iter()
            .map(row_to_routine_exercise)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(RoutineWithExercises { routine, exercises }))
    }

    /// List the user's active routines
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_routines(&self, user_id: Uuid) -> AppResult<Vec<Routine>> {
        let rows = sqlx::query(
            "SELECT * FROM routines WHERE user_id = $1 AND is_active = 1 ORDER BY created_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_routine)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Update a routine's name and description
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the routine is not the user's.
    pub async fn update_routine(
        &self,
        routine_id: Uuid,
        user_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE routines SET name = $3, description = $4, updated_at = $5
            WHERE id = $1 AND user_id = $2 AND is_active = 1
            ",
        )
        .bind(routine_id.to_string())
        .bind(user_id.to_string())
        .bind(name)
        .bind(description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Routine"));
        }
        Ok(())
    }

    /// Soft-delete a routine
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the routine is not the user's.
    pub async fn deactivate_routine(&self, routine_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE routines SET is_active = 0, updated_at = $3
            WHERE id = $1 AND user_id = $2 AND is_active = 1
            ",
        )
        .bind(routine_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Routine"));
        }
        Ok(())
    }

    /// Add one exercise prescription to a routine the user owns
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the routine is not the user's.
    pub async fn add_routine_exercise(
        &self,
        user_id: Uuid,
        re: &RoutineExercise,
    ) -> AppResult<()> {
        self.assert_routine_owner(re.routine_id, user_id).await?;
        insert_routine_exercise(&self.pool, re).await
    }

    /// Update one exercise prescription
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the row or routine is not the user's.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_routine_exercise(
        &self,
        user_id: Uuid,
        routine_id: Uuid,
        routine_exercise_id: Uuid,
        sets: Option<u32>,
        reps: Option<u32>,
        duration_minutes: Option<u32>,
        weight_kg: Option<f64>,
        day_of_week: Option<u8>,
        position: Option<u32>,
    ) -> AppResult<()> {
        self.assert_routine_owner(routine_id, user_id).await?;

        let result = sqlx::query(
            r"
            UPDATE routine_exercises SET
                sets = COALESCE($3, sets),
                reps = COALESCE($4, reps),
                duration_minutes = COALESCE($5, duration_minutes),
                weight_kg = COALESCE($6, weight_kg),
                day_of_week = COALESCE($7, day_of_week),
                position = COALESCE($8, position)
            WHERE id = $1 AND routine_id = $2
            ",
        )
        .bind(routine_exercise_id.to_string())
        .bind(routine_id.to_string())
        .bind(sets.map(i64::from))
        .bind(reps.map(i64::from))
        .bind(duration_minutes.map(i64::from))
        .bind(weight_kg)
        .bind(day_of_week.map(i64::from))
        .bind(position.map(i64::from))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Routine exercise"));
        }
        Ok(())
    }

    /// Remove one exercise prescription
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the row or routine is not the user's.
    pub async fn remove_routine_exercise(
        &self,
        user_id: Uuid,
        routine_id: Uuid,
        routine_exercise_id: Uuid,
    ) -> AppResult<()> {
        self.assert_routine_owner(routine_id, user_id).await?;

        let result = sqlx::query(
            "DELETE FROM routine_exercises WHERE id = $1 AND routine_id = $2",
        )
        .bind(routine_exercise_id.to_string())
        .bind(routine_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Routine exercise"));
        }
        Ok(())
    }

    /// Total number of active routines (admin stats)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_routines(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM routines WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    async fn assert_routine_owner(&self, routine_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let row = sqlx::query(
            "SELECT 1 AS one FROM routines WHERE id = $1 AND user_id = $2 AND is_active = 1",
        )
        .bind(routine_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        if row.is_none() {
            return Err(AppError::not_found("Routine"));
        }
        Ok(())
    }
}
