// ABOUTME: Exercise catalog database operations
// ABOUTME: Public catalog reads plus admin-managed writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Exercise, ExerciseCategory};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_exercise(row: &SqliteRow) -> Result<Exercise, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let category: String = row.try_get("category")?;
    let created_by: Option<String> = row.try_get("created_by")?;

    Ok(Exercise {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        name: row.try_get("name")?,
        category: ExerciseCategory::parse(&category),
        description: row.try_get("description")?,
        muscle_group: row.try_get("muscle_group")?,
        image_url: row.try_get("image_url")?,
        video_url: row.try_get("video_url")?,
        is_public: row.try_get("is_public")?,
        created_by: created_by
            .map(|c| Uuid::parse_str(&c))
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Create the exercises table
    pub(super) async fn migrate_exercises(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category TEXT NOT NULL CHECK (category IN ('strength', 'cardio')),
                description TEXT,
                muscle_group TEXT,
                image_url TEXT,
                video_url TEXT,
                is_public BOOLEAN NOT NULL DEFAULT 1,
                created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_exercises_category ON exercises(category)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a catalog exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_exercise(&self, exercise: &Exercise) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO exercises (
                id, name, category, description, muscle_group, image_url,
                video_url, is_public, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(&exercise.name)
        .bind(exercise.category.as_str())
        .bind(&exercise.description)
        .bind(&exercise.muscle_group)
        .bind(&exercise.image_url)
        .bind(&exercise.video_url)
        .bind(exercise.is_public)
        .bind(exercise.created_by.map(|id| id.to_string()))
        .bind(exercise.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch one exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_exercise(&self, exercise_id: Uuid) -> AppResult<Option<Exercise>> {
        let row = sqlx::query("SELECT * FROM exercises WHERE id = $1")
            .bind(exercise_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_exercise).transpose().map_err(Into::into)
    }

    /// List public catalog exercises, optionally filtered by category or a
    /// name search term
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_exercises(
        &self,
        category: Option<ExerciseCategory>,
        search: Option<&str>,
    ) -> AppResult<Vec<Exercise>> {
        let search_term = search.map(|s| format!("%{s}%"));
        let rows = sqlx::query(
            r"
            SELECT * FROM exercises
            WHERE is_public = 1
              AND ($1 IS NULL OR category = $1)
              AND ($2 IS NULL OR name LIKE $2)
            ORDER BY name
            ",
        )
        .bind(category.map(ExerciseCategory::as_str))
        .bind(search_term)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_exercise)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Update a catalog exercise (admin)
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the exercise does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_exercise(
        &self,
        exercise_id: Uuid,
        name: &str,
        category: ExerciseCategory,
        description: Option<&str>,
        muscle_group: Option<&str>,
        image_url: Option<&str>,
        video_url: Option<&str>,
        is_public: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE exercises SET
                name = $2, category = $3, description = $4, muscle_group = $5,
                image_url = $6, video_url = $7, is_public = $8
            WHERE id = $1
            ",
        )
        .bind(exercise_id.to_string())
        .bind(name)
        .bind(category.as_str())
        .bind(description)
        .bind(muscle_group)
        .bind(image_url)
        .bind(video_url)
        .bind(is_public)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Exercise"));
        }
        Ok(())
    }

    /// Delete a catalog exercise (admin)
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the exercise does not exist.
    pub async fn delete_exercise(&self, exercise_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(exercise_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Exercise"));
        }
        Ok(())
    }
}
