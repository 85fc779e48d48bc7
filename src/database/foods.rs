// ABOUTME: Food catalog database operations
// ABOUTME: Per-100g macro rows consumed by meal logging and the plan generator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::Food;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_food(row: &SqliteRow) -> Result<Food, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let created_by: Option<String> = row.try_get("created_by")?;

    Ok(Food {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        name: row.try_get("name")?,
        kcal_per_100g: row.try_get("kcal_per_100g")?,
        protein_g: row.try_get("protein_g")?,
        carbs_g: row.try_get("carbs_g")?,
        fat_g: row.try_get("fat_g")?,
        is_public: row.try_get("is_public")?,
        created_by: created_by
            .map(|c| Uuid::parse_str(&c))
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Create the foods table
    pub(super) async fn migrate_foods(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS foods (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                kcal_per_100g REAL NOT NULL,
                protein_g REAL NOT NULL DEFAULT 0,
                carbs_g REAL NOT NULL DEFAULT 0,
                fat_g REAL NOT NULL DEFAULT 0,
                is_public BOOLEAN NOT NULL DEFAULT 1,
                created_by TEXT REFERENCES users(id) ON DELETE SET NULL,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_foods_name ON foods(name)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a catalog food
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_food(&self, food: &Food) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO foods (
                id, name, kcal_per_100g, protein_g, carbs_g, fat_g,
                is_public, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(food.id.to_string())
        .bind(&food.name)
        .bind(food.kcal_per_100g)
        .bind(food.protein_g)
        .bind(food.carbs_g)
        .bind(food.fat_g)
        .bind(food.is_public)
        .bind(food.created_by.map(|id| id.to_string()))
        .bind(food.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetch one food
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_food(&self, food_id: Uuid) -> AppResult<Option<Food>> {
        let row = sqlx::query("SELECT * FROM foods WHERE id = $1")
            .bind(food_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_food).transpose().map_err(Into::into)
    }

    /// List public catalog foods with an optional name search
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_foods(&self, search: Option<&str>) -> AppResult<Vec<Food>> {
        let search_term = search.map(|s| format!("%{s}%"));
        let rows = sqlx::query(
            r"
            SELECT * FROM foods
            WHERE is_public = 1 AND ($1 IS NULL OR name LIKE $1)
            ORDER BY name
            ",
        )
        .bind(search_term)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_food).collect::<Result<_, _>>().map_err(Into::into)
    }

    /// Update a catalog food (admin)
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the food does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_food(
        &self,
        food_id: Uuid,
        name: &str,
        kcal_per_100g: f64,
        protein_g: f64,
        carbs_g: f64,
        fat_g: f64,
        is_public: bool,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r"
            UPDATE foods SET
                name = $2, kcal_per_100g = $3, protein_g = $4, carbs_g = $5,
                fat_g = $6, is_public = $7
            WHERE id = $1
            ",
        )
        .bind(food_id.to_string())
        .bind(name)
        .bind(kcal_per_100g)
        .bind(protein_g)
        .bind(carbs_g)
        .bind(fat_g)
        .bind(is_public)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Food"));
        }
        Ok(())
    }

    /// Delete a catalog food (admin)
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the food does not exist.
    pub async fn delete_food(&self, food_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM foods WHERE id = $1")
            .bind(food_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Food"));
        }
        Ok(())
    }
}
