// ABOUTME: Daily log, meal item and daily exercise database operations
// ABOUTME: Logs are lazily created; calorie aggregates update in the item's transaction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{DailyExercise, DailyLog, Food, Meal, MealItem};
use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_daily_log(row: &SqliteRow) -> Result<DailyLog, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;

    Ok(DailyLog {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        log_date: row.try_get("log_date")?,
        weight_kg: row.try_get("weight_kg")?,
        calories_consumed: row.try_get("calories_consumed")?,
        calories_burned: row.try_get("calories_burned")?,
        notes: row.try_get("notes")?,
    })
}

fn row_to_meal_item(row: &SqliteRow) -> Result<MealItem, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let daily_log_id: String = row.try_get("daily_log_id")?;
    let food_id: String = row.try_get("food_id")?;
    let meal: String = row.try_get("meal")?;

    Ok(MealItem {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        daily_log_id: Uuid::parse_str(&daily_log_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        food_id: Uuid::parse_str(&food_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        meal: Meal::parse(&meal),
        quantity_g: row.try_get("quantity_g")?,
        logged_at: row.try_get("logged_at")?,
    })
}

fn row_to_daily_exercise(row: &SqliteRow) -> Result<DailyExercise, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let daily_log_id: String = row.try_get("daily_log_id")?;
    let exercise_id: String = row.try_get("exercise_id")?;

    Ok(DailyExercise {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        daily_log_id: Uuid::parse_str(&daily_log_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        exercise_id: Uuid::parse_str(&exercise_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        duration_minutes: row
            .try_get::<Option<i64>, _>("duration_minutes")?
            .and_then(|v| u32::try_from(v).ok()),
        calories_burned: row.try_get("calories_burned")?,
        completed_at: row.try_get("completed_at")?,
    })
}

impl Database {
    /// Create the daily log tables
    pub(super) async fn migrate_logs(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_logs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                log_date DATE NOT NULL,
                weight_kg REAL,
                calories_consumed REAL NOT NULL DEFAULT 0,
                calories_burned REAL NOT NULL DEFAULT 0,
                notes TEXT,
                UNIQUE (user_id, log_date)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meal_items (
                id TEXT PRIMARY KEY,
                daily_log_id TEXT NOT NULL REFERENCES daily_logs(id) ON DELETE CASCADE,
                food_id TEXT NOT NULL REFERENCES foods(id) ON DELETE CASCADE,
                meal TEXT NOT NULL CHECK (meal IN ('breakfast', 'lunch', 'dinner', 'snack')),
                quantity_g REAL NOT NULL,
                logged_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS daily_exercises (
                id TEXT PRIMARY KEY,
                daily_log_id TEXT NOT NULL REFERENCES daily_logs(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                duration_minutes INTEGER,
                calories_burned REAL,
                completed_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_daily_logs_user_date ON daily_logs(user_id, log_date)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_meal_items_log ON meal_items(daily_log_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_daily_exercises_log ON daily_exercises(daily_log_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the log for a date, creating an empty one on first touch
    ///
    /// # Errors
    ///
    /// Returns an error if the queries fail.
    pub async fn get_or_create_daily_log(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
    ) -> AppResult<DailyLog> {
        if let Some(log) = self.get_daily_log(user_id, log_date).await? {
            return Ok(log);
        }

        let log = DailyLog {
            id: Uuid::new_v4(),
            user_id,
            log_date,
            weight_kg: None,
            calories_consumed: 0.0,
            calories_burned: 0.0,
            notes: None,
        };

        // Another request may have created the row concurrently; the unique
        // constraint turns that into a conflict we resolve by re-reading.
        let inserted = sqlx::query(
            r"
            INSERT OR IGNORE INTO daily_logs (
                id, user_id, log_date, weight_kg, calories_consumed, calories_burned, notes
            ) VALUES ($1, $2, $3, NULL, 0, 0, NULL)
            ",
        )
        .bind(log.id.to_string())
        .bind(user_id.to_string())
        .bind(log_date)
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return self
                .get_daily_log(user_id, log_date)
                .await?
                .ok_or_else(|| AppError::database("Daily log vanished after insert race"));
        }
        Ok(log)
    }

    /// Fetch the log for a date, if present
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_daily_log(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
    ) -> AppResult<Option<DailyLog>> {
        let row = sqlx::query("SELECT * FROM daily_logs WHERE user_id = $1 AND log_date = $2")
            .bind(user_id.to_string())
            .bind(log_date)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(row_to_daily_log).transpose().map_err(Into::into)
    }

    /// List logs in an inclusive date range, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_daily_logs(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<DailyLog>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM daily_logs
            WHERE user_id = $1 AND log_date BETWEEN $2 AND $3
            ORDER BY log_date
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_daily_log)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Record weight and notes for a date (lazy create), also refreshing the
    /// profile weight so generators see the latest reading
    ///
    /// # Errors
    ///
    /// Returns an error if the writes fail.
    pub async fn upsert_daily_log(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        weight_kg: Option<f64>,
        notes: Option<&str>,
    ) -> AppResult<DailyLog> {
        let log = self.get_or_create_daily_log(user_id, log_date).await?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            UPDATE daily_logs SET
                weight_kg = COALESCE($2, weight_kg),
                notes = COALESCE($3, notes)
            WHERE id = $1
            ",
        )
        .bind(log.id.to_string())
        .bind(weight_kg)
        .bind(notes)
        .execute(&mut *tx)
        .await?;

        if let Some(weight) = weight_kg {
            sqlx::query("UPDATE users SET weight_kg = $2 WHERE id = $1")
                .bind(user_id.to_string())
                .bind(weight)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.get_daily_log(user_id, log_date)
            .await?
            .ok_or_else(|| AppError::database("Daily log missing after upsert"))
    }

    /// Record a consumed food; the log's consumed-calorie aggregate moves in
    /// the same transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the writes fail.
    pub async fn add_meal_item(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        food: &Food,
        meal: Meal,
        quantity_g: f64,
    ) -> AppResult<MealItem> {
        let log = self.get_or_create_daily_log(user_id, log_date).await?;
        let kcal = food.kcal_for_quantity(quantity_g);

        let item = MealItem {
            id: Uuid::new_v4(),
            daily_log_id: log.id,
            food_id: food.id,
            meal,
            quantity_g,
            logged_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO meal_items (id, daily_log_id, food_id, meal, quantity_g, logged_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(item.id.to_string())
        .bind(item.daily_log_id.to_string())
        .bind(item.food_id.to_string())
        .bind(item.meal.as_str())
        .bind(item.quantity_g)
        .bind(item.logged_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE daily_logs SET calories_consumed = calories_consumed + $2 WHERE id = $1",
        )
        .bind(log.id.to_string())
        .bind(kcal)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Remove a consumed food and roll its calories out of the aggregate
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the item is not on the user's log.
    pub async fn remove_meal_item(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        meal_item_id: Uuid,
    ) -> AppResult<()> {
        let log = self
            .get_daily_log(user_id, log_date)
            .await?
            .ok_or_else(|| AppError::not_found("Daily log"))?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r"
            SELECT mi.quantity_g AS quantity_g, f.kcal_per_100g AS kcal_per_100g
            FROM meal_items mi
            JOIN foods f ON f.id = mi.food_id
            WHERE mi.id = $1 AND mi.daily_log_id = $2
            ",
        )
        .bind(meal_item_id.to_string())
        .bind(log.id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(AppError::not_found("Meal item"));
        };

        let quantity_g: f64 = row.try_get("quantity_g")?;
        let kcal_per_100g: f64 = row.try_get("kcal_per_100g")?;
        let kcal = kcal_per_100g * quantity_g / 100.0;

        sqlx::query("DELETE FROM meal_items WHERE id = $1")
            .bind(meal_item_id.to_string())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE daily_logs SET calories_consumed = MAX(0, calories_consumed - $2) WHERE id = $1",
        )
        .bind(log.id.to_string())
        .bind(kcal)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Record a completed exercise; the burned-calorie aggregate moves in
    /// the same transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the writes fail.
    pub async fn add_daily_exercise(
        &self,
        user_id: Uuid,
        log_date: NaiveDate,
        exercise_id: Uuid,
        duration_minutes: Option<u32>,
        calories_burned: Option<f64>,
    ) -> AppResult<DailyExercise> {
        let log = self.get_or_create_daily_log(user_id, log_date).await?;

        let entry = DailyExercise {
            id: Uuid::new_v4(),
            daily_log_id: log.id,
            exercise_id,
            duration_minutes,
            calories_burned,
            completed_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            INSERT INTO daily_exercises (
                id, daily_log_id, exercise_id, duration_minutes, calories_burned, completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(entry.id.to_string())
        .bind(entry.daily_log_id.to_string())
        .bind(entry.exercise_id.to_string())
        .bind(entry.duration_minutes.map(i64::from))
        .bind(entry.calories_burned)
        .bind(entry.completed_at)
        .execute(&mut *tx)
        .await?;

        if let Some(kcal) = calories_burned {
            sqlx::query(
                "UPDATE daily_logs SET calories_burned = calories_burned + $2 WHERE id = $1",
            )
            .bind(log.id.to_string())
            .bind(kcal)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entry)
    }

    /// Meal items attached to a log
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_meal_items(&self, daily_log_id: Uuid) -> AppResult<Vec<MealItem>> {
        let rows = sqlx::query(
            "SELECT * FROM meal_items WHERE daily_log_id = $1 ORDER BY logged_at",
        )
        .bind(daily_log_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_meal_item)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Completed exercises attached to a log
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_daily_exercises(&self, daily_log_id: Uuid) -> AppResult<Vec<DailyExercise>> {
        let rows = sqlx::query(
            "SELECT * FROM daily_exercises WHERE daily_log_id = $1 ORDER BY completed_at",
        )
        .bind(daily_log_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_daily_exercise)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Number of logs a user has written (achievement milestones)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_daily_logs_for_user(&self, user_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM daily_logs WHERE user_id = $1")
            .bind(user_id.to_string())
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    /// Number of completed exercises across all the user's logs
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_daily_exercises_for_user(&self, user_id: Uuid) -> AppResult<i64> {
        let row = sqlx::query(
            r"
            SELECT COUNT(*) AS n
            FROM daily_exercises de
            JOIN daily_logs dl ON dl.id = de.daily_log_id
            WHERE dl.user_id = $1
            ",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("n")?)
    }

    /// Total number of daily logs (admin stats)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_daily_logs(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM daily_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }
}
