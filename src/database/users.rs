// ABOUTME: User management database operations
// ABOUTME: Handles registration, profile updates and coach/client links
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::AppResult;
use crate::models::{ActivityLevel, Sex, User, UserRole};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_user(row: &SqliteRow) -> Result<User, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let coach_id: Option<String> = row.try_get("coach_id")?;
    let role: String = row.try_get("role")?;
    let sex: Option<String> = row.try_get("sex")?;
    let activity_level: String = row.try_get("activity_level")?;

    Ok(User {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        role: UserRole::parse(&role),
        coach_id: coach_id
            .map(|c| Uuid::parse_str(&c))
            .transpose()
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        onboarding_completed: row.try_get("onboarding_completed")?,
        weight_kg: row.try_get("weight_kg")?,
        height_cm: row.try_get("height_cm")?,
        birth_year: row.try_get("birth_year")?,
        sex: sex.as_deref().and_then(Sex::parse),
        activity_level: ActivityLevel::parse(&activity_level),
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
        last_active: row.try_get("last_active")?,
    })
}

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                display_name TEXT,
                role TEXT NOT NULL DEFAULT 'client' CHECK (role IN ('client', 'coach', 'admin')),
                coach_id TEXT REFERENCES users(id) ON DELETE SET NULL,
                onboarding_completed BOOLEAN NOT NULL DEFAULT 0,
                weight_kg REAL,
                height_cm REAL,
                birth_year INTEGER,
                sex TEXT,
                activity_level TEXT NOT NULL DEFAULT 'light',
                is_active BOOLEAN NOT NULL DEFAULT 1,
                created_at DATETIME NOT NULL,
                last_active DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_coach_id ON users(coach_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns a conflict error when the email is already registered.
    pub async fn create_user(&self, user: &User) -> AppResult<Uuid> {
        sqlx::query(
            r"
            INSERT INTO users (
                id, email, password_hash, display_name, role, coach_id,
                onboarding_completed, weight_kg, height_cm, birth_year, sex,
                activity_level, is_active, created_at, last_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role.as_str())
        .bind(user.coach_id.map(|id| id.to_string()))
        .bind(user.onboarding_completed)
        .bind(user.weight_kg)
        .bind(user.height_cm)
        .bind(user.birth_year)
        .bind(user.sex.map(Sex::as_str))
        .bind(user.activity_level.as_str())
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_active)
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Fetch a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose().map_err(Into::into)
    }

    /// Fetch a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose().map_err(Into::into)
    }

    /// Total number of user accounts
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn count_users(&self) -> AppResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("n")?)
    }

    /// Update body stats and onboarding completion
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_user_profile(
        &self,
        user_id: Uuid,
        weight_kg: Option<f64>,
        height_cm: Option<f64>,
        birth_year: Option<i32>,
        sex: Option<Sex>,
        activity_level: ActivityLevel,
        onboarding_completed: bool,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE users SET
                weight_kg = $2,
                height_cm = $3,
                birth_year = $4,
                sex = $5,
                activity_level = $6,
                onboarding_completed = $7,
                last_active = CURRENT_TIMESTAMP
            WHERE id = $1
            ",
        )
        .bind(user_id.to_string())
        .bind(weight_kg)
        .bind(height_cm)
        .bind(birth_year)
        .bind(sex.map(Sex::as_str))
        .bind(activity_level.as_str())
        .bind(onboarding_completed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record a fresh weight reading on the profile (latest wins)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_user_weight(&self, user_id: Uuid, weight_kg: f64) -> AppResult<()> {
        sqlx::query("UPDATE users SET weight_kg = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(weight_kg)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Change a user's role (admin operation)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_user_role(&self, user_id: Uuid, role: UserRole) -> AppResult<()> {
        sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Enable or disable an account (admin operation)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(is_active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Assign (or clear) a user's coach
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn set_user_coach(&self, user_id: Uuid, coach_id: Option<Uuid>) -> AppResult<()> {
        sqlx::query("UPDATE users SET coach_id = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(coach_id.map(|id| id.to_string()))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List every account, newest first (admin operation)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(row_to_user).collect::<Result<_, _>>().map_err(Into::into)
    }

    /// List the active clients assigned to a coach
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_clients_for_coach(&self, coach_id: Uuid) -> AppResult<Vec<User>> {
        let rows = sqlx::query(
            "SELECT * FROM users WHERE coach_id = $1 AND is_active = 1 ORDER BY created_at",
        )
        .bind(coach_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_user).collect::<Result<_, _>>().map_err(Into::into)
    }
}
