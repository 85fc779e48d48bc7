// ABOUTME: Refresh token storage and rotation
// ABOUTME: Tokens are stored as sha256 hashes and single-use
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the refresh tokens table
    pub(super) async fn migrate_tokens(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS refresh_tokens (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token_hash TEXT UNIQUE NOT NULL,
                expires_at DATETIME NOT NULL,
                revoked BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_user ON refresh_tokens(user_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new refresh token hash
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query(
            r"
            INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at, revoked, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(token_hash)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Consume a refresh token: returns its user and revokes it in one
    /// transaction, or `None` when the token is unknown, revoked or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the queries fail.
    pub async fn consume_refresh_token(&self, token_hash: &str) -> AppResult<Option<Uuid>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r"
            SELECT user_id, expires_at, revoked FROM refresh_tokens
            WHERE token_hash = $1
            ",
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let revoked: bool = row.try_get("revoked")?;
        let expires_at: DateTime<Utc> = row.try_get("expires_at")?;
        if revoked || expires_at < Utc::now() {
            return Ok(None);
        }

        let user_id: String = row.try_get("user_id")?;

        sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Uuid::parse_str(&user_id)
            .map(Some)
            .map_err(|e| crate::errors::AppError::database(e.to_string()))
    }

    /// Revoke every refresh token a user holds (logout-everywhere, admin
    /// deactivation)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn revoke_refresh_tokens_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
