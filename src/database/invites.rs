// ABOUTME: Coach invitation token database operations
// ABOUTME: Tokens are stored hashed; acceptance links a client to the coach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::InviteToken;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_invite(row: &SqliteRow) -> Result<InviteToken, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let coach_id: String = row.try_get("coach_id")?;

    Ok(InviteToken {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        coach_id: Uuid::parse_str(&coach_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        token_hash: row.try_get("token_hash")?,
        email: row.try_get("email")?,
        expires_at: row.try_get("expires_at")?,
        used_at: row.try_get("used_at")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Create the invite tokens table
    pub(super) async fn migrate_invites(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS invite_tokens (
                id TEXT PRIMARY KEY,
                coach_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                token_hash TEXT UNIQUE NOT NULL,
                email TEXT,
                expires_at DATETIME NOT NULL,
                used_at DATETIME,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new invite token hash
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_invite(
        &self,
        coach_id: Uuid,
        token_hash: &str,
        email: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> AppResult<InviteToken> {
        let invite = InviteToken {
            id: Uuid::new_v4(),
            coach_id,
            token_hash: token_hash.to_owned(),
            email: email.map(ToOwned::to_owned),
            expires_at,
            used_at: None,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO invite_tokens (id, coach_id, token_hash, email, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(invite.id.to_string())
        .bind(coach_id.to_string())
        .bind(token_hash)
        .bind(email)
        .bind(expires_at)
        .bind(invite.created_at)
        .execute(&self.pool)
        .await?;

        Ok(invite)
    }

    /// Accept an invite: validates the token, marks it used and links the
    /// client to the coach in one transaction. Returns the coach id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the token is unknown, expired or already
    /// used.
    pub async fn accept_invite(&self, token_hash: &str, client_id: Uuid) -> AppResult<Uuid> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT * FROM invite_tokens WHERE token_hash = $1")
            .bind(token_hash)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Err(AppError::invalid_input("Invalid invitation token"));
        };
        let invite = row_to_invite(&row)?;

        if !invite.is_valid(Utc::now()) {
            return Err(AppError::invalid_input(
                "Invitation token has expired or was already used",
            ));
        }

        sqlx::query("UPDATE invite_tokens SET used_at = $2 WHERE id = $1")
            .bind(invite.id.to_string())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE users SET coach_id = $2 WHERE id = $1")
            .bind(client_id.to_string())
            .bind(invite.coach_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(invite.coach_id)
    }

    /// List a coach's invites, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_invites_for_coach(&self, coach_id: Uuid) -> AppResult<Vec<InviteToken>> {
        let rows = sqlx::query(
            "SELECT * FROM invite_tokens WHERE coach_id = $1 ORDER BY created_at DESC",
        )
        .bind(coach_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_invite)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }
}
