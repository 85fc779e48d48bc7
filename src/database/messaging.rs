// ABOUTME: Message and notification database operations
// ABOUTME: Coach-client direct messages plus per-user notification feed
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{Message, Notification};
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

fn row_to_message(row: &SqliteRow) -> Result<Message, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let sender_id: String = row.try_get("sender_id")?;
    let recipient_id: String = row.try_get("recipient_id")?;

    Ok(Message {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        sender_id: Uuid::parse_str(&sender_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        recipient_id: Uuid::parse_str(&recipient_id)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        body: row.try_get("body")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_notification(row: &SqliteRow) -> Result<Notification, sqlx::Error> {
    let id: String = row.try_get("id")?;
    let user_id: String = row.try_get("user_id")?;

    Ok(Notification {
        id: Uuid::parse_str(&id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        user_id: Uuid::parse_str(&user_id).map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        kind: row.try_get("kind")?,
        title: row.try_get("title")?,
        body: row.try_get("body")?,
        read: row.try_get("read")?,
        created_at: row.try_get("created_at")?,
    })
}

impl Database {
    /// Create the messages and notifications tables
    pub(super) async fn migrate_messaging(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                sender_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                recipient_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                body TEXT NOT NULL,
                read BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                body TEXT NOT NULL,
                read BOOLEAN NOT NULL DEFAULT 0,
                created_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_peers ON messages(sender_id, recipient_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, read)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a direct message
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
    ) -> AppResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            body: body.to_owned(),
            read: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO messages (id, sender_id, recipient_id, body, read, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            ",
        )
        .bind(message.id.to_string())
        .bind(sender_id.to_string())
        .bind(recipient_id.to_string())
        .bind(body)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    /// Conversation between two users, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_messages_between(
        &self,
        user_a: Uuid,
        user_b: Uuid,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY created_at
            ",
        )
        .bind(user_a.to_string())
        .bind(user_b.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_message)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Distinct peers the user has exchanged messages with, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_conversation_peers(&self, user_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = sqlx::query(
            r"
            SELECT peer, MAX(created_at) AS last_at FROM (
                SELECT recipient_id AS peer, created_at FROM messages WHERE sender_id = $1
                UNION ALL
                SELECT sender_id AS peer, created_at FROM messages WHERE recipient_id = $1
            )
            GROUP BY peer
            ORDER BY last_at DESC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let peer: String = row.try_get("peer")?;
                Uuid::parse_str(&peer).map_err(|e| sqlx::Error::Decode(Box::new(e)))
            })
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Mark every message from `peer` to `user_id` as read
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_messages_read(&self, user_id: Uuid, peer: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET read = 1 WHERE recipient_id = $1 AND sender_id = $2 AND read = 0",
        )
        .bind(user_id.to_string())
        .bind(peer.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Push a notification onto a user's feed
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_notification(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        body: &str,
    ) -> AppResult<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id,
            kind: kind.to_owned(),
            title: title.to_owned(),
            body: body.to_owned(),
            read: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            r"
            INSERT INTO notifications (id, user_id, kind, title, body, read, created_at)
            VALUES ($1, $2, $3, $4, $5, 0, $6)
            ",
        )
        .bind(notification.id.to_string())
        .bind(user_id.to_string())
        .bind(kind)
        .bind(title)
        .bind(body)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(notification)
    }

    /// List a user's notifications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_notifications(
        &self,
        user_id: Uuid,
        unread_only: bool,
    ) -> AppResult<Vec<Notification>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM notifications
            WHERE user_id = $1 AND ($2 = 0 OR read = 0)
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.to_string())
        .bind(unread_only)
        .fetch_all(&self.pool)
        .await?;
        rows.iter()
            .map(row_to_notification)
            .collect::<Result<_, _>>()
            .map_err(Into::into)
    }

    /// Mark one notification read
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` when the notification is not the user's.
    pub async fn mark_notification_read(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET read = 1 WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Notification"));
        }
        Ok(())
    }

    /// Mark all of a user's notifications read
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn mark_all_notifications_read(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET read = 1 WHERE user_id = $1 AND read = 0",
        )
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
