// ABOUTME: Brand settings database operations
// ABOUTME: Singleton row seeded with defaults on first migration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use super::Database;
use crate::errors::AppResult;
use crate::models::BrandSettings;
use chrono::Utc;
use sqlx::Row;

/// Fixed primary key of the singleton row
const BRAND_ROW_ID: i64 = 1;

impl Database {
    /// Create and seed the brand settings table
    pub(super) async fn migrate_brand(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS brand_settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                app_name TEXT NOT NULL,
                logo_url TEXT,
                primary_color TEXT NOT NULL,
                accent_color TEXT NOT NULL,
                updated_at DATETIME NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        let defaults = BrandSettings::default();
        sqlx::query(
            r"
            INSERT OR IGNORE INTO brand_settings (id, app_name, logo_url, primary_color, accent_color, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(BRAND_ROW_ID)
        .bind(&defaults.app_name)
        .bind(&defaults.logo_url)
        .bind(&defaults.primary_color)
        .bind(&defaults.accent_color)
        .bind(defaults.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Read the current brand settings
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_brand_settings(&self) -> AppResult<BrandSettings> {
        let row = sqlx::query("SELECT * FROM brand_settings WHERE id = $1")
            .bind(BRAND_ROW_ID)
            .fetch_one(&self.pool)
            .await?;

        Ok(BrandSettings {
            app_name: row.try_get("app_name")?,
            logo_url: row.try_get("logo_url")?,
            primary_color: row.try_get("primary_color")?,
            accent_color: row.try_get("accent_color")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    /// Replace the brand settings (admin)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_brand_settings(&self, settings: &BrandSettings) -> AppResult<()> {
        sqlx::query(
            r"
            UPDATE brand_settings SET
                app_name = $2, logo_url = $3, primary_color = $4,
                accent_color = $5, updated_at = $6
            WHERE id = $1
            ",
        )
        .bind(BRAND_ROW_ID)
        .bind(&settings.app_name)
        .bind(&settings.logo_url)
        .bind(&settings.primary_color)
        .bind(&settings.accent_color)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
