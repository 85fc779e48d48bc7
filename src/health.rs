// ABOUTME: Health reporting for the /api/health endpoint
// ABOUTME: Database connectivity probe plus uptime and version
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Health reporting.

use crate::database::Database;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Overall service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Health report returned by `/api/health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// Whether the database answered the probe
    pub database: bool,
    /// Seconds since process start
    pub uptime_secs: u64,
    /// Crate version
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Build the current health report
pub async fn health_report(database: &Database, started_at: std::time::Instant) -> HealthReport {
    let database_ok = match database.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Health check database probe failed: {e}");
            false
        }
    };

    HealthReport {
        status: if database_ok {
            HealthStatus::Healthy
        } else {
            HealthStatus::Degraded
        },
        database: database_ok,
        uptime_secs: started_at.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    }
}
