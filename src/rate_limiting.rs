// ABOUTME: Rate limiting engine for API request throttling
// ABOUTME: Fixed-window counters per client IP with a tighter auth window
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! # In-Memory Rate Limiting
//!
//! Fixed-window counters keyed by `scope:client_ip`. State is per-process
//! and resets on restart; a multi-process deployment needs sticky routing
//! or an external limiter in front.

use crate::config::environment::RateLimitConfig;
use crate::errors::{AppError, AppResult};
use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Which limit window a request counts against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitScope {
    /// General API traffic
    Api,
    /// Login/register/refresh, which get a much tighter budget
    Auth,
}

impl LimitScope {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Auth => "auth",
        }
    }
}

/// Rate limit outcome attached to responses
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitInfo {
    /// Maximum requests allowed in the current window
    pub limit: u32,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// When the current window resets
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug)]
struct WindowState {
    window_start: Instant,
    count: u32,
}

/// Fixed-window rate limiter over in-process state
pub struct FixedWindowLimiter {
    windows: DashMap<String, WindowState>,
    config: RateLimitConfig,
}

impl FixedWindowLimiter {
    /// Create a limiter with the given configuration
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            config,
        }
    }

    const fn limit_for(&self, scope: LimitScope) -> u32 {
        match scope {
            LimitScope::Api => self.config.requests_per_window,
            LimitScope::Auth => self.config.auth_requests_per_window,
        }
    }

    /// Count a request against the window for `client_ip`
    ///
    /// # Errors
    ///
    /// Returns `RateLimitExceeded` once the window budget is spent.
    pub fn check(&self, scope: LimitScope, client_ip: &str) -> AppResult<RateLimitInfo> {
        if !self.config.enabled {
            return Ok(RateLimitInfo {
                limit: u32::MAX,
                remaining: u32::MAX,
                reset_at: Utc::now(),
            });
        }

        let limit = self.limit_for(scope);
        let window = Duration::from_secs(self.config.window_seconds);
        let key = format!("{}:{client_ip}", scope.as_str());
        let now = Instant::now();

        let mut entry = self.windows.entry(key).or_insert_with(|| WindowState {
            window_start: now,
            count: 0,
        });

        // Window expired: start a fresh one
        if now.duration_since(entry.window_start) >= window {
            entry.window_start = now;
            entry.count = 0;
        }

        let elapsed = now.duration_since(entry.window_start);
        let reset_in = window.saturating_sub(elapsed);
        let reset_at = Utc::now()
            + chrono::Duration::from_std(reset_in).unwrap_or_else(|_| chrono::Duration::zero());

        if entry.count >= limit {
            let retry_after = reset_in.as_secs().max(1);
            tracing::warn!(
                client_ip,
                scope = scope.as_str(),
                limit,
                "rate limit exceeded"
            );
            return Err(AppError::rate_limit_exceeded(limit, retry_after));
        }

        entry.count += 1;
        Ok(RateLimitInfo {
            limit,
            remaining: limit - entry.count,
            reset_at,
        })
    }

    /// Drop windows that have been idle for at least one full window.
    ///
    /// Called periodically from a background task so the map does not grow
    /// with one entry per client forever.
    pub fn evict_stale(&self) {
        let window = Duration::from_secs(self.config.window_seconds);
        let now = Instant::now();
        self.windows
            .retain(|_, state| now.duration_since(state.window_start) < window * 2);
    }
}

/// Best-effort client IP extraction: `X-Forwarded-For` first hop, then the
/// socket peer address
#[must_use]
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(requests: u32, auth_requests: u32) -> RateLimitConfig {
        RateLimitConfig {
            enabled: true,
            requests_per_window: requests,
            auth_requests_per_window: auth_requests,
            window_seconds: 60,
        }
    }

    #[test]
    fn test_limit_enforced_per_ip() {
        let limiter = FixedWindowLimiter::new(test_config(3, 1));

        for _ in 0..3 {
            assert!(limiter.check(LimitScope::Api, "10.0.0.1").is_ok());
        }
        let err = limiter.check(LimitScope::Api, "10.0.0.1").unwrap_err();
        assert_eq!(
            err.http_status(),
            axum::http::StatusCode::TOO_MANY_REQUESTS
        );

        // A different client has its own window
        assert!(limiter.check(LimitScope::Api, "10.0.0.2").is_ok());
    }

    #[test]
    fn test_auth_scope_is_tighter() {
        let limiter = FixedWindowLimiter::new(test_config(100, 1));
        assert!(limiter.check(LimitScope::Auth, "10.0.0.1").is_ok());
        assert!(limiter.check(LimitScope::Auth, "10.0.0.1").is_err());
        // The api scope is unaffected
        assert!(limiter.check(LimitScope::Api, "10.0.0.1").is_ok());
    }

    #[test]
    fn test_disabled_limiter_always_allows() {
        let mut config = test_config(1, 1);
        config.enabled = false;
        let limiter = FixedWindowLimiter::new(config);
        for _ in 0..10 {
            assert!(limiter.check(LimitScope::Auth, "10.0.0.1").is_ok());
        }
    }

    #[test]
    fn test_remaining_counts_down() {
        let limiter = FixedWindowLimiter::new(test_config(2, 1));
        let first = limiter.check(LimitScope::Api, "10.0.0.9").unwrap();
        assert_eq!(first.remaining, 1);
        let second = limiter.check(LimitScope::Api, "10.0.0.9").unwrap();
        assert_eq!(second.remaining, 0);
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers, None), "203.0.113.7");
        assert_eq!(client_ip(&HeaderMap::new(), None), "unknown");
    }
}
