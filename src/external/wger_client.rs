// ABOUTME: wger exercise database API client for search and media enrichment
// ABOUTME: Implements caching and rate limiting; failures degrade, never propagate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! wger Exercise Database API Client
//!
//! wger (<https://wger.de>) is a public exercise database; the catalog
//! search route uses it to enrich results with external matches and
//! media. The API is free and needs no authentication for reads.
//!
//! # Features
//! - Exercise search by term
//! - Exercise image lookup
//! - In-client caching to minimize API calls
//! - Rate limiting (30 requests per minute)
//!
//! The client is an optional collaborator: callers treat every error as
//! "no external results" and log it, per the external-interface contract.

use crate::config::environment::WgerConfig;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Cache TTL for search results
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Requests allowed per minute against the wger API
const RATE_LIMIT_PER_MINUTE: u32 = 30;

/// HTTP timeout for wger calls; slow enrichment must not stall requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// An exercise suggestion from the wger database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WgerExercise {
    /// wger exercise id
    pub id: u64,
    /// Exercise name
    pub name: String,
    /// Category name (e.g. "Legs")
    pub category: Option<String>,
    /// Thumbnail/image URL when wger has one
    pub image_url: Option<String>,
}

/// wger search endpoint response envelope
#[derive(Debug, Deserialize)]
struct SearchResponse {
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    data: SuggestionData,
}

#[derive(Debug, Deserialize)]
struct SuggestionData {
    id: u64,
    name: String,
    category: Option<String>,
    image_thumbnail: Option<String>,
}

/// Cache entry with expiration
#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<WgerExercise>,
    expires_at: Instant,
}

/// Sliding-window rate limiter for API requests
#[derive(Debug)]
struct RateLimiter {
    requests: Vec<Instant>,
    limit: u32,
    window: Duration,
}

impl RateLimiter {
    const fn new(limit: u32, window: Duration) -> Self {
        Self {
            requests: Vec::new(),
            limit,
            window,
        }
    }

    /// Check if a request can be made, removing expired entries
    fn can_request(&mut self) -> bool {
        let now = Instant::now();
        self.requests
            .retain(|&t| now.duration_since(t) < self.window);
        self.requests.len() < self.limit as usize
    }

    fn record_request(&mut self) {
        self.requests.push(Instant::now());
    }
}

/// wger exercise database client
pub struct WgerClient {
    config: WgerConfig,
    http_client: reqwest::Client,
    search_cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
    rate_limiter: Arc<RwLock<RateLimiter>>,
}

impl WgerClient {
    /// Create a new wger client
    #[must_use]
    pub fn new(config: WgerConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            config,
            http_client,
            search_cache: Arc::new(RwLock::new(HashMap::new())),
            rate_limiter: Arc::new(RwLock::new(RateLimiter::new(
                RATE_LIMIT_PER_MINUTE,
                Duration::from_secs(60),
            ))),
        }
    }

    /// Search wger for exercises matching a term.
    ///
    /// Results are cached for an hour per (term, limit) pair. When the
    /// in-process minute budget is exhausted the call returns an error
    /// instead of queueing; callers degrade to catalog-only results.
    ///
    /// # Errors
    ///
    /// Returns an `ExternalServiceError` for transport failures, non-2xx
    /// responses, undecodable bodies or an exhausted rate budget.
    pub async fn search_exercises(
        &self,
        term: &str,
        limit: usize,
    ) -> AppResult<Vec<WgerExercise>> {
        let cache_key = format!("{term}:{limit}");

        if let Some(entry) = self.search_cache.read().await.get(&cache_key) {
            if entry.expires_at > Instant::now() {
                tracing::debug!("wger search cache hit for '{term}'");
                return Ok(entry.data.clone());
            }
        }

        {
            let mut limiter = self.rate_limiter.write().await;
            if !limiter.can_request() {
                return Err(AppError::external_service(
                    "wger",
                    "request budget exhausted, try again shortly",
                ));
            }
            limiter.record_request();
        }

        let url = format!("{}/exercise/search/", self.config.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("term", term), ("language", "english"), ("format", "json")])
            .send()
            .await
            .map_err(|e| AppError::external_service("wger", e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "wger",
                format!("search returned HTTP {}", response.status()),
            ));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::external_service("wger", e.to_string()))?;

        let results: Vec<WgerExercise> = body
            .suggestions
            .into_iter()
            .take(limit)
            .map(|s| WgerExercise {
                id: s.data.id,
                name: s.data.name,
                category: s.data.category,
                image_url: s
                    .data
                    .image_thumbnail
                    .map(|path| absolute_media_url(&self.config.base_url, &path)),
            })
            .collect();

        self.search_cache.write().await.insert(
            cache_key,
            CacheEntry {
                data: results.clone(),
                expires_at: Instant::now() + SEARCH_CACHE_TTL,
            },
        );

        Ok(results)
    }
}

/// wger returns image paths relative to the site root
fn absolute_media_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http") {
        return path.to_owned();
    }
    // Strip the API suffix down to the origin
    let origin = base_url.trim_end_matches('/').trim_end_matches("/api/v2");
    format!("{origin}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_url_resolution() {
        assert_eq!(
            absolute_media_url("https://wger.de/api/v2", "/media/exercise-images/1.png"),
            "https://wger.de/media/exercise-images/1.png"
        );
        assert_eq!(
            absolute_media_url("https://wger.de/api/v2", "https://cdn.example/x.png"),
            "https://cdn.example/x.png"
        );
    }

    #[test]
    fn test_rate_limiter_window() {
        let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
        assert!(limiter.can_request());
        limiter.record_request();
        assert!(limiter.can_request());
        limiter.record_request();
        assert!(!limiter.can_request());
    }
}
