// ABOUTME: Main library entry point for the Forma fitness tracking backend
// ABOUTME: Exposes REST API routing, persistence, auth and the plan generators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

#![deny(unsafe_code)]

//! # Forma Fitness API
//!
//! REST backend for a fitness tracking application. Users register, log
//! daily weight, food and exercise, and receive generated training routines,
//! meal plans and guideline-based recommendations. Coaches manage clients
//! through invitations, check-ins and messaging; admins manage the exercise
//! and food catalogs and site branding.
//!
//! ## Architecture
//!
//! - **Routes**: per-resource axum routers under `/api`
//! - **Auth**: stateless HS256 JWT bearer tokens with a refresh-token flow
//! - **Database**: sqlx over SQLite, idempotent migrations at startup
//! - **Generators**: pure rule-based routine/meal-plan builders over an
//!   injected RNG
//! - **Intelligence**: threshold-rule recommendation engine and energy
//!   (BMR/TDEE) calculations
//!
//! ## Example
//!
//! ```rust,no_run
//! use forma_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Forma API configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Unified error handling: error codes, `AppError`, HTTP response mapping
pub mod errors;

/// Domain entities and their string codecs
pub mod models;

/// Environment-based configuration
pub mod config;

/// Structured logging setup
pub mod logging;

/// JWT issuance/validation and password hashing
pub mod auth;

/// Request authentication and role guards
pub mod middleware;

/// Fixed-window in-memory request rate limiting
pub mod rate_limiting;

/// In-process TTL cache for catalog reads
pub mod cache;

/// Database handle, migrations and per-resource queries
pub mod database;

/// Rule-based routine and meal plan generators
pub mod generators;

/// Recommendation engine and energy expenditure calculations
pub mod intelligence;

/// Clients for external collaborators (wger exercise database)
pub mod external;

/// HTTP route handlers and router assembly
pub mod routes;

/// Health reporting for the `/api/health` endpoint
pub mod health;
