// ABOUTME: Request middleware module root
// ABOUTME: Re-exports authentication middleware and role guards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

/// Bearer-token authentication and role guards
pub mod auth;

pub use auth::{AuthMiddleware, AuthedUser};
