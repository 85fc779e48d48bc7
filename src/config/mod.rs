// ABOUTME: Configuration module root
// ABOUTME: Re-exports the environment-variable backed server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

/// Environment-variable based server configuration
pub mod environment;
