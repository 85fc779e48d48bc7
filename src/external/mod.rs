// ABOUTME: External collaborator clients module root
// ABOUTME: Hosts the wger exercise database client
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

/// wger exercise-database client
pub mod wger_client;
