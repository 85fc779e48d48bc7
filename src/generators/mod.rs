// ABOUTME: Rule-based plan generators module root
// ABOUTME: Shared error type for the routine and meal plan builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Plan generators.
//!
//! Both generators are pure functions over the catalog, an optional goal
//! and an injected [`rand::Rng`]. Production callers pass a freshly seeded
//! `ChaCha8Rng`; tests pass a fixed seed and get identical plans back.

/// Weekly routine generation from the exercise catalog
pub mod routine;

/// Weekly meal plan generation from the food catalog
pub mod meal_plan;

use thiserror::Error;

/// Precondition failures for plan generation; routes map these to 400
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    /// No exercises available at all
    #[error("exercise pool is empty")]
    EmptyPool,
    /// The pool is missing one of the two required categories
    #[error("exercise pool has no {0} exercises")]
    MissingCategory(&'static str),
    /// No foods available at all
    #[error("food catalog is empty")]
    EmptyFoodCatalog,
    /// A meal component has no candidate foods
    #[error("no foods available for the {0} bucket")]
    EmptyBucket(&'static str),
}

impl From<GeneratorError> for crate::errors::AppError {
    fn from(error: GeneratorError) -> Self {
        Self::invalid_input(error.to_string())
    }
}
