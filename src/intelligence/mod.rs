// ABOUTME: Intelligence module root: recommendation engine and energy formulas
// ABOUTME: Shared recommendation types used by the rules and the routes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Guideline-based recommendations and energy expenditure calculations.

/// Threshold-rule recommendation engine
pub mod recommendations;

/// BMR / TDEE calculations for onboarding
pub mod energy;

use serde::{Deserialize, Serialize};

/// How urgently a recommendation should be surfaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Low,
    Medium,
    High,
}

/// Which aspect of the program a recommendation addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Safety,
    Exercise,
    Nutrition,
    Progress,
}

/// A single advisory produced by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Stable machine-readable kind (e.g. "rapid_weight_loss")
    pub kind: String,
    pub priority: RecommendationPriority,
    pub category: RecommendationCategory,
    /// Advisory text shown to the user
    pub message: String,
    /// The guideline the rule encodes
    pub scientific_basis: String,
}
