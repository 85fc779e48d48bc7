// ABOUTME: Domain entities for users, goals, routines, catalog items and daily logs
// ABOUTME: Includes string codecs for enum columns and entity constructors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Common data models shared by routes, database modules and the generators.
//!
//! Enums that land in TEXT columns carry `as_str`/`parse` codecs; `parse`
//! falls back to the most permissive variant rather than erroring, matching
//! how rows written by older versions are read back.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role attached to every user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular end user tracking their own data
    #[default]
    Client,
    /// Coach managing one or more clients
    Coach,
    /// Site administrator
    Admin,
}

impl UserRole {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Coach => "coach",
            Self::Admin => "admin",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "coach" => Self::Coach,
            "admin" => Self::Admin,
            _ => Self::Client,
        }
    }

    /// Whether this role can manage other users' data
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Coach | Self::Admin)
    }
}

/// Biological sex used in energy expenditure formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

/// Self-reported activity level driving the TDEE multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "sedentary" => Self::Sedentary,
            "moderate" => Self::Moderate,
            "active" => Self::Active,
            "very_active" => Self::VeryActive,
            _ => Self::Light,
        }
    }
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: Uuid,
    /// Login email, unique across the site
    pub email: String,
    /// bcrypt password hash (never serialized to clients)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Display name shown in the UI
    pub display_name: Option<String>,
    /// Account role
    pub role: UserRole,
    /// Assigned coach, if any
    pub coach_id: Option<Uuid>,
    /// Whether onboarding (body stats + initial goal) has been completed
    pub onboarding_completed: bool,
    /// Current body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Height in centimeters
    pub height_cm: Option<f64>,
    /// Year of birth, for age-dependent formulas
    pub birth_year: Option<i32>,
    /// Biological sex for energy formulas
    pub sex: Option<Sex>,
    /// Self-reported activity level
    pub activity_level: ActivityLevel,
    /// Soft account disable flag
    pub is_active: bool,
    /// Registration timestamp
    pub created_at: DateTime<Utc>,
    /// Last request timestamp
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new client account with defaults for everything else
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            display_name,
            role: UserRole::Client,
            coach_id: None,
            onboarding_completed: false,
            weight_kg: None,
            height_cm: None,
            birth_year: None,
            sex: None,
            activity_level: ActivityLevel::default(),
            is_active: true,
            created_at: now,
            last_active: now,
        }
    }

    /// Age in years derived from `birth_year`
    #[must_use]
    pub fn age(&self, today: NaiveDate) -> Option<u32> {
        let birth_year = self.birth_year?;
        u32::try_from(today.year() - birth_year).ok()
    }
}

/// The direction of an active goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightLoss,
    WeightGain,
    #[default]
    Maintain,
}

impl GoalType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeightLoss => "weight_loss",
            Self::WeightGain => "weight_gain",
            Self::Maintain => "maintain",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "weight_loss" => Self::WeightLoss,
            "weight_gain" => Self::WeightGain,
            _ => Self::Maintain,
        }
    }
}

/// A user's weight/calorie target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub goal_type: GoalType,
    /// Weight the user is aiming for
    pub target_weight_kg: Option<f64>,
    /// Weight recorded when the goal was created
    pub starting_weight_kg: Option<f64>,
    /// Daily calorie budget; `None` means "use the generator default"
    pub daily_calorie_goal: Option<u32>,
    /// Only one goal per user is active at a time
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Exercise catalog category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseCategory {
    Strength,
    Cardio,
}

impl ExerciseCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Cardio => "cardio",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "cardio" => Self::Cardio,
            _ => Self::Strength,
        }
    }
}

/// Catalog exercise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: Uuid,
    pub name: String,
    pub category: ExerciseCategory,
    pub description: Option<String>,
    /// Primary muscle group, free-form (e.g. "legs", "back")
    pub muscle_group: Option<String>,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    /// Public catalog entries are visible to every user
    pub is_public: bool,
    /// Admin/coach who created the entry; `None` for seeded rows
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Catalog food with per-100g macros
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub kcal_per_100g: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    pub is_public: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Food {
    /// Calories contributed by `quantity_g` grams of this food
    #[must_use]
    pub fn kcal_for_quantity(&self, quantity_g: f64) -> f64 {
        self.kcal_per_100g * quantity_g / 100.0
    }
}

/// A named collection of exercises assigned to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Routine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Soft-delete flag; inactive routines are hidden, not removed
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Routine membership row linking an exercise with its prescription
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub id: Uuid,
    pub routine_id: Uuid,
    pub exercise_id: Uuid,
    /// 0 = Monday .. 6 = Sunday; `None` for day-agnostic routines
    pub day_of_week: Option<u8>,
    /// Order within the day
    pub position: u32,
    pub sets: Option<u32>,
    pub reps: Option<u32>,
    pub duration_minutes: Option<u32>,
    pub weight_kg: Option<f64>,
}

/// Per-user-per-date aggregate of weight and calorie totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub log_date: NaiveDate,
    pub weight_kg: Option<f64>,
    pub calories_consumed: f64,
    pub calories_burned: f64,
    pub notes: Option<String>,
}

/// Meal slot within a daily log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl Meal {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "breakfast" => Self::Breakfast,
            "lunch" => Self::Lunch,
            "dinner" => Self::Dinner,
            _ => Self::Snack,
        }
    }
}

/// A consumed food recorded against a daily log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealItem {
    pub id: Uuid,
    pub daily_log_id: Uuid,
    pub food_id: Uuid,
    pub meal: Meal,
    pub quantity_g: f64,
    pub logged_at: DateTime<Utc>,
}

/// A completed exercise recorded against a daily log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyExercise {
    pub id: Uuid,
    pub daily_log_id: Uuid,
    pub exercise_id: Uuid,
    pub duration_minutes: Option<u32>,
    pub calories_burned: Option<f64>,
    pub completed_at: DateTime<Utc>,
}

/// A routine planned for a calendar date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledRoutine {
    pub id: Uuid,
    pub user_id: Uuid,
    pub routine_id: Uuid,
    pub scheduled_date: NaiveDate,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// In-app notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Machine-readable kind (e.g. "achievement", "checkin_comment")
    pub kind: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Direct message between a coach and a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// Gamification badge earned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Stable code, unique per user (e.g. "first_log")
    pub code: String,
    pub title: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

/// Weekly check-in a client submits to their coach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub client_id: Uuid,
    pub coach_id: Uuid,
    pub note: Option<String>,
    pub weight_kg: Option<f64>,
    pub coach_comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Invitation from a coach to a (future) client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteToken {
    pub id: Uuid,
    pub coach_id: Uuid,
    /// sha256 hex of the raw token; the raw value is only returned once
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl InviteToken {
    /// Whether this invite can still be accepted
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.used_at.is_none() && now < self.expires_at
    }
}

/// Site branding, a singleton row editable by admins
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSettings {
    pub app_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub accent_color: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for BrandSettings {
    fn default() -> Self {
        Self {
            app_name: "Forma".to_owned(),
            logo_url: None,
            primary_color: "#1f6f54".to_owned(),
            accent_color: "#f59e0b".to_owned(),
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Client, UserRole::Coach, UserRole::Admin] {
            assert_eq!(UserRole::parse(role.as_str()), role);
        }
        assert_eq!(UserRole::parse("something-else"), UserRole::Client);
    }

    #[test]
    fn test_goal_type_round_trip() {
        for goal in [GoalType::WeightLoss, GoalType::WeightGain, GoalType::Maintain] {
            assert_eq!(GoalType::parse(goal.as_str()), goal);
        }
    }

    #[test]
    fn test_food_kcal_for_quantity() {
        let food = Food {
            id: Uuid::new_v4(),
            name: "Oats".to_owned(),
            kcal_per_100g: 380.0,
            protein_g: 13.0,
            carbs_g: 67.0,
            fat_g: 7.0,
            is_public: true,
            created_by: None,
            created_at: Utc::now(),
        };
        assert!((food.kcal_for_quantity(50.0) - 190.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invite_validity() {
        let now = Utc::now();
        let mut invite = InviteToken {
            id: Uuid::new_v4(),
            coach_id: Uuid::new_v4(),
            token_hash: "ab".repeat(32),
            email: None,
            expires_at: now + chrono::Duration::days(7),
            used_at: None,
            created_at: now,
        };
        assert!(invite.is_valid(now));
        invite.used_at = Some(now);
        assert!(!invite.is_valid(now));
    }
}
