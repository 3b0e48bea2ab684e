//! crates/alttrack_core/src/domain.rs
//!
//! Defines the core data structures for the application: the authenticated
//! identity and the schedule notebooks exchanged with the REST backend.
//! Field names follow the backend's camelCase JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Identity & Session
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// The authenticated user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// An access token together with the identity it authorizes.
///
/// Both halves live in one value, so a token without an identity (or the
/// reverse) cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub identity: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub user: Identity,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl RegisterResponse {
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            username: self.username,
            role: self.role,
        }
    }
}

/// The deployment environment advertised by the access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Anything other than `development` is treated as production.
    pub fn from_claim(value: &str) -> Self {
        if value.eq_ignore_ascii_case("development") {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

//=========================================================================================
// Notebook Schedule Types
//=========================================================================================

/// The category assigned to a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayType {
    School,
    Company,
    Off,
}

impl DayType {
    /// Cycles SCHOOL -> COMPANY -> OFF -> SCHOOL.
    pub fn next(self) -> Self {
        match self {
            DayType::School => DayType::Company,
            DayType::Company => DayType::Off,
            DayType::Off => DayType::School,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::School => "📚 École",
            DayType::Company => "💼 Entreprise",
            DayType::Off => "🏖️ Repos",
        }
    }

    fn emoji(self) -> &'static str {
        match self {
            DayType::School => "📚",
            DayType::Company => "💼",
            DayType::Off => "🏖️",
        }
    }
}

/// Seven day types, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekPattern(pub [DayType; 7]);

impl WeekPattern {
    const DAY_INITIALS: [&'static str; 7] = ["L", "M", "M", "J", "V", "S", "D"];

    pub fn days(&self) -> &[DayType; 7] {
        &self.0
    }

    /// Advances one day to its next type. Out-of-range indices are ignored.
    pub fn toggle(&mut self, day_index: usize) {
        if let Some(day) = self.0.get_mut(day_index) {
            *day = day.next();
        }
    }

    pub fn count(&self, day_type: DayType) -> usize {
        self.0.iter().filter(|d| **d == day_type).count()
    }
}

impl Default for WeekPattern {
    fn default() -> Self {
        use DayType::*;
        Self([School, School, Company, Company, Company, Off, Off])
    }
}

impl fmt::Display for WeekPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, day) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}", Self::DAY_INITIALS[index], day.emoji())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialRuleType {
    FullSchool,
    FullCompany,
}

/// School holiday zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationZone {
    A,
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRule {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub rule_type: SpecialRuleType,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Forces a single date to a given day type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookOverride {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub day_type: DayType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPeriod {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub period_type: DayType,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A named schedule definition owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_in_weeks: Option<u32>,
    pub location_zone: LocationZone,
    #[serde(rename = "weekPatternJson")]
    pub week_pattern: WeekPattern,
    #[serde(rename = "userId")]
    pub owner_id: Uuid,
    #[serde(default)]
    pub special_rules: Vec<SpecialRule>,
    #[serde(default)]
    pub overrides: Vec<NotebookOverride>,
    #[serde(default)]
    pub special_periods: Vec<SpecialPeriod>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//=========================================================================================
// Notebook Inputs
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialRuleInput {
    #[serde(rename = "type")]
    pub rule_type: SpecialRuleType,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideInput {
    pub date: NaiveDate,
    pub day_type: DayType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialPeriodInput {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(rename = "type")]
    pub period_type: DayType,
}

/// Body of `POST /notebooks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotebookInput {
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_weeks: Option<u32>,
    pub location_zone: LocationZone,
    #[serde(rename = "weekPatternJson")]
    pub week_pattern: WeekPattern,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_rules: Vec<SpecialRuleInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<OverrideInput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub special_periods: Vec<SpecialPeriodInput>,
}

impl CreateNotebookInput {
    /// A notebook with the default week pattern and no rules.
    pub fn new(
        name: impl Into<String>,
        start_date: NaiveDate,
        location_zone: LocationZone,
    ) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date: None,
            duration_in_weeks: None,
            location_zone,
            week_pattern: WeekPattern::default(),
            special_rules: Vec::new(),
            overrides: Vec::new(),
            special_periods: Vec::new(),
        }
    }
}

/// Body of `PUT /notebooks/:id`. Absent fields are left unchanged by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotebookInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_in_weeks: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_zone: Option<LocationZone>,
    #[serde(rename = "weekPatternJson", skip_serializing_if = "Option::is_none")]
    pub week_pattern: Option<WeekPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_rules: Option<Vec<SpecialRuleInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<OverrideInput>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_periods: Option<Vec<SpecialPeriodInput>>,
}
