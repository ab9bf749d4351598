//! User account records managed by the console.

use std::str::FromStr;

use bayan_core::{AppError, AppResult, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a user record, assigned by the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Activation state shared by user and municipality records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Record is live and eligible for selection controls.
    Active,
    /// Record is retained but disabled.
    Inactive,
}

impl RecordStatus {
    /// Returns the storage string for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    /// Parses a storage value leniently.
    ///
    /// Anything other than the exact `active` value degrades to
    /// [`RecordStatus::Inactive`] so a malformed record never fails a fetch.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl FromStr for RecordStatus {
    type Err = AppError;

    /// Strict parse for form input, unlike the lenient [`RecordStatus::parse`].
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(AppError::Validation(format!(
                "unknown record status '{value}'"
            ))),
        }
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one
    /// `@`, local part and domain are non-empty, domain contains at least
    /// one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl FromStr for EmailAddress {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

/// A user account as stored by the external directory.
///
/// Deliberately tolerant: names may be empty and the municipality may be
/// unassigned. A record missing fields renders as "unassigned" rather than
/// failing the whole listing. Input validation happens at the create/update
/// boundary, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Given name, possibly empty for a degraded record.
    pub first_name: String,
    /// Family name, possibly empty for a degraded record.
    pub last_name: String,
    /// Email address as stored; validated only on input.
    pub email: String,
    /// Permission tier.
    pub role: Role,
    /// Home municipality name, `None` when unassigned.
    pub municipality: Option<String>,
    /// Stored activation state.
    pub status: RecordStatus,
    /// Creation timestamp assigned by the store.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Returns the status the console should display.
    ///
    /// An administrator is always shown as `Active` regardless of the stored
    /// status. This override applies to display only, never to
    /// authorization: access checks consult the role, not the status.
    #[must_use]
    pub fn display_status(&self) -> RecordStatus {
        if self.role.is_administrator() {
            RecordStatus::Active
        } else {
            self.status
        }
    }

    /// Returns whether the stored status is `Active`.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == RecordStatus::Active
    }

    /// Returns the assigned municipality name, treating an empty stored
    /// value as unassigned.
    #[must_use]
    pub fn municipality_name(&self) -> Option<&str> {
        self.municipality
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Returns "first last" with degraded-record grace for empty parts.
    #[must_use]
    pub fn full_name(&self) -> String {
        let mut name = String::new();
        for part in [self.first_name.trim(), self.last_name.trim()] {
            if part.is_empty() {
                continue;
            }
            if !name.is_empty() {
                name.push(' ');
            }
            name.push_str(part);
        }

        name
    }
}
