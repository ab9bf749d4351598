use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// Coarse-grained permission tier of a signed-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular operator, scoped to a single municipality.
    User,
    /// Administrator with every grant and an unrestricted scope.
    Administrator,
}

impl Role {
    /// Returns the storage string for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Administrator => "administrator",
        }
    }

    /// Returns whether this role is the administrator tier.
    #[must_use]
    pub fn is_administrator(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "administrator" => Ok(Self::Administrator),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Caller context for the signed-in console operator.
///
/// Supplied by the external authentication collaborator; this subsystem
/// never derives or persists it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
    role: Role,
    municipality: Option<String>,
}

impl OperatorIdentity {
    /// Creates an operator identity from externally supplied identity data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
        role: Role,
        municipality: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            role,
            municipality,
        }
    }

    /// Returns the stable subject claim from the identity provider.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current operator.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the operator's permission tier.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the operator's home municipality, if one is assigned.
    #[must_use]
    pub fn municipality(&self) -> Option<&str> {
        self.municipality.as_deref()
    }
}
