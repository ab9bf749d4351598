//! User directory ports and application service.
//!
//! Owns the gated user lifecycle: listing, creation, update, and deletion
//! against the external directory store. Every operation consults the
//! access policy before touching the repository; a denial surfaces as
//! `AppError::Forbidden` and is never retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use bayan_core::{AppError, AppResult, NonEmptyString, OperatorIdentity, Role};
use bayan_domain::{
    AccessPolicy, EmailAddress, FEATURE_ADD_USER, FEATURE_DELETE_USER, FEATURE_VIEW_USERS,
    RecordAction, RecordScope, RecordStatus, User, UserId, group_users_by_municipality,
};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Repository port for the external user directory.
///
/// Implementations return ordered sequences and treat missing stored fields
/// as unassigned values rather than failing a fetch.
#[async_trait]
pub trait UserDirectoryRepository: Send + Sync {
    /// Lists users within a scope, in stable store order.
    async fn list_users(&self, scope: &RecordScope) -> AppResult<Vec<User>>;

    /// Finds a user by identifier.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>>;

    /// Finds a user by canonical email.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Persists a new user record.
    async fn create_user(&self, user: User) -> AppResult<User>;

    /// Replaces an existing user record.
    async fn update_user(&self, user: User) -> AppResult<User>;

    /// Removes a user record.
    async fn delete_user(&self, user_id: UserId) -> AppResult<()>;
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Form fields for user creation.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, validated and normalized before storage.
    pub email: String,
    /// Permission tier for the new account.
    pub role: Role,
    /// Home municipality, if assigned.
    pub municipality: Option<String>,
}

/// Form fields for a full-replace user update.
///
/// The console posts the entire form state, so updates replace every
/// editable field.
#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, validated and normalized before storage.
    pub email: String,
    /// Permission tier.
    pub role: Role,
    /// Home municipality, if assigned.
    pub municipality: Option<String>,
    /// Stored activation state.
    pub status: RecordStatus,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Application service for the user directory.
#[derive(Clone)]
pub struct DirectoryService {
    repository: Arc<dyn UserDirectoryRepository>,
    policy: AccessPolicy,
}

impl DirectoryService {
    /// Creates a directory service from a repository and an access policy.
    #[must_use]
    pub fn new(repository: Arc<dyn UserDirectoryRepository>, policy: AccessPolicy) -> Self {
        Self { repository, policy }
    }

    /// Returns the access policy for edge-level feature projection.
    #[must_use]
    pub fn policy(&self) -> &AccessPolicy {
        &self.policy
    }

    /// Lists the users visible to the operator.
    ///
    /// The fetch scope is decided by the policy before the store is called.
    /// A caller with no municipality to be scoped to sees an empty list,
    /// not an error.
    pub async fn list_users(&self, operator: &OperatorIdentity) -> AppResult<Vec<User>> {
        self.require_feature(operator, FEATURE_VIEW_USERS)?;

        match self.policy.user_scope(operator) {
            RecordScope::None => Ok(Vec::new()),
            scope => self.repository.list_users(&scope).await,
        }
    }

    /// Lists visible users bucketed per municipality.
    pub async fn grouped_users(
        &self,
        operator: &OperatorIdentity,
    ) -> AppResult<BTreeMap<String, Vec<User>>> {
        let users = self.list_users(operator).await?;
        Ok(group_users_by_municipality(&users))
    }

    /// Returns one user the operator is allowed to see.
    pub async fn find_user(&self, operator: &OperatorIdentity, user_id: UserId) -> AppResult<User> {
        self.require_feature(operator, FEATURE_VIEW_USERS)?;

        let user = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        if !operator.role().is_administrator() {
            let in_scope = match (operator.municipality(), user.municipality_name()) {
                (Some(home), Some(target)) => home.trim().eq_ignore_ascii_case(target),
                _ => false,
            };

            if !in_scope {
                return Err(AppError::Forbidden(format!(
                    "user '{user_id}' is outside the operator's municipality"
                )));
            }
        }

        Ok(user)
    }

    /// Creates a user from validated form fields.
    pub async fn create_user(
        &self,
        operator: &OperatorIdentity,
        input: CreateUserInput,
    ) -> AppResult<User> {
        self.require_feature(operator, FEATURE_ADD_USER)?;

        let first_name = NonEmptyString::new(input.first_name.trim())?;
        let last_name = NonEmptyString::new(input.last_name.trim())?;
        let email = EmailAddress::new(&input.email)?;
        let municipality = normalize_municipality(input.municipality);

        self.require_scope_over(operator, municipality.as_deref())?;

        if self
            .repository
            .find_user_by_email(email.as_str())
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                email.as_str()
            )));
        }

        let now = Utc::now();
        self.repository
            .create_user(User {
                id: UserId::new(),
                first_name: first_name.as_str().to_owned(),
                last_name: last_name.as_str().to_owned(),
                email: email.as_str().to_owned(),
                role: input.role,
                municipality,
                status: RecordStatus::Active,
                created_at: now,
                updated_at: now,
            })
            .await
    }

    /// Replaces an existing user's fields.
    pub async fn update_user(
        &self,
        operator: &OperatorIdentity,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<User> {
        let existing = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        if !self
            .policy
            .can_perform_action(operator, RecordAction::Update, &existing)
        {
            return Err(AppError::Forbidden(format!(
                "operator '{}' may not update user '{user_id}'",
                operator.subject()
            )));
        }

        let first_name = NonEmptyString::new(input.first_name.trim())?;
        let last_name = NonEmptyString::new(input.last_name.trim())?;
        let email = EmailAddress::new(&input.email)?;
        let municipality = normalize_municipality(input.municipality);

        self.require_scope_over(operator, municipality.as_deref())?;

        if let Some(other) = self.repository.find_user_by_email(email.as_str()).await? {
            if other.id != user_id {
                return Err(AppError::Conflict(format!(
                    "a user with email '{}' already exists",
                    email.as_str()
                )));
            }
        }

        self.repository
            .update_user(User {
                id: existing.id,
                first_name: first_name.as_str().to_owned(),
                last_name: last_name.as_str().to_owned(),
                email: email.as_str().to_owned(),
                role: input.role,
                municipality,
                status: input.status,
                created_at: existing.created_at,
                updated_at: Utc::now(),
            })
            .await
    }

    /// Removes a user record.
    pub async fn delete_user(
        &self,
        operator: &OperatorIdentity,
        user_id: UserId,
    ) -> AppResult<()> {
        self.require_feature(operator, FEATURE_DELETE_USER)?;

        let existing = self
            .repository
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        if !self
            .policy
            .can_perform_action(operator, RecordAction::Delete, &existing)
        {
            return Err(AppError::Forbidden(format!(
                "operator '{}' may not delete user '{user_id}'",
                operator.subject()
            )));
        }

        self.repository.delete_user(user_id).await
    }

    fn require_feature(&self, operator: &OperatorIdentity, feature: &str) -> AppResult<()> {
        if self.policy.can_access_feature(operator, feature) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "operator '{}' is missing the '{feature}' feature",
                operator.subject()
            )))
        }
    }

    /// Keeps non-administrator writes inside the operator's home
    /// municipality.
    fn require_scope_over(
        &self,
        operator: &OperatorIdentity,
        municipality: Option<&str>,
    ) -> AppResult<()> {
        if operator.role().is_administrator() {
            return Ok(());
        }

        let in_scope = match (operator.municipality(), municipality) {
            (Some(home), Some(target)) => home.trim().eq_ignore_ascii_case(target),
            _ => false,
        };

        if in_scope {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "operator '{}' may only manage users of their own municipality",
                operator.subject()
            )))
        }
    }
}

fn normalize_municipality(value: Option<String>) -> Option<String> {
    value
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty())
}
