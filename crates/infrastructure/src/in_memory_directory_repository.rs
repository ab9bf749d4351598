use async_trait::async_trait;
use tokio::sync::RwLock;

use bayan_application::{MunicipalityRepository, UserDirectoryRepository};
use bayan_core::{AppError, AppResult};
use bayan_domain::{Municipality, RecordScope, User, UserId};

/// In-memory directory repository implementation.
///
/// Backs the `memory` provider mode and the service tests. Listing order is
/// deterministic: creation time, then identifier.
#[derive(Debug, Default)]
pub struct InMemoryDirectoryRepository {
    users: RwLock<Vec<User>>,
    municipalities: RwLock<Vec<Municipality>>,
}

impl InMemoryDirectoryRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with records.
    #[must_use]
    pub fn with_records(users: Vec<User>, municipalities: Vec<Municipality>) -> Self {
        Self {
            users: RwLock::new(users),
            municipalities: RwLock::new(municipalities),
        }
    }
}

#[async_trait]
impl UserDirectoryRepository for InMemoryDirectoryRepository {
    async fn list_users(&self, scope: &RecordScope) -> AppResult<Vec<User>> {
        let users = self.users.read().await;

        let mut listed: Vec<User> = match scope {
            RecordScope::All => users.clone(),
            RecordScope::Municipality(name) => users
                .iter()
                .filter(|user| {
                    user.municipality_name()
                        .is_some_and(|municipality| municipality.eq_ignore_ascii_case(name))
                })
                .cloned()
                .collect(),
            RecordScope::None => Vec::new(),
        };

        listed.sort_by(|left, right| {
            left.created_at
                .cmp(&right.created_at)
                .then_with(|| left.id.as_uuid().cmp(&right.id.as_uuid()))
        });

        Ok(listed)
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AppError::Conflict(format!(
                "a user with email '{}' already exists",
                user.email
            )));
        }

        users.push(user.clone());
        Ok(user)
    }

    async fn update_user(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;

        let Some(slot) = users.iter_mut().find(|existing| existing.id == user.id) else {
            return Err(AppError::NotFound(format!(
                "user '{}' does not exist",
                user.id
            )));
        };

        *slot = user.clone();
        Ok(user)
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|user| user.id != user_id);

        if users.len() == before {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl MunicipalityRepository for InMemoryDirectoryRepository {
    async fn list_municipalities(&self) -> AppResult<Vec<Municipality>> {
        Ok(self.municipalities.read().await.clone())
    }
}
