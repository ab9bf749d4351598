//! REST client for the external document-store directory service.
//!
//! Documents deserialize leniently: a record missing fields degrades to
//! unassigned values instead of failing the whole fetch. Requests are
//! issued once; retry policy belongs to the collaborator, not this client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use bayan_application::{MunicipalityRepository, UserDirectoryRepository};
use bayan_core::{AppError, AppResult, Role};
use bayan_domain::{Municipality, MunicipalityId, RecordScope, RecordStatus, User, UserId};

/// Directory repository backed by the document store's REST surface.
pub struct RestDirectoryRepository {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl RestDirectoryRepository {
    /// Creates a REST directory repository.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_token,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .http_client
            .request(method, format!("{}{path}", self.base_url));

        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    async fn fetch_users(&self, query: &[(&str, &str)]) -> AppResult<Vec<User>> {
        let response = self
            .request(reqwest::Method::GET, "/users")
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let response = require_success(response, "list users").await?;
        let documents: Vec<UserDocument> = response.json().await.map_err(transport_error)?;

        Ok(documents
            .into_iter()
            .filter_map(UserDocument::into_user)
            .collect())
    }
}

#[async_trait]
impl UserDirectoryRepository for RestDirectoryRepository {
    async fn list_users(&self, scope: &RecordScope) -> AppResult<Vec<User>> {
        match scope {
            RecordScope::All => self.fetch_users(&[]).await,
            RecordScope::Municipality(name) => {
                self.fetch_users(&[("municipality", name.as_str())]).await
            }
            RecordScope::None => Ok(Vec::new()),
        }
    }

    async fn find_user(&self, user_id: UserId) -> AppResult<Option<User>> {
        let response = self
            .request(reqwest::Method::GET, &format!("/users/{user_id}"))
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = require_success(response, "fetch user").await?;
        let document: UserDocument = response.json().await.map_err(transport_error)?;

        Ok(document.into_user_or(user_id))
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let matches = self.fetch_users(&[("email", email)]).await?;
        Ok(matches
            .into_iter()
            .find(|user| user.email.eq_ignore_ascii_case(email)))
    }

    async fn create_user(&self, user: User) -> AppResult<User> {
        let response = self
            .request(reqwest::Method::POST, "/users")
            .json(&UserPayload::from(&user))
            .send()
            .await
            .map_err(transport_error)?;

        require_success(response, "create user").await?;
        Ok(user)
    }

    async fn update_user(&self, user: User) -> AppResult<User> {
        let response = self
            .request(reqwest::Method::PUT, &format!("/users/{}", user.id))
            .json(&UserPayload::from(&user))
            .send()
            .await
            .map_err(transport_error)?;

        require_success(response, "update user").await?;
        Ok(user)
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/users/{user_id}"))
            .send()
            .await
            .map_err(transport_error)?;

        require_success(response, "delete user").await?;
        Ok(())
    }
}

#[async_trait]
impl MunicipalityRepository for RestDirectoryRepository {
    async fn list_municipalities(&self) -> AppResult<Vec<Municipality>> {
        let response = self
            .request(reqwest::Method::GET, "/municipalities")
            .send()
            .await
            .map_err(transport_error)?;

        let response = require_success(response, "list municipalities").await?;
        let documents: Vec<MunicipalityDocument> =
            response.json().await.map_err(transport_error)?;

        Ok(documents
            .into_iter()
            .filter_map(MunicipalityDocument::into_municipality)
            .collect())
    }
}

async fn require_success(
    response: reqwest::Response,
    context: &str,
) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());

    Err(match status {
        reqwest::StatusCode::BAD_REQUEST => {
            AppError::Validation(format!("{context} rejected: {body}"))
        }
        reqwest::StatusCode::UNAUTHORIZED => {
            AppError::Unauthorized(format!("{context} rejected: {body}"))
        }
        reqwest::StatusCode::FORBIDDEN => {
            AppError::Forbidden(format!("{context} rejected: {body}"))
        }
        reqwest::StatusCode::NOT_FOUND => AppError::NotFound(format!("{context}: {body}")),
        reqwest::StatusCode::CONFLICT => AppError::Conflict(format!("{context}: {body}")),
        _ => AppError::Internal(format!("{context} failed with status {status}: {body}")),
    })
}

fn transport_error(error: reqwest::Error) -> AppError {
    AppError::Internal(format!("directory store transport error: {error}"))
}

/// User document as stored by the directory service.
///
/// Every field defaults so a partial document still maps onto a record.
#[derive(Debug, Default, Deserialize)]
struct UserDocument {
    #[serde(default)]
    id: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl UserDocument {
    /// Maps a document onto a record; a document with no usable identifier
    /// cannot be referenced and is dropped from listings.
    fn into_user(self) -> Option<User> {
        let user_id = Uuid::parse_str(self.id.trim()).ok().map(UserId::from_uuid)?;
        Some(self.into_user_with(user_id))
    }

    /// Maps a document onto a record, falling back to a known identifier
    /// when the stored one is unusable.
    fn into_user_or(self, fallback_id: UserId) -> Option<User> {
        let user_id = Uuid::parse_str(self.id.trim())
            .ok()
            .map(UserId::from_uuid)
            .unwrap_or(fallback_id);
        Some(self.into_user_with(user_id))
    }

    fn into_user_with(self, user_id: UserId) -> User {
        User {
            id: user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            role: self.role.parse::<Role>().unwrap_or(Role::User),
            municipality: self.municipality,
            status: RecordStatus::parse(&self.status),
            created_at: self.created_at.unwrap_or(DateTime::UNIX_EPOCH),
            updated_at: self.updated_at.unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

/// Outbound user document written to the directory service.
#[derive(Debug, Serialize)]
struct UserPayload<'a> {
    id: String,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    role: &'static str,
    municipality: Option<&'a str>,
    status: &'static str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserPayload<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.as_str(),
            last_name: user.last_name.as_str(),
            email: user.email.as_str(),
            role: user.role.as_str(),
            municipality: user.municipality.as_deref(),
            status: user.status.as_str(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Municipality document as stored by the directory service.
#[derive(Debug, Default, Deserialize)]
struct MunicipalityDocument {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    privileges: Vec<String>,
}

impl MunicipalityDocument {
    /// Maps a document onto a record; a nameless municipality cannot be
    /// referenced by users or the district map and is dropped.
    fn into_municipality(self) -> Option<Municipality> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return None;
        }

        let id = Uuid::parse_str(self.id.trim())
            .ok()
            .map(MunicipalityId::from_uuid)
            .unwrap_or_else(|| MunicipalityId::from_name(&name));

        Some(Municipality {
            id,
            name,
            status: RecordStatus::parse(&self.status),
            privileges: self.privileges,
        })
    }
}

#[cfg(test)]
mod tests {
    use bayan_core::Role;
    use bayan_domain::{RecordStatus, UserId};
    use chrono::DateTime;
    use uuid::Uuid;

    use super::{MunicipalityDocument, UserDocument};

    #[test]
    fn partial_user_document_degrades_to_unassigned_values() {
        let document = UserDocument {
            id: Uuid::new_v4().to_string(),
            email: "ana@example.com".to_owned(),
            ..UserDocument::default()
        };

        let user = document.into_user();
        assert!(user.is_some());

        let user = user.unwrap_or_else(|| panic!("test"));
        assert_eq!(user.first_name, "");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.municipality, None);
        assert_eq!(user.status, RecordStatus::Inactive);
        assert_eq!(user.created_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn user_document_without_identifier_is_dropped_from_listings() {
        let document = UserDocument {
            id: "not-a-uuid".to_owned(),
            ..UserDocument::default()
        };

        assert!(document.into_user().is_none());
    }

    #[test]
    fn known_identifier_recovers_a_document_with_a_bad_id() {
        let fallback = UserId::new();
        let document = UserDocument {
            id: String::new(),
            status: "active".to_owned(),
            ..UserDocument::default()
        };

        let user = document.into_user_or(fallback);
        assert!(user.is_some());
        let user = user.unwrap_or_else(|| panic!("test"));
        assert_eq!(user.id, fallback);
        assert_eq!(user.status, RecordStatus::Active);
    }

    #[test]
    fn nameless_municipality_document_is_dropped() {
        let document = MunicipalityDocument {
            id: Uuid::new_v4().to_string(),
            name: "   ".to_owned(),
            ..MunicipalityDocument::default()
        };

        assert!(document.into_municipality().is_none());
    }

    #[test]
    fn municipality_document_with_bad_id_derives_one_from_the_name() {
        let document = MunicipalityDocument {
            id: "garbage".to_owned(),
            name: "ORANI".to_owned(),
            status: "active".to_owned(),
            privileges: vec!["view-users".to_owned()],
        };

        let municipality = document.into_municipality();
        assert!(municipality.is_some());

        let municipality = municipality.unwrap_or_else(|| panic!("test"));
        assert!(municipality.is_active());
        assert_eq!(municipality.privileges, vec!["view-users".to_owned()]);
    }
}
