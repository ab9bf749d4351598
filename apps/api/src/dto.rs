use std::collections::BTreeMap;

use bayan_core::OperatorIdentity;
use bayan_domain::{DistrictGroup, Municipality, User};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the signed-in operator and their feature grants.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/operator-response.ts"
)]
pub struct OperatorResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
    pub municipality: Option<String>,
    pub features: Vec<String>,
}

/// API representation of a user record.
///
/// `display_status` carries the administrator override the console shows;
/// `status` stays the stored value for the edit form.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub municipality: Option<String>,
    pub status: String,
    pub display_status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Incoming payload for user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub municipality: Option<String>,
}

/// Incoming payload for a full-replace user update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    pub municipality: Option<String>,
    pub status: String,
}

/// Listing view query state: active tab and selected municipality.
#[derive(Debug, Default, Deserialize)]
pub struct UserListQuery {
    pub tab: Option<String>,
    pub municipality: Option<String>,
}

/// API representation of a municipality.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/municipality-response.ts"
)]
pub struct MunicipalityResponse {
    pub municipality_id: String,
    pub name: String,
    pub status: String,
    pub privileges: Vec<String>,
}

/// One district bucket of the selection control.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/district-group-response.ts"
)]
pub struct DistrictGroupResponse {
    pub district: String,
    pub municipalities: Vec<MunicipalityResponse>,
}

/// One municipality bucket of the grouped user listing.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/console-types/src/generated/municipality-bucket-response.ts"
)]
pub struct MunicipalityBucketResponse {
    pub municipality: String,
    pub count: usize,
    pub users: Vec<UserResponse>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id.to_string(),
            display_status: user.display_status().as_str().to_owned(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role.as_str().to_owned(),
            municipality: user.municipality,
            status: user.status.as_str().to_owned(),
            created_at: user.created_at.to_rfc3339(),
            updated_at: user.updated_at.to_rfc3339(),
        }
    }
}

impl From<Municipality> for MunicipalityResponse {
    fn from(municipality: Municipality) -> Self {
        Self {
            municipality_id: municipality.id.to_string(),
            name: municipality.name,
            status: municipality.status.as_str().to_owned(),
            privileges: municipality.privileges,
        }
    }
}

impl From<DistrictGroup> for DistrictGroupResponse {
    fn from(group: DistrictGroup) -> Self {
        Self {
            district: group.district,
            municipalities: group
                .municipalities
                .into_iter()
                .map(MunicipalityResponse::from)
                .collect(),
        }
    }
}

impl OperatorResponse {
    /// Builds the operator payload with the features the policy grants.
    pub fn new(identity: OperatorIdentity, features: Vec<String>) -> Self {
        Self {
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            role: identity.role().as_str().to_owned(),
            municipality: identity.municipality().map(ToOwned::to_owned),
            features,
        }
    }
}

/// Converts the grouped-user map into ordered bucket payloads.
pub fn municipality_buckets(grouped: BTreeMap<String, Vec<User>>) -> Vec<MunicipalityBucketResponse> {
    grouped
        .into_iter()
        .map(|(municipality, users)| MunicipalityBucketResponse {
            municipality,
            count: users.len(),
            users: users.into_iter().map(UserResponse::from).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{
        CreateUserRequest, DistrictGroupResponse, HealthResponse, MunicipalityBucketResponse,
        MunicipalityResponse, OperatorResponse, UpdateUserRequest, UserResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        CreateUserRequest::export(&config)?;
        UpdateUserRequest::export(&config)?;
        UserResponse::export(&config)?;
        OperatorResponse::export(&config)?;
        MunicipalityResponse::export(&config)?;
        DistrictGroupResponse::export(&config)?;
        MunicipalityBucketResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        HealthResponse::export(&config)?;

        Ok(())
    }
}
