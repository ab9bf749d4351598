use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use bayan_application::{CreateUserInput, UpdateUserInput};
use bayan_core::OperatorIdentity;
use bayan_domain::{RecordStatus, RosterTab, UserId, filter_users};

use crate::dto::{
    CreateUserRequest, MunicipalityBucketResponse, UpdateUserRequest, UserListQuery, UserResponse,
    municipality_buckets,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Query(query): Query<UserListQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.directory_service.list_users(&operator).await?;

    // Tab and selection are view state; the filter falls back to the full
    // list whenever no municipality is selected.
    let tab = RosterTab::parse(query.tab.as_deref().unwrap_or_default());
    let filtered = filter_users(&users, tab, query.municipality.as_deref());

    Ok(Json(filtered.into_iter().map(UserResponse::from).collect()))
}

pub async fn grouped_users_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> ApiResult<Json<Vec<MunicipalityBucketResponse>>> {
    let grouped = state.directory_service.grouped_users(&operator).await?;
    Ok(Json(municipality_buckets(grouped)))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .directory_service
        .find_user(&operator, UserId::from_uuid(user_id))
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .directory_service
        .create_user(
            &operator,
            CreateUserInput {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                role: payload.role.parse()?,
                municipality: payload.municipality,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .directory_service
        .update_user(
            &operator,
            UserId::from_uuid(user_id),
            UpdateUserInput {
                first_name: payload.first_name,
                last_name: payload.last_name,
                email: payload.email,
                role: payload.role.parse()?,
                municipality: payload.municipality,
                status: payload.status.parse::<RecordStatus>()?,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state
        .directory_service
        .delete_user(&operator, UserId::from_uuid(user_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
