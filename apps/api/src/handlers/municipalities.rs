use axum::Json;
use axum::extract::{Extension, State};

use bayan_core::OperatorIdentity;

use crate::dto::{DistrictGroupResponse, MunicipalityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_municipalities_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MunicipalityResponse>>> {
    let municipalities = state
        .municipality_service
        .list_municipalities()
        .await?
        .into_iter()
        .map(MunicipalityResponse::from)
        .collect();

    Ok(Json(municipalities))
}

pub async fn accessible_municipalities_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> ApiResult<Json<Vec<MunicipalityResponse>>> {
    let municipalities = state
        .municipality_service
        .accessible_municipalities(&operator)
        .await?
        .into_iter()
        .map(MunicipalityResponse::from)
        .collect();

    Ok(Json(municipalities))
}

pub async fn district_groups_handler(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DistrictGroupResponse>>> {
    let groups = state
        .municipality_service
        .district_groups()
        .await?
        .into_iter()
        .map(DistrictGroupResponse::from)
        .collect();

    Ok(Json(groups))
}
