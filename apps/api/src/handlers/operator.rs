use axum::Json;
use axum::extract::{Extension, State};

use bayan_core::OperatorIdentity;
use bayan_domain::RECOGNIZED_FEATURES;

use crate::dto::OperatorResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Returns the signed-in operator and the features the policy grants them,
/// so the console can decide which controls to render.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(operator): Extension<OperatorIdentity>,
) -> ApiResult<Json<OperatorResponse>> {
    let policy = state.directory_service.policy();
    let features = RECOGNIZED_FEATURES
        .iter()
        .filter(|feature| policy.can_access_feature(&operator, feature))
        .map(|feature| (*feature).to_owned())
        .collect();

    Ok(Json(OperatorResponse::new(operator, features)))
}
