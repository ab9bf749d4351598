use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use bayan_core::{AppError, OperatorIdentity, Role};

use crate::error::ApiResult;
use crate::state::AppState;

/// Header carrying the operator's stable subject claim.
pub const OPERATOR_SUBJECT_HEADER: &str = "x-operator-subject";
/// Header carrying the operator's display name.
pub const OPERATOR_NAME_HEADER: &str = "x-operator-name";
/// Header carrying the operator's email address.
pub const OPERATOR_EMAIL_HEADER: &str = "x-operator-email";
/// Header carrying the operator's role.
pub const OPERATOR_ROLE_HEADER: &str = "x-operator-role";
/// Header carrying the operator's home municipality.
pub const OPERATOR_MUNICIPALITY_HEADER: &str = "x-operator-municipality";

/// Builds the operator identity from the trusted identity headers and makes
/// it available to handlers.
///
/// The authentication handshake itself belongs to the upstream collaborator;
/// requests reaching this service without a subject and role are rejected.
pub async fn require_operator(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = operator_from_headers(request.headers())?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn operator_from_headers(headers: &HeaderMap) -> Result<OperatorIdentity, AppError> {
    let subject = header_value(headers, OPERATOR_SUBJECT_HEADER)
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let role = header_value(headers, OPERATOR_ROLE_HEADER)
        .ok_or_else(|| AppError::Unauthorized("operator role is missing".to_owned()))?
        .parse::<Role>()
        .map_err(|_| AppError::Unauthorized("operator role is not recognized".to_owned()))?;

    let display_name =
        header_value(headers, OPERATOR_NAME_HEADER).unwrap_or_else(|| subject.clone());
    let email = header_value(headers, OPERATOR_EMAIL_HEADER);
    let municipality = header_value(headers, OPERATOR_MUNICIPALITY_HEADER);

    Ok(OperatorIdentity::new(
        subject,
        display_name,
        email,
        role,
        municipality,
    ))
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let allowed_origin = state.frontend_url;
        let origin_is_allowed = origin == allowed_origin;
        let referer_is_allowed = referer.starts_with(&allowed_origin);

        if !origin_is_allowed && !referer_is_allowed {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderMap;
    use bayan_core::Role;

    use super::operator_from_headers;

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in entries {
            if let (Ok(header_name), Ok(header_value)) = (
                name.parse::<axum::http::HeaderName>(),
                value.parse::<axum::http::HeaderValue>(),
            ) {
                map.insert(header_name, header_value);
            }
        }
        map
    }

    #[test]
    fn identity_is_built_from_trusted_headers() {
        let identity = operator_from_headers(&headers(&[
            ("x-operator-subject", "op-7"),
            ("x-operator-name", "Ana Reyes"),
            ("x-operator-role", "user"),
            ("x-operator-municipality", "ORANI"),
        ]));

        assert!(identity.is_ok());
        let identity = identity.unwrap_or_else(|_| panic!("test"));
        assert_eq!(identity.subject(), "op-7");
        assert_eq!(identity.role(), Role::User);
        assert_eq!(identity.municipality(), Some("ORANI"));
    }

    #[test]
    fn missing_subject_is_unauthorized() {
        let identity = operator_from_headers(&headers(&[("x-operator-role", "user")]));
        assert!(identity.is_err());
    }

    #[test]
    fn unknown_role_is_unauthorized() {
        let identity = operator_from_headers(&headers(&[
            ("x-operator-subject", "op-7"),
            ("x-operator-role", "owner"),
        ]));
        assert!(identity.is_err());
    }

    #[test]
    fn display_name_falls_back_to_the_subject() {
        let identity = operator_from_headers(&headers(&[
            ("x-operator-subject", "op-7"),
            ("x-operator-role", "administrator"),
        ]));

        assert!(identity.is_ok());
        assert_eq!(
            identity.unwrap_or_else(|_| panic!("test")).display_name(),
            "op-7"
        );
    }
}
