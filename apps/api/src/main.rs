//! Bayan console API composition root.

#![forbid(unsafe_code)]

mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use bayan_application::{
    DirectoryService, MunicipalityRepository, MunicipalityService, UserDirectoryRepository,
};
use bayan_core::{AppError, Role};
use bayan_domain::{
    AccessPolicy, DistrictMap, FEATURE_EDIT_USER, FEATURE_VIEW_USERS, FeatureGrants,
};
use bayan_infrastructure::{InMemoryDirectoryRepository, RestDirectoryRepository};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
    let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
    let api_port = env::var("API_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(3001);

    let policy = AccessPolicy::new(feature_grants_from_env()?);
    let district_map = DistrictMap::standard();

    let directory_provider =
        env::var("DIRECTORY_PROVIDER").unwrap_or_else(|_| "memory".to_owned());

    let (user_repository, municipality_repository): (
        Arc<dyn UserDirectoryRepository>,
        Arc<dyn MunicipalityRepository>,
    ) = match directory_provider.as_str() {
        "memory" => {
            let repository = Arc::new(InMemoryDirectoryRepository::new());
            (repository.clone(), repository)
        }
        "rest" => {
            let base_url = required_env("DIRECTORY_URL")?;
            Url::parse(&base_url)
                .map_err(|error| AppError::Validation(format!("invalid DIRECTORY_URL: {error}")))?;
            let api_token = env::var("DIRECTORY_API_TOKEN")
                .ok()
                .filter(|value| !value.trim().is_empty());

            let http_client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build directory HTTP client: {error}"))
                })?;

            let repository = Arc::new(RestDirectoryRepository::new(
                http_client,
                base_url,
                api_token,
            ));
            (repository.clone(), repository)
        }
        other => {
            return Err(AppError::Validation(format!(
                "DIRECTORY_PROVIDER must be either 'memory' or 'rest', got '{other}'"
            )));
        }
    };

    let app_state = AppState {
        directory_service: DirectoryService::new(user_repository, policy.clone()),
        municipality_service: MunicipalityService::new(
            municipality_repository,
            policy,
            district_map,
        ),
        frontend_url: frontend_url.clone(),
    };

    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::operator::me_handler))
        .route(
            "/api/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/api/users/by-municipality",
            get(handlers::users::grouped_users_handler),
        )
        .route(
            "/api/users/{user_id}",
            get(handlers::users::get_user_handler)
                .put(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/api/municipalities",
            get(handlers::municipalities::list_municipalities_handler),
        )
        .route(
            "/api/municipalities/accessible",
            get(handlers::municipalities::accessible_municipalities_handler),
        )
        .route(
            "/api/municipalities/districts",
            get(handlers::municipalities::district_groups_handler),
        )
        .route_layer(from_fn(middleware::require_operator));

    let cors_layer = CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(&frontend_url)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_same_origin_for_mutations,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state);

    let host = IpAddr::from_str(&api_host)
        .map_err(|error| AppError::Internal(format!("invalid API_HOST '{api_host}': {error}")))?;
    let address = SocketAddr::from((host, api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, %directory_provider, "bayan-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Loads the role → feature grant table.
///
/// `ROLE_FEATURE_GRANTS` holds a JSON object keyed by role, e.g.
/// `{"user": ["view-users", "edit-user"]}`. Administrators are granted
/// every feature by the policy itself, so the table only matters for the
/// `user` role.
fn feature_grants_from_env() -> Result<FeatureGrants, AppError> {
    match env::var("ROLE_FEATURE_GRANTS") {
        Ok(value) if !value.trim().is_empty() => serde_json::from_str(&value).map_err(|error| {
            AppError::Validation(format!("invalid ROLE_FEATURE_GRANTS: {error}"))
        }),
        _ => Ok(FeatureGrants::new()
            .grant(Role::User, FEATURE_VIEW_USERS)
            .grant(Role::User, FEATURE_EDIT_USER)),
    }
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}
