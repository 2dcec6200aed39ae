//! API module for the Capsuleer API

pub mod routes;
pub mod types;

use crate::server::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Authentication endpoints
        .route("/auth/login", get(routes::auth::login))
        .route("/auth/callback", get(routes::auth::callback))
        .route("/auth/verify", get(routes::auth::verify))
        .route("/auth/refresh", post(routes::auth::refresh))
        // Health
        .route("/health", get(routes::health::health_check))
}

/// Create OpenAPI documentation routes
pub fn docs_routes() -> Router<AppState> {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::login,
        routes::auth::callback,
        routes::auth::verify,
        routes::auth::refresh,
        routes::health::health_check,
    ),
    components(schemas(
        crate::auth::SessionClaims,
        types::RefreshRequest,
        types::RefreshResponse,
        types::HealthCheckResponse,
        crate::error::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "EVE SSO login, session tokens, and token refresh"),
        (name = "health", description = "Health and monitoring"),
    ),
    info(
        title = "Capsuleer API",
        version = "0.1.0",
        description = "Companion auth service for EVE Online pilots",
        license(
            name = "MIT",
        ),
    ),
    servers(
        (url = "http://localhost:3001", description = "Local development"),
    ),
)]
struct ApiDoc;
