//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the shared `EventService`
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response bodies
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use homies_auth::Hs256JwtValidator;
use homies_infra::{AppConfig, StoreError};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StoreError> {
    let services = services::build_services(config.database.as_ref()).await?;
    Ok(build_router(&config.jwt_secret, services))
}

/// Router over already-wired services.
pub fn build_router(jwt_secret: &str, services: AppServices) -> Router {
    let services = Arc::new(services);
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState {
        jwt,
        services: services.clone(),
    };

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
