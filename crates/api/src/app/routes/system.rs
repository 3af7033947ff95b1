use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto::WhoAmIResponse;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(WhoAmIResponse {
        user_id: principal.user_id().to_string(),
        user_name: principal.user_name().to_string(),
    })
}

pub async fn types(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.events.types().await {
        Ok(types) => Json(types).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
