use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use homies_core::ValidationErrors;
use homies_events::{EventForm, EventType};
use homies_infra::ServiceError;

use crate::app::dto::{FormResponse, ValidationErrorBody};

pub fn service_error_to_response(err: ServiceError) -> Response {
    match err {
        ServiceError::Validation(errors) => validation_error(&errors),
        ServiceError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        ServiceError::Unauthorized => json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            "only the organiser may modify this event",
        ),
        ServiceError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        ServiceError::Store(e) => {
            error!(error = %e, "store failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

/// 400 for a rejected Add/Edit submission, echoing the submitted values.
pub fn form_rejected(errors: &ValidationErrors, form: EventForm, types: Vec<EventType>) -> Response {
    let body = ValidationErrorBody {
        error: "validation_error",
        message: errors.to_string(),
        fields: errors.iter().collect(),
        form: FormResponse::new(form, types),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn validation_error(errors: &ValidationErrors) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "validation_error",
            "message": errors.to_string(),
            "fields": errors,
        })),
    )
        .into_response()
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use homies_infra::StoreError;

    #[test]
    fn service_errors_map_to_statuses() {
        let mut errors = ValidationErrors::new();
        errors.push("name", "The field name is required");

        let cases = [
            (ServiceError::Validation(errors), StatusCode::BAD_REQUEST),
            (ServiceError::NotFound("event 1".into()), StatusCode::NOT_FOUND),
            (ServiceError::Unauthorized, StatusCode::FORBIDDEN),
            (ServiceError::Conflict("dup".into()), StatusCode::CONFLICT),
            (
                ServiceError::Store(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(service_error_to_response(err).status(), status);
        }
    }
}
