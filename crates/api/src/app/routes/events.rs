use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use homies_core::EventId;
use homies_events::EventForm;
use homies_infra::ServiceError;

use crate::app::dto::{CreatedResponse, FormResponse, JoinResponse};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route("/joined", get(list_joined))
        .route("/new", get(new_event_form))
        .route("/:id", get(get_event).put(update_event))
        .route("/:id/edit", get(edit_event_form))
        .route("/:id/join", post(join_event))
        .route("/:id/leave", post(leave_event))
}

fn parse_event_id(raw: &str) -> Result<EventId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid event id"))
}

/// Map a create/update failure; validation errors re-render the submitted form.
async fn submission_error(services: &AppServices, form: EventForm, err: ServiceError) -> Response {
    match err {
        ServiceError::Validation(field_errors) => match services.events.types().await {
            Ok(types) => errors::form_rejected(&field_errors, form, types),
            Err(e) => errors::service_error_to_response(e),
        },
        other => errors::service_error_to_response(other),
    }
}

pub async fn list_events(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.events.event_summaries().await {
        Ok(events) => Json(events).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_joined(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    match services.events.joined_by(principal.user_id()).await {
        Ok(events) => Json(events).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn new_event_form(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.events.types().await {
        Ok(types) => Json(FormResponse::new(EventForm::default(), types)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(form): Json<EventForm>,
) -> Response {
    let result = services.events.create_event(principal.user_id(), &form).await;
    match result {
        Ok(id) => (StatusCode::CREATED, Json(CreatedResponse { id })).into_response(),
        Err(e) => submission_error(&services, form, e).await,
    }
}

pub async fn get_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.events.event_detail(event_id, principal.user_id()).await {
        Ok(detail) => Json(detail).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn edit_event_form(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let event = match services
        .events
        .event_for_edit(event_id, principal.user_id())
        .await
    {
        Ok(event) => event,
        Err(e) => return errors::service_error_to_response(e),
    };

    match services.events.types().await {
        Ok(types) => Json(FormResponse::new(EventForm::from_event(&event), types)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    Json(form): Json<EventForm>,
) -> Response {
    let event_id = match parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let result = services
        .events
        .update_event(event_id, principal.user_id(), &form)
        .await;
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => submission_error(&services, form, e).await,
    }
}

pub async fn join_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.events.join(event_id, principal.user_id()).await {
        Ok(outcome) => Json(JoinResponse { event_id, outcome }).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn leave_event(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let event_id = match parse_event_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.events.leave(event_id, principal.user_id()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
