//! Event participation orchestration (application-level).
//!
//! `EventService` is the single entry point for every use case: it validates
//! input, checks ownership and delegates persistence to a [`Store`]. The caller
//! identity is always an explicit argument.
//!
//! ```text
//! caller ──► EventService ──► Store (events / participation / types / users)
//!                 │
//!                 ├─ EventForm::validate   (field errors, collected)
//!                 ├─ ensure_organiser      (ownership, short-circuits)
//!                 └─ projections           (formatted view models)
//! ```

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, instrument};

use homies_auth::{AuthzError, Principal, ensure_organiser};
use homies_core::{DomainError, Entity, EventId, TypeId, UserId, ValidationErrors};
use homies_events::{
    Event, EventDetail, EventForm, EventSummary, EventType, JoinOutcome, NewEvent,
};

use crate::store::{Store, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Field-scoped input errors; every failing field is listed.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// Referenced event, type or participation does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller is not the event's organiser.
    #[error("unauthorized")]
    Unauthorized,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Store(StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(errors) => ServiceError::Validation(errors),
            DomainError::NotFound(what) => ServiceError::NotFound(what),
            DomainError::Unauthorized => ServiceError::Unauthorized,
            DomainError::InvalidId(msg) => {
                let mut errors = ValidationErrors::new();
                errors.push("id", msg);
                ServiceError::Validation(errors)
            }
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => ServiceError::NotFound(what),
            StoreError::Conflict(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(_: AuthzError) -> Self {
        ServiceError::Unauthorized
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(value: ValidationErrors) -> Self {
        ServiceError::Validation(value)
    }
}

/// Use cases of the event participation core.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn Store>,
}

impl EventService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record (or refresh) the caller's display name.
    #[instrument(skip(self, principal), fields(user_id = %principal.user_id()), err)]
    pub async fn register_user(&self, principal: &Principal) -> Result<(), ServiceError> {
        self.store
            .upsert_user(principal.user_id(), principal.user_name())
            .await?;
        Ok(())
    }

    /// Type catalog, for populating Add/Edit forms.
    pub async fn types(&self) -> Result<Vec<EventType>, ServiceError> {
        Ok(self.store.list_types().await?)
    }

    #[instrument(skip(self, form), fields(organiser_id = %organiser_id), err)]
    pub async fn create_event(
        &self,
        organiser_id: &UserId,
        form: &EventForm,
    ) -> Result<EventId, ServiceError> {
        let details = form.validate()?;
        self.ensure_type(details.type_id).await?;

        let id = self
            .store
            .insert_event(NewEvent::new(organiser_id.clone(), details, Utc::now()))
            .await?;

        info!(event_id = %id, "event created");
        Ok(id)
    }

    pub async fn event_summaries(&self) -> Result<Vec<EventSummary>, ServiceError> {
        let rows = self.store.list_events().await?;
        Ok(rows.into_iter().map(EventSummary::from).collect())
    }

    /// Full event page as seen by `viewer`, including whether they joined.
    #[instrument(skip(self), fields(viewer = %viewer), err)]
    pub async fn event_detail(
        &self,
        event_id: EventId,
        viewer: &UserId,
    ) -> Result<EventDetail, ServiceError> {
        let record = self
            .store
            .find_event_detail(event_id)
            .await?
            .ok_or_else(|| ServiceError::from(Event::not_found(event_id)))?;

        let joined = self.is_participant(event_id, viewer).await?;
        Ok(EventDetail::new(record, joined))
    }

    /// Load an event for editing. Only its organiser may see it this way.
    #[instrument(skip(self), fields(requester = %requester), err)]
    pub async fn event_for_edit(
        &self,
        event_id: EventId,
        requester: &UserId,
    ) -> Result<Event, ServiceError> {
        let event = self
            .store
            .find_event(event_id)
            .await?
            .ok_or_else(|| ServiceError::from(Event::not_found(event_id)))?;

        ensure_organiser(requester, event.organiser_id())?;
        Ok(event)
    }

    /// Replace the editable fields of an event on behalf of its organiser.
    ///
    /// Order of checks: existence, ownership, field validation, type
    /// existence. Nothing is written unless all pass.
    #[instrument(skip(self, form), fields(requester = %requester), err)]
    pub async fn update_event(
        &self,
        event_id: EventId,
        requester: &UserId,
        form: &EventForm,
    ) -> Result<(), ServiceError> {
        self.event_for_edit(event_id, requester).await?;

        let details = form.validate()?;
        self.ensure_type(details.type_id).await?;

        self.store.update_event(event_id, &details).await?;
        info!(event_id = %event_id, "event updated");
        Ok(())
    }

    /// Ensure `user_id` participates in the event. Joining twice is a success.
    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn join(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<JoinOutcome, ServiceError> {
        let outcome = match self.store.join(event_id, user_id).await {
            Ok(outcome) => outcome,
            // A racing duplicate insert lost to the unique key: already joined.
            Err(StoreError::Conflict(_)) => JoinOutcome::AlreadyJoined,
            Err(e) => return Err(e.into()),
        };

        match outcome {
            JoinOutcome::Joined => info!(event_id = %event_id, "joined event"),
            JoinOutcome::AlreadyJoined => debug!(event_id = %event_id, "already joined"),
        }
        Ok(outcome)
    }

    /// Remove `user_id` from the event. Fails with `NotFound` if not joined.
    #[instrument(skip(self), fields(user_id = %user_id), err)]
    pub async fn leave(&self, event_id: EventId, user_id: &UserId) -> Result<(), ServiceError> {
        self.store.leave(event_id, user_id).await?;
        info!(event_id = %event_id, "left event");
        Ok(())
    }

    pub async fn is_participant(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<bool, ServiceError> {
        Ok(self.store.is_participant(event_id, user_id).await?)
    }

    pub async fn joined_by(&self, user_id: &UserId) -> Result<Vec<EventSummary>, ServiceError> {
        let rows = self.store.list_joined_by(user_id).await?;
        Ok(rows.into_iter().map(EventSummary::from).collect())
    }

    async fn ensure_type(&self, type_id: TypeId) -> Result<(), ServiceError> {
        if self.store.type_exists(type_id).await? {
            Ok(())
        } else {
            Err(EventType::not_found(type_id).into())
        }
    }
}
