//! Storage boundary for events, types, users and participation.
//!
//! The traits here are the only way the service layer touches persisted state.
//! Every query returns an explicit projection; nothing is lazily loaded.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use thiserror::Error;

use homies_core::{DomainError, EventId, TypeId, UserId};
use homies_events::{
    Event, EventDetailRecord, EventDetails, EventListing, EventType, JoinOutcome, NewEvent,
};

/// Store operation error.
///
/// These are **infrastructure errors** as seen at the storage boundary; the
/// service layer maps them into its own error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A referenced row does not exist (event, type, participation).
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Referential integrity blocked a delete (rows still reference the target).
    #[error("restricted: {0}")]
    Restricted(String),

    /// Connection, decoding or other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<DomainError> for StoreError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(what) => StoreError::NotFound(what),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Read-only access to the event type catalog.
#[async_trait]
pub trait TypeRegistry: Send + Sync {
    /// All types, ordered by id.
    async fn list_types(&self) -> Result<Vec<EventType>, StoreError>;

    async fn type_exists(&self, type_id: TypeId) -> Result<bool, StoreError>;
}

/// Display names for user ids issued by the identity provider.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert or refresh the display name of `user_id`.
    async fn upsert_user(&self, user_id: &UserId, user_name: &str) -> Result<(), StoreError>;
}

/// Event persistence.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persist a new event and return its assigned id.
    ///
    /// Fails with `NotFound` if the referenced type does not exist.
    async fn insert_event(&self, event: NewEvent) -> Result<EventId, StoreError>;

    /// Listing rows for every event, ordered by id (insertion order).
    async fn list_events(&self) -> Result<Vec<EventListing>, StoreError>;

    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError>;

    async fn find_event_detail(
        &self,
        event_id: EventId,
    ) -> Result<Option<EventDetailRecord>, StoreError>;

    /// Overwrite the editable fields of an existing event atomically.
    async fn update_event(&self, event_id: EventId, details: &EventDetails)
    -> Result<(), StoreError>;

    /// Delete an event. Fails with `Restricted` while participation rows reference it.
    async fn delete_event(&self, event_id: EventId) -> Result<(), StoreError>;
}

/// Membership relation between users and events.
#[async_trait]
pub trait ParticipationLedger: Send + Sync {
    /// Ensure `user_id` participates in `event_id`.
    ///
    /// Existing membership is a successful no-op. Fails with `NotFound` if the
    /// event does not exist.
    async fn join(&self, event_id: EventId, user_id: &UserId) -> Result<JoinOutcome, StoreError>;

    /// Remove the membership row. Fails with `NotFound` if the event or the
    /// row does not exist.
    async fn leave(&self, event_id: EventId, user_id: &UserId) -> Result<(), StoreError>;

    async fn is_participant(&self, event_id: EventId, user_id: &UserId)
    -> Result<bool, StoreError>;

    /// Listing rows for every event `user_id` takes part in, ordered by event id.
    async fn list_joined_by(&self, user_id: &UserId) -> Result<Vec<EventListing>, StoreError>;
}

/// Everything the service layer needs from a backend.
pub trait Store: EventStore + ParticipationLedger + TypeRegistry + UserDirectory {}

impl<T> Store for T where T: EventStore + ParticipationLedger + TypeRegistry + UserDirectory {}
