use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use homies_core::{Entity, EventId, TypeId, UserId};
use homies_events::{
    Event, EventDetailRecord, EventDetails, EventListing, EventType, JoinOutcome, NewEvent,
    Participation, ParticipationState, default_catalog,
};

use super::{EventStore, ParticipationLedger, StoreError, TypeRegistry, UserDirectory};

#[derive(Debug, Default)]
struct State {
    last_event_id: i64,
    users: HashMap<UserId, String>,
    types: BTreeMap<TypeId, EventType>,
    events: BTreeMap<EventId, Event>,
    /// Ordered by (event_id, user_id); the set itself enforces pair uniqueness.
    participants: BTreeSet<Participation>,
}

impl State {
    fn organiser_name(&self, user_id: &UserId) -> String {
        self.users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| user_id.to_string())
    }

    fn type_name(&self, type_id: TypeId) -> String {
        self.types
            .get(&type_id)
            .map(|t| t.name().to_string())
            .unwrap_or_default()
    }

    fn listing(&self, event: &Event) -> EventListing {
        EventListing {
            id: event.id(),
            name: event.name().to_string(),
            start: event.start(),
            type_name: self.type_name(event.type_id()),
            organiser_name: self.organiser_name(event.organiser_id()),
        }
    }

    fn require_event(&self, event_id: EventId) -> Result<&Event, StoreError> {
        self.events
            .get(&event_id)
            .ok_or_else(|| Event::not_found(event_id).into())
    }

    fn require_type(&self, type_id: TypeId) -> Result<(), StoreError> {
        if self.types.contains_key(&type_id) {
            Ok(())
        } else {
            Err(EventType::not_found(type_id).into())
        }
    }

    fn has_participants(&self, event_id: EventId) -> bool {
        self.participants.iter().any(|p| p.event_id == event_id)
    }
}

/// In-memory store for tests/dev.
///
/// A single lock guards all tables, so every operation is atomic and
/// operations on the same (event, user) pair serialize. Referential rules of
/// the relational schema (type FK, participant restrict) are enforced by hand.
#[derive(Debug)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Empty store seeded with the default type catalog.
    pub fn new() -> Self {
        Self::with_types(default_catalog())
    }

    pub fn with_types(types: Vec<EventType>) -> Self {
        let state = State {
            types: types.into_iter().map(|t| (t.id(), t)).collect(),
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// Number of membership rows for `event_id`.
    pub fn participation_count(&self, event_id: EventId) -> usize {
        self.read()
            .map(|s| s.participants.iter().filter(|p| p.event_id == event_id).count())
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Backend("lock poisoned".to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TypeRegistry for InMemoryStore {
    async fn list_types(&self) -> Result<Vec<EventType>, StoreError> {
        Ok(self.read()?.types.values().cloned().collect())
    }

    async fn type_exists(&self, type_id: TypeId) -> Result<bool, StoreError> {
        Ok(self.read()?.types.contains_key(&type_id))
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn upsert_user(&self, user_id: &UserId, user_name: &str) -> Result<(), StoreError> {
        self.write()?
            .users
            .insert(user_id.clone(), user_name.to_string());
        Ok(())
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn insert_event(&self, event: NewEvent) -> Result<EventId, StoreError> {
        let mut state = self.write()?;
        state.require_type(event.details.type_id)?;

        state.last_event_id += 1;
        let id = EventId::new(state.last_event_id);
        state.events.insert(id, Event::new(id, event));
        Ok(id)
    }

    async fn list_events(&self) -> Result<Vec<EventListing>, StoreError> {
        let state = self.read()?;
        Ok(state.events.values().map(|e| state.listing(e)).collect())
    }

    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.read()?.events.get(&event_id).cloned())
    }

    async fn find_event_detail(
        &self,
        event_id: EventId,
    ) -> Result<Option<EventDetailRecord>, StoreError> {
        let state = self.read()?;
        Ok(state.events.get(&event_id).map(|e| EventDetailRecord {
            id: e.id(),
            name: e.name().to_string(),
            description: e.description().to_string(),
            created_on: e.created_on(),
            start: e.start(),
            end: e.end(),
            type_name: state.type_name(e.type_id()),
            organiser_name: state.organiser_name(e.organiser_id()),
        }))
    }

    async fn update_event(
        &self,
        event_id: EventId,
        details: &EventDetails,
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.require_type(details.type_id)?;

        let event = state
            .events
            .get_mut(&event_id)
            .ok_or_else(|| StoreError::from(Event::not_found(event_id)))?;
        event.apply_changes(details.clone());
        Ok(())
    }

    async fn delete_event(&self, event_id: EventId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.require_event(event_id)?;

        if state.has_participants(event_id) {
            return Err(StoreError::Restricted(format!(
                "event {event_id} still has participants"
            )));
        }

        state.events.remove(&event_id);
        Ok(())
    }
}

#[async_trait]
impl ParticipationLedger for InMemoryStore {
    async fn join(&self, event_id: EventId, user_id: &UserId) -> Result<JoinOutcome, StoreError> {
        let mut state = self.write()?;
        state.require_event(event_id)?;

        let row = Participation::new(event_id, user_id.clone());
        let (next, outcome) =
            ParticipationState::from_membership(state.participants.contains(&row)).join();
        if next.is_joined() {
            state.participants.insert(row);
        }
        Ok(outcome)
    }

    async fn leave(&self, event_id: EventId, user_id: &UserId) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.require_event(event_id)?;

        let row = Participation::new(event_id, user_id.clone());
        ParticipationState::from_membership(state.participants.contains(&row)).leave(&row)?;
        state.participants.remove(&row);
        Ok(())
    }

    async fn is_participant(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<bool, StoreError> {
        let row = Participation::new(event_id, user_id.clone());
        Ok(self.read()?.participants.contains(&row))
    }

    async fn list_joined_by(&self, user_id: &UserId) -> Result<Vec<EventListing>, StoreError> {
        let state = self.read()?;
        Ok(state
            .participants
            .iter()
            .filter(|p| &p.user_id == user_id)
            .filter_map(|p| state.events.get(&p.event_id))
            .map(|e| state.listing(e))
            .collect())
    }
}
