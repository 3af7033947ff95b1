use serde::{Deserialize, Serialize};

use homies_core::{DomainError, Entity, TypeId, ValidationErrors};

pub const TYPE_NAME_MAX_LENGTH: usize = 50;

/// Event category from the fixed type catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventType {
    id: TypeId,
    name: String,
}

impl EventType {
    pub fn new(id: TypeId, name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let mut errors = ValidationErrors::new();
        errors.check_text("name", &name, 1, TYPE_NAME_MAX_LENGTH);
        errors.into_result(Self { id, name }).map_err(DomainError::from)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Entity for EventType {
    const KIND: &'static str = "type";
    type Id = TypeId;

    fn id(&self) -> TypeId {
        self.id
    }
}

/// The seeded catalog. Ids are stable and match the schema seed data.
pub fn default_catalog() -> Vec<EventType> {
    [(1, "Animals"), (2, "Fun"), (3, "Discussion"), (4, "Work")]
        .into_iter()
        .map(|(id, name)| EventType {
            id: TypeId::new(id),
            name: name.to_string(),
        })
        .collect()
}
