//! Infrastructure layer: stores, configuration and the event participation service.

pub mod config;
pub mod service;
pub mod store;

pub use config::{AppConfig, ConfigError, DatabaseConfig};
pub use service::{EventService, ServiceError};
pub use store::{
    EventStore, InMemoryStore, ParticipationLedger, PostgresStore, Store, StoreError,
    TypeRegistry, UserDirectory,
};
