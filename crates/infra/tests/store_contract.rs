//! Behaviour every `Store` backend must share.
//!
//! Each scenario runs against the in-memory store, and against Postgres when
//! `DATABASE_URL` is set.

use std::sync::Arc;

use homies_core::{TypeId, UserId};
use homies_events::{EventForm, JoinOutcome};
use homies_infra::{EventService, InMemoryStore, PostgresStore, ServiceError, Store};

async fn backends() -> Vec<(&'static str, Arc<dyn Store>)> {
    let mut stores: Vec<(&'static str, Arc<dyn Store>)> =
        vec![("in-memory", Arc::new(InMemoryStore::new()))];

    if let Ok(url) = std::env::var("DATABASE_URL") {
        let store = PostgresStore::connect(&url, 2).await.expect("connect");
        store.migrate().await.expect("migrate");
        stores.push(("postgres", Arc::new(store)));
    }
    stores
}

fn chess_night() -> EventForm {
    EventForm {
        name: "Chess Night".to_string(),
        description: "Casual games, all levels welcome.".to_string(),
        start: "20-05-2024 18:00".to_string(),
        end: "20-05-2024 20:00".to_string(),
        type_id: Some(TypeId::new(1)),
    }
}

#[tokio::test]
async fn unregistered_users_can_organise_and_join() {
    for (backend, store) in backends().await {
        let service = EventService::new(store);
        let organiser = UserId::generate();
        let helper = UserId::generate();

        let id = service
            .create_event(&organiser, &chess_night())
            .await
            .unwrap_or_else(|e| panic!("{backend}: create failed: {e}"));

        let detail = service.event_detail(id, &helper).await.unwrap();
        assert_eq!(detail.organiser, organiser.to_string(), "{backend}");

        assert_eq!(
            service.join(id, &helper).await.unwrap(),
            JoinOutcome::Joined,
            "{backend}"
        );
        let joined = service.joined_by(&helper).await.unwrap();
        assert_eq!(joined.len(), 1, "{backend}");
        assert_eq!(joined[0].organiser, organiser.to_string(), "{backend}");

        service.leave(id, &helper).await.unwrap();
    }
}

#[tokio::test]
async fn leave_without_join_is_not_found() {
    for (backend, store) in backends().await {
        let service = EventService::new(store);
        let organiser = UserId::generate();
        let stranger = UserId::generate();
        let id = service.create_event(&organiser, &chess_night()).await.unwrap();

        let err = service.leave(id, &stranger).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::NotFound(format!("participation of {stranger} in event {id}")),
            "{backend}"
        );
    }
}
