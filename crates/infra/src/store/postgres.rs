//! Postgres-backed store.
//!
//! The schema lives in `migrations/` and is applied with [`PostgresStore::migrate`].
//!
//! ## Error Mapping
//!
//! | PostgreSQL error code | StoreError | Scenario |
//! |---|---|---|
//! | `23505` unique violation | `Conflict` | duplicate participation row (absorbed by `join`) |
//! | `23503` FK violation on delete | `Restricted` | event still referenced by participants |
//! | `23503` FK violation on insert/update | `NotFound` | unknown type |
//! | anything else | `Backend` | connectivity, decoding, ... |

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use tracing::{Span, instrument};

use homies_core::{Entity, EventId, TypeId, UserId};
use homies_events::{
    Event, EventDetailRecord, EventDetails, EventListing, EventType, JoinOutcome, NewEvent,
};

use super::{EventStore, ParticipationLedger, StoreError, TypeRegistry, UserDirectory};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Relational store on a SQLx connection pool.
///
/// `PgPool` is internally reference counted, so cloning the store is cheap and
/// all clones share one pool.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))
    }
}

#[derive(Debug, FromRow)]
struct TypeRow {
    id: i32,
    name: String,
}

#[derive(Debug, FromRow)]
struct EventRow {
    id: i64,
    name: String,
    description: String,
    organiser_id: String,
    created_on: DateTime<Utc>,
    start_at: NaiveDateTime,
    end_at: NaiveDateTime,
    type_id: i32,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let organiser_id = UserId::new(row.organiser_id)?;
        let details = EventDetails {
            name: row.name,
            description: row.description,
            start: row.start_at,
            end: row.end_at,
            type_id: TypeId::new(row.type_id),
        };
        Ok(Event::new(
            EventId::new(row.id),
            NewEvent::new(organiser_id, details, row.created_on),
        ))
    }
}

#[derive(Debug, FromRow)]
struct ListingRow {
    id: i64,
    name: String,
    start_at: NaiveDateTime,
    type_name: String,
    organiser_name: String,
}

impl From<ListingRow> for EventListing {
    fn from(row: ListingRow) -> Self {
        Self {
            id: EventId::new(row.id),
            name: row.name,
            start: row.start_at,
            type_name: row.type_name,
            organiser_name: row.organiser_name,
        }
    }
}

#[derive(Debug, FromRow)]
struct DetailRow {
    id: i64,
    name: String,
    description: String,
    created_on: DateTime<Utc>,
    start_at: NaiveDateTime,
    end_at: NaiveDateTime,
    type_name: String,
    organiser_name: String,
}

impl From<DetailRow> for EventDetailRecord {
    fn from(row: DetailRow) -> Self {
        Self {
            id: EventId::new(row.id),
            name: row.name,
            description: row.description,
            created_on: row.created_on,
            start: row.start_at,
            end: row.end_at,
            type_name: row.type_name,
            organiser_name: row.organiser_name,
        }
    }
}

#[async_trait]
impl TypeRegistry for PostgresStore {
    #[instrument(skip(self), err)]
    async fn list_types(&self) -> Result<Vec<EventType>, StoreError> {
        let rows: Vec<TypeRow> = sqlx::query_as("SELECT id, name FROM types ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_types", e))?;

        rows.into_iter()
            .map(|r| EventType::new(TypeId::new(r.id), r.name).map_err(StoreError::from))
            .collect()
    }

    #[instrument(skip(self), fields(type_id = %type_id), err)]
    async fn type_exists(&self, type_id: TypeId) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM types WHERE id = $1)")
            .bind(type_id.get())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("type_exists", e))
    }
}

#[async_trait]
impl UserDirectory for PostgresStore {
    #[instrument(skip(self, user_name), fields(user_id = %user_id), err)]
    async fn upsert_user(&self, user_id: &UserId, user_name: &str) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, user_name)
            VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET user_name = EXCLUDED.user_name
            WHERE users.user_name IS DISTINCT FROM EXCLUDED.user_name
            "#,
        )
        .bind(user_id.as_str())
        .bind(user_name)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("upsert_user", e))?;
        Ok(())
    }
}

const LISTING_COLUMNS: &str = r#"
    e.id,
    e.name,
    e.start_at,
    t.name AS type_name,
    COALESCE(u.user_name, e.organiser_id) AS organiser_name
"#;

#[async_trait]
impl EventStore for PostgresStore {
    #[instrument(
        skip(self, event),
        fields(organiser_id = %event.organiser_id, event_id = tracing::field::Empty),
        err
    )]
    async fn insert_event(&self, event: NewEvent) -> Result<EventId, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO events (name, description, organiser_id, created_on, start_at, end_at, type_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&event.details.name)
        .bind(&event.details.description)
        .bind(event.organiser_id.as_str())
        .bind(event.created_on)
        .bind(event.details.start)
        .bind(event.details.end)
        .bind(event.details.type_id.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_event", e))?;

        Span::current().record("event_id", id);
        Ok(EventId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn list_events(&self) -> Result<Vec<EventListing>, StoreError> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM events e
            JOIN types t ON t.id = e.type_id
            LEFT JOIN users u ON u.id = e.organiser_id
            ORDER BY e.id ASC
            "#
        );
        let rows: Vec<ListingRow> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_events", e))?;

        Ok(rows.into_iter().map(EventListing::from).collect())
    }

    #[instrument(skip(self), fields(event_id = %event_id), err)]
    async fn find_event(&self, event_id: EventId) -> Result<Option<Event>, StoreError> {
        let row: Option<EventRow> = sqlx::query_as(
            r#"
            SELECT id, name, description, organiser_id, created_on, start_at, end_at, type_id
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_event", e))?;

        row.map(Event::try_from).transpose()
    }

    #[instrument(skip(self), fields(event_id = %event_id), err)]
    async fn find_event_detail(
        &self,
        event_id: EventId,
    ) -> Result<Option<EventDetailRecord>, StoreError> {
        let row: Option<DetailRow> = sqlx::query_as(
            r#"
            SELECT
                e.id,
                e.name,
                e.description,
                e.created_on,
                e.start_at,
                e.end_at,
                t.name AS type_name,
                COALESCE(u.user_name, e.organiser_id) AS organiser_name
            FROM events e
            JOIN types t ON t.id = e.type_id
            LEFT JOIN users u ON u.id = e.organiser_id
            WHERE e.id = $1
            "#,
        )
        .bind(event_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_event_detail", e))?;

        Ok(row.map(EventDetailRecord::from))
    }

    #[instrument(skip(self, details), fields(event_id = %event_id), err)]
    async fn update_event(
        &self,
        event_id: EventId,
        details: &EventDetails,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = $2, description = $3, start_at = $4, end_at = $5, type_id = $6
            WHERE id = $1
            "#,
        )
        .bind(event_id.get())
        .bind(&details.name)
        .bind(&details.description)
        .bind(details.start)
        .bind(details.end)
        .bind(details.type_id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_event", e))?;

        if result.rows_affected() == 0 {
            return Err(Event::not_found(event_id).into());
        }
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %event_id), err)]
    async fn delete_event(&self, event_id: EventId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| match map_sqlx_error("delete_event", e) {
                StoreError::NotFound(msg) => StoreError::Restricted(msg),
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(Event::not_found(event_id).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ParticipationLedger for PostgresStore {
    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn join(&self, event_id: EventId, user_id: &UserId) -> Result<JoinOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("join", e))?;

        lock_event(&mut tx, event_id).await?;

        // ON CONFLICT turns a concurrent duplicate join into a zero-row insert.
        let inserted = sqlx::query(
            r#"
            INSERT INTO events_participants (event_id, helper_id)
            VALUES ($1, $2)
            ON CONFLICT (event_id, helper_id) DO NOTHING
            "#,
        )
        .bind(event_id.get())
        .bind(user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("join", e))?
        .rows_affected();

        tx.commit().await.map_err(|e| map_sqlx_error("join", e))?;

        let outcome = if inserted == 0 {
            JoinOutcome::AlreadyJoined
        } else {
            JoinOutcome::Joined
        };
        Ok(outcome)
    }

    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn leave(&self, event_id: EventId, user_id: &UserId) -> Result<(), StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("leave", e))?;

        lock_event(&mut tx, event_id).await?;

        let removed = sqlx::query(
            "DELETE FROM events_participants WHERE event_id = $1 AND helper_id = $2",
        )
        .bind(event_id.get())
        .bind(user_id.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("leave", e))?
        .rows_affected();

        // Nothing deleted: the pair was never joined. Dropping `tx` rolls back.
        if removed == 0 {
            return Err(StoreError::NotFound(format!(
                "participation of {user_id} in event {event_id}"
            )));
        }

        tx.commit().await.map_err(|e| map_sqlx_error("leave", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(event_id = %event_id, user_id = %user_id), err)]
    async fn is_participant(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM events_participants WHERE event_id = $1 AND helper_id = $2
            )
            "#,
        )
        .bind(event_id.get())
        .bind(user_id.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("is_participant", e))
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn list_joined_by(&self, user_id: &UserId) -> Result<Vec<EventListing>, StoreError> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM events_participants ep
            JOIN events e ON e.id = ep.event_id
            JOIN types t ON t.id = e.type_id
            LEFT JOIN users u ON u.id = e.organiser_id
            WHERE ep.helper_id = $1
            ORDER BY e.id ASC
            "#
        );
        let rows: Vec<ListingRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_joined_by", e))?;

        Ok(rows.into_iter().map(EventListing::from).collect())
    }
}

/// Take a share lock on the event row for the rest of the transaction.
///
/// Blocks a concurrent delete of the event while a membership row is being
/// written or removed.
async fn lock_event(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    event_id: EventId,
) -> Result<(), StoreError> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM events WHERE id = $1 FOR SHARE")
        .bind(event_id.get())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_event", e))?;

    match found {
        Some(_) => Ok(()),
        None => Err(Event::not_found(event_id).into()),
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => StoreError::Conflict(msg),
                Some(FOREIGN_KEY_VIOLATION) => StoreError::NotFound(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_row_converts_into_entity() {
        let created_on = Utc::now();
        let start = homies_core::parse_date_time("20-05-2024 18:00").unwrap();
        let row = EventRow {
            id: 7,
            name: "Chess Night".to_string(),
            description: "Bring a board.".to_string(),
            organiser_id: "user-a".to_string(),
            created_on,
            start_at: start,
            end_at: start,
            type_id: 2,
        };

        let event = Event::try_from(row).unwrap();
        assert_eq!(event.id(), EventId::new(7));
        assert_eq!(event.organiser_id().as_str(), "user-a");
        assert_eq!(event.type_id(), TypeId::new(2));
    }

    #[test]
    fn event_row_with_blank_organiser_is_rejected() {
        let start = homies_core::parse_date_time("20-05-2024 18:00").unwrap();
        let row = EventRow {
            id: 1,
            name: "n".to_string(),
            description: "d".to_string(),
            organiser_id: String::new(),
            created_on: Utc::now(),
            start_at: start,
            end_at: start,
            type_id: 1,
        };

        assert!(matches!(Event::try_from(row), Err(StoreError::Backend(_))));
    }
}
