use async_trait::async_trait;
use common::{EventId, OrderId, TransactionId};
use domain::Event;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{Result, store::EventStore};

/// PostgreSQL-backed event store implementation.
///
/// Each snapshot is one row of `saga_events`: the correlation columns are
/// indexed for lookups and the full event is kept as a JSONB document.
#[derive(Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new PostgreSQL event store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_event(row: PgRow) -> Result<Event> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    #[tracing::instrument(skip(self, event), fields(event_id = %event.id))]
    async fn save(&self, event: &Event) -> Result<()> {
        let document = serde_json::to_value(event)?;

        sqlx::query(
            r#"
            INSERT INTO saga_events (id, transaction_id, order_id, source, status, created_at, document)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                source = EXCLUDED.source,
                status = EXCLUDED.status,
                created_at = EXCLUDED.created_at,
                document = EXCLUDED.document
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(event.transaction_id.as_str())
        .bind(event.order_id.as_uuid())
        .bind(event.source.map(|s| s.as_str()))
        .bind(event.status.map(|s| s.as_str()))
        .bind(event.created_at)
        .bind(document)
        .execute(&self.pool)
        .await?;

        metrics::counter!("event_store_snapshots_saved").increment(1);
        Ok(())
    }

    async fn find_by_id(&self, id: EventId) -> Result<Option<Event>> {
        let row: Option<PgRow> = sqlx::query("SELECT document FROM saga_events WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Event>> {
        let rows = sqlx::query(
            r#"
            SELECT document
            FROM saga_events
            ORDER BY created_at DESC, stored_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn find_latest_by_order_id(&self, order_id: OrderId) -> Result<Option<Event>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT document
            FROM saga_events
            WHERE order_id = $1
            ORDER BY created_at DESC, stored_at DESC
            LIMIT 1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn find_latest_by_transaction_id(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<Option<Event>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT document
            FROM saga_events
            WHERE transaction_id = $1
            ORDER BY created_at DESC, stored_at DESC
            LIMIT 1
            "#,
        )
        .bind(transaction_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }
}
