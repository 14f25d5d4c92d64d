//! Database layer: migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::Result;
use crate::events::{AuditEvent, EventKind, EventRecord};

const EVENT_COLUMNS: &str = "id, event_id, event_type, audit_id, actor, value, ledger, timestamp, \
                             contract_id, tx_hash, created_at";

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Make sure the file is created if it doesn't exist yet.
    let url = if url.contains('?') || url.contains(":memory:") {
        url
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the persisted cursor: last-seen ledger (`0` when fresh) and the
/// optional pagination token.
pub async fn load_cursor(pool: &SqlitePool) -> Result<(i64, Option<String>)> {
    let row: Option<(i64, Option<String>)> =
        sqlx::query_as("SELECT last_ledger, last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.unwrap_or((0, None)))
}

/// Persist the last-seen ledger (and optionally a pagination cursor string).
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events inside one transaction. Events whose
/// `event_id` is already stored are silently ignored so re-polling a range is
/// harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[AuditEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, audit_id, actor, value, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.audit_id)
        .bind(&ev.actor)
        .bind(&ev.value)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for one audit, ordered by ledger ascending.
pub async fn get_events_for_audit(pool: &SqlitePool, audit_id: &str) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE audit_id = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(audit_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Audit ids requested by `project`, in submission order.
pub async fn get_project_audit_ids(pool: &SqlitePool, project: &str) -> Result<Vec<u64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT CAST(audit_id AS INTEGER)
        FROM   events
        WHERE  event_type = ?1 AND actor = ?2 AND audit_id IS NOT NULL
        ORDER  BY CAST(audit_id AS INTEGER) ASC
        "#,
    )
    .bind(EventKind::AuditRequested.as_str())
    .bind(project)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id as u64).collect())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    // One connection: every in-memory connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    migrate(&pool).await.expect("migrations");
    pool
}

#[cfg(test)]
pub(crate) fn sample_event(kind: EventKind, audit_id: u64, actor: Option<&str>, value: Option<&str>, ledger: i64) -> AuditEvent {
    AuditEvent {
        event_id: format!("{ledger:019}-0000000001"),
        event_type: kind.as_str().to_string(),
        audit_id: Some(audit_id.to_string()),
        actor: actor.map(String::from),
        value: value.map(String::from),
        ledger,
        timestamp: 1_704_067_200 + ledger,
        contract_id: "CAUDIT".to_string(),
        tx_hash: Some(format!("tx-{ledger}")),
    }
}
