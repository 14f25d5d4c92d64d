//! Long-running background task that polls the Soroban RPC and writes
//! decoded registry events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Where the next poll starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub ledger: u32,
    pub cursor: Option<String>,
}

/// Run the indexer loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(contract = %state.config.contract_id, "Indexer starting");

    let mut position = load_position(&state.pool, state.config.start_ledger).await;

    info!(ledger = position.ledger, "Resuming");

    loop {
        // The RPC client retries internally, so a poll may take a while;
        // shutdown must not wait for it.
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            result = poll_once(&state.pool, &state.client, &state.config, &position) => {
                match result {
                    Ok(next) => position = next,
                    Err(e) => error!("Indexer poll error: {e}"),
                }
            }
        }

        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!(ledger = position.ledger, "Indexer stopped");
}

/// Position from the saved cursor, falling back to `start_ledger` when it
/// cannot be read.
async fn load_position(pool: &SqlitePool, start_ledger: u32) -> Position {
    match db::load_cursor(pool).await {
        Ok((last_ledger, cursor)) => resume_position(last_ledger, cursor, start_ledger),
        Err(e) => {
            warn!("Failed to load saved cursor, starting from ledger {start_ledger}: {e}");
            resume_position(0, None, start_ledger)
        }
    }
}

/// A saved ledger wins over the configured start ledger.
fn resume_position(last_ledger: i64, cursor: Option<String>, start_ledger: u32) -> Position {
    let ledger = if last_ledger > 0 {
        last_ledger as u32
    } else {
        start_ledger
    };
    Position { ledger, cursor }
}

/// The ledger to scan from next: the newest ledger the RPC reported, never
/// moving backwards.
fn advance_ledger(start_ledger: u32, latest_ledger: Option<u64>) -> u32 {
    latest_ledger
        .map(|l| (l as u32).max(start_ledger))
        .unwrap_or(start_ledger)
}

/// Perform a single poll iteration and return the next position.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    position: &Position,
) -> Result<Position> {
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        position.ledger,
        position.cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = page.events.len(),
            stored = inserted,
            "Polled registry events"
        );
    }

    let next = Position {
        ledger: advance_ledger(position.ledger, page.latest_ledger),
        cursor: page.cursor,
    };

    // Persist so restarts are deterministic.
    db::save_cursor(pool, next.ledger as i64, next.cursor.as_deref()).await?;

    Ok(next)
}
