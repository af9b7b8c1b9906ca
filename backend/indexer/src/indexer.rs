//! Long-running background task that polls the Soroban RPC and writes
//! decoded escrow events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db::{self, Cursor};
use crate::errors::Result;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(contract_id = %state.config.contract_id, "Indexer starting");

    let mut cursor = match db::load_cursor(&state.pool).await {
        Ok(saved) => saved,
        Err(e) => {
            error!("Failed to load cursor, starting from config: {e}");
            Cursor::default()
        }
    };
    if cursor.last_ledger == 0 {
        cursor.last_ledger = i64::from(state.config.start_ledger);
    }

    info!(ledger = cursor.last_ledger, "Resuming");

    let interval = Duration::from_secs(state.config.poll_interval_secs);
    loop {
        match poll_once(&state.pool, &state.client, &state.config, &cursor).await {
            Ok(next) => cursor = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(ledger = cursor.last_ledger, "Indexer stopped");
}

/// Perform a single poll iteration and return the cursor to use next.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    cursor: &Cursor,
) -> Result<Cursor> {
    let start_ledger = u32::try_from(cursor.last_ledger).unwrap_or(config.start_ledger);
    let page = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor.last_cursor.as_deref(),
        config.events_per_page,
    )
    .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = page.events.len(),
            inserted, "Polled events page"
        );
    }

    let next = advance(cursor, page.cursor, page.latest_ledger);

    // Persist so restarts pick up where we stopped.
    db::save_cursor(pool, &next).await?;
    Ok(next)
}

/// The ledger never moves backwards. An empty page keeps the previous
/// pagination cursor so the next poll continues from the same position.
fn advance(prev: &Cursor, page_cursor: Option<String>, latest_ledger: Option<u64>) -> Cursor {
    let latest = latest_ledger
        .and_then(|l| i64::try_from(l).ok())
        .unwrap_or(prev.last_ledger);
    Cursor {
        last_ledger: latest.max(prev.last_ledger),
        last_cursor: page_cursor.or_else(|| prev.last_cursor.clone()),
    }
}
