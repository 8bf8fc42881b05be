//! Periodic reconciliation of the mirror against the chain: discover all
//! market contracts, read each one's current state, and upsert it. The
//! chain owns the canonical pool totals, so a sync pass is also what heals
//! any drift the callback path left behind.

use std::sync::Arc;

use metrics::{counter, gauge};
use serde::Serialize;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::chain::{discovery, ChainClient};
use crate::services::mirror;

#[derive(Debug, Default, Clone, Serialize)]
pub struct SyncReport {
    pub discovered: usize,
    pub synced: usize,
    pub resolved: usize,
    pub failed: usize,
}

/// One full discovery-and-sync pass. Per-market failures are logged and
/// skipped; the pass itself never fails.
pub async fn run_sync_once(chain: &ChainClient, pool: &PgPool) -> SyncReport {
    let addresses = discovery::discover_all(chain).await;
    counter!("sync_runs_total").increment(1);
    gauge!("markets_discovered").set(addresses.len() as f64);

    let mut report = SyncReport {
        discovered: addresses.len(),
        ..Default::default()
    };

    for address in addresses {
        let snapshot = match chain.market_snapshot(address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, address = %address, "Failed to read market snapshot");
                report.failed += 1;
                continue;
            }
        };

        let market = match mirror::sync_market(pool, &snapshot).await {
            Ok(market) => market,
            Err(e) => {
                tracing::warn!(error = %e, address = %address, "Failed to upsert market");
                report.failed += 1;
                continue;
            }
        };
        report.synced += 1;

        // Backfill resolutions observed on-chain but missing from the mirror.
        if snapshot.resolved && !market.is_resolved() {
            if let Some(winning_outcome) = snapshot.winning_outcome {
                match mirror::record_resolution(pool, market.id, winning_outcome).await {
                    Ok(_) => report.resolved += 1,
                    Err(e) => {
                        tracing::warn!(error = %e, market_id = market.id, "Failed to mirror resolution");
                        report.failed += 1;
                    }
                }
            }
        }
    }

    tracing::info!(
        discovered = report.discovered,
        synced = report.synced,
        resolved = report.resolved,
        failed = report.failed,
        "Sync pass complete"
    );

    report
}

/// Run the sync job on a fixed interval.
pub async fn run_sync_loop(chain: Arc<ChainClient>, pool: PgPool, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;
        run_sync_once(&chain, &pool).await;
    }
}
