//! Admin write path: submit a signed on-chain transaction, wait for the
//! receipt within the configured horizon, then drive the mirror writer from
//! the decoded event — never from the parameters the admin supplied.
//!
//! State machine per action: Requested → Submitted → Confirmed → Mirrored,
//! with Failed reachable from anywhere. A receipt that does not appear
//! inside the horizon surfaces as `Pending`; the action is resumed by
//! re-polling the same transaction hash, never by resubmitting.

use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chain::client::MarketSnapshot;
use crate::chain::events::EventKind;
use crate::chain::verifier::VerifiedFact;
use crate::db::market_repo;
use crate::errors::{AppError, VerifyError};
use crate::models::Market;
use crate::services::mirror;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    CreateMarket,
    ResolveMarket,
}

/// Outcome of an admin action as reported to the caller.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminActionResult {
    /// Confirmed on-chain and projected into the mirror.
    Mirrored {
        market: Market,
        tx_hash: Option<String>,
    },
    /// Broadcast but not yet confirmed within the receipt horizon.
    /// Resume by re-polling this hash; do not resubmit.
    Pending { tx_hash: String, kind: ActionKind },
}

/// Create a market on-chain, then mirror it.
pub async fn create_market(
    state: &AppState,
    question: &str,
    outcomes: &[String],
    end_time: DateTime<Utc>,
    creator_address: &str,
) -> Result<AdminActionResult, AppError> {
    tracing::info!(question, "Admin action requested: create market");

    let tx_hash = state
        .chain
        .submit_create_market(question, outcomes, end_time)
        .await
        .map_err(AppError::Internal)?;
    tracing::info!(tx_hash = %format!("{tx_hash:#x}"), "Create market submitted");

    finish_create(state, tx_hash, Some(creator_address)).await
}

/// Resume a create action from its transaction hash after a Pending result.
pub async fn resume_create(state: &AppState, tx_hash: B256) -> Result<AdminActionResult, AppError> {
    finish_create(state, tx_hash, None).await
}

async fn finish_create(
    state: &AppState,
    tx_hash: B256,
    creator_address: Option<&str>,
) -> Result<AdminActionResult, AppError> {
    let receipt = match state.verifier.fetch_receipt(tx_hash).await {
        Ok(receipt) => receipt,
        Err(VerifyError::ReceiptNotFound(hash)) => {
            tracing::warn!(tx_hash = %hash, "Create market still unconfirmed, surfacing pending");
            return Ok(AdminActionResult::Pending {
                tx_hash: hash,
                kind: ActionKind::CreateMarket,
            });
        }
        Err(e) => return Err(e.into()),
    };

    // Confirmed: the event carries the chain-assigned market address.
    let fact =
        state
            .verifier
            .expect_event(&receipt, state.chain.factory_address(), EventKind::MarketCreated)?;
    let VerifiedFact::MarketCreated(created) = fact else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "verifier returned wrong fact kind for MarketCreated"
        )));
    };

    let address: Address = created
        .address
        .parse()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("event carried invalid market address")))?;

    // Read the authoritative initial state from the chain; fall back to an
    // event-derived empty snapshot if the contract read lags the receipt.
    let mut snapshot = match state.chain.market_snapshot(address).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(error = %e, address = %created.address, "Snapshot read failed after creation, mirroring from event");
            MarketSnapshot {
                address: created.address.clone(),
                question: created.question.clone(),
                outcomes: Vec::new(),
                outcome_pools: Vec::new(),
                total_pool: rust_decimal::Decimal::ZERO,
                end_time: created.end_time,
                creator: None,
                resolved: false,
                winning_outcome: None,
            }
        }
    };
    snapshot.creator = Some(
        creator_address
            .map(str::to_string)
            .unwrap_or_else(|| created.creator.clone()),
    );

    let market = mirror::sync_market(&state.db, &snapshot).await?;
    tracing::info!(market_id = market.id, address = %created.address, "Market created and mirrored");

    Ok(AdminActionResult::Mirrored {
        market,
        tx_hash: Some(created.tx_hash),
    })
}

/// Resolve a market on-chain, then mirror the resolution.
pub async fn resolve_market(
    state: &AppState,
    market_id: i64,
    winning_outcome: i32,
) -> Result<AdminActionResult, AppError> {
    let market = market_repo::get_by_id(&state.db, market_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("market {market_id} not found")))?;

    if market.is_resolved() {
        // Terminal state; a repeat request is a safe no-op.
        return Ok(AdminActionResult::Mirrored {
            market,
            tx_hash: None,
        });
    }

    // Range-check before anything reaches the chain: a resolution transaction
    // cannot be taken back.
    if winning_outcome < 0 || winning_outcome as usize >= market.outcomes.len() {
        return Err(AppError::BadRequest(format!(
            "winning outcome {winning_outcome} out of range for market {market_id}"
        )));
    }

    let address = market_chain_address(&market)?;

    tracing::info!(market_id, winning_outcome, "Admin action requested: resolve market");
    let tx_hash = state
        .chain
        .submit_resolve_market(address, winning_outcome)
        .await
        .map_err(AppError::Internal)?;
    tracing::info!(market_id, tx_hash = %format!("{tx_hash:#x}"), "Resolve market submitted");

    finish_resolve(state, market, tx_hash).await
}

/// Resume a resolve action from its transaction hash after a Pending result.
pub async fn resume_resolve(
    state: &AppState,
    market_id: i64,
    tx_hash: B256,
) -> Result<AdminActionResult, AppError> {
    let market = market_repo::get_by_id(&state.db, market_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("market {market_id} not found")))?;

    finish_resolve(state, market, tx_hash).await
}

async fn finish_resolve(
    state: &AppState,
    market: Market,
    tx_hash: B256,
) -> Result<AdminActionResult, AppError> {
    let receipt = match state.verifier.fetch_receipt(tx_hash).await {
        Ok(receipt) => receipt,
        Err(VerifyError::ReceiptNotFound(hash)) => {
            tracing::warn!(market_id = market.id, tx_hash = %hash, "Resolution still unconfirmed, surfacing pending");
            return Ok(AdminActionResult::Pending {
                tx_hash: hash,
                kind: ActionKind::ResolveMarket,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let address = market_chain_address(&market)?;

    // The event confirms what actually resolved on-chain; the admin's input
    // never reaches the mirror directly.
    let fact = state
        .verifier
        .expect_event(&receipt, address, EventKind::MarketResolved)?;
    let VerifiedFact::MarketResolved(resolved) = fact else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "verifier returned wrong fact kind for MarketResolved"
        )));
    };

    let market = mirror::record_resolution(&state.db, market.id, resolved.winning_outcome).await?;
    tracing::info!(
        market_id = market.id,
        winning_outcome = resolved.winning_outcome,
        "Market resolved and mirrored"
    );

    Ok(AdminActionResult::Mirrored {
        market,
        tx_hash: Some(resolved.tx_hash),
    })
}

fn market_chain_address(market: &Market) -> Result<Address, AppError> {
    market
        .chain_address
        .as_deref()
        .ok_or_else(|| {
            AppError::BadRequest(format!("market {} has no on-chain address yet", market.id))
        })?
        .parse()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("mirror holds invalid chain address")))
}
