//! Idempotent projection of verified on-chain facts into the relational
//! mirror. All four operations are safe to call twice with the same input:
//! the chain can be re-scanned after a crash, and clients retry callbacks
//! after timeouts even when the first attempt succeeded.
//!
//! Nothing here trusts client input. Every write is driven by a
//! `VerifiedFact` the transaction verifier produced, or by an on-chain
//! snapshot the sync job read itself.

use metrics::counter;
use sqlx::PgPool;

use crate::chain::client::MarketSnapshot;
use crate::chain::verifier::{BetFact, ClaimFact};
use crate::db::{bet_repo, market_repo, payout_repo, user_repo};
use crate::errors::MirrorError;
use crate::models::{Bet, Market, Payout};

/// A projection result: the mirrored row, plus whether this call was a
/// duplicate of an already-applied fact (success, not an error).
#[derive(Debug, Clone)]
pub struct Projected<T> {
    pub row: T,
    pub duplicate: bool,
}

/// Project a verified bet into the mirror.
///
/// Guarded by the bet's transaction hash: a hash already mirrored returns
/// the existing row without touching the pools. The referenced user and
/// market must already exist — a bet against an unknown market indicates a
/// discovery gap that has to be fixed explicitly, not papered over with a
/// placeholder row.
pub async fn record_bet(
    pool: &PgPool,
    market_address: &str,
    fact: &BetFact,
    chain_id: i64,
) -> Result<Projected<Bet>, MirrorError> {
    if let Some(existing) = bet_repo::get_by_tx_hash(pool, &fact.tx_hash).await? {
        counter!("bets_duplicate_total").increment(1);
        tracing::debug!(tx_hash = %fact.tx_hash, "Bet already mirrored, returning existing row");
        return Ok(Projected {
            row: existing,
            duplicate: true,
        });
    }

    let market = market_repo::get_by_address(pool, market_address)
        .await?
        .ok_or_else(|| MirrorError::UnknownMarket(market_address.to_lowercase()))?;

    let user = user_repo::get_by_wallet(pool, &fact.wallet)
        .await?
        .ok_or_else(|| MirrorError::UnknownUser(fact.wallet.clone()))?;

    if fact.outcome_index < 0 || fact.outcome_index as usize >= market.outcomes.len() {
        return Err(MirrorError::OutcomeOutOfRange {
            market_id: market.id,
            index: fact.outcome_index,
        });
    }

    let mut tx = pool.begin().await?;

    let Some(bet) = bet_repo::insert(&mut tx, market.id, user.id, fact, chain_id).await? else {
        // Lost the race to a concurrent writer with the same hash; the
        // unique constraint is the authority, our pre-check was only an
        // optimization. Roll back and return the winner's row.
        drop(tx);
        let existing = bet_repo::get_by_tx_hash(pool, &fact.tx_hash)
            .await?
            .ok_or_else(|| anyhow::anyhow!("bet vanished after tx_hash conflict"))?;
        counter!("bets_duplicate_total").increment(1);
        return Ok(Projected {
            row: existing,
            duplicate: true,
        });
    };

    market_repo::increment_pools(&mut tx, market.id, fact.outcome_index, fact.amount).await?;
    tx.commit().await?;

    counter!("bets_recorded_total").increment(1);
    tracing::info!(
        tx_hash = %fact.tx_hash,
        market_id = market.id,
        wallet = %fact.wallet,
        outcome = fact.outcome_index,
        amount = %fact.amount,
        "Bet mirrored"
    );

    Ok(Projected {
        row: bet,
        duplicate: false,
    })
}

/// Project a verified winnings claim into the mirror.
///
/// A payout already recorded under the same claim hash is an idempotent
/// duplicate; under a different hash it is `AlreadyClaimed`. The market must
/// be resolved and the user must actually hold a bet on the winning outcome.
pub async fn record_claim(
    pool: &PgPool,
    market_address: &str,
    fact: &ClaimFact,
) -> Result<Projected<Payout>, MirrorError> {
    let market = market_repo::get_by_address(pool, market_address)
        .await?
        .ok_or_else(|| MirrorError::UnknownMarket(market_address.to_lowercase()))?;

    let user = user_repo::get_by_wallet(pool, &fact.wallet)
        .await?
        .ok_or_else(|| MirrorError::UnknownUser(fact.wallet.clone()))?;

    if let Some(existing) = payout_repo::get_by_market_user(pool, market.id, user.id).await? {
        return duplicate_or_already_claimed(existing, &fact.tx_hash, market.id, user.id);
    }

    if !market.is_resolved() {
        return Err(MirrorError::NotResolved(market.id));
    }
    let winning_outcome = market
        .winning_outcome
        .ok_or_else(|| anyhow::anyhow!("resolved market {} has no winning outcome", market.id))?;

    if !bet_repo::has_winning_bet(pool, market.id, user.id, winning_outcome).await? {
        return Err(MirrorError::NoWinningBet {
            market_id: market.id,
            user_id: user.id,
        });
    }

    match payout_repo::insert(pool, market.id, user.id, fact.amount, Some(&fact.tx_hash)).await? {
        Some(payout) => {
            counter!("payouts_recorded_total").increment(1);
            tracing::info!(
                tx_hash = %fact.tx_hash,
                market_id = market.id,
                wallet = %fact.wallet,
                amount = %fact.amount,
                "Payout mirrored"
            );
            Ok(Projected {
                row: payout,
                duplicate: false,
            })
        }
        None => {
            // Concurrent claim won the unique constraint race.
            let existing = payout_repo::get_by_market_user(pool, market.id, user.id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("payout vanished after unique conflict"))?;
            duplicate_or_already_claimed(existing, &fact.tx_hash, market.id, user.id)
        }
    }
}

fn duplicate_or_already_claimed(
    existing: Payout,
    claim_tx_hash: &str,
    market_id: i64,
    user_id: uuid::Uuid,
) -> Result<Projected<Payout>, MirrorError> {
    if existing.claim_tx_hash.as_deref() == Some(claim_tx_hash) {
        counter!("payouts_duplicate_total").increment(1);
        tracing::debug!(tx_hash = %claim_tx_hash, "Claim already mirrored, returning existing payout");
        return Ok(Projected {
            row: existing,
            duplicate: true,
        });
    }
    Err(MirrorError::AlreadyClaimed { market_id, user_id })
}

/// Project a verified resolution: a one-way transition to `resolved`.
/// Resolving an already-resolved market is a no-op success so the write
/// path can be retried safely.
pub async fn record_resolution(
    pool: &PgPool,
    market_id: i64,
    winning_outcome: i32,
) -> Result<Market, MirrorError> {
    let market = market_repo::get_by_id(pool, market_id)
        .await?
        .ok_or_else(|| MirrorError::UnknownMarket(market_id.to_string()))?;

    if market.is_resolved() {
        tracing::debug!(market_id, "Market already resolved, no-op");
        return Ok(market);
    }

    if winning_outcome < 0 || winning_outcome as usize >= market.outcomes.len() {
        return Err(MirrorError::OutcomeOutOfRange {
            market_id,
            index: winning_outcome,
        });
    }

    match market_repo::resolve(pool, market_id, winning_outcome).await? {
        Some(resolved) => {
            counter!("markets_resolved_total").increment(1);
            tracing::info!(market_id, winning_outcome, "Market resolution mirrored");
            Ok(resolved)
        }
        None => {
            // A concurrent call resolved it first; re-read and accept.
            market_repo::get_by_id(pool, market_id)
                .await?
                .ok_or_else(|| MirrorError::UnknownMarket(market_id.to_string()))
        }
    }
}

/// Upsert a market from an on-chain snapshot, keyed by contract address.
/// An existing mirror row keeps its identifier; mutable fields are
/// refreshed from the chain, which owns the canonical pool totals.
pub async fn sync_market(
    pool: &PgPool,
    snapshot: &MarketSnapshot,
) -> Result<Market, MirrorError> {
    let market = market_repo::upsert_by_address(pool, snapshot).await?;
    tracing::debug!(
        market_id = market.id,
        address = %snapshot.address,
        total_pool = %snapshot.total_pool,
        "Market synced from chain"
    );
    Ok(market)
}
