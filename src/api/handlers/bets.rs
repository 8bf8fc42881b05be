use alloy::primitives::B256;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiResponse;
use crate::chain::events::{self, EventKind};
use crate::chain::verifier::{BetFact, VerifiedFact};
use crate::db::user_repo;
use crate::errors::{AppError, VerifyError};
use crate::models::Bet;
use crate::services::mirror;
use crate::AppState;

/// Callback body: only a hash and a claimed identity. Amount, outcome, and
/// market are deliberately absent — the chain is asked what happened.
#[derive(Deserialize)]
pub struct RecordBetRequest {
    pub tx_hash: String,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct RecordBetResponse {
    pub bet: Bet,
    pub duplicate: bool,
    pub verified: BetFact,
}

/// POST /api/bets/record — verify a claimed bet transaction against the
/// chain, then project it into the mirror.
pub async fn record(
    State(state): State<AppState>,
    Json(req): Json<RecordBetRequest>,
) -> Result<Json<ApiResponse<RecordBetResponse>>, AppError> {
    let tx_hash: B256 = req
        .tx_hash
        .parse()
        .map_err(|_| AppError::BadRequest("invalid transaction hash".into()))?;

    let receipt = state.verifier.fetch_receipt(tx_hash).await?;

    // The receipt's target tells us which market contract was bet on; the
    // mirror must already know that contract or the bet is unplaceable.
    let target = receipt.to.ok_or(VerifyError::WrongTarget {
        expected: "a market contract".into(),
        actual: "contract creation".into(),
    })?;
    let market_address = events::addr_string(target);

    let fact = state
        .verifier
        .expect_event(&receipt, target, EventKind::BetPlaced)?;
    let VerifiedFact::Bet(fact) = fact else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "verifier returned wrong fact kind for BetPlaced"
        )));
    };

    // The verified wallet is authoritative for ownership; the claimed id is
    // only cross-checked for observability.
    match user_repo::get_by_id(&state.db, req.user_id)
        .await
        .map_err(AppError::Internal)?
    {
        Some(user) if user.wallet_address != fact.wallet => {
            tracing::warn!(
                claimed_user = %req.user_id,
                claimed_wallet = %user.wallet_address,
                verified_wallet = %fact.wallet,
                "Claimed identity does not match on-chain bettor"
            );
        }
        _ => {}
    }

    let chain_id = state.chain.chain_id() as i64;
    let projected = mirror::record_bet(&state.db, &market_address, &fact, chain_id).await?;

    Ok(ApiResponse::ok(RecordBetResponse {
        bet: projected.row,
        duplicate: projected.duplicate,
        verified: fact,
    }))
}
