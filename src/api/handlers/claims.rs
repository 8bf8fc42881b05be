use alloy::primitives::{Address, B256};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ApiResponse;
use crate::chain::events::{self, EventKind};
use crate::chain::verifier::{ClaimFact, VerifiedFact};
use crate::db::user_repo;
use crate::errors::AppError;
use crate::models::Payout;
use crate::services::eligibility::{self, ClaimEligibility};
use crate::services::mirror;
use crate::AppState;

#[derive(Deserialize)]
pub struct RecordClaimRequest {
    pub tx_hash: String,
    pub market_address: String,
    pub user_id: Uuid,
}

#[derive(Serialize)]
pub struct RecordClaimResponse {
    pub payout: Payout,
    pub duplicate: bool,
    pub verified: ClaimFact,
}

/// POST /api/claims/record — verify a claimed winnings transaction against
/// the market contract, then project the payout into the mirror.
pub async fn record(
    State(state): State<AppState>,
    Json(req): Json<RecordClaimRequest>,
) -> Result<Json<ApiResponse<RecordClaimResponse>>, AppError> {
    let tx_hash: B256 = req
        .tx_hash
        .parse()
        .map_err(|_| AppError::BadRequest("invalid transaction hash".into()))?;
    let expected: Address = req
        .market_address
        .parse()
        .map_err(|_| AppError::BadRequest("invalid market address".into()))?;

    let fact = state
        .verifier
        .verify(tx_hash, expected, EventKind::WinningsClaimed)
        .await?;
    let VerifiedFact::Claim(fact) = fact else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "verifier returned wrong fact kind for WinningsClaimed"
        )));
    };

    match user_repo::get_by_id(&state.db, req.user_id)
        .await
        .map_err(AppError::Internal)?
    {
        Some(user) if user.wallet_address != fact.wallet => {
            tracing::warn!(
                claimed_user = %req.user_id,
                claimed_wallet = %user.wallet_address,
                verified_wallet = %fact.wallet,
                "Claimed identity does not match on-chain claimant"
            );
        }
        _ => {}
    }

    let market_address = events::addr_string(expected);
    let projected = mirror::record_claim(&state.db, &market_address, &fact).await?;

    Ok(ApiResponse::ok(RecordClaimResponse {
        payout: projected.row,
        duplicate: projected.duplicate,
        verified: fact,
    }))
}

#[derive(Deserialize)]
pub struct EligibilityQuery {
    pub user_id: Uuid,
}

/// GET /api/markets/:id/eligibility — cheap, side-effect-free read of
/// whether a user may claim, derived purely from mirrored state.
pub async fn check_eligibility(
    State(state): State<AppState>,
    Path(market_id): Path<i64>,
    Query(query): Query<EligibilityQuery>,
) -> Result<Json<ApiResponse<ClaimEligibility>>, AppError> {
    let result = eligibility::can_claim(&state.db, market_id, query.user_id).await?;
    Ok(ApiResponse::ok(result))
}
