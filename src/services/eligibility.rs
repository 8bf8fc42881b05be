//! Read-only settlement eligibility. Derives its answer entirely from
//! mirrored state — never from the chain — because it backs a frequently
//! polled endpoint. The reason vocabulary is shared with the claim recorder.

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{bet_repo, market_repo, payout_repo};
use crate::errors::MirrorError;

pub const REASON_NOT_RESOLVED: &str = "market not resolved";
pub const REASON_NO_WINNING_BET: &str = "no winning bet";
pub const REASON_ALREADY_CLAIMED: &str = "already claimed";

#[derive(Debug, Clone, Serialize)]
pub struct ClaimEligibility {
    pub eligible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl ClaimEligibility {
    fn no(reason: &'static str) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }

    fn yes() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }
}

/// May this user claim a payout for this market right now?
pub async fn can_claim(
    pool: &PgPool,
    market_id: i64,
    user_id: Uuid,
) -> Result<ClaimEligibility, MirrorError> {
    let market = market_repo::get_by_id(pool, market_id)
        .await?
        .ok_or_else(|| MirrorError::UnknownMarket(market_id.to_string()))?;

    if !market.is_resolved() {
        return Ok(ClaimEligibility::no(REASON_NOT_RESOLVED));
    }

    let winning_outcome = market
        .winning_outcome
        .ok_or_else(|| anyhow::anyhow!("resolved market {market_id} has no winning outcome"))?;

    if !bet_repo::has_winning_bet(pool, market_id, user_id, winning_outcome).await? {
        return Ok(ClaimEligibility::no(REASON_NO_WINNING_BET));
    }

    if payout_repo::get_by_market_user(pool, market_id, user_id)
        .await?
        .is_some()
    {
        return Ok(ClaimEligibility::no(REASON_ALREADY_CLAIMED));
    }

    Ok(ClaimEligibility::yes())
}
