use alloy::primitives::B256;
use axum::extract::{Path, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ApiResponse;
use crate::db::market_repo;
use crate::errors::AppError;
use crate::models::Market;
use crate::services::odds;
use crate::services::orchestrator::{self, ActionKind, AdminActionResult};
use crate::AppState;

/// GET /api/markets — all mirrored markets.
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Market>>>, AppError> {
    let markets = market_repo::list_all(&state.db)
        .await
        .map_err(AppError::Internal)?;
    Ok(ApiResponse::ok(markets))
}

#[derive(Serialize)]
pub struct MarketDetail {
    #[serde(flatten)]
    pub market: Market,
    pub implied_odds: Vec<Decimal>,
}

/// GET /api/markets/:id — one market with implied odds from its pools.
pub async fn detail(
    State(state): State<AppState>,
    Path(market_id): Path<i64>,
) -> Result<Json<ApiResponse<MarketDetail>>, AppError> {
    let market = market_repo::get_by_id(&state.db, market_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound(format!("market {market_id} not found")))?;

    let implied_odds = odds::implied_odds(&market.outcome_pools);
    Ok(ApiResponse::ok(MarketDetail {
        market,
        implied_odds,
    }))
}

#[derive(Deserialize)]
pub struct CreateMarketRequest {
    pub question: String,
    pub outcomes: Vec<String>,
    pub end_time: DateTime<Utc>,
    pub creator_address: String,
}

/// POST /api/admin/markets — create a market on-chain and mirror it.
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateMarketRequest>,
) -> Result<Json<ApiResponse<AdminActionResult>>, AppError> {
    if req.question.trim().is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }
    if req.outcomes.len() < 2 {
        return Err(AppError::BadRequest(
            "a market needs at least two outcomes".into(),
        ));
    }
    if req.end_time <= Utc::now() {
        return Err(AppError::BadRequest("end_time must be in the future".into()));
    }

    let result = orchestrator::create_market(
        &state,
        &req.question,
        &req.outcomes,
        req.end_time,
        &req.creator_address,
    )
    .await?;
    Ok(ApiResponse::ok(result))
}

#[derive(Deserialize)]
pub struct ResolveMarketRequest {
    pub winning_outcome: i32,
}

/// POST /api/admin/markets/:id/resolve — resolve a market on-chain and
/// mirror the confirmed outcome.
pub async fn resolve(
    State(state): State<AppState>,
    Path(market_id): Path<i64>,
    Json(req): Json<ResolveMarketRequest>,
) -> Result<Json<ApiResponse<AdminActionResult>>, AppError> {
    let result = orchestrator::resolve_market(&state, market_id, req.winning_outcome).await?;
    Ok(ApiResponse::ok(result))
}

#[derive(Deserialize)]
pub struct ResumeActionRequest {
    pub tx_hash: String,
    pub kind: ActionKind,
    pub market_id: Option<i64>,
}

/// POST /api/admin/actions/resume — re-poll a pending admin action by its
/// transaction hash instead of resubmitting it.
pub async fn resume(
    State(state): State<AppState>,
    Json(req): Json<ResumeActionRequest>,
) -> Result<Json<ApiResponse<AdminActionResult>>, AppError> {
    let tx_hash: B256 = req
        .tx_hash
        .parse()
        .map_err(|_| AppError::BadRequest("invalid transaction hash".into()))?;

    let result = match req.kind {
        ActionKind::CreateMarket => orchestrator::resume_create(&state, tx_hash).await?,
        ActionKind::ResolveMarket => {
            let market_id = req.market_id.ok_or_else(|| {
                AppError::BadRequest("market_id is required to resume a resolution".into())
            })?;
            orchestrator::resume_resolve(&state, market_id, tx_hash).await?
        }
    };
    Ok(ApiResponse::ok(result))
}
