use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::MarketStatus;

/// Database row for the markets table — the mirror's projection of one
/// on-chain prediction market. `chain_address` is null until the market has
/// been observed on-chain.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Market {
    pub id: i64,
    pub chain_address: Option<String>,
    pub question: String,
    pub outcomes: Vec<String>,
    pub outcome_pools: Vec<Decimal>,
    pub total_pool: Decimal,
    pub status: String,
    pub winning_outcome: Option<i32>,
    pub end_time: Option<DateTime<Utc>>,
    pub creator_address: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Market {
    pub fn is_resolved(&self) -> bool {
        self.status == MarketStatus::Resolved.as_str()
    }
}
