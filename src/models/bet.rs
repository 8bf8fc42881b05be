use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the bets table. `tx_hash` is the idempotency key:
/// one on-chain bet transaction maps to at most one row, and rows are
/// immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bet {
    pub id: Uuid,
    pub tx_hash: String,
    pub market_id: i64,
    pub user_id: Uuid,
    pub outcome_index: i32,
    pub amount: Decimal,
    pub wallet_address: String,
    pub chain_id: i64,
    pub created_at: Option<DateTime<Utc>>,
}
