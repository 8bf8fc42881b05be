use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the payouts table. At most one payout per
/// (market, user) pair, enforced by a unique constraint; never updated
/// or deleted after insert.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payout {
    pub id: Uuid,
    pub market_id: i64,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub claim_tx_hash: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
