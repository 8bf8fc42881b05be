use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Payout;

/// Get the payout for a (market, user) pair, of which at most one exists.
pub async fn get_by_market_user(
    pool: &PgPool,
    market_id: i64,
    user_id: Uuid,
) -> anyhow::Result<Option<Payout>> {
    let row = sqlx::query_as::<_, Payout>(
        "SELECT * FROM payouts WHERE market_id = $1 AND user_id = $2",
    )
    .bind(market_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Insert a payout. The (market, user) unique constraint backs the race:
/// a conflicting insert returns `None` and the caller inspects the existing
/// row rather than creating a second payout.
pub async fn insert(
    pool: &PgPool,
    market_id: i64,
    user_id: Uuid,
    amount: Decimal,
    claim_tx_hash: Option<&str>,
) -> anyhow::Result<Option<Payout>> {
    let row = sqlx::query_as::<_, Payout>(
        r#"
        INSERT INTO payouts (market_id, user_id, amount, claim_tx_hash)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (market_id, user_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(market_id)
    .bind(user_id)
    .bind(amount)
    .bind(claim_tx_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
