use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::chain::verifier::BetFact;
use crate::models::Bet;

/// Get a bet by its transaction hash, the global idempotency key.
pub async fn get_by_tx_hash(pool: &PgPool, tx_hash: &str) -> anyhow::Result<Option<Bet>> {
    let row = sqlx::query_as::<_, Bet>("SELECT * FROM bets WHERE tx_hash = $1")
        .bind(tx_hash)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Insert a verified bet. The unique constraint on tx_hash is the authority
/// for concurrent duplicates: a conflicting insert returns `None` and the
/// caller re-reads the existing row instead of double counting.
pub async fn insert(
    conn: &mut PgConnection,
    market_id: i64,
    user_id: Uuid,
    fact: &BetFact,
    chain_id: i64,
) -> anyhow::Result<Option<Bet>> {
    let row = sqlx::query_as::<_, Bet>(
        r#"
        INSERT INTO bets (tx_hash, market_id, user_id, outcome_index, amount, wallet_address, chain_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (tx_hash) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(&fact.tx_hash)
    .bind(market_id)
    .bind(user_id)
    .bind(fact.outcome_index)
    .bind(fact.amount)
    .bind(fact.wallet.to_lowercase())
    .bind(chain_id)
    .fetch_optional(conn)
    .await?;

    Ok(row)
}

/// All bets one user holds on one market.
pub async fn get_by_market_user(
    pool: &PgPool,
    market_id: i64,
    user_id: Uuid,
) -> anyhow::Result<Vec<Bet>> {
    let rows = sqlx::query_as::<_, Bet>(
        "SELECT * FROM bets WHERE market_id = $1 AND user_id = $2 ORDER BY created_at",
    )
    .bind(market_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Whether the user holds at least one bet on the market's winning outcome.
pub async fn has_winning_bet(
    pool: &PgPool,
    market_id: i64,
    user_id: Uuid,
    winning_outcome: i32,
) -> anyhow::Result<bool> {
    let row: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM bets
            WHERE market_id = $1 AND user_id = $2 AND outcome_index = $3
        )
        "#,
    )
    .bind(market_id)
    .bind(user_id)
    .bind(winning_outcome)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}
