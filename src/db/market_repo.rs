use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::chain::MarketSnapshot;
use crate::models::{Market, MarketStatus};

/// Get a single market by mirror id.
pub async fn get_by_id(pool: &PgPool, id: i64) -> anyhow::Result<Option<Market>> {
    let row = sqlx::query_as::<_, Market>("SELECT * FROM markets WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Get a single market by its on-chain contract address (lowercased).
pub async fn get_by_address(pool: &PgPool, chain_address: &str) -> anyhow::Result<Option<Market>> {
    let row = sqlx::query_as::<_, Market>("SELECT * FROM markets WHERE chain_address = $1")
        .bind(chain_address.to_lowercase())
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// List all mirrored markets, newest first.
pub async fn list_all(pool: &PgPool) -> anyhow::Result<Vec<Market>> {
    let rows = sqlx::query_as::<_, Market>("SELECT * FROM markets ORDER BY id DESC")
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Upsert a market by its on-chain address, the natural external key.
/// An existing row keeps its mirror id and resolution state; only the
/// mutable fields (question, pool snapshot, end time) are refreshed.
/// Status and winning outcome from the snapshot apply to fresh inserts only —
/// resolution of existing rows goes through the one-way `resolve` below.
pub async fn upsert_by_address(pool: &PgPool, snapshot: &MarketSnapshot) -> anyhow::Result<Market> {
    let status = if snapshot.resolved {
        MarketStatus::Resolved
    } else {
        MarketStatus::Open
    };

    let row = sqlx::query_as::<_, Market>(
        r#"
        INSERT INTO markets
            (chain_address, question, outcomes, outcome_pools, total_pool,
             status, winning_outcome, end_time, creator_address, resolved_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (chain_address) DO UPDATE
        SET question = EXCLUDED.question,
            outcomes = EXCLUDED.outcomes,
            outcome_pools = EXCLUDED.outcome_pools,
            total_pool = EXCLUDED.total_pool,
            end_time = EXCLUDED.end_time,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(snapshot.address.to_lowercase())
    .bind(&snapshot.question)
    .bind(&snapshot.outcomes)
    .bind(&snapshot.outcome_pools)
    .bind(snapshot.total_pool)
    .bind(status.as_str())
    .bind(snapshot.winning_outcome)
    .bind(snapshot.end_time)
    .bind(snapshot.creator.as_deref().map(str::to_lowercase))
    .bind(snapshot.resolved.then(Utc::now))
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// One-way transition to resolved. The status guard makes a second call a
/// no-op: returns the updated row, or `None` when the market was already
/// resolved (or absent).
pub async fn resolve(
    pool: &PgPool,
    market_id: i64,
    winning_outcome: i32,
) -> anyhow::Result<Option<Market>> {
    let row = sqlx::query_as::<_, Market>(
        r#"
        UPDATE markets
        SET status = $2, winning_outcome = $3, resolved_at = $4, updated_at = NOW()
        WHERE id = $1 AND status <> $2
        RETURNING *
        "#,
    )
    .bind(market_id)
    .bind(MarketStatus::Resolved.as_str())
    .bind(winning_outcome)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Atomically add a bet amount to one outcome pool and the total pool.
/// Expressed as a relative SQL update so concurrent writers never lose
/// increments; runs inside the bet-insert transaction.
pub async fn increment_pools(
    conn: &mut PgConnection,
    market_id: i64,
    outcome_index: i32,
    amount: Decimal,
) -> anyhow::Result<()> {
    // Postgres arrays are 1-based.
    sqlx::query(
        r#"
        UPDATE markets
        SET outcome_pools[$2] = outcome_pools[$2] + $3,
            total_pool = total_pool + $3,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(market_id)
    .bind(outcome_index + 1)
    .bind(amount)
    .execute(conn)
    .await?;

    Ok(())
}
