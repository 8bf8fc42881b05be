use sqlx::PgPool;
use uuid::Uuid;

use crate::models::User;

/// Get a user by mirror id.
pub async fn get_by_id(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Get a user by wallet address. Addresses are stored lowercased, so the
/// lookup lowercases its input rather than trusting caller casing.
pub async fn get_by_wallet(pool: &PgPool, wallet_address: &str) -> anyhow::Result<Option<User>> {
    let row = sqlx::query_as::<_, User>("SELECT * FROM users WHERE wallet_address = $1")
        .bind(wallet_address.to_lowercase())
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
