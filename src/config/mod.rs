use std::env;
use std::time::Duration;

/// Bounded polling policy for "receipt not yet indexed". A missing receipt
/// inside the horizon is retried; past the horizon the caller sees a
/// retryable `ReceiptNotFound` / pending status instead of blocking.
#[derive(Debug, Clone, Copy)]
pub struct ReceiptPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl Default for ReceiptPolicy {
    fn default() -> Self {
        Self {
            attempts: 10,
            interval: Duration::from_millis(1500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    // Chain
    pub rpc_url: String,
    pub chain_id: u64,
    pub factory_address: String,
    pub receipt_policy: ReceiptPolicy,

    // Admin write path (optional — required for create/resolve endpoints)
    pub admin_private_key: Option<String>,

    // Sync job
    pub sync_interval_secs: u64,
    pub sync_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let receipt_policy = ReceiptPolicy {
            attempts: env::var("RECEIPT_POLL_ATTEMPTS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .unwrap_or(10),
            interval: Duration::from_millis(
                env::var("RECEIPT_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "1500".into())
                    .parse()
                    .unwrap_or(1500),
            ),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,

            rpc_url: env::var("RPC_URL")
                .map_err(|_| anyhow::anyhow!("RPC_URL must be set"))?,
            chain_id: env::var("CHAIN_ID")
                .unwrap_or_else(|_| "1".into())
                .parse()?,
            factory_address: env::var("FACTORY_ADDRESS")
                .map_err(|_| anyhow::anyhow!("FACTORY_ADDRESS must be set"))?,
            receipt_policy,

            admin_private_key: env::var("ADMIN_PRIVATE_KEY").ok(),

            sync_interval_secs: env::var("SYNC_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".into())
                .parse()
                .unwrap_or(300),
            sync_enabled: env::var("SYNC_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
        })
    }

    /// Returns true if the admin signer is configured for on-chain writes.
    pub fn has_admin_signer(&self) -> bool {
        self.admin_private_key.is_some()
    }
}
