//! Best-effort enumeration of all market contracts known to the factory.
//!
//! Discovery never errors: the bulk accessor is tried first, an indexed scan
//! is the fallback for older factory deployments, and a totally unreachable
//! factory degrades to an empty result that callers treat as "nothing new".

use alloy::primitives::Address;
use async_trait::async_trait;

/// Read-only factory surface. Behind a trait so the fallback logic can be
/// exercised against a scripted factory in tests.
#[async_trait]
pub trait FactoryReader: Send + Sync {
    async fn all_markets(&self) -> anyhow::Result<Vec<Address>>;
    async fn market_count(&self) -> anyhow::Result<u64>;
    async fn market_at(&self, index: u64) -> anyhow::Result<Address>;
}

/// Enumerate every market address the factory knows about.
///
/// Tries the bulk accessor first; on failure falls back to a sequential
/// per-index scan, skipping individual indices that error so one bad slot
/// does not abort the whole pass.
pub async fn discover_all(factory: &dyn FactoryReader) -> Vec<Address> {
    match factory.all_markets().await {
        Ok(addresses) => {
            tracing::debug!(count = addresses.len(), "Bulk market accessor succeeded");
            return addresses;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Bulk market accessor failed, falling back to indexed scan");
        }
    }

    let count = match factory.market_count().await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "Market count accessor failed, discovery returns empty");
            return Vec::new();
        }
    };

    let mut addresses = Vec::with_capacity(count as usize);
    for index in 0..count {
        match factory.market_at(index).await {
            Ok(address) => addresses.push(address),
            Err(e) => {
                tracing::warn!(error = %e, index, "Skipping unreadable market index");
            }
        }
    }

    addresses
}
