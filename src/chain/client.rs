//! Thin wrapper around the chain RPC endpoint: receipt lookups, typed
//! factory/market contract reads, and the signed admin write path.

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, B256, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::chain::discovery::FactoryReader;
use crate::chain::events;
use crate::config::AppConfig;
use crate::errors::VerifyError;

sol! {
    #[sol(rpc)]
    interface IMarketFactory {
        function getMarkets() external view returns (address[] memory);
        function marketCount() external view returns (uint256);
        function markets(uint256 index) external view returns (address);
        function createMarket(string memory question, string[] memory outcomes, uint256 endTime) external returns (address);
    }

    #[sol(rpc)]
    interface IPredictionMarket {
        function question() external view returns (string memory);
        function endTime() external view returns (uint256);
        function outcomeCount() external view returns (uint256);
        function outcomeName(uint256 index) external view returns (string memory);
        function outcomePool(uint256 index) external view returns (uint256);
        function totalPool() external view returns (uint256);
        function resolved() external view returns (bool);
        function winningOutcome() external view returns (uint256);
        function resolveMarket(uint256 winningOutcome) external;
    }
}

/// Current on-chain state of one market contract, as read during a sync pass.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub address: String,
    pub question: String,
    pub outcomes: Vec<String>,
    pub outcome_pools: Vec<Decimal>,
    pub total_pool: Decimal,
    pub end_time: Option<DateTime<Utc>>,
    pub creator: Option<String>,
    pub resolved: bool,
    pub winning_outcome: Option<i32>,
}

pub struct ChainClient {
    provider: DynProvider,
    factory_address: Address,
    chain_id: u64,
}

impl ChainClient {
    /// Connect an HTTP provider. When an admin private key is configured the
    /// provider can also sign and submit transactions for the write path.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let factory_address: Address = config
            .factory_address
            .parse()
            .map_err(|_| anyhow::anyhow!("FACTORY_ADDRESS is not a valid address"))?;

        let provider = match &config.admin_private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key
                    .parse()
                    .map_err(|_| anyhow::anyhow!("ADMIN_PRIVATE_KEY is not a valid key"))?;
                let wallet = EthereumWallet::from(signer);
                ProviderBuilder::new()
                    .wallet(wallet)
                    .connect(&config.rpc_url)
                    .await?
                    .erased()
            }
            None => ProviderBuilder::new().connect(&config.rpc_url).await?.erased(),
        };

        Ok(Self {
            provider,
            factory_address,
            chain_id: config.chain_id,
        })
    }

    pub fn factory_address(&self) -> Address {
        self.factory_address
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Fetch the receipt for a mined transaction. `Ok(None)` means the chain
    /// has not indexed the hash yet — a retryable condition, distinct from
    /// transport failure.
    pub async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<TransactionReceipt>, VerifyError> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| VerifyError::RpcUnavailable(e.to_string()))
    }

    /// Read the full current state of one market contract.
    pub async fn market_snapshot(&self, address: Address) -> anyhow::Result<MarketSnapshot> {
        let market = IPredictionMarket::new(address, self.provider.clone());

        let question = market.question().call().await?;
        let end_time = market.endTime().call().await?;
        let count = u64::try_from(market.outcomeCount().call().await?)
            .map_err(|_| anyhow::anyhow!("outcome count overflows u64"))?;

        let mut outcomes = Vec::with_capacity(count as usize);
        let mut outcome_pools = Vec::with_capacity(count as usize);
        for index in 0..count {
            outcomes.push(market.outcomeName(U256::from(index)).call().await?);
            let pool = market.outcomePool(U256::from(index)).call().await?;
            outcome_pools.push(
                events::wei_to_decimal(pool)
                    .ok_or_else(|| anyhow::anyhow!("outcome pool overflows decimal"))?,
            );
        }

        let total_pool = events::wei_to_decimal(market.totalPool().call().await?)
            .ok_or_else(|| anyhow::anyhow!("total pool overflows decimal"))?;

        let resolved = market.resolved().call().await?;
        let winning_outcome = if resolved {
            let raw = market.winningOutcome().call().await?;
            Some(
                i32::try_from(raw)
                    .map_err(|_| anyhow::anyhow!("winning outcome overflows i32"))?,
            )
        } else {
            None
        };

        Ok(MarketSnapshot {
            address: events::addr_string(address),
            question,
            outcomes,
            outcome_pools,
            total_pool,
            end_time: i64::try_from(end_time)
                .ok()
                .and_then(|secs| DateTime::from_timestamp(secs, 0)),
            creator: None,
            resolved,
            winning_outcome,
        })
    }

    /// Submit a signed market-creation transaction via the factory.
    /// Returns the broadcast hash; confirmation is polled separately so a
    /// slow chain surfaces as a resumable pending state, not a stuck call.
    pub async fn submit_create_market(
        &self,
        question: &str,
        outcomes: &[String],
        end_time: DateTime<Utc>,
    ) -> anyhow::Result<B256> {
        let end_secs = u64::try_from(end_time.timestamp())
            .map_err(|_| anyhow::anyhow!("end time predates the unix epoch"))?;
        let factory = IMarketFactory::new(self.factory_address, self.provider.clone());
        let pending = factory
            .createMarket(question.to_string(), outcomes.to_vec(), U256::from(end_secs))
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }

    /// Submit a signed resolution transaction to a market contract.
    pub async fn submit_resolve_market(
        &self,
        market_address: Address,
        winning_outcome: i32,
    ) -> anyhow::Result<B256> {
        let outcome = u64::try_from(winning_outcome)
            .map_err(|_| anyhow::anyhow!("winning outcome must be non-negative"))?;
        let market = IPredictionMarket::new(market_address, self.provider.clone());
        let pending = market
            .resolveMarket(U256::from(outcome))
            .send()
            .await?;
        Ok(*pending.tx_hash())
    }
}

#[async_trait]
impl FactoryReader for ChainClient {
    async fn all_markets(&self) -> anyhow::Result<Vec<Address>> {
        let factory = IMarketFactory::new(self.factory_address, self.provider.clone());
        Ok(factory.getMarkets().call().await?)
    }

    async fn market_count(&self) -> anyhow::Result<u64> {
        let factory = IMarketFactory::new(self.factory_address, self.provider.clone());
        let count = factory.marketCount().call().await?;
        u64::try_from(count).map_err(|_| anyhow::anyhow!("market count overflows u64"))
    }

    async fn market_at(&self, index: u64) -> anyhow::Result<Address> {
        let factory = IMarketFactory::new(self.factory_address, self.provider.clone());
        Ok(factory.markets(U256::from(index)).call().await?)
    }
}
