//! Independent re-derivation of on-chain facts from a transaction hash.
//!
//! The verifier is the only component that decides whether an external claim
//! ("this hash placed a bet") is true. Everything downstream consumes its
//! typed `VerifiedFact` output and never client-supplied amounts or outcomes.
//! Verification has no side effects on the mirror.

use std::sync::Arc;

use alloy::primitives::{Address, B256};
use alloy::rpc::types::{Log, TransactionReceipt};
use chrono::{DateTime, Utc};
use metrics::counter;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::time::sleep;

use crate::chain::client::ChainClient;
use crate::chain::events::{self, EventKind, MarketEvent};
use crate::config::ReceiptPolicy;
use crate::errors::VerifyError;

/// Normalized result of verifying a bet transaction.
#[derive(Debug, Clone, Serialize)]
pub struct BetFact {
    pub wallet: String,
    pub outcome_index: i32,
    pub amount: Decimal,
    pub tx_hash: String,
}

/// Normalized result of verifying a winnings-claim transaction.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimFact {
    pub wallet: String,
    pub amount: Decimal,
    pub tx_hash: String,
}

/// Normalized result of verifying a market-creation transaction.
#[derive(Debug, Clone, Serialize)]
pub struct MarketCreatedFact {
    pub address: String,
    pub question: String,
    pub end_time: Option<DateTime<Utc>>,
    pub creator: String,
    pub tx_hash: String,
}

/// Normalized result of verifying a resolution transaction.
#[derive(Debug, Clone, Serialize)]
pub struct MarketResolvedFact {
    pub winning_outcome: i32,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifiedFact {
    Bet(BetFact),
    Claim(ClaimFact),
    MarketCreated(MarketCreatedFact),
    MarketResolved(MarketResolvedFact),
}

impl VerifiedFact {
    fn from_event(event: MarketEvent, tx_hash: &str) -> Self {
        match event {
            MarketEvent::BetPlaced {
                bettor,
                outcome_index,
                amount,
            } => VerifiedFact::Bet(BetFact {
                wallet: events::addr_string(bettor),
                outcome_index,
                amount,
                tx_hash: tx_hash.to_string(),
            }),
            MarketEvent::WinningsClaimed { claimant, amount } => VerifiedFact::Claim(ClaimFact {
                wallet: events::addr_string(claimant),
                amount,
                tx_hash: tx_hash.to_string(),
            }),
            MarketEvent::MarketCreated {
                market,
                question,
                end_time,
                creator,
            } => VerifiedFact::MarketCreated(MarketCreatedFact {
                address: events::addr_string(market),
                question,
                end_time,
                creator: events::addr_string(creator),
                tx_hash: tx_hash.to_string(),
            }),
            MarketEvent::MarketResolved { winning_outcome } => {
                VerifiedFact::MarketResolved(MarketResolvedFact {
                    winning_outcome,
                    tx_hash: tx_hash.to_string(),
                })
            }
        }
    }
}

pub struct TxVerifier {
    chain: Arc<ChainClient>,
    policy: ReceiptPolicy,
}

impl TxVerifier {
    pub fn new(chain: Arc<ChainClient>, policy: ReceiptPolicy) -> Self {
        Self { chain, policy }
    }

    /// Fetch the receipt for a hash, polling within the configured horizon.
    /// A receipt that never appears inside the horizon is `ReceiptNotFound`
    /// (retryable); a mined-but-reverted transaction is permanent.
    pub async fn fetch_receipt(&self, tx_hash: B256) -> Result<TransactionReceipt, VerifyError> {
        let hash_str = format!("{tx_hash:#x}");

        for attempt in 0..self.policy.attempts.max(1) {
            if attempt > 0 {
                sleep(self.policy.interval).await;
            }

            match self.chain.transaction_receipt(tx_hash).await? {
                Some(receipt) => {
                    if !receipt.status() {
                        counter!("verification_failures_total").increment(1);
                        return Err(VerifyError::Reverted(hash_str));
                    }
                    return Ok(receipt);
                }
                None => {
                    tracing::debug!(tx_hash = %hash_str, attempt, "Receipt not yet indexed");
                }
            }
        }

        Err(VerifyError::ReceiptNotFound(hash_str))
    }

    /// Check the receipt's target and extract the expected event from its
    /// logs. Pure with respect to the chain — the receipt is already in hand.
    pub fn expect_event(
        &self,
        receipt: &TransactionReceipt,
        expected_contract: Address,
        kind: EventKind,
    ) -> Result<VerifiedFact, VerifyError> {
        check_target(expected_contract, receipt.to)?;
        let tx_hash = format!("{:#x}", receipt.transaction_hash);
        scan_logs(expected_contract, kind, receipt.inner.logs(), &tx_hash)
    }

    /// Full verification: fetch the receipt for `tx_hash`, check it targeted
    /// `expected_contract`, and extract the first log decoding to `kind`.
    pub async fn verify(
        &self,
        tx_hash: B256,
        expected_contract: Address,
        kind: EventKind,
    ) -> Result<VerifiedFact, VerifyError> {
        let receipt = self.fetch_receipt(tx_hash).await?;
        self.expect_event(&receipt, expected_contract, kind)
    }
}

/// Addresses are compared as parsed 20-byte values, which makes the match
/// case-insensitive by construction.
fn check_target(expected: Address, actual: Option<Address>) -> Result<(), VerifyError> {
    let Some(actual) = actual else {
        counter!("verification_failures_total").increment(1);
        return Err(VerifyError::WrongTarget {
            expected: events::addr_string(expected),
            actual: "contract creation".into(),
        });
    };

    if actual != expected {
        counter!("verification_failures_total").increment(1);
        return Err(VerifyError::WrongTarget {
            expected: events::addr_string(expected),
            actual: events::addr_string(actual),
        });
    }

    Ok(())
}

/// Scan receipt logs for the first entry emitted by `expected` that decodes
/// to `kind`. Entries that fail to decode belong to unrelated events in the
/// same transaction and are skipped silently.
fn scan_logs(
    expected: Address,
    kind: EventKind,
    logs: &[Log],
    tx_hash: &str,
) -> Result<VerifiedFact, VerifyError> {
    for log in logs {
        if log.inner.address != expected {
            continue;
        }
        let Some(event) = events::decode_log(log) else {
            continue;
        };
        if event.kind() != kind {
            continue;
        }
        return Ok(VerifiedFact::from_event(event, tx_hash));
    }

    counter!("verification_failures_total").increment(1);
    Err(VerifyError::EventNotFound(kind.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::events::{BetPlaced, WinningsClaimed};
    use alloy::primitives::{LogData, U256};
    use alloy::sol_types::SolEvent;

    fn addr(n: u8) -> Address {
        Address::from([n; 20])
    }

    fn rpc_log(address: Address, data: LogData) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            ..Default::default()
        }
    }

    fn bet_log(contract: Address) -> Log {
        let ev = BetPlaced {
            bettor: addr(0xa1),
            outcome: U256::from(0u64),
            amount: U256::from(500_000_000_000_000_000u64),
        };
        rpc_log(contract, ev.encode_log_data())
    }

    #[test]
    fn scan_accepts_first_matching_event() {
        let contract = addr(0x10);
        let claim = WinningsClaimed {
            claimant: addr(0xa1),
            amount: U256::from(1u64),
        };
        // Unrelated event first, then the one we expect.
        let logs = vec![rpc_log(contract, claim.encode_log_data()), bet_log(contract)];

        let fact = scan_logs(contract, EventKind::BetPlaced, &logs, "0xaaa").unwrap();
        match fact {
            VerifiedFact::Bet(bet) => {
                assert_eq!(bet.outcome_index, 0);
                assert_eq!(bet.amount, Decimal::new(5, 1));
                assert_eq!(bet.tx_hash, "0xaaa");
            }
            other => panic!("unexpected fact: {other:?}"),
        }
    }

    #[test]
    fn scan_fails_when_only_unrelated_events_present() {
        let contract = addr(0x10);
        let claim = WinningsClaimed {
            claimant: addr(0xa1),
            amount: U256::from(1u64),
        };
        let logs = vec![rpc_log(contract, claim.encode_log_data())];

        let err = scan_logs(contract, EventKind::BetPlaced, &logs, "0xaaa").unwrap_err();
        assert!(matches!(err, VerifyError::EventNotFound("BetPlaced")));
    }

    #[test]
    fn scan_ignores_logs_from_other_contracts() {
        let contract = addr(0x10);
        let logs = vec![bet_log(addr(0x99))];

        let err = scan_logs(contract, EventKind::BetPlaced, &logs, "0xaaa").unwrap_err();
        assert!(matches!(err, VerifyError::EventNotFound(_)));
    }

    #[test]
    fn target_mismatch_is_wrong_target() {
        let err = check_target(addr(0x10), Some(addr(0x20))).unwrap_err();
        assert!(matches!(err, VerifyError::WrongTarget { .. }));

        let err = check_target(addr(0x10), None).unwrap_err();
        assert!(matches!(err, VerifyError::WrongTarget { .. }));

        assert!(check_target(addr(0x10), Some(addr(0x10))).is_ok());
    }
}
