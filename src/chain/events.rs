//! Contract event definitions and log decoding.
//!
//! The on-chain interface is a small closed set of event shapes. Decoding is
//! defensive: a log entry that does not match a known shape yields `None` and
//! the caller keeps scanning, because transactions routinely carry log entries
//! from unrelated contracts and events.

use alloy::primitives::{Address, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

sol! {
    /// Emitted by a market contract when a user stakes on an outcome.
    #[derive(Debug)]
    event BetPlaced(address indexed bettor, uint256 outcome, uint256 amount);

    /// Emitted by a market contract when a user claims winnings.
    #[derive(Debug)]
    event WinningsClaimed(address indexed claimant, uint256 amount);

    /// Emitted by the factory when a new market contract is deployed.
    #[derive(Debug)]
    event MarketCreated(address indexed market, string question, uint256 endTime, address creator);

    /// Emitted by a market contract on terminal resolution.
    #[derive(Debug)]
    event MarketResolved(uint256 winningOutcome);
}

/// Ledger amounts are fixed-point integers in wei; 1e18 wei = 1 unit.
const WEI_SCALE: u32 = 18;

/// The kinds of events the verifier knows how to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    BetPlaced,
    WinningsClaimed,
    MarketCreated,
    MarketResolved,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::BetPlaced => "BetPlaced",
            EventKind::WinningsClaimed => "WinningsClaimed",
            EventKind::MarketCreated => "MarketCreated",
            EventKind::MarketResolved => "MarketResolved",
        }
    }
}

/// A decoded, typed market event extracted from one receipt log entry.
#[derive(Debug, Clone)]
pub enum MarketEvent {
    BetPlaced {
        bettor: Address,
        outcome_index: i32,
        amount: Decimal,
    },
    WinningsClaimed {
        claimant: Address,
        amount: Decimal,
    },
    MarketCreated {
        market: Address,
        question: String,
        end_time: Option<DateTime<Utc>>,
        creator: Address,
    },
    MarketResolved {
        winning_outcome: i32,
    },
}

impl MarketEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MarketEvent::BetPlaced { .. } => EventKind::BetPlaced,
            MarketEvent::WinningsClaimed { .. } => EventKind::WinningsClaimed,
            MarketEvent::MarketCreated { .. } => EventKind::MarketCreated,
            MarketEvent::MarketResolved { .. } => EventKind::MarketResolved,
        }
    }
}

/// Attempt to decode a receipt log entry into a known market event.
/// Returns `None` for anything that doesn't match — never an error.
pub fn decode_log(log: &Log) -> Option<MarketEvent> {
    let topic0 = *log.inner.data.topics().first()?;
    let data = &log.inner.data;

    if topic0 == BetPlaced::SIGNATURE_HASH {
        let ev = BetPlaced::decode_log_data(data).ok()?;
        Some(MarketEvent::BetPlaced {
            bettor: ev.bettor,
            outcome_index: u256_to_i32(ev.outcome)?,
            amount: wei_to_decimal(ev.amount)?,
        })
    } else if topic0 == WinningsClaimed::SIGNATURE_HASH {
        let ev = WinningsClaimed::decode_log_data(data).ok()?;
        Some(MarketEvent::WinningsClaimed {
            claimant: ev.claimant,
            amount: wei_to_decimal(ev.amount)?,
        })
    } else if topic0 == MarketCreated::SIGNATURE_HASH {
        let ev = MarketCreated::decode_log_data(data).ok()?;
        Some(MarketEvent::MarketCreated {
            market: ev.market,
            question: ev.question,
            end_time: unix_timestamp(ev.endTime),
            creator: ev.creator,
        })
    } else if topic0 == MarketResolved::SIGNATURE_HASH {
        let ev = MarketResolved::decode_log_data(data).ok()?;
        Some(MarketEvent::MarketResolved {
            winning_outcome: u256_to_i32(ev.winningOutcome)?,
        })
    } else {
        None
    }
}

/// Convert a wei amount to a decimal ledger unit (1e18 divisor) without
/// passing through a float. Returns `None` if the amount overflows the
/// decimal mantissa.
pub fn wei_to_decimal(amount: U256) -> Option<Decimal> {
    let wei = i128::try_from(amount).ok()?;
    Decimal::try_from_i128_with_scale(wei, WEI_SCALE).ok()
}

/// Lowercase `0x`-prefixed hex form of an address, the mirror's storage format.
pub fn addr_string(address: Address) -> String {
    format!("{address:#x}")
}

fn u256_to_i32(value: U256) -> Option<i32> {
    i32::try_from(value).ok()
}

fn unix_timestamp(value: U256) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(value).ok()?;
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::LogData;

    fn rpc_log(address: Address, data: LogData) -> Log {
        Log {
            inner: alloy::primitives::Log { address, data },
            ..Default::default()
        }
    }

    fn market_addr() -> Address {
        "0x4bfb41d5b3570defd03c39a9a4d8de6bd8b8982e".parse().unwrap()
    }

    #[test]
    fn decodes_bet_placed() {
        let bettor: Address = "0x00000000000000000000000000000000000000a1".parse().unwrap();
        let ev = BetPlaced {
            bettor,
            outcome: U256::from(1u64),
            // 0.5 in wei
            amount: U256::from(500_000_000_000_000_000u64),
        };
        let log = rpc_log(market_addr(), ev.encode_log_data());

        let decoded = decode_log(&log).expect("should decode");
        match decoded {
            MarketEvent::BetPlaced {
                bettor: b,
                outcome_index,
                amount,
            } => {
                assert_eq!(b, bettor);
                assert_eq!(outcome_index, 1);
                assert_eq!(amount, Decimal::new(5, 1));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn decodes_market_resolved() {
        let ev = MarketResolved {
            winningOutcome: U256::from(0u64),
        };
        let log = rpc_log(market_addr(), ev.encode_log_data());

        match decode_log(&log).expect("should decode") {
            MarketEvent::MarketResolved { winning_outcome } => assert_eq!(winning_outcome, 0),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn unknown_topic_yields_none() {
        // A WinningsClaimed log truncated to a foreign topic should not decode.
        let ev = WinningsClaimed {
            claimant: market_addr(),
            amount: U256::from(1u64),
        };
        let mut data = ev.encode_log_data();
        let mut topics = data.topics().to_vec();
        topics[0] = alloy::primitives::B256::ZERO;
        data = LogData::new_unchecked(topics, data.data.clone());
        let log = rpc_log(market_addr(), data);

        assert!(decode_log(&log).is_none());
    }

    #[test]
    fn wei_conversion_is_exact() {
        // 1 wei survives the conversion — no float rounding.
        assert_eq!(
            wei_to_decimal(U256::from(1u64)).unwrap(),
            Decimal::new(1, 18)
        );
        assert_eq!(
            wei_to_decimal(U256::from(1_500_000_000_000_000_000u64)).unwrap(),
            Decimal::new(15, 1)
        );
        // Amounts beyond the decimal mantissa are rejected, not truncated.
        assert!(wei_to_decimal(U256::MAX).is_none());
    }

    #[test]
    fn addresses_compare_case_insensitively() {
        let lower: Address = "0x4bfb41d5b3570defd03c39a9a4d8de6bd8b8982e".parse().unwrap();
        let upper: Address = "0x4BFB41D5B3570DEFD03C39A9A4D8DE6BD8B8982E".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(addr_string(upper), "0x4bfb41d5b3570defd03c39a9a4d8de6bd8b8982e");
    }
}
