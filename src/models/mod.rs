pub mod bet;
pub mod market;
pub mod payout;
pub mod user;

pub use bet::Bet;
pub use market::Market;
pub use payout::Payout;
pub use user::User;

use std::fmt;

// ---------------------------------------------------------------------------
// MarketStatus
// ---------------------------------------------------------------------------

/// Resolution status of a mirrored market. Stored as lowercase TEXT;
/// `resolved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketStatus {
    Open,
    Resolved,
    Paused,
    Cancelled,
}

impl MarketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketStatus::Open => "open",
            MarketStatus::Resolved => "resolved",
            MarketStatus::Paused => "paused",
            MarketStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "open" => Some(MarketStatus::Open),
            "resolved" => Some(MarketStatus::Resolved),
            "paused" => Some(MarketStatus::Paused),
            "cancelled" => Some(MarketStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for MarketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
