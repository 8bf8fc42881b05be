pub mod client;
pub mod discovery;
pub mod events;
pub mod verifier;

pub use client::{ChainClient, MarketSnapshot};
pub use verifier::{TxVerifier, VerifiedFact};
