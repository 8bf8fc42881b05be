mod common;

use rust_decimal::Decimal;

use betmirror::chain::MarketSnapshot;
use betmirror::db::{bet_repo, market_repo};
use betmirror::errors::MirrorError;
use betmirror::services::mirror;

use common::{bet_fact, claim_fact, seed_open_market, seed_resolved_market, seed_user, setup_test_db};

const WALLET: &str = "0x00000000000000000000000000000000000000a1";
const OTHER_WALLET: &str = "0x00000000000000000000000000000000000000b2";
const MARKET_ADDR: &str = "0x0000000000000000000000000000000000001010";

#[tokio::test]
async fn record_bet_is_idempotent_per_tx_hash() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool, WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    let fact = bet_fact(WALLET, 0, Decimal::new(5, 1), "0xaaa");

    let first = mirror::record_bet(&pool, MARKET_ADDR, &fact, 31337)
        .await
        .expect("first record should succeed");
    assert!(!first.duplicate);
    assert_eq!(first.row.user_id, user.id);
    assert_eq!(first.row.market_id, market.id);
    assert_eq!(first.row.amount, Decimal::new(5, 1));

    let second = mirror::record_bet(&pool, MARKET_ADDR, &fact, 31337)
        .await
        .expect("replay should succeed as duplicate");
    assert!(second.duplicate);
    assert_eq!(second.row.id, first.row.id);

    // Pools incremented exactly once despite the replay.
    let market = market_repo::get_by_id(&pool, market.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(market.outcome_pools, vec![Decimal::new(5, 1), Decimal::ZERO]);
    assert_eq!(market.total_pool, Decimal::new(5, 1));
}

#[tokio::test]
async fn record_bet_accumulates_pools_across_outcomes() {
    let pool = setup_test_db().await;
    seed_user(&pool, WALLET).await;
    seed_user(&pool, OTHER_WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 0, Decimal::new(3, 0), "0xa1"), 1)
        .await
        .unwrap();
    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(OTHER_WALLET, 1, Decimal::new(1, 0), "0xa2"), 1)
        .await
        .unwrap();
    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 1, Decimal::new(2, 0), "0xa3"), 1)
        .await
        .unwrap();

    let market = market_repo::get_by_id(&pool, market.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(market.outcome_pools, vec![Decimal::new(3, 0), Decimal::new(3, 0)]);
    // Total pool always equals the sum of the outcome pools.
    assert_eq!(market.total_pool, Decimal::new(6, 0));
}

#[tokio::test]
async fn record_bet_rejects_unknown_market_and_user() {
    let pool = setup_test_db().await;
    seed_user(&pool, WALLET).await;

    let err = mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 0, Decimal::ONE, "0xa1"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::UnknownMarket(_)));

    seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    let err = mirror::record_bet(
        &pool,
        MARKET_ADDR,
        &bet_fact(OTHER_WALLET, 0, Decimal::ONE, "0xa2"),
        1,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, MirrorError::UnknownUser(_)));
}

#[tokio::test]
async fn record_bet_rejects_out_of_range_outcome() {
    let pool = setup_test_db().await;
    seed_user(&pool, WALLET).await;
    seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    let err = mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 2, Decimal::ONE, "0xa1"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::OutcomeOutOfRange { index: 2, .. }));

    let err = mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, -1, Decimal::ONE, "0xa2"), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::OutcomeOutOfRange { index: -1, .. }));
}

#[tokio::test]
async fn record_claim_full_lifecycle() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool, WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 0, Decimal::new(5, 1), "0xaaa"), 1)
        .await
        .unwrap();

    // Claiming before resolution is rejected.
    let err = mirror::record_claim(&pool, MARKET_ADDR, &claim_fact(WALLET, Decimal::ONE, "0xbbb"))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::NotResolved(_)));

    mirror::record_resolution(&pool, market.id, 0).await.unwrap();

    let first = mirror::record_claim(&pool, MARKET_ADDR, &claim_fact(WALLET, Decimal::ONE, "0xbbb"))
        .await
        .expect("claim on winning bet should succeed");
    assert!(!first.duplicate);
    assert_eq!(first.row.user_id, user.id);
    assert_eq!(first.row.claim_tx_hash.as_deref(), Some("0xbbb"));

    // Same hash again: idempotent duplicate, not a second payout.
    let replay = mirror::record_claim(&pool, MARKET_ADDR, &claim_fact(WALLET, Decimal::ONE, "0xbbb"))
        .await
        .unwrap();
    assert!(replay.duplicate);
    assert_eq!(replay.row.id, first.row.id);

    // A different hash for the same (market, user) is a real double claim.
    let err = mirror::record_claim(&pool, MARKET_ADDR, &claim_fact(WALLET, Decimal::ONE, "0xccc"))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::AlreadyClaimed { .. }));
}

#[tokio::test]
async fn record_claim_requires_winning_bet() {
    let pool = setup_test_db().await;
    seed_user(&pool, WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    // The user bet on outcome 1; outcome 0 wins.
    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 1, Decimal::ONE, "0xaaa"), 1)
        .await
        .unwrap();
    mirror::record_resolution(&pool, market.id, 0).await.unwrap();

    let err = mirror::record_claim(&pool, MARKET_ADDR, &claim_fact(WALLET, Decimal::ONE, "0xbbb"))
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::NoWinningBet { .. }));
}

#[tokio::test]
async fn record_resolution_is_one_way_and_idempotent() {
    let pool = setup_test_db().await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    let resolved = mirror::record_resolution(&pool, market.id, 1).await.unwrap();
    assert!(resolved.is_resolved());
    assert_eq!(resolved.winning_outcome, Some(1));

    // A replay, even with a different outcome, is a no-op that keeps the
    // first recorded result.
    let again = mirror::record_resolution(&pool, market.id, 0).await.unwrap();
    assert_eq!(again.winning_outcome, Some(1));
}

#[tokio::test]
async fn record_resolution_rejects_out_of_range_outcome() {
    let pool = setup_test_db().await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    let err = mirror::record_resolution(&pool, market.id, 5).await.unwrap_err();
    assert!(matches!(err, MirrorError::OutcomeOutOfRange { index: 5, .. }));
}

#[tokio::test]
async fn sync_market_upserts_by_address_keeping_id() {
    let pool = setup_test_db().await;

    let mut snapshot = MarketSnapshot {
        address: MARKET_ADDR.to_string(),
        question: "Will it rain?".to_string(),
        outcomes: vec!["Yes".into(), "No".into()],
        outcome_pools: vec![Decimal::ZERO, Decimal::ZERO],
        total_pool: Decimal::ZERO,
        end_time: None,
        creator: None,
        resolved: false,
        winning_outcome: None,
    };

    let created = mirror::sync_market(&pool, &snapshot).await.unwrap();
    assert_eq!(created.chain_address.as_deref(), Some(MARKET_ADDR));

    // A later pass with fresh pool totals updates in place.
    snapshot.outcome_pools = vec![Decimal::new(7, 0), Decimal::new(3, 0)];
    snapshot.total_pool = Decimal::new(10, 0);
    let updated = mirror::sync_market(&pool, &snapshot).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.total_pool, Decimal::new(10, 0));
    assert_eq!(updated.outcome_pools, vec![Decimal::new(7, 0), Decimal::new(3, 0)]);
}

#[tokio::test]
async fn sync_market_never_unresolves_a_market() {
    let pool = setup_test_db().await;
    let market = seed_resolved_market(&pool, MARKET_ADDR, "Will it rain?", 0).await;

    // A stale snapshot that predates the resolution must not clear it.
    let snapshot = MarketSnapshot {
        address: MARKET_ADDR.to_string(),
        question: "Will it rain?".to_string(),
        outcomes: vec!["Yes".into(), "No".into()],
        outcome_pools: vec![Decimal::ZERO, Decimal::ZERO],
        total_pool: Decimal::ZERO,
        end_time: None,
        creator: None,
        resolved: false,
        winning_outcome: None,
    };

    let synced = mirror::sync_market(&pool, &snapshot).await.unwrap();
    assert_eq!(synced.id, market.id);
    assert!(synced.is_resolved());
    assert_eq!(synced.winning_outcome, Some(0));
}

#[tokio::test]
async fn bet_rows_store_verified_fields() {
    let pool = setup_test_db().await;
    seed_user(&pool, WALLET).await;
    seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 1, Decimal::new(25, 1), "0xdd"), 8453)
        .await
        .unwrap();

    let bet = bet_repo::get_by_tx_hash(&pool, "0xdd").await.unwrap().unwrap();
    assert_eq!(bet.wallet_address, WALLET);
    assert_eq!(bet.outcome_index, 1);
    assert_eq!(bet.amount, Decimal::new(25, 1));
    assert_eq!(bet.chain_id, 8453);
}
