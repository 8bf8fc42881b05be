mod common;

use rust_decimal::Decimal;

use betmirror::errors::MirrorError;
use betmirror::services::eligibility::{
    self, REASON_ALREADY_CLAIMED, REASON_NOT_RESOLVED, REASON_NO_WINNING_BET,
};
use betmirror::services::mirror;

use common::{bet_fact, claim_fact, seed_open_market, seed_user, setup_test_db};

const WALLET: &str = "0x00000000000000000000000000000000000000a1";
const MARKET_ADDR: &str = "0x0000000000000000000000000000000000001010";

#[tokio::test]
async fn unresolved_market_is_never_claimable() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool, WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    // Even a user holding bets cannot claim before resolution.
    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 0, Decimal::ONE, "0xaaa"), 1)
        .await
        .unwrap();

    let result = eligibility::can_claim(&pool, market.id, user.id).await.unwrap();
    assert!(!result.eligible);
    assert_eq!(result.reason, Some(REASON_NOT_RESOLVED));
}

#[tokio::test]
async fn losing_bettor_is_not_eligible() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool, WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 1, Decimal::ONE, "0xaaa"), 1)
        .await
        .unwrap();
    mirror::record_resolution(&pool, market.id, 0).await.unwrap();

    let result = eligibility::can_claim(&pool, market.id, user.id).await.unwrap();
    assert!(!result.eligible);
    assert_eq!(result.reason, Some(REASON_NO_WINNING_BET));
}

#[tokio::test]
async fn winner_is_eligible_until_claimed() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool, WALLET).await;
    let market = seed_open_market(&pool, MARKET_ADDR, "Will it rain?").await;

    mirror::record_bet(&pool, MARKET_ADDR, &bet_fact(WALLET, 0, Decimal::ONE, "0xaaa"), 1)
        .await
        .unwrap();
    mirror::record_resolution(&pool, market.id, 0).await.unwrap();

    let result = eligibility::can_claim(&pool, market.id, user.id).await.unwrap();
    assert!(result.eligible);
    assert_eq!(result.reason, None);

    mirror::record_claim(&pool, MARKET_ADDR, &claim_fact(WALLET, Decimal::ONE, "0xbbb"))
        .await
        .unwrap();

    let result = eligibility::can_claim(&pool, market.id, user.id).await.unwrap();
    assert!(!result.eligible);
    assert_eq!(result.reason, Some(REASON_ALREADY_CLAIMED));
}

#[tokio::test]
async fn unknown_market_is_an_error_not_a_reason() {
    let pool = setup_test_db().await;
    let user = seed_user(&pool, WALLET).await;

    let err = eligibility::can_claim(&pool, 123456, user.id).await.unwrap_err();
    assert!(matches!(err, MirrorError::UnknownMarket(_)));
}
