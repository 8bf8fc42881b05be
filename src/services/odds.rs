use rust_decimal::Decimal;

/// Map per-outcome pool balances to implied probabilities.
///
/// Each outcome's probability is its pool's share of the total. A market
/// with no liquidity yet reports uniform odds rather than dividing by zero.
pub fn implied_odds(pools: &[Decimal]) -> Vec<Decimal> {
    if pools.is_empty() {
        return Vec::new();
    }

    let total: Decimal = pools.iter().sum();
    if total.is_zero() {
        let uniform = Decimal::ONE / Decimal::from(pools.len() as u64);
        return vec![uniform; pools.len()];
    }

    pools.iter().map(|pool| pool / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_to_pool_share() {
        let odds = implied_odds(&[Decimal::from(75), Decimal::from(25)]);
        assert_eq!(odds, vec![Decimal::new(75, 2), Decimal::new(25, 2)]);
    }

    #[test]
    fn empty_market_is_uniform() {
        let odds = implied_odds(&[Decimal::ZERO, Decimal::ZERO]);
        assert_eq!(odds, vec![Decimal::new(5, 1), Decimal::new(5, 1)]);
    }

    #[test]
    fn no_outcomes_no_odds() {
        assert!(implied_odds(&[]).is_empty());
    }

    #[test]
    fn odds_sum_to_one() {
        let odds = implied_odds(&[
            Decimal::new(5, 1),
            Decimal::new(13, 1),
            Decimal::new(2, 1),
        ]);
        let sum: Decimal = odds.iter().sum();
        assert_eq!(sum.round_dp(10), Decimal::ONE);
    }
}
