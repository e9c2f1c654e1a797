//! Fragment arithmetic: position valuation, threshold and streak bonus.

use crate::domain::{Decimal, LiquidityDeposit, StakingPosition, WeeklyFragment};

/// Minimum weekly USD value that makes a liquidity task claimable.
pub const DEFAULT_MIN_CLAIMABLE_USD: i64 = 50;

/// Total USD provided, or `None` if the sum leaves decimal range.
pub fn total_provision_usd(deposits: &[LiquidityDeposit]) -> Option<Decimal> {
    Decimal::checked_sum(deposits.iter().map(|d| d.amount_usd))
}

/// Total USD staked, or `None` if any position or the sum overflows.
pub fn total_staking_usd(positions: &[StakingPosition]) -> Option<Decimal> {
    let values = positions
        .iter()
        .map(StakingPosition::usd_value)
        .collect::<Option<Vec<_>>>()?;
    Decimal::checked_sum(values)
}

/// Base award: one fragment per whole USD, or `None` below the threshold.
pub fn base_fragments(total_usd: Decimal, min_claimable_usd: Decimal) -> Option<i64> {
    if total_usd < min_claimable_usd {
        return None;
    }
    Some(total_usd.floor_non_negative())
}

/// Final award for the current week.
///
/// With claims in both of the two preceding weeks the award is the
/// accumulated worth of that streak; otherwise it is the base award.
pub fn apply_streak(
    base: i64,
    last_week: Option<&WeeklyFragment>,
    two_weeks_ago: Option<&WeeklyFragment>,
) -> i64 {
    match (last_week, two_weeks_ago) {
        (Some(w1), Some(w2)) => w1.fragments.saturating_add(w2.fragments),
        _ => base,
    }
}
