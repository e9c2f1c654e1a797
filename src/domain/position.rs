//! Liquidity positions as reported by the subgraph.

use super::Decimal;

/// A liquidity provision (mint) with its USD value at deposit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityDeposit {
    pub amount_usd: Decimal,
}

/// LP tokens staked into a liquidity mining campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakingPosition {
    /// Staked LP token amount.
    pub amount: Decimal,
    /// Total LP supply of the stakable pair.
    pub total_supply: Decimal,
    /// Pair reserves in USD.
    pub reserve_usd: Decimal,
}

impl StakingPosition {
    /// USD share of the pair reserves held by this stake.
    ///
    /// A pair with zero supply has no value to share out. Returns `None` when
    /// the reported figures overflow decimal range.
    pub fn usd_value(&self) -> Option<Decimal> {
        if self.total_supply == Decimal::zero() {
            return Some(Decimal::zero());
        }
        self.amount
            .checked_div(self.total_supply)?
            .checked_mul(self.reserve_usd)
    }
}
