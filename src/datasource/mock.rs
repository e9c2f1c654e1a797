//! Mock data source for testing without network calls.

use super::{DataSource, DataSourceError};
use crate::domain::{Decimal, LiquidityDeposit, StakingPosition};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock data source that returns predefined positions per address.
///
/// Range filtering is the subgraph's job, so the mock returns everything it
/// holds for an address and records the requested window instead.
#[derive(Debug, Default)]
pub struct MockDataSource {
    deposits: HashMap<String, Vec<LiquidityDeposit>>,
    stakes: HashMap<String, Vec<StakingPosition>>,
    failure: Option<DataSourceError>,
    requests: Mutex<Vec<(i64, i64)>>,
}

impl MockDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a liquidity provision worth `amount_usd` for `address`.
    pub fn with_liquidity_deposit(mut self, address: &str, amount_usd: &str) -> Self {
        self.deposits
            .entry(address.to_lowercase())
            .or_default()
            .push(LiquidityDeposit {
                amount_usd: parse(amount_usd),
            });
        self
    }

    /// Add a staked LP position for `address`.
    pub fn with_staking_position(
        mut self,
        address: &str,
        amount: &str,
        total_supply: &str,
        reserve_usd: &str,
    ) -> Self {
        self.stakes
            .entry(address.to_lowercase())
            .or_default()
            .push(StakingPosition {
                amount: parse(amount),
                total_supply: parse(total_supply),
                reserve_usd: parse(reserve_usd),
            });
        self
    }

    /// Make every fetch fail with `error`.
    pub fn failing(mut self, error: DataSourceError) -> Self {
        self.failure = Some(error);
        self
    }

    /// `(from_secs, to_secs)` windows requested so far.
    pub fn requested_ranges(&self) -> Vec<(i64, i64)> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn record(&self, from_secs: i64, to_secs: i64) -> Result<(), DataSourceError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((from_secs, to_secs));
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

fn parse(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap_or_default()
}

#[async_trait]
impl DataSource for MockDataSource {
    async fn fetch_liquidity_deposits(
        &self,
        address: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<LiquidityDeposit>, DataSourceError> {
        self.record(from_secs, to_secs)?;
        Ok(self
            .deposits
            .get(&address.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_staking_positions(
        &self,
        address: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<StakingPosition>, DataSourceError> {
        self.record(from_secs, to_secs)?;
        Ok(self
            .stakes
            .get(&address.to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}
