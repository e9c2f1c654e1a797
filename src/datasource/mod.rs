//! Data source abstraction for reading a wallet's liquidity positions.

use crate::domain::{LiquidityDeposit, StakingPosition};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod subgraph;

pub use mock::MockDataSource;
pub use subgraph::SubgraphDataSource;

/// Reader for on-chain liquidity activity.
///
/// Implementations must apply their own timeout and retry policy. Every call
/// fetches fresh data; nothing is cached between claims.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    /// Liquidity provisions made by `address` in `[from_secs, to_secs)`.
    async fn fetch_liquidity_deposits(
        &self,
        address: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<LiquidityDeposit>, DataSourceError>;

    /// LP stakes made by `address` in `[from_secs, to_secs)`.
    async fn fetch_staking_positions(
        &self,
        address: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<StakingPosition>, DataSourceError>;
}

/// Error type for data source operations.
#[derive(Debug, Clone)]
pub enum DataSourceError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Parsing error (invalid JSON or malformed response)
    ParseError(String),
    /// The GraphQL endpoint answered with an `errors` array
    QueryError(String),
    /// Rate limit exceeded
    RateLimited,
}

impl fmt::Display for DataSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            DataSourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            DataSourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            DataSourceError::QueryError(msg) => write!(f, "Query error: {}", msg),
            DataSourceError::RateLimited => write!(f, "Rate limited"),
        }
    }
}

impl std::error::Error for DataSourceError {}
