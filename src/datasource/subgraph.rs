//! GraphQL subgraph client implementation.

use super::{DataSource, DataSourceError};
use crate::domain::{Decimal, LiquidityDeposit, StakingPosition};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Rows requested per page. The Graph caps `first` at 1000.
const PAGE_SIZE: usize = 1000;

const LIQUIDITY_DEPOSITS_QUERY: &str = r#"
query getLiquidityPositionDepositsBetweenTimestampAAndTimestampB($address: Bytes!, $from: BigInt!, $to: BigInt!, $first: Int!, $lastId: ID!) {
  mints(first: $first, orderBy: id, orderDirection: asc, where: { to: $address, timestamp_gte: $from, timestamp_lt: $to, id_gt: $lastId }) {
    id
    amountUSD
  }
}
"#;

const STAKING_POSITIONS_QUERY: &str = r#"
query getLiquidityStakingPositionBetweenTimestampAAndTimestampB($address: Bytes!, $from: BigInt!, $to: BigInt!, $first: Int!, $lastId: ID!) {
  liquidityMiningCampaignDeposits(first: $first, orderBy: id, orderDirection: asc, where: { user: $address, timestamp_gte: $from, timestamp_lt: $to, id_gt: $lastId }) {
    id
    amount
    liquidityMiningCampaign {
      stakablePair {
        totalSupply
        reserveUSD
      }
    }
  }
}
"#;

/// Data source backed by a The Graph compatible GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct SubgraphDataSource {
    client: Client,
    url: String,
    max_elapsed: Duration,
}

impl SubgraphDataSource {
    /// Create a client whose individual requests give up after `timeout` and
    /// whose retries stop after `max_elapsed`.
    pub fn new(
        url: String,
        timeout: Duration,
        max_elapsed: Duration,
    ) -> Result<Self, DataSourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DataSourceError::NetworkError(e.to_string()))?;
        Ok(Self {
            client,
            url,
            max_elapsed,
        })
    }

    async fn post_query(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, DataSourceError> {
        let payload = serde_json::json!({
            "query": query,
            "variables": variables,
        });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        };

        let body = retry(backoff, || async {
            let response = self
                .client
                .post(&self.url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(DataSourceError::NetworkError(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 {
                return Err(backoff::Error::transient(DataSourceError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(DataSourceError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(DataSourceError::ParseError(e.to_string())))
        })
        .await?;

        extract_data(body)
    }

    /// Walk every page of `field` using an `id_gt` cursor.
    ///
    /// A single malformed row fails the whole fetch.
    async fn fetch_all<T>(
        &self,
        query: &str,
        field: &str,
        address: &str,
        from_secs: i64,
        to_secs: i64,
        parse: fn(&serde_json::Value) -> Result<T, DataSourceError>,
    ) -> Result<Vec<T>, DataSourceError> {
        let mut items = Vec::new();
        let mut last_id = String::new();
        let mut pages = 0usize;

        loop {
            let data = self
                .post_query(query, query_variables(address, from_secs, to_secs, &last_id))
                .await?;
            pages += 1;

            let rows = data
                .get(field)
                .and_then(|v| v.as_array())
                .ok_or_else(|| DataSourceError::ParseError(format!("Missing {} array", field)))?;

            for row in rows {
                items.push(parse(row)?);
            }

            match rows.last() {
                Some(last) if rows.len() >= PAGE_SIZE => last_id = row_id(last)?,
                _ => break,
            }
        }

        debug!(field, pages, rows = items.len(), "Subgraph fetch complete");
        Ok(items)
    }
}

#[async_trait]
impl DataSource for SubgraphDataSource {
    async fn fetch_liquidity_deposits(
        &self,
        address: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<LiquidityDeposit>, DataSourceError> {
        debug!(address, from_secs, to_secs, "Fetching liquidity deposits");
        self.fetch_all(
            LIQUIDITY_DEPOSITS_QUERY,
            "mints",
            address,
            from_secs,
            to_secs,
            parse_liquidity_deposit,
        )
        .await
    }

    async fn fetch_staking_positions(
        &self,
        address: &str,
        from_secs: i64,
        to_secs: i64,
    ) -> Result<Vec<StakingPosition>, DataSourceError> {
        debug!(address, from_secs, to_secs, "Fetching staking positions");
        self.fetch_all(
            STAKING_POSITIONS_QUERY,
            "liquidityMiningCampaignDeposits",
            address,
            from_secs,
            to_secs,
            parse_staking_position,
        )
        .await
    }
}

// Subgraph `Bytes` filters compare against lowercase hex.
fn query_variables(
    address: &str,
    from_secs: i64,
    to_secs: i64,
    last_id: &str,
) -> serde_json::Value {
    serde_json::json!({
        "address": address.to_lowercase(),
        "from": from_secs.to_string(),
        "to": to_secs.to_string(),
        "first": PAGE_SIZE,
        "lastId": last_id,
    })
}

fn row_id(row: &serde_json::Value) -> Result<String, DataSourceError> {
    row.get("id")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| DataSourceError::ParseError("Missing id field".to_string()))
}

fn extract_data(body: serde_json::Value) -> Result<serde_json::Value, DataSourceError> {
    if let Some(errors) = body.get("errors").and_then(|v| v.as_array()) {
        if !errors.is_empty() {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                .collect();
            return Err(DataSourceError::QueryError(messages.join("; ")));
        }
    }

    body.get("data")
        .filter(|d| !d.is_null())
        .cloned()
        .ok_or_else(|| DataSourceError::ParseError("Missing data field".to_string()))
}

fn decimal_field(json: &serde_json::Value, field: &str) -> Result<Decimal, DataSourceError> {
    let raw = json
        .get(field)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DataSourceError::ParseError(format!("Missing {} field", field)))?;
    Decimal::from_str_canonical(raw)
        .map_err(|e| DataSourceError::ParseError(format!("Invalid {}: {}", field, e)))
}

fn parse_liquidity_deposit(json: &serde_json::Value) -> Result<LiquidityDeposit, DataSourceError> {
    Ok(LiquidityDeposit {
        amount_usd: decimal_field(json, "amountUSD")?,
    })
}

fn parse_staking_position(json: &serde_json::Value) -> Result<StakingPosition, DataSourceError> {
    let pair = json
        .get("liquidityMiningCampaign")
        .and_then(|c| c.get("stakablePair"))
        .ok_or_else(|| {
            DataSourceError::ParseError("Missing liquidityMiningCampaign.stakablePair".to_string())
        })?;

    Ok(StakingPosition {
        amount: decimal_field(json, "amount")?,
        total_supply: decimal_field(pair, "totalSupply")?,
        reserve_usd: decimal_field(pair, "reserveUSD")?,
    })
}
