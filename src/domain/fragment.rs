use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Address;

/// Category of rewardable action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    Visit,
    LiquidityProvision,
    LiquidityStaking,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Visit => "VISIT",
            TaskType::LiquidityProvision => "LIQUIDITY_PROVISION",
            TaskType::LiquidityStaking => "LIQUIDITY_STAKING",
        }
    }

    /// Plaintext the wallet must sign to claim this task.
    pub fn claim_message(&self) -> &'static str {
        match self {
            TaskType::Visit => "Sign this message to claim your daily visit",
            TaskType::LiquidityProvision => {
                "Sign this message to claim your weekly liquidity provision fragments"
            }
            TaskType::LiquidityStaking => {
                "Sign this message to claim your weekly liquidity staking fragments"
            }
        }
    }

    /// Weekly tasks are bucketed into `WeeklyFragment` records.
    pub fn is_weekly(&self) -> bool {
        !matches!(self, TaskType::Visit)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VISIT" => Ok(TaskType::Visit),
            "LIQUIDITY_PROVISION" => Ok(TaskType::LiquidityProvision),
            "LIQUIDITY_STAKING" => Ok(TaskType::LiquidityStaking),
            other => Err(format!("unknown task type: {}", other)),
        }
    }
}

/// Fragments awarded for one (address, campaign, type, week, year) bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyFragment {
    pub address: Address,
    pub campaign_id: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub week: u32,
    pub year: i32,
    pub fragments: i64,
}

/// Outcome of a successful claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResult {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub claimed_fragments: i64,
}
