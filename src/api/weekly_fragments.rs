use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::expeditions::AddressQuery;
use super::{parse_address, require_signature, AppState};
use crate::domain::{Address, ClaimResult, TaskType, TimeMs, WeeklyFragment};
use crate::engine::WeekInformation;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct WeeklyClaimRequest {
    pub address: String,
    pub signature: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyFragmentsResponse {
    pub address: Address,
    pub campaign_id: String,
    pub week: WeekInformation,
    pub total_fragments: i64,
    pub fragments: Vec<WeeklyFragmentDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyFragmentDto {
    #[serde(rename = "type")]
    pub task_type: TaskType,
    pub week: u32,
    pub year: i32,
    pub fragments: i64,
}

impl From<WeeklyFragment> for WeeklyFragmentDto {
    fn from(f: WeeklyFragment) -> Self {
        Self {
            task_type: f.task_type,
            week: f.week,
            year: f.year,
            fragments: f.fragments,
        }
    }
}

pub async fn get_weekly_fragments(
    Query(params): Query<AddressQuery>,
    State(state): State<AppState>,
) -> Result<Json<WeeklyFragmentsResponse>, AppError> {
    let address = parse_address(&params.address)?;
    let summary = state
        .orchestrator
        .weekly_fragments(&address, TimeMs::now())
        .await?;

    Ok(Json(WeeklyFragmentsResponse {
        address,
        campaign_id: summary.campaign_id,
        week: summary.current_week,
        total_fragments: summary.total_fragments,
        fragments: summary.fragments.into_iter().map(Into::into).collect(),
    }))
}

pub async fn claim_liquidity_provision(
    State(state): State<AppState>,
    Json(body): Json<WeeklyClaimRequest>,
) -> Result<Json<ClaimResult>, AppError> {
    claim_weekly(state, body, TaskType::LiquidityProvision).await
}

pub async fn claim_liquidity_staking(
    State(state): State<AppState>,
    Json(body): Json<WeeklyClaimRequest>,
) -> Result<Json<ClaimResult>, AppError> {
    claim_weekly(state, body, TaskType::LiquidityStaking).await
}

async fn claim_weekly(
    state: AppState,
    body: WeeklyClaimRequest,
    task_type: TaskType,
) -> Result<Json<ClaimResult>, AppError> {
    let address = parse_address(&body.address)?;
    let signature = require_signature(&body.signature)?;

    let result = state
        .orchestrator
        .claim(&address, signature, task_type, TimeMs::now())
        .await?;
    Ok(Json(result))
}
