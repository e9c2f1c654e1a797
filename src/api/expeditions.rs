use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::{parse_address, require_signature, AppState};
use crate::domain::{Campaign, ClaimResult, TaskType, TimeMs, VisitSummary};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    pub address: String,
}

#[derive(Debug, Deserialize)]
pub struct DailyVisitRequest {
    pub address: String,
    pub signature: String,
}

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub address: String,
    pub signature: String,
    #[serde(rename = "type")]
    pub task_type: TaskType,
}

pub async fn get_visits(
    Query(params): Query<AddressQuery>,
    State(state): State<AppState>,
) -> Result<Json<VisitSummary>, AppError> {
    let address = parse_address(&params.address)?;
    let visits = state.orchestrator.visits(&address, TimeMs::now()).await?;
    Ok(Json(visits))
}

pub async fn daily_visit(
    State(state): State<AppState>,
    Json(body): Json<DailyVisitRequest>,
) -> Result<Json<VisitSummary>, AppError> {
    let address = parse_address(&body.address)?;
    let signature = require_signature(&body.signature)?;

    let visits = state
        .orchestrator
        .daily_visit(&address, signature, TimeMs::now())
        .await?;
    Ok(Json(visits))
}

pub async fn claim(
    State(state): State<AppState>,
    Json(body): Json<ClaimRequest>,
) -> Result<Json<ClaimResult>, AppError> {
    let address = parse_address(&body.address)?;
    let signature = require_signature(&body.signature)?;

    let result = state
        .orchestrator
        .claim(&address, signature, body.task_type, TimeMs::now())
        .await?;
    Ok(Json(result))
}

pub async fn get_campaign(State(state): State<AppState>) -> Result<Json<Campaign>, AppError> {
    let campaign = state.orchestrator.active_campaign(TimeMs::now()).await?;
    Ok(Json(campaign))
}
