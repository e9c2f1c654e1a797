pub mod expeditions;
pub mod health;
pub mod weekly_fragments;

use crate::db::Repository;
use crate::domain::Address;
use crate::error::AppError;
use crate::orchestration::Orchestrator;
use axum::{
    routing::{get, post},
    Router,
};
use std::str::FromStr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, orchestrator: Arc<Orchestrator>) -> Self {
        Self { repo, orchestrator }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/expeditions", get(expeditions::get_visits))
        .route("/expeditions/campaign", get(expeditions::get_campaign))
        .route("/expeditions/daily-visit", post(expeditions::daily_visit))
        .route("/expeditions/claim", post(expeditions::claim))
        .route(
            "/expeditions/weekly-fragments",
            get(weekly_fragments::get_weekly_fragments),
        )
        .route(
            "/expeditions/weekly-fragments/claim-liquidity-provision",
            post(weekly_fragments::claim_liquidity_provision),
        )
        .route(
            "/expeditions/weekly-fragments/claim-liquidity-staking",
            post(weekly_fragments::claim_liquidity_staking),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub(crate) fn parse_address(input: &str) -> Result<Address, AppError> {
    Address::from_str(input.trim()).map_err(|_| AppError::BadRequest("Invalid address".into()))
}

pub(crate) fn require_signature(signature: &str) -> Result<&str, AppError> {
    let signature = signature.trim();
    if signature.is_empty() {
        return Err(AppError::BadRequest("Missing signature".into()));
    }
    Ok(signature)
}
