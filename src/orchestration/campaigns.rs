use crate::db::Repository;
use crate::domain::{Campaign, TimeMs};
use crate::error::ClaimError;
use std::sync::Arc;

/// Resolves the campaign that claims are scoped to.
#[derive(Clone)]
pub struct CampaignResolver {
    repo: Arc<Repository>,
}

impl CampaignResolver {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// The campaign whose window contains `now`.
    ///
    /// If campaigns overlap, the one that started first wins.
    pub async fn find_active_campaign(&self, now: TimeMs) -> Result<Campaign, ClaimError> {
        self.repo
            .find_active_campaign(now)
            .await?
            .ok_or(ClaimError::NoActiveCampaign)
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Campaign, ClaimError> {
        self.repo
            .get_campaign(id)
            .await?
            .ok_or_else(|| ClaimError::DocumentNotFound(format!("campaign {}", id)))
    }
}
