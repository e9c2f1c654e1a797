use crate::datasource::DataSource;
use crate::db::Repository;
use crate::domain::{
    Address, Campaign, ClaimResult, Decimal, TaskType, TimeMs, VisitSummary, WeeklyFragment,
};
use crate::engine::{self, WeekInformation};
use crate::error::ClaimError;
use crate::orchestration::{CampaignResolver, FragmentClaimEngine, VisitTracker};
use crate::signature::verify_signature;
use std::sync::Arc;
use tracing::warn;

/// Weekly fragment history for an address in the active campaign.
#[derive(Debug, Clone)]
pub struct FragmentSummary {
    pub campaign_id: String,
    pub current_week: WeekInformation,
    pub total_fragments: i64,
    pub fragments: Vec<WeeklyFragment>,
}

/// Signed request flow: verify signer, resolve campaign, then act.
#[derive(Clone)]
pub struct Orchestrator {
    repo: Arc<Repository>,
    campaigns: CampaignResolver,
    visits: VisitTracker,
    claims: FragmentClaimEngine,
}

impl Orchestrator {
    pub fn new(
        repo: Arc<Repository>,
        datasource: Arc<dyn DataSource>,
        min_claimable_usd: Decimal,
    ) -> Self {
        Self {
            campaigns: CampaignResolver::new(repo.clone()),
            visits: VisitTracker::new(repo.clone()),
            claims: FragmentClaimEngine::new(repo.clone(), datasource, min_claimable_usd),
            repo,
        }
    }

    /// Register today's visit for a signed daily-visit request.
    pub async fn daily_visit(
        &self,
        address: &Address,
        signature: &str,
        now: TimeMs,
    ) -> Result<VisitSummary, ClaimError> {
        let signer = authenticate(address, signature, TaskType::Visit)?;
        let campaign = self.campaigns.find_active_campaign(now).await?;
        let visit = self.visits.register_visit(&signer, &campaign.id, now).await?;
        Ok(visit.into())
    }

    /// Claim any task type for a signed request.
    pub async fn claim(
        &self,
        address: &Address,
        signature: &str,
        task_type: TaskType,
        now: TimeMs,
    ) -> Result<ClaimResult, ClaimError> {
        let signer = authenticate(address, signature, task_type)?;
        let campaign = self.campaigns.find_active_campaign(now).await?;
        self.claims
            .claim(&signer, &campaign.id, task_type, now)
            .await
    }

    pub async fn visits(&self, address: &Address, now: TimeMs) -> Result<VisitSummary, ClaimError> {
        let campaign = self.campaigns.find_active_campaign(now).await?;
        self.visits.get_visits(address, &campaign.id).await
    }

    pub async fn active_campaign(&self, now: TimeMs) -> Result<Campaign, ClaimError> {
        self.campaigns.find_active_campaign(now).await
    }

    pub async fn weekly_fragments(
        &self,
        address: &Address,
        now: TimeMs,
    ) -> Result<FragmentSummary, ClaimError> {
        let campaign = self.campaigns.find_active_campaign(now).await?;
        let fragments = self
            .repo
            .query_weekly_fragments(address, &campaign.id)
            .await?;
        let total_fragments = fragments.iter().map(|f| f.fragments).sum();

        Ok(FragmentSummary {
            campaign_id: campaign.id,
            current_week: engine::week_information(now),
            total_fragments,
            fragments,
        })
    }
}

fn authenticate(
    address: &Address,
    signature: &str,
    task_type: TaskType,
) -> Result<Address, ClaimError> {
    verify_signature(task_type.claim_message(), signature, Some(address)).map_err(|e| {
        warn!(address = %address, task_type = %task_type, error = %e, "Signature rejected");
        ClaimError::InvalidSignature
    })
}
