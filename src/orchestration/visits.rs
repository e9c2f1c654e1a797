use crate::db::Repository;
use crate::domain::{Address, TimeMs, Visit, VisitSummary};
use crate::error::ClaimError;
use std::sync::Arc;
use tracing::{debug, info};

/// Per-address daily visit counters, one credited visit per UTC day.
#[derive(Clone)]
pub struct VisitTracker {
    repo: Arc<Repository>,
}

impl VisitTracker {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Credit today's visit. Repeated calls on the same UTC day return the
    /// record unchanged.
    pub async fn register_visit(
        &self,
        address: &Address,
        campaign_id: &str,
        now: TimeMs,
    ) -> Result<Visit, ClaimError> {
        let (visit, credited) = self.repo.register_visit(address, campaign_id, now).await?;
        let visit = visit.ok_or_else(|| {
            ClaimError::DocumentNotFound(format!("visit for {} in {}", address, campaign_id))
        })?;

        if credited {
            info!(
                address = %address,
                campaign_id = %campaign_id,
                all_visits = visit.all_visits,
                "Visit registered"
            );
        } else {
            debug!(address = %address, campaign_id = %campaign_id, "Visit already registered today");
        }

        Ok(visit)
    }

    /// Visit state, defaulting to zeros for unknown addresses.
    pub async fn get_visits(
        &self,
        address: &Address,
        campaign_id: &str,
    ) -> Result<VisitSummary, ClaimError> {
        Ok(self
            .repo
            .get_visit(address, campaign_id)
            .await?
            .map(VisitSummary::from)
            .unwrap_or_else(|| VisitSummary::empty(address.clone())))
    }
}
