use crate::datasource::{DataSource, DataSourceError};
use crate::db::Repository;
use crate::domain::{Address, ClaimResult, Decimal, TaskType, TimeMs, WeeklyFragment};
use crate::engine::{self, WeekInformation};
use crate::error::ClaimError;
use crate::orchestration::visits::VisitTracker;
use std::sync::Arc;
use tracing::{info, warn};

/// Computes and persists fragments, at most once per weekly bucket.
#[derive(Clone)]
pub struct FragmentClaimEngine {
    repo: Arc<Repository>,
    datasource: Arc<dyn DataSource>,
    visits: VisitTracker,
    min_claimable_usd: Decimal,
}

impl FragmentClaimEngine {
    pub fn new(
        repo: Arc<Repository>,
        datasource: Arc<dyn DataSource>,
        min_claimable_usd: Decimal,
    ) -> Self {
        Self {
            visits: VisitTracker::new(repo.clone()),
            repo,
            datasource,
            min_claimable_usd,
        }
    }

    /// Claim `task_type` for `address` in `campaign_id` at instant `now`.
    ///
    /// Visits update the streak counter but award no fragments. Liquidity
    /// tasks are valued over the current ISO week and written once per week.
    pub async fn claim(
        &self,
        address: &Address,
        campaign_id: &str,
        task_type: TaskType,
        now: TimeMs,
    ) -> Result<ClaimResult, ClaimError> {
        if !task_type.is_weekly() {
            self.visits.register_visit(address, campaign_id, now).await?;
            return Ok(ClaimResult {
                task_type,
                claimed_fragments: 0,
            });
        }

        let week = engine::week_information(now);
        let already_claimed = || ClaimError::AlreadyClaimed {
            task_type,
            week_date: week.week_date.clone(),
        };

        if self
            .bucket(address, campaign_id, task_type, &week)
            .await?
            .is_some()
        {
            return Err(already_claimed());
        }

        let total_usd = self.weekly_usd_value(address, task_type, &week).await?;
        let base = engine::base_fragments(total_usd, self.min_claimable_usd).ok_or_else(|| {
            info!(
                address = %address,
                task_type = %task_type,
                total_usd = %total_usd,
                "Weekly value below claim threshold"
            );
            ClaimError::NoClaimableFragments
        })?;

        let last_week = week.previous();
        let two_weeks_ago = last_week.previous();
        let (w1, w2) = futures::try_join!(
            self.bucket(address, campaign_id, task_type, &last_week),
            self.bucket(address, campaign_id, task_type, &two_weeks_ago),
        )?;
        let fragments = engine::apply_streak(base, w1.as_ref(), w2.as_ref());

        let record = WeeklyFragment {
            address: address.clone(),
            campaign_id: campaign_id.to_string(),
            task_type,
            week: week.week_number,
            year: week.year,
            fragments,
        };
        if !self.repo.insert_weekly_fragment(&record).await? {
            warn!(
                address = %address,
                task_type = %task_type,
                week = %week.week_date,
                "Lost concurrent claim for weekly bucket"
            );
            return Err(already_claimed());
        }

        info!(
            address = %address,
            campaign_id = %campaign_id,
            task_type = %task_type,
            week = %week.week_date,
            base,
            fragments,
            "Weekly fragments claimed"
        );

        Ok(ClaimResult {
            task_type,
            claimed_fragments: fragments,
        })
    }

    async fn bucket(
        &self,
        address: &Address,
        campaign_id: &str,
        task_type: TaskType,
        week: &WeekInformation,
    ) -> Result<Option<WeeklyFragment>, sqlx::Error> {
        self.repo
            .get_weekly_fragment(address, campaign_id, task_type, week.week_number, week.year)
            .await
    }

    async fn weekly_usd_value(
        &self,
        address: &Address,
        task_type: TaskType,
        week: &WeekInformation,
    ) -> Result<Decimal, ClaimError> {
        let from = week.start_ms.as_secs();
        let to = week.end_ms.as_secs();

        let total = match task_type {
            TaskType::LiquidityProvision => {
                let deposits = self
                    .datasource
                    .fetch_liquidity_deposits(address.as_str(), from, to)
                    .await?;
                engine::total_provision_usd(&deposits)
            }
            TaskType::LiquidityStaking => {
                let positions = self
                    .datasource
                    .fetch_staking_positions(address.as_str(), from, to)
                    .await?;
                engine::total_staking_usd(&positions)
            }
            TaskType::Visit => Some(Decimal::zero()),
        };

        total.ok_or_else(|| {
            warn!(address = %address, task_type = %task_type, "Reported positions overflow USD total");
            ClaimError::ExternalSourceUnavailable(DataSourceError::ParseError(
                "position values out of range".to_string(),
            ))
        })
    }
}
