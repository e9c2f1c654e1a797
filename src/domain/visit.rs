use serde::Serialize;

use super::{Address, TimeMs};

/// Daily visit counter for one address within one campaign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub address: Address,
    pub campaign_id: String,
    pub all_visits: i64,
    pub last_visit: TimeMs,
}

/// Visit state as exposed to callers. Addresses without a record get zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitSummary {
    pub address: Address,
    pub all_visits: i64,
    pub last_visit: i64,
}

impl VisitSummary {
    pub fn empty(address: Address) -> Self {
        Self {
            address,
            all_visits: 0,
            last_visit: 0,
        }
    }
}

impl From<Visit> for VisitSummary {
    fn from(visit: Visit) -> Self {
        Self {
            address: visit.address,
            all_visits: visit.all_visits,
            last_visit: visit.last_visit.as_ms(),
        }
    }
}
