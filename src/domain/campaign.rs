use serde::Serialize;

use super::{Address, TimeMs};

/// A time-boxed rewards programme. Claims are always scoped to one campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    #[serde(rename = "startDate")]
    pub start_ms: TimeMs,
    #[serde(rename = "endDate")]
    pub end_ms: TimeMs,
    #[serde(rename = "redeemEndDate")]
    pub redeem_end_ms: TimeMs,
    pub initiator_address: Address,
}

impl Campaign {
    /// Create a campaign with a fresh UUID v4 id.
    pub fn new(
        start_ms: TimeMs,
        end_ms: TimeMs,
        redeem_end_ms: TimeMs,
        initiator_address: Address,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            start_ms,
            end_ms,
            redeem_end_ms,
            initiator_address,
        }
    }

    /// Both ends inclusive.
    pub fn is_active_at(&self, now: TimeMs) -> bool {
        self.start_ms <= now && now <= self.end_ms
    }
}
