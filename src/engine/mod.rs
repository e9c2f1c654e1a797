//! Pure computation for week bucketing and fragment awards.

pub mod fragments;
pub mod week;

pub use fragments::{apply_streak, base_fragments, total_provision_usd, total_staking_usd};
pub use week::{week_information, WeekInformation};
