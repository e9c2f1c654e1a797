//! Stateful services that combine the repository, the position reader and
//! the pure engine into the claim flow.

pub mod campaigns;
pub mod claim;
pub mod orchestrator;
pub mod visits;

pub use campaigns::CampaignResolver;
pub use claim::FragmentClaimEngine;
pub use orchestrator::Orchestrator;
pub use visits::VisitTracker;
