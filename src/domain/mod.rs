//! Domain types for the expeditions rewards programme.
//!
//! This module provides:
//! - Primitives: TimeMs, checksummed Address
//! - Lossless USD values via the Decimal wrapper
//! - Campaign, Visit and WeeklyFragment records
//! - Subgraph position shapes used by liquidity claims

pub mod campaign;
pub mod decimal;
pub mod fragment;
pub mod position;
pub mod primitives;
pub mod visit;

pub use campaign::Campaign;
pub use decimal::Decimal;
pub use fragment::{ClaimResult, TaskType, WeeklyFragment};
pub use position::{LiquidityDeposit, StakingPosition};
pub use primitives::{Address, AddressParseError, TimeMs};
pub use visit::{Visit, VisitSummary};
