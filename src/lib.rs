pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod signature;

pub use config::Config;
pub use datasource::{DataSource, DataSourceError, MockDataSource, SubgraphDataSource};
pub use db::{init_db, Repository};
pub use domain::{Address, Campaign, ClaimResult, Decimal, TaskType, TimeMs, WeeklyFragment};
pub use error::{AppError, ClaimError};
pub use orchestration::Orchestrator;
