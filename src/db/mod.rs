//! SQLite persistence for campaigns, visits and weekly fragments.
//!
//! This module provides:
//! - Database initialization and schema migration
//! - SQLite pragma configuration
//! - Repository layer for database operations

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::Repository;
