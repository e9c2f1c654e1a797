//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by record:
//! - `visits.rs` - Daily visit counters
//! - `fragments.rs` - Weekly fragment buckets

mod fragments;
mod visits;

use crate::domain::{Address, Campaign, TimeMs};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Round-trip a trivial query to confirm the pool is usable.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Campaign operations
    // =========================================================================

    /// Insert a campaign. Used for seeding; there is no admin surface.
    ///
    /// # Errors
    /// Returns an error if the insert fails (including a duplicate id).
    pub async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO campaigns (id, start_ms, end_ms, redeem_end_ms, initiator_address)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&campaign.id)
        .bind(campaign.start_ms.as_ms())
        .bind(campaign.end_ms.as_ms())
        .bind(campaign.redeem_end_ms.as_ms())
        .bind(campaign.initiator_address.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, start_ms, end_ms, redeem_end_ms, initiator_address
            FROM campaigns
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_campaign).transpose()
    }

    /// Campaign whose `[start, end]` window contains `now`.
    ///
    /// Overlapping campaigns resolve to the earliest start, then lowest id.
    pub async fn find_active_campaign(&self, now: TimeMs) -> Result<Option<Campaign>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, start_ms, end_ms, redeem_end_ms, initiator_address
            FROM campaigns
            WHERE start_ms <= ? AND end_ms >= ?
            ORDER BY start_ms ASC, id ASC
            LIMIT 1
            "#,
        )
        .bind(now.as_ms())
        .bind(now.as_ms())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_campaign).transpose()
    }
}

fn row_to_campaign(row: &SqliteRow) -> Result<Campaign, sqlx::Error> {
    let initiator: String = row.get("initiator_address");
    Ok(Campaign {
        id: row.get("id"),
        start_ms: TimeMs::new(row.get("start_ms")),
        end_ms: TimeMs::new(row.get("end_ms")),
        redeem_end_ms: TimeMs::new(row.get("redeem_end_ms")),
        initiator_address: parse_address(&initiator)?,
    })
}

pub(super) fn parse_address(raw: &str) -> Result<Address, sqlx::Error> {
    Address::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::db::init_db;
    use tempfile::TempDir;

    pub const ALICE: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    pub async fn temp_repo() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    pub fn campaign(start_ms: i64, end_ms: i64) -> Campaign {
        Campaign::new(
            TimeMs::new(start_ms),
            TimeMs::new(end_ms),
            TimeMs::new(end_ms.saturating_add(1_000)),
            Address::from_str(ALICE).unwrap(),
        )
    }
}
