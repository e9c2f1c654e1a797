use super::{parse_address, Repository};
use crate::domain::{Address, TaskType, WeeklyFragment};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

impl Repository {
    /// Look up a single (address, campaign, type, week, year) bucket.
    pub async fn get_weekly_fragment(
        &self,
        address: &Address,
        campaign_id: &str,
        task_type: TaskType,
        week: u32,
        year: i32,
    ) -> Result<Option<WeeklyFragment>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT address, campaign_id, type, week, year, fragments
            FROM weekly_fragments
            WHERE address = ? AND campaign_id = ? AND type = ? AND week = ? AND year = ?
            "#,
        )
        .bind(address.as_str())
        .bind(campaign_id)
        .bind(task_type.as_str())
        .bind(week)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_weekly_fragment).transpose()
    }

    /// Insert a weekly fragment bucket idempotently.
    ///
    /// Returns `false` when the bucket already exists; the unique index makes
    /// this the arbiter between concurrent claims.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_weekly_fragment(
        &self,
        fragment: &WeeklyFragment,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO weekly_fragments (
                address, campaign_id, type, week, year, fragments, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(address, campaign_id, type, week, year) DO NOTHING
            "#,
        )
        .bind(fragment.address.as_str())
        .bind(&fragment.campaign_id)
        .bind(fragment.task_type.as_str())
        .bind(fragment.week)
        .bind(fragment.year)
        .bind(fragment.fragments)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All buckets for an address within a campaign, oldest week first.
    pub async fn query_weekly_fragments(
        &self,
        address: &Address,
        campaign_id: &str,
    ) -> Result<Vec<WeeklyFragment>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT address, campaign_id, type, week, year, fragments
            FROM weekly_fragments
            WHERE address = ? AND campaign_id = ?
            ORDER BY year ASC, week ASC, type ASC
            "#,
        )
        .bind(address.as_str())
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_weekly_fragment).collect()
    }

    /// Number of buckets stored for one (address, campaign, type, week, year).
    pub async fn count_weekly_fragments(
        &self,
        address: &Address,
        campaign_id: &str,
        task_type: TaskType,
        week: u32,
        year: i32,
    ) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS n
            FROM weekly_fragments
            WHERE address = ? AND campaign_id = ? AND type = ? AND week = ? AND year = ?
            "#,
        )
        .bind(address.as_str())
        .bind(campaign_id)
        .bind(task_type.as_str())
        .bind(week)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("n"))
    }
}

fn row_to_weekly_fragment(row: &SqliteRow) -> Result<WeeklyFragment, sqlx::Error> {
    let address: String = row.get("address");
    let task_type: String = row.get("type");
    Ok(WeeklyFragment {
        address: parse_address(&address)?,
        campaign_id: row.get("campaign_id"),
        task_type: TaskType::from_str(&task_type).map_err(|e| sqlx::Error::Decode(e.into()))?,
        week: row.get("week"),
        year: row.get("year"),
        fragments: row.get("fragments"),
    })
}
