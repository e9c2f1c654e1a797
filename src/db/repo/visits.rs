use super::{parse_address, Repository};
use crate::domain::{Address, TimeMs, Visit};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl Repository {
    /// Credit a visit for `now` unless one was already credited on the same
    /// UTC day.
    ///
    /// The increment is a single conditional upsert, so concurrent same-day
    /// requests cannot double count. Returns the stored record (if any) and
    /// whether this call credited a visit.
    ///
    /// # Errors
    /// Returns an error if the transaction fails.
    pub async fn register_visit(
        &self,
        address: &Address,
        campaign_id: &str,
        now: TimeMs,
    ) -> Result<(Option<Visit>, bool), sqlx::Error> {
        let day_start = now.start_of_day();
        let next_day = day_start.plus_days(1);

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO visits (address, campaign_id, all_visits, last_visit_ms)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT(address, campaign_id) DO UPDATE SET
                all_visits = visits.all_visits + 1,
                last_visit_ms = excluded.last_visit_ms
            WHERE visits.last_visit_ms < ?4 OR visits.last_visit_ms >= ?5
            "#,
        )
        .bind(address.as_str())
        .bind(campaign_id)
        .bind(now.as_ms())
        .bind(day_start.as_ms())
        .bind(next_day.as_ms())
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT address, campaign_id, all_visits, last_visit_ms
            FROM visits
            WHERE address = ? AND campaign_id = ?
            "#,
        )
        .bind(address.as_str())
        .bind(campaign_id)
        .fetch_optional(&mut *tx)
        .await?;

        tx.commit().await?;

        let visit = row.as_ref().map(row_to_visit).transpose()?;
        Ok((visit, result.rows_affected() > 0))
    }

    pub async fn get_visit(
        &self,
        address: &Address,
        campaign_id: &str,
    ) -> Result<Option<Visit>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT address, campaign_id, all_visits, last_visit_ms
            FROM visits
            WHERE address = ? AND campaign_id = ?
            "#,
        )
        .bind(address.as_str())
        .bind(campaign_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_visit).transpose()
    }

    /// Overwrite a visit record as-is. Seeding only; claims go through
    /// `register_visit`.
    pub async fn upsert_visit(&self, visit: &Visit) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO visits (address, campaign_id, all_visits, last_visit_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(address, campaign_id) DO UPDATE SET
                all_visits = excluded.all_visits,
                last_visit_ms = excluded.last_visit_ms
            "#,
        )
        .bind(visit.address.as_str())
        .bind(&visit.campaign_id)
        .bind(visit.all_visits)
        .bind(visit.last_visit.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn row_to_visit(row: &SqliteRow) -> Result<Visit, sqlx::Error> {
    let address: String = row.get("address");
    Ok(Visit {
        address: parse_address(&address)?,
        campaign_id: row.get("campaign_id"),
        all_visits: row.get("all_visits"),
        last_visit: TimeMs::new(row.get("last_visit_ms")),
    })
}
