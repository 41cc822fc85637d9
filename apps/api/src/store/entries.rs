use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EntryRow, Meals, MonthListingRow};
use crate::store::EntryStore;

/// Postgres-backed entry store. Uniqueness of (owner_id, date) is enforced
/// by the `entries_owner_date_key` constraint; upsert rides on it.
#[derive(Clone)]
pub struct PgEntryStore {
    pool: PgPool,
}

impl PgEntryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn upsert(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
        meals: Meals,
    ) -> Result<EntryRow> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            INSERT INTO entries (id, owner_id, date, raw_text, breakfast, lunch, dinner, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            ON CONFLICT (owner_id, date) DO UPDATE
                SET raw_text = EXCLUDED.raw_text,
                    breakfast = EXCLUDED.breakfast,
                    lunch = EXCLUDED.lunch,
                    dinner = EXCLUDED.dinner,
                    updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(date)
        .bind(raw_text)
        .bind(meals.breakfast)
        .bind(meals.lunch)
        .bind(meals.dinner)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_text(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
    ) -> Result<Option<EntryRow>> {
        Ok(sqlx::query_as::<_, EntryRow>(
            r#"
            UPDATE entries
            SET raw_text = $3, updated_at = NOW()
            WHERE owner_id = $1 AND date = $2
            RETURNING *
            "#,
        )
        .bind(owner_id)
        .bind(date)
        .bind(raw_text)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get(&self, owner_id: Uuid, date: NaiveDate) -> Result<Option<EntryRow>> {
        Ok(sqlx::query_as::<_, EntryRow>(
            "SELECT * FROM entries WHERE owner_id = $1 AND date = $2",
        )
        .bind(owner_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_by_month(
        &self,
        owner_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthListingRow>> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("invalid month {year}-{month:02}"))?;
        // Half-open range: [first of month, first of next month).
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| anyhow!("invalid month {year}-{month:02}"))?;

        Ok(sqlx::query_as::<_, MonthListingRow>(
            r#"
            SELECT e.date, ev.score, ev.went_out_level, e.breakfast, e.lunch, e.dinner
            FROM entries e
            LEFT JOIN evaluations ev ON ev.entry_id = e.id
            WHERE e.owner_id = $1 AND e.date >= $2 AND e.date < $3
            ORDER BY e.date ASC
            "#,
        )
        .bind(owner_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete(&self, owner_id: Uuid, date: NaiveDate) -> Result<bool> {
        let result = sqlx::query("DELETE FROM entries WHERE owner_id = $1 AND date = $2")
            .bind(owner_id)
            .bind(date)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
