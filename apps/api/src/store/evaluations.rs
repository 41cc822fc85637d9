use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::models::{EvaluationPayload, EvaluationRow};
use crate::store::EvaluationStore;

/// Postgres foreign-key violation, raised when a late evaluation targets an
/// entry that was deleted while the LLM call was in flight.
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";

/// Postgres-backed evaluation store. The UNIQUE constraint on entry_id makes
/// `INSERT ... ON CONFLICT (entry_id) DO UPDATE` the atomic replace-supersede
/// primitive: no reader window ever shows two evaluations for one entry.
#[derive(Clone)]
pub struct PgEvaluationStore {
    pool: PgPool,
}

impl PgEvaluationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EvaluationStore for PgEvaluationStore {
    async fn upsert_replace(
        &self,
        entry_id: Uuid,
        payload: &EvaluationPayload,
        model: &str,
        prompt_version: i32,
    ) -> Result<Option<EvaluationRow>> {
        let result = sqlx::query_as::<_, EvaluationRow>(
            r#"
            INSERT INTO evaluations
                (id, entry_id, summary, score, tags, places, went_out_level,
                 model, prompt_version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            ON CONFLICT (entry_id) DO UPDATE
                SET summary = EXCLUDED.summary,
                    score = EXCLUDED.score,
                    tags = EXCLUDED.tags,
                    places = EXCLUDED.places,
                    went_out_level = EXCLUDED.went_out_level,
                    model = EXCLUDED.model,
                    prompt_version = EXCLUDED.prompt_version,
                    created_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(entry_id)
        .bind(&payload.summary)
        .bind(payload.score)
        .bind(&payload.tags)
        .bind(&payload.places)
        .bind(payload.went_out_level)
        .bind(model)
        .bind(prompt_version)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(Some(row)),
            // The owning entry vanished mid-flight: lost update, discarded.
            Err(sqlx::Error::Database(ref db)) if db.code().as_deref() == Some(PG_FOREIGN_KEY_VIOLATION) => {
                debug!("evaluation for entry {entry_id} discarded: entry no longer exists");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_entry(&self, entry_id: Uuid) -> Result<Option<EvaluationRow>> {
        Ok(
            sqlx::query_as::<_, EvaluationRow>("SELECT * FROM evaluations WHERE entry_id = $1")
                .bind(entry_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_by_entry(&self, entry_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM evaluations WHERE entry_id = $1")
            .bind(entry_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<EvaluationRow>> {
        Ok(sqlx::query_as::<_, EvaluationRow>(
            r#"
            SELECT ev.*
            FROM evaluations ev
            JOIN entries e ON e.id = ev.entry_id
            WHERE e.owner_id = $1
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
