use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::evaluator::{Evaluator, PROMPT_VERSION};
use crate::models::{EntryRow, EvaluationRow, Meals, MonthListingRow};
use crate::store::{EntryStore, EvaluationStore};

/// Entry lifecycle orchestrator. The only component that mutates both
/// stores in one operation; every flow is split into fast store work on
/// either side of the (slow) evaluator call, so no transaction ever spans
/// the external call.
#[derive(Clone)]
pub struct Journal {
    entries: Arc<dyn EntryStore>,
    evaluations: Arc<dyn EvaluationStore>,
    evaluator: Arc<dyn Evaluator>,
}

impl Journal {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        evaluations: Arc<dyn EvaluationStore>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            entries,
            evaluations,
            evaluator,
        }
    }

    /// Create or fully replace the entry for (owner_id, date), then kick off
    /// evaluation of the new text in the background. Returns as soon as the
    /// entry row is durable; the caller gets "evaluation pending", never the
    /// evaluation itself.
    pub async fn save(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
        meals: Meals,
    ) -> Result<EntryRow> {
        let entry = self.entries.upsert(owner_id, date, raw_text, meals).await?;

        let evaluations = Arc::clone(&self.evaluations);
        let evaluator = Arc::clone(&self.evaluator);
        let entry_id = entry.id;
        let text = raw_text.to_string();
        tokio::spawn(async move {
            evaluate_and_store(&*evaluations, &*evaluator, entry_id, &text, meals).await;
        });

        Ok(entry)
    }

    /// Text-only edit. Meals stay as they are and no evaluation is
    /// triggered: edits are staged until the caller explicitly re-evaluates,
    /// so a string of saves costs at most one model call.
    pub async fn update_text(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
    ) -> Result<Option<EntryRow>> {
        self.entries.update_text(owner_id, date, raw_text).await
    }

    /// Synchronously evaluate the stored text with the entry's current meal
    /// flags and replace any prior evaluation. The caller waits for the
    /// model and receives the final evaluation. Returns None if no entry
    /// exists for the date (including one deleted while the call was in
    /// flight).
    pub async fn re_evaluate(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<EvaluationRow>> {
        let Some(entry) = self.entries.get(owner_id, date).await? else {
            return Ok(None);
        };

        let payload = self.evaluator.evaluate(&entry.raw_text, entry.meals()).await;
        self.evaluations
            .upsert_replace(entry.id, &payload, self.evaluator.model(), PROMPT_VERSION)
            .await
    }

    /// Delete the entry and its evaluation as one logical operation.
    /// The evaluation goes first: if the second step fails we are left with
    /// an entry lacking an evaluation, never a dangling evaluation.
    /// Returns false when no entry exists for the date.
    pub async fn delete(&self, owner_id: Uuid, date: NaiveDate) -> Result<bool> {
        let Some(entry) = self.entries.get(owner_id, date).await? else {
            return Ok(false);
        };

        self.evaluations.delete_by_entry(entry.id).await?;
        self.entries.delete(owner_id, date).await
    }

    /// Entry plus its evaluation (if settled) for one date.
    pub async fn detail(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
    ) -> Result<Option<(EntryRow, Option<EvaluationRow>)>> {
        let Some(entry) = self.entries.get(owner_id, date).await? else {
            return Ok(None);
        };
        let evaluation = self.evaluations.get_by_entry(entry.id).await?;
        Ok(Some((entry, evaluation)))
    }

    pub async fn month(
        &self,
        owner_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthListingRow>> {
        self.entries.list_by_month(owner_id, year, month).await
    }

    pub async fn all_evaluations(&self, owner_id: Uuid) -> Result<Vec<EvaluationRow>> {
        self.evaluations.list_for_owner(owner_id).await
    }
}

/// Body of the fire-and-forget evaluation task. The evaluator itself never
/// fails; a store failure here is logged and swallowed — the entry stays
/// saved without an evaluation and is not retried. A lost update (entry
/// deleted mid-flight) is discarded without resurrecting anything.
async fn evaluate_and_store(
    evaluations: &dyn EvaluationStore,
    evaluator: &dyn Evaluator,
    entry_id: Uuid,
    raw_text: &str,
    meals: Meals,
) {
    let payload = evaluator.evaluate(raw_text, meals).await;

    match evaluations
        .upsert_replace(entry_id, &payload, evaluator.model(), PROMPT_VERSION)
        .await
    {
        Ok(Some(row)) => debug!("evaluation settled for entry {entry_id} (score {})", row.score),
        Ok(None) => debug!("late evaluation for deleted entry {entry_id} discarded"),
        Err(e) => warn!("failed to save evaluation for entry {entry_id}: {e}"),
    }
}
