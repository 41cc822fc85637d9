//! In-memory doubles shared by the orchestrator and handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::evaluator::Evaluator;
use crate::models::{EntryRow, EvaluationPayload, EvaluationRow, Meals, MonthListingRow};
use crate::store::{EntryStore, EvaluationStore};

/// In-memory store backing both traits. Entry and evaluation maps share the
/// struct so upsert_replace can observe entry existence, the same way the
/// foreign key does in Postgres.
#[derive(Default)]
pub(crate) struct MemStore {
    entries: Mutex<HashMap<(Uuid, NaiveDate), EntryRow>>,
    evaluations: Mutex<HashMap<Uuid, EvaluationRow>>,
}

impl MemStore {
    fn entry_exists(&self, entry_id: Uuid) -> bool {
        self.entries
            .lock()
            .unwrap()
            .values()
            .any(|e| e.id == entry_id)
    }

    pub(crate) fn evaluation_count(&self) -> usize {
        self.evaluations.lock().unwrap().len()
    }
}

#[async_trait]
impl EntryStore for MemStore {
    async fn upsert(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
        meals: Meals,
    ) -> Result<EntryRow> {
        let mut entries = self.entries.lock().unwrap();
        // Replacing keeps the row identity, as ON CONFLICT DO UPDATE does.
        let id = entries
            .get(&(owner_id, date))
            .map(|e| e.id)
            .unwrap_or_else(Uuid::new_v4);
        let row = EntryRow {
            id,
            owner_id,
            date,
            raw_text: raw_text.to_string(),
            breakfast: meals.breakfast,
            lunch: meals.lunch,
            dinner: meals.dinner,
            updated_at: Utc::now(),
        };
        entries.insert((owner_id, date), row.clone());
        Ok(row)
    }

    async fn update_text(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
    ) -> Result<Option<EntryRow>> {
        let mut entries = self.entries.lock().unwrap();
        Ok(entries.get_mut(&(owner_id, date)).map(|e| {
            e.raw_text = raw_text.to_string();
            e.updated_at = Utc::now();
            e.clone()
        }))
    }

    async fn get(&self, owner_id: Uuid, date: NaiveDate) -> Result<Option<EntryRow>> {
        Ok(self.entries.lock().unwrap().get(&(owner_id, date)).cloned())
    }

    async fn list_by_month(
        &self,
        owner_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthListingRow>> {
        let entries = self.entries.lock().unwrap();
        let evaluations = self.evaluations.lock().unwrap();
        let mut rows: Vec<MonthListingRow> = entries
            .values()
            .filter(|e| {
                e.owner_id == owner_id
                    && e.date.format("%Y-%m").to_string() == format!("{year:04}-{month:02}")
            })
            .map(|e| {
                let ev = evaluations.get(&e.id);
                MonthListingRow {
                    date: e.date,
                    score: ev.map(|v| v.score),
                    went_out_level: ev.map(|v| v.went_out_level),
                    breakfast: e.breakfast,
                    lunch: e.lunch,
                    dinner: e.dinner,
                }
            })
            .collect();
        rows.sort_by_key(|r| r.date);
        Ok(rows)
    }

    async fn delete(&self, owner_id: Uuid, date: NaiveDate) -> Result<bool> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .remove(&(owner_id, date))
            .is_some())
    }
}

#[async_trait]
impl EvaluationStore for MemStore {
    async fn upsert_replace(
        &self,
        entry_id: Uuid,
        payload: &EvaluationPayload,
        model: &str,
        prompt_version: i32,
    ) -> Result<Option<EvaluationRow>> {
        if !self.entry_exists(entry_id) {
            return Ok(None);
        }
        let row = EvaluationRow {
            id: Uuid::new_v4(),
            entry_id,
            summary: payload.summary.clone(),
            score: payload.score,
            tags: payload.tags.clone(),
            places: payload.places.clone(),
            went_out_level: payload.went_out_level,
            model: model.to_string(),
            prompt_version,
            created_at: Utc::now(),
        };
        self.evaluations.lock().unwrap().insert(entry_id, row.clone());
        Ok(Some(row))
    }

    async fn get_by_entry(&self, entry_id: Uuid) -> Result<Option<EvaluationRow>> {
        Ok(self.evaluations.lock().unwrap().get(&entry_id).cloned())
    }

    async fn delete_by_entry(&self, entry_id: Uuid) -> Result<()> {
        self.evaluations.lock().unwrap().remove(&entry_id);
        Ok(())
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<EvaluationRow>> {
        let entries = self.entries.lock().unwrap();
        let evaluations = self.evaluations.lock().unwrap();
        Ok(evaluations
            .values()
            .filter(|ev| {
                entries
                    .values()
                    .any(|e| e.id == ev.entry_id && e.owner_id == owner_id)
            })
            .cloned()
            .collect())
    }
}

/// Deterministic evaluator: summary echoes the input text, so tests can
/// tell which save produced the settled evaluation.
pub(crate) struct EchoEvaluator;

#[async_trait]
impl Evaluator for EchoEvaluator {
    async fn evaluate(&self, raw_text: &str, _meals: Meals) -> EvaluationPayload {
        EvaluationPayload {
            summary: format!("echo:{raw_text}"),
            score: (raw_text.chars().count() % 10 + 1) as i16,
            tags: vec!["test".to_string()],
            places: vec![],
            went_out_level: 1,
        }
    }

    fn model(&self) -> &str {
        "echo-model"
    }
}
