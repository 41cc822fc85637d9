use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What the Evaluator produces for one entry. Validated before it ever
/// reaches a store: score 1..=10, went_out_level 0..=3, summary 1..=500
/// chars, at most 5 tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationPayload {
    pub summary: String,
    pub score: i16,
    pub tags: Vec<String>,
    pub places: Vec<String>,
    pub went_out_level: i16,
}

impl EvaluationPayload {
    /// Range and length checks mirroring the database CHECK constraints.
    /// A payload that fails this never leaves the evaluator.
    pub fn is_valid(&self) -> bool {
        (1..=10).contains(&self.score)
            && (0..=3).contains(&self.went_out_level)
            && self.tags.len() <= 5
            && !self.summary.is_empty()
            && self.summary.chars().count() <= 500
    }
}

/// A persisted evaluation. At most one row exists per entry_id at any
/// observable point; replacement is atomic at the store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EvaluationRow {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub summary: String,
    pub score: i16,
    pub tags: Vec<String>,
    pub places: Vec<String>,
    pub went_out_level: i16,
    pub model: String,
    pub prompt_version: i32,
    pub created_at: DateTime<Utc>,
}
