use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// The three daily meal checkboxes. Each flag is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meals {
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}

/// One journal entry: unique per (owner_id, date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EntryRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub date: NaiveDate,
    pub raw_text: String,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
    pub updated_at: DateTime<Utc>,
}

impl EntryRow {
    pub fn meals(&self) -> Meals {
        Meals {
            breakfast: self.breakfast,
            lunch: self.lunch,
            dinner: self.dinner,
        }
    }
}

/// Month listing projection: entry meals joined with the evaluation's score
/// and outing level, both null while the entry is unevaluated.
#[derive(Debug, Clone, FromRow)]
pub struct MonthListingRow {
    pub date: NaiveDate,
    pub score: Option<i16>,
    pub went_out_level: Option<i16>,
    pub breakfast: bool,
    pub lunch: bool,
    pub dinner: bool,
}
