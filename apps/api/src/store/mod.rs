/// Store collaborator interfaces. The orchestrator is the only component
/// that mutates both stores in one operation; everything else goes through
/// these traits, so tests can swap in in-memory implementations.
pub mod entries;
pub mod evaluations;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{EntryRow, EvaluationPayload, EvaluationRow, Meals, MonthListingRow};

pub use entries::PgEntryStore;
pub use evaluations::PgEvaluationStore;

#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert or fully replace the row keyed by (owner_id, date).
    /// Text and all three meal flags are overwritten; updated_at is bumped.
    async fn upsert(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
        meals: Meals,
    ) -> Result<EntryRow>;

    /// Partial update of raw_text only, meals untouched.
    /// Returns None if no entry exists for the key.
    async fn update_text(
        &self,
        owner_id: Uuid,
        date: NaiveDate,
        raw_text: &str,
    ) -> Result<Option<EntryRow>>;

    async fn get(&self, owner_id: Uuid, date: NaiveDate) -> Result<Option<EntryRow>>;

    /// All entries for one calendar month, ascending by date, each joined
    /// with its evaluation's score and outing level (null if unevaluated).
    /// Days never saved do not appear.
    async fn list_by_month(
        &self,
        owner_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<MonthListingRow>>;

    /// Returns false if no entry existed for the key.
    async fn delete(&self, owner_id: Uuid, date: NaiveDate) -> Result<bool>;
}

#[async_trait]
pub trait EvaluationStore: Send + Sync {
    /// Atomically supersede any existing evaluation for entry_id with a new
    /// one. No reader may ever observe two evaluations for one entry.
    /// Returns None when the entry no longer exists (a late evaluation
    /// racing a delete) — the caller discards the result as a lost update.
    async fn upsert_replace(
        &self,
        entry_id: Uuid,
        payload: &EvaluationPayload,
        model: &str,
        prompt_version: i32,
    ) -> Result<Option<EvaluationRow>>;

    async fn get_by_entry(&self, entry_id: Uuid) -> Result<Option<EvaluationRow>>;

    async fn delete_by_entry(&self, entry_id: Uuid) -> Result<()>;

    /// All evaluations whose owning entry belongs to owner_id. Unordered
    /// cross-month projection for analytics.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<EvaluationRow>>;
}
