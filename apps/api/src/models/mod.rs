pub mod entry;
pub mod evaluation;

pub use entry::{EntryRow, Meals, MonthListingRow};
pub use evaluation::{EvaluationPayload, EvaluationRow};
