use crate::config::Config;
use crate::journal::Journal;

/// Shared application state injected into all route handlers via Axum
/// extractors. The journal carries the store and evaluator handles; nothing
/// else holds mutable state.
#[derive(Clone)]
pub struct AppState {
    pub journal: Journal,
    /// Kept on state for handlers that grow config-driven policy later;
    /// only main reads it today.
    #[allow(dead_code)]
    pub config: Config,
}
