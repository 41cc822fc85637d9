pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::journal::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/entries",
            post(handlers::handle_save_entry).get(handlers::handle_month_listing),
        )
        // Static segment; wins over the :date capture below.
        .route(
            "/entries/evaluations",
            get(handlers::handle_list_evaluations),
        )
        .route(
            "/entries/:date",
            get(handlers::handle_date_detail)
                .put(handlers::handle_update_text)
                .delete(handlers::handle_delete_entry),
        )
        .route(
            "/entries/:date/re-evaluate",
            post(handlers::handle_re_evaluate),
        )
        .with_state(state)
}
