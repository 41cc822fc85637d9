use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

// Crate-local Json: same extractor/response as axum's, but body rejections
// come back as 400 instead of 422/415.
use crate::errors::{AppError, Json};
use crate::models::{EvaluationRow, Meals};
use crate::state::AppState;

/// Storage-boundary cap on entry text. UI layers may impose tighter limits;
/// this one is the contract.
const MAX_TEXT_CHARS: usize = 2000;

/// Owner identity arrives as an opaque `x-user-id` header. A missing header
/// maps to the nil UUID here at the boundary only — the orchestrator and
/// stores always receive an explicit owner.
fn owner_from_headers(headers: &HeaderMap) -> Result<Uuid, AppError> {
    match headers.get("x-user-id") {
        None => Ok(Uuid::nil()),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| AppError::Validation("x-user-id must be a UUID".to_string())),
    }
}

/// Strict YYYY-MM-DD parse. Length-checked first so chrono's lenient
/// numeric parsing cannot admit un-padded dates.
fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    if s.len() == 10 {
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(date);
        }
    }
    Err(AppError::Validation(
        "Invalid date format. Use YYYY-MM-DD".to_string(),
    ))
}

/// Strict YYYY-MM parse; month must be 01..=12.
fn parse_month(s: &str) -> Result<(i32, u32), AppError> {
    let invalid = || AppError::Validation("Invalid month format. Use YYYY-MM".to_string());

    let (year, month) = s.split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn validate_text(raw_text: &str) -> Result<(), AppError> {
    if raw_text.chars().count() > MAX_TEXT_CHARS {
        return Err(AppError::Validation(format!(
            "raw_text must be at most {MAX_TEXT_CHARS} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SaveEntryRequest {
    pub date: String,
    pub raw_text: String,
    pub meals: Meals,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTextRequest {
    pub raw_text: String,
}

#[derive(Serialize)]
pub struct MonthEntryResponse {
    pub date: NaiveDate,
    pub score: Option<i16>,
    pub went_out_level: Option<i16>,
    pub meals: Meals,
}

#[derive(Serialize)]
pub struct EntryBody {
    pub date: NaiveDate,
    pub raw_text: String,
    pub meals: Meals,
}

#[derive(Serialize)]
pub struct EvaluationBody {
    pub summary: String,
    pub score: i16,
    pub tags: Vec<String>,
    pub places: Vec<String>,
    pub went_out_level: i16,
}

impl From<EvaluationRow> for EvaluationBody {
    fn from(row: EvaluationRow) -> Self {
        EvaluationBody {
            summary: row.summary,
            score: row.score,
            tags: row.tags,
            places: row.places,
            went_out_level: row.went_out_level,
        }
    }
}

#[derive(Serialize)]
pub struct DetailResponse {
    pub entry: EntryBody,
    pub evaluation: Option<EvaluationBody>,
}

/// POST /entries — upsert the day's entry; evaluation runs in the
/// background, so the response is 202 with a pending marker.
pub async fn handle_save_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SaveEntryRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let date = parse_date(&req.date)?;
    validate_text(&req.raw_text)?;

    state
        .journal
        .save(owner_id, date, &req.raw_text, req.meals)
        .await
        .map_err(AppError::Internal)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "message": "Entry saved, evaluation pending",
            "evaluation_status": "pending"
        })),
    ))
}

/// GET /entries?month=YYYY-MM — score-and-outing projection for a month,
/// ascending; days never saved are simply absent.
pub async fn handle_month_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<MonthQuery>,
) -> Result<Json<Vec<MonthEntryResponse>>, AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let (year, month) = parse_month(&params.month)?;

    let rows = state
        .journal
        .month(owner_id, year, month)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(
        rows.into_iter()
            .map(|r| MonthEntryResponse {
                date: r.date,
                score: r.score,
                went_out_level: r.went_out_level,
                meals: Meals {
                    breakfast: r.breakfast,
                    lunch: r.lunch,
                    dinner: r.dinner,
                },
            })
            .collect(),
    ))
}

/// GET /entries/evaluations — every evaluation owned by the caller,
/// unordered, for cross-month analytics.
pub async fn handle_list_evaluations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<EvaluationRow>>, AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let evaluations = state
        .journal
        .all_evaluations(owner_id)
        .await
        .map_err(AppError::Internal)?;
    Ok(Json(evaluations))
}

/// GET /entries/:date — entry plus evaluation (null until settled).
pub async fn handle_date_detail(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<DetailResponse>, AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let date = parse_date(&date)?;

    let (entry, evaluation) = state
        .journal
        .detail(owner_id, date)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

    Ok(Json(DetailResponse {
        entry: EntryBody {
            date: entry.date,
            raw_text: entry.raw_text.clone(),
            meals: entry.meals(),
        },
        evaluation: evaluation.map(EvaluationBody::from),
    }))
}

/// PUT /entries/:date — text-only edit; meals untouched, no evaluation
/// triggered.
pub async fn handle_update_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
    Json(req): Json<UpdateTextRequest>,
) -> Result<Json<Value>, AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let date = parse_date(&date)?;
    validate_text(&req.raw_text)?;

    state
        .journal
        .update_text(owner_id, date, &req.raw_text)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

    Ok(Json(json!({ "message": "Entry text updated" })))
}

/// POST /entries/:date/re-evaluate — the one path that waits on the model.
pub async fn handle_re_evaluate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let date = parse_date(&date)?;

    let evaluation = state
        .journal
        .re_evaluate(owner_id, date)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("Entry not found".to_string()))?;

    Ok(Json(json!({ "evaluation": EvaluationBody::from(evaluation) })))
}

/// DELETE /entries/:date — evaluation first, then the entry.
pub async fn handle_delete_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(date): Path<String>,
) -> Result<Json<Value>, AppError> {
    let owner_id = owner_from_headers(&headers)?;
    let date = parse_date(&date)?;

    let deleted = state
        .journal
        .delete(owner_id, date)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound("Entry not found".to_string()));
    }

    Ok(Json(json!({ "message": "Entry deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_strict_iso_dates() {
        assert_eq!(
            parse_date("2024-05-01").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_malformed_input() {
        for bad in ["2024-5-1", "2024/05/01", "20240501", "2024-13-01", "yesterday", ""] {
            assert!(parse_date(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn parse_month_accepts_strict_year_month() {
        assert_eq!(parse_month("2024-05").unwrap(), (2024, 5));
        assert_eq!(parse_month("2024-12").unwrap(), (2024, 12));
    }

    #[test]
    fn parse_month_rejects_malformed_input() {
        for bad in ["2024-5", "2024-13", "2024-00", "202405", "2024-05-01", "24-05", ""] {
            assert!(parse_month(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn text_length_is_capped_in_chars_not_bytes() {
        assert!(validate_text(&"a".repeat(2000)).is_ok());
        assert!(validate_text(&"a".repeat(2001)).is_err());
        // 2000 multibyte chars are within the limit even though the byte
        // length is far larger.
        assert!(validate_text(&"日".repeat(2000)).is_ok());
    }

    #[test]
    fn missing_owner_header_falls_back_to_nil_uuid() {
        let headers = HeaderMap::new();
        assert_eq!(owner_from_headers(&headers).unwrap(), Uuid::nil());
    }

    #[test]
    fn malformed_owner_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", "not-a-uuid".parse().unwrap());
        assert!(owner_from_headers(&headers).is_err());
    }

    #[test]
    fn owner_header_is_parsed_as_uuid() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert("x-user-id", id.to_string().parse().unwrap());
        assert_eq!(owner_from_headers(&headers).unwrap(), id);
    }

    mod rejections {
        use std::sync::Arc;

        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        use super::*;
        use crate::config::Config;
        use crate::journal::Journal;
        use crate::routes::build_router;
        use crate::testutil::{EchoEvaluator, MemStore};

        fn test_router() -> axum::Router {
            let store = Arc::new(MemStore::default());
            let journal = Journal::new(store.clone(), store, Arc::new(EchoEvaluator));
            build_router(AppState {
                journal,
                config: Config {
                    database_url: "postgres://unused".to_string(),
                    anthropic_api_key: "unused".to_string(),
                    port: 0,
                    rust_log: "info".to_string(),
                },
            })
        }

        fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        }

        #[tokio::test]
        async fn put_body_without_text_is_a_400() {
            let response = test_router()
                .oneshot(json_request("PUT", "/entries/2024-05-01", "{}"))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn save_body_without_meals_is_a_400() {
            let body = r#"{"date": "2024-05-01", "raw_text": "a day"}"#;
            let response = test_router()
                .oneshot(json_request("POST", "/entries", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn save_body_without_json_content_type_is_a_400() {
            let body = r#"{"date": "2024-05-01", "raw_text": "a day",
                "meals": {"breakfast": false, "lunch": false, "dinner": false}}"#;
            let response = test_router()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/entries")
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        #[tokio::test]
        async fn well_formed_save_is_accepted_as_pending() {
            let body = r#"{"date": "2024-05-01", "raw_text": "a day",
                "meals": {"breakfast": true, "lunch": false, "dinner": true}}"#;
            let response = test_router()
                .oneshot(json_request("POST", "/entries", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::ACCEPTED);
        }
    }
}
