pub mod prompts;

use async_trait::async_trait;
use tracing::warn;

use crate::llm_client::{LlmClient, MODEL};
use crate::models::{EvaluationPayload, Meals};

/// Version of the evaluation prompt, persisted with each evaluation so old
/// rows can be told apart after a prompt change.
pub const PROMPT_VERSION: i32 = 1;

/// Summary used when the model call or its output cannot be used.
const FALLBACK_SUMMARY: &str = "Analysis failed for this entry.";
/// Summary used for an entry with no text at all.
const EMPTY_SUMMARY: &str = "(no entry)";

/// The evaluation contract: text plus meal flags in, a structured payload
/// out. Infallible by signature — an implementation degrades to
/// `fallback_evaluation` instead of surfacing an error to its caller.
#[async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, raw_text: &str, meals: Meals) -> EvaluationPayload;

    /// Model identifier recorded alongside evaluations this evaluator
    /// produces.
    fn model(&self) -> &str;
}

/// Deterministic placeholder returned when no real evaluation can be
/// produced. Score sits at the center of the scale; nothing else is claimed.
pub fn fallback_evaluation(raw_text: &str) -> EvaluationPayload {
    EvaluationPayload {
        summary: if raw_text.trim().is_empty() {
            EMPTY_SUMMARY.to_string()
        } else {
            FALLBACK_SUMMARY.to_string()
        },
        score: 5,
        tags: vec![],
        places: vec![],
        went_out_level: 0,
    }
}

/// LLM-backed evaluator. Builds the scoring prompt, parses the model's JSON
/// and range-checks it; anything that goes wrong becomes the fallback.
#[derive(Clone)]
pub struct LlmEvaluator {
    llm: LlmClient,
}

impl LlmEvaluator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(&self, raw_text: &str, meals: Meals) -> EvaluationPayload {
        // Nothing to analyze; skip the call entirely.
        if raw_text.trim().is_empty() {
            return fallback_evaluation(raw_text);
        }

        let prompt = build_prompt(raw_text, meals);

        match self
            .llm
            .complete_json::<EvaluationPayload>(&prompt, prompts::EVALUATE_SYSTEM)
            .await
        {
            Ok(payload) if payload.is_valid() => payload,
            Ok(payload) => {
                warn!(
                    "evaluation payload out of range (score={}, went_out_level={}, tags={}), using fallback",
                    payload.score,
                    payload.went_out_level,
                    payload.tags.len()
                );
                fallback_evaluation(raw_text)
            }
            Err(e) => {
                warn!("evaluation call failed: {e}, using fallback");
                fallback_evaluation(raw_text)
            }
        }
    }

    fn model(&self) -> &str {
        MODEL
    }
}

/// Fills the prompt template. The fixed meals JSON goes in first: the
/// journal text is untrusted and may itself contain a literal placeholder,
/// so it must never be present while template substitution is still running.
fn build_prompt(raw_text: &str, meals: Meals) -> String {
    let meals_json = serde_json::to_string(&meals).unwrap_or_else(|_| "{}".to_string());
    prompts::EVALUATE_PROMPT
        .replace("{meals}", &meals_json)
        .replace("{journal_text}", raw_text)
}
