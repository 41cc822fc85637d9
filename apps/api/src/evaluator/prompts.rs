/// Prompt for the daily-entry evaluation call. Bumping wording in a way that
/// changes scoring behavior must bump PROMPT_VERSION in the evaluator.
pub const EVALUATE_SYSTEM: &str = "You are an assistant that reads a personal \
    daily journal entry and returns a structured evaluation as JSON. \
    You MUST respond with a single valid JSON object and nothing else. \
    Do NOT use markdown code fences. Do NOT add explanations.";

pub const EVALUATE_PROMPT: &str = r#"Read the journal entry below and evaluate the writer's day. Consider positivity, variety of activity, self-care (meal checkboxes are provided), and reflection.

Scoring policy:
- score is an integer from 1 (worst) to 10 (best).
- Aim for a normal distribution centered on 5: a decent day is 5, good is 6, very good is 7. Be strict.
- Vague or generic entries with no concrete detail ("today was fun", "walked the dog") score low, 4 or below, even if the mood sounds positive.
- Long, concrete entries, and clear achievements ("filed a patent today") score high, 8 or above.
- Creative work, exercise, and evident satisfaction push the score up; low-quality or unclear activity pushes it down.
- Meal completion contributes to the score but must not dominate it.
- After picking a score and outing level, imagine what behavior they imply, compare against the actual entry, and adjust if they do not match.

Other fields:
- summary: a plain 1-150 character summary of what the entry says. Summarize only; no commentary, no hedging about missing information, no "the entry mentions ...".
- tags: up to 5 short keywords; one or two is fine for a short entry.
- places: place or venue names appearing in the text; [] if none.
- went_out_level: 0 (stayed in) to 3 (long or multi-location outing), estimated from how long and how far the writer seems to have been out.

INPUT:
- journal_text: {journal_text}
- meals: {meals}

OUTPUT JSON SCHEMA:
{
  "summary": "string, 1-150 chars",
  "score": 1-10,
  "tags": ["string", ...],
  "places": ["string", ...],
  "went_out_level": 0|1|2|3
}

Constraints:
- Score integer 1..10 only.
- Be neutral; avoid moral judgement.
- Respond with valid JSON only."#;
