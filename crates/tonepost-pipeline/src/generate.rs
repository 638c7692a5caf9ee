//! Initial draft generation and defensive response parsing.

use tonepost_llm::ChatClient;

use crate::error::PipelineError;
use crate::types::Candidate;

/// Independent drafts requested per generation (one API call returns all).
pub(crate) const DRAFT_COUNT: u8 = 3;

/// Maximum hashtags kept per candidate.
pub const MAX_HASHTAGS: usize = 7;

/// Maximum story phrases kept per candidate.
pub const MAX_STORY_PHRASES: usize = 3;

/// Request [`DRAFT_COUNT`] draft completions and parse each one.
///
/// Parsing is defensive: a malformed completion becomes a neutral
/// placeholder candidate rather than an error, so one bad draft never costs
/// the whole request.
///
/// # Errors
///
/// Returns [`PipelineError::Llm`] if the completion call itself fails.
pub async fn generate_candidates(
    chat: &ChatClient,
    system: &str,
    user: &str,
    temperature: f32,
) -> Result<Vec<Candidate>, PipelineError> {
    let completions = chat.complete(system, user, DRAFT_COUNT, temperature).await?;

    let candidates: Vec<Candidate> = completions.iter().map(|c| parse_candidate(c)).collect();
    let usable = candidates.iter().filter(|c| !c.is_empty()).count();
    tracing::debug!(
        drafts = candidates.len(),
        usable,
        "parsed draft completions"
    );

    Ok(candidates)
}

/// Parse one completion into a [`Candidate`].
///
/// Accepts the strict JSON shape the prompt requests, tolerating a markdown
/// code fence around it. Anything unparsable yields `Candidate::default()`.
/// Hashtags are capped at [`MAX_HASHTAGS`], story phrases at
/// [`MAX_STORY_PHRASES`], and non-string array entries are dropped.
#[must_use]
pub fn parse_candidate(raw: &str) -> Candidate {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(strip_code_fence(raw)) else {
        return Candidate::default();
    };

    Candidate {
        caption: string_field(value.get("caption")),
        hashtags: string_list(value.get("hashtags"), MAX_HASHTAGS),
        story_phrases: string_list(value.get("story_phrases"), MAX_STORY_PHRASES),
        engagement_question: string_field(value.get("engagement_question")),
    }
}

fn string_field(value: Option<&serde_json::Value>) -> String {
    value
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn string_list(value: Option<&serde_json::Value>, cap: usize) -> Vec<String> {
    value
        .and_then(serde_json::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(serde_json::Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .take(cap)
                .collect()
        })
        .unwrap_or_default()
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
