//! Prompt composition.
//!
//! Pure and deterministic: identical inputs always produce identical prompt
//! strings. Prompt literals are Korean because the generated copy is Korean;
//! everything else about the pipeline stays in the code's language.

use std::fmt::Write as _;

use tonepost_core::{StyleRules, Tone};
use tonepost_retrieval::ExemplarCaption;

use crate::types::GenerationRequest;

/// Exemplars included in the system prompt.
const MAX_PROMPT_EXEMPLARS: usize = 3;

/// Per-exemplar truncation length in characters.
const EXEMPLAR_TRUNCATE_CHARS: usize = 400;

/// Marker used for absent today-context fields.
const NOT_PROVIDED: &str = "제공되지 않음";

/// Emoji budget stated in the positive-constraint block.
const MAX_EMOJI: usize = 2;

/// Build the system instruction for the initial drafts.
#[must_use]
pub fn system_prompt(
    request: &GenerationRequest,
    rules: &StyleRules,
    exemplars: &[ExemplarCaption],
) -> String {
    let tone_rules = rules.tone(request.tone);
    let mut prompt = String::new();

    let _ = writeln!(
        prompt,
        "당신은 {} 가게를 직접 운영하는 사장입니다. 오늘 가게에서 있었던 일을 1인칭으로 전하는 SNS 캡션을 작성하세요.",
        request.category
    );
    let _ = writeln!(
        prompt,
        "반드시 아래 키를 가진 JSON 객체 하나만 출력하세요: caption(문자열), hashtags(문자열 배열, 5~7개), story_phrases(문자열 배열, 정확히 3개), engagement_question(문자열)."
    );

    prompt.push_str("\n[금지 표현]\n");
    let _ = writeln!(prompt, "- 진부한 문구: {}", rules.cliches.join(", "));
    let _ = writeln!(prompt, "- 과장 문구: {}", rules.hard_blocked.join(", "));
    let _ = writeln!(prompt, "- 홍보성 문구: {}", rules.promo_phrases.join(", "));

    prompt.push_str("\n[작성 조건]\n");
    let _ = writeln!(
        prompt,
        "- 캡션 길이는 공백 포함 {}~{}자.",
        tone_rules.min_chars, tone_rules.max_chars
    );
    prompt.push_str("- 문장은 3~4개로 나누세요.\n");
    let _ = writeln!(prompt, "- 이모지는 최대 {MAX_EMOJI}개까지만 사용하세요.");
    prompt.push_str("- 적어도 한 문장에는 오늘 가게 운영에서 있었던 구체적인 내용을 담으세요.\n");

    prompt.push_str("\n[말투 규칙]\n");
    let _ = writeln!(prompt, "- 목표 말투: {}", tone_label(request.tone));
    let _ = writeln!(
        prompt,
        "- 이 말투에서 쓰지 말아야 할 표현: {}",
        tone_rules.forbidden.join(", ")
    );

    if !exemplars.is_empty() {
        prompt.push_str("\n[참고 캡션]\n");
        prompt.push_str("아래 캡션은 리듬과 구조만 참고하세요. 문구를 그대로 따라 쓰지 마세요.\n");
        for (i, exemplar) in exemplars.iter().take(MAX_PROMPT_EXEMPLARS).enumerate() {
            let truncated: String = exemplar.text.chars().take(EXEMPLAR_TRUNCATE_CHARS).collect();
            let _ = writeln!(prompt, "{}. {truncated}", i + 1);
        }
    }

    prompt
}

/// Build the user instruction carrying the raw content and today-context.
#[must_use]
pub fn user_prompt(request: &GenerationRequest) -> String {
    let ctx = request.today_context.clone().unwrap_or_default();
    let field = |value: &Option<String>| -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v.clone(),
            _ => NOT_PROVIDED.to_string(),
        }
    };

    let mut prompt = String::new();
    let _ = writeln!(prompt, "오늘 있었던 일: {}", request.content);
    let _ = writeln!(prompt, "작성 목적: {}", request.purpose);
    let _ = writeln!(prompt, "날씨: {}", field(&ctx.weather));
    let _ = writeln!(prompt, "재고 상황: {}", field(&ctx.inventory_status));
    let _ = writeln!(prompt, "손님 반응: {}", field(&ctx.customer_reaction));
    prompt
}

fn tone_label(tone: Tone) -> &'static str {
    match tone {
        Tone::Emotional => "감성적인 말투 (잔잔하고 따뜻하게)",
        Tone::Casual => "친근한 말투 (가볍고 일상적인 사장님 말투)",
        Tone::Professional => "정중한 말투 (차분하고 격식 있게)",
    }
}
