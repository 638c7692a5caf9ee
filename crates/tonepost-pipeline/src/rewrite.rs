//! Escalating corrective rewriting.
//!
//! A fixed, ordered chain of at most four stages. Each stage is a pure
//! planner that inspects the current caption and either returns a rewrite
//! plan or passes; the executor issues exactly one completion per planned
//! stage. A blank completion silently keeps the prior caption — the chain
//! retries for quality, never for availability, so transport errors
//! propagate instead of being retried.

use std::fmt::Write as _;

use tonepost_core::{classify_tone, StyleRules, Tone};
use tonepost_llm::ChatClient;

use crate::error::PipelineError;
use crate::types::{GenerationRequest, ScoreResult};

/// Temperature for the stricter tone/hard-block guard rewrite.
const GUARD_TEMPERATURE: f32 = 0.4;

/// Temperature for the residual hard-block sweep.
const SWEEP_TEMPERATURE: f32 = 0.3;

/// Temperature for the final tone touch-up.
const TOUCHUP_TEMPERATURE: f32 = 0.4;

/// System framing shared by every rewrite completion.
const REWRITE_SYSTEM: &str =
    "당신은 가게 사장이 쓴 SNS 캡션을 다듬는 편집자입니다. 지시된 문제만 고치고, 사실 관계와 분위기는 유지하세요. 수정한 캡션 본문만 출력하세요.";

/// One planned corrective completion.
#[derive(Debug, Clone)]
pub(crate) struct RewritePlan {
    pub stage: &'static str,
    pub instruction: String,
    pub temperature: f32,
}

/// Stage 0 — issue-triggered rewrite.
///
/// Fires when the scorer reported defects or a literal context copy.
pub(crate) fn plan_issue_rewrite(
    caption: &str,
    score: &ScoreResult,
    request: &GenerationRequest,
    rules: &StyleRules,
) -> Option<RewritePlan> {
    if score.issues.is_empty() && !score.literal_copy {
        return None;
    }

    let tone_rules = rules.tone(request.tone);
    let mut instruction = String::new();
    let _ = writeln!(instruction, "다음 캡션에서 아래 문제만 고쳐 주세요.");
    for issue in &score.issues {
        let _ = writeln!(instruction, "- {issue}");
    }
    let _ = writeln!(
        instruction,
        "길이는 공백 포함 {}~{}자, 말투는 기존 그대로 유지하세요. 언급된 사실은 바꾸지 마세요.",
        tone_rules.min_chars, tone_rules.max_chars
    );
    let _ = write!(instruction, "\n캡션:\n{caption}");

    Some(RewritePlan {
        stage: "issue_rewrite",
        instruction,
        temperature: tone_rules.temperature,
    })
}

/// Stage 1 — tone and hard-block guard.
///
/// Re-evaluates the current caption for tone drift, hard-blocked phrases,
/// emotional-extra-blocked phrases, length violations, and residual
/// casual-forbidden words; any trip produces a stricter rewrite carrying an
/// explicit banned-word list at a lower temperature.
pub(crate) fn plan_guard_rewrite(
    caption: &str,
    tone: Tone,
    rules: &StyleRules,
) -> Option<RewritePlan> {
    let tone_rules = rules.tone(tone);
    let blocked_hits = blocked_phrases_in(caption, tone, rules);
    let tone_drift = classify_tone(rules, caption) != tone;
    let length_violation = !tone_rules.contains_len(caption.chars().count());
    let casual_forbidden = tone == Tone::Casual
        && tone_rules
            .forbidden
            .iter()
            .any(|w| caption.contains(w.as_str()));

    if blocked_hits.is_empty() && !tone_drift && !length_violation && !casual_forbidden {
        return None;
    }

    let mut banned: Vec<&str> = blocked_hits;
    banned.extend(tone_rules.forbidden.iter().map(String::as_str));

    let mut instruction = String::new();
    let _ = writeln!(
        instruction,
        "다음 캡션을 {} 말투로 다시 써 주세요. 공백 포함 {}~{}자를 지키세요.",
        tone.as_str(),
        tone_rules.min_chars,
        tone_rules.max_chars
    );
    let _ = writeln!(instruction, "다음 단어는 절대 쓰지 마세요: {}", banned.join(", "));
    let _ = write!(instruction, "\n캡션:\n{caption}");

    Some(RewritePlan {
        stage: "guard_rewrite",
        instruction,
        temperature: GUARD_TEMPERATURE,
    })
}

/// Stage 2 — residual hard-block sweep.
///
/// Fires only while hard-blocked (or emotional-extra-blocked) phrases
/// persist; asks for nothing but their removal.
pub(crate) fn plan_block_sweep(
    caption: &str,
    tone: Tone,
    rules: &StyleRules,
) -> Option<RewritePlan> {
    let blocked_hits = blocked_phrases_in(caption, tone, rules);
    if blocked_hits.is_empty() {
        return None;
    }

    let mut instruction = String::new();
    let _ = writeln!(
        instruction,
        "다음 캡션에서 이 표현만 자연스럽게 제거해 주세요: {}",
        blocked_hits.join(", ")
    );
    let _ = writeln!(instruction, "나머지 문장과 말투는 그대로 두세요.");
    let _ = write!(instruction, "\n캡션:\n{caption}");

    Some(RewritePlan {
        stage: "block_sweep",
        instruction,
        temperature: SWEEP_TEMPERATURE,
    })
}

/// Stage 3 — tone-specific touch-up.
///
/// Fires when a casual caption still reads emotional, or an emotional
/// caption fails to read emotional.
pub(crate) fn plan_tone_touchup(
    caption: &str,
    tone: Tone,
    rules: &StyleRules,
) -> Option<RewritePlan> {
    let detected = classify_tone(rules, caption);
    let needs_touchup = match tone {
        Tone::Casual => detected == Tone::Emotional,
        Tone::Emotional => detected != Tone::Emotional,
        Tone::Professional => false,
    };
    if !needs_touchup {
        return None;
    }

    let direction = match tone {
        Tone::Casual => "감성적인 문장을 걷어내고 가볍고 일상적인 사장님 말투로",
        _ => "잔잔하고 따뜻한 감성적인 말투로",
    };

    let mut instruction = String::new();
    let _ = writeln!(instruction, "다음 캡션을 {direction} 다듬어 주세요. 내용은 그대로 유지하세요.");
    let _ = write!(instruction, "\n캡션:\n{caption}");

    Some(RewritePlan {
        stage: "tone_touchup",
        instruction,
        temperature: TOUCHUP_TEMPERATURE,
    })
}

/// Run the full chain against the selected caption.
///
/// Stage 0 plans from the scorer's verdict on the original winner; stages
/// 1–3 re-plan from whatever the previous stage left behind. The surviving
/// caption is returned whether or not any stage fired.
///
/// # Errors
///
/// Returns [`PipelineError::Llm`] if a planned stage's completion call
/// fails at the transport level.
pub async fn run_rewrite_chain(
    chat: &ChatClient,
    rules: &StyleRules,
    request: &GenerationRequest,
    caption: String,
    initial: &ScoreResult,
) -> Result<String, PipelineError> {
    let mut caption = caption;

    if let Some(plan) = plan_issue_rewrite(&caption, initial, request, rules) {
        caption = apply(chat, &plan, caption).await?;
    }
    if let Some(plan) = plan_guard_rewrite(&caption, request.tone, rules) {
        caption = apply(chat, &plan, caption).await?;
    }
    if let Some(plan) = plan_block_sweep(&caption, request.tone, rules) {
        caption = apply(chat, &plan, caption).await?;
    }
    if let Some(plan) = plan_tone_touchup(&caption, request.tone, rules) {
        caption = apply(chat, &plan, caption).await?;
    }

    Ok(caption)
}

/// Issue one completion for a planned stage.
///
/// A non-empty result replaces the caption; a blank one keeps the prior
/// caption without retrying.
async fn apply(
    chat: &ChatClient,
    plan: &RewritePlan,
    current: String,
) -> Result<String, PipelineError> {
    let completions = chat
        .complete(REWRITE_SYSTEM, &plan.instruction, 1, plan.temperature)
        .await?;

    match completions.into_iter().next() {
        Some(text) if !text.trim().is_empty() => {
            tracing::debug!(stage = plan.stage, "rewrite applied");
            Ok(text.trim().to_string())
        }
        _ => {
            tracing::debug!(stage = plan.stage, "rewrite returned empty — keeping prior caption");
            Ok(current)
        }
    }
}

/// Blocked phrases present in the caption: the hard set, plus the emotional
/// extras for emotional tone.
fn blocked_phrases_in<'r>(caption: &str, tone: Tone, rules: &'r StyleRules) -> Vec<&'r str> {
    rules
        .blocked_for(tone)
        .into_iter()
        .filter(|p| caption.contains(*p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonepost_core::Tone;

    use crate::types::{CaptionIssue, GenerationRequest};

    fn rules() -> StyleRules {
        StyleRules::builtin()
    }

    fn request(tone: Tone) -> GenerationRequest {
        GenerationRequest {
            category: "카페".to_string(),
            tone,
            purpose: "신메뉴 소개".to_string(),
            content: "신메뉴 딸기라떼 출시".to_string(),
            today_context: None,
        }
    }

    fn clean_score() -> ScoreResult {
        ScoreResult {
            score: 80.0,
            detected_tone: Tone::Casual,
            issues: vec![],
            literal_copy: false,
        }
    }

    const CLEAN_CASUAL: &str =
        "오늘부터 딸기라떼를 시작했어요. 비가 와서 손님이 적을 줄 알았는데 오히려 따뜻한 음료와 함께 찾아주신 분들이 많았어요. 생딸기를 넉넉하게 갈아 넣어서 향이 진해요.";

    #[test]
    fn issue_rewrite_skips_clean_captions() {
        let plan = plan_issue_rewrite(CLEAN_CASUAL, &clean_score(), &request(Tone::Casual), &rules());
        assert!(plan.is_none());
    }

    #[test]
    fn issue_rewrite_lists_reported_defects() {
        let mut score = clean_score();
        score.issues = vec![CaptionIssue::LengthOutOfRange, CaptionIssue::ClichePhrase];
        let plan = plan_issue_rewrite("짧은 캡션", &score, &request(Tone::Casual), &rules())
            .expect("issues must trigger stage 0");
        assert!(plan.instruction.contains("길이가 목표 범위를 벗어났습니다"));
        assert!(plan.instruction.contains("진부한 표현이 포함되어 있습니다"));
        assert!(plan.instruction.contains("짧은 캡션"));
    }

    #[test]
    fn literal_copy_alone_triggers_stage_zero() {
        let mut score = clean_score();
        score.literal_copy = true;
        assert!(
            plan_issue_rewrite(CLEAN_CASUAL, &score, &request(Tone::Casual), &rules()).is_some()
        );
    }

    #[test]
    fn guard_skips_compliant_caption() {
        assert!(plan_guard_rewrite(CLEAN_CASUAL, Tone::Casual, &rules()).is_none());
    }

    #[test]
    fn guard_fires_on_hard_blocked_phrase() {
        let caption = format!("{CLEAN_CASUAL} 최고의 하루였어요");
        let plan = plan_guard_rewrite(&caption, Tone::Casual, &rules())
            .expect("hard block must trigger the guard");
        assert!(plan.instruction.contains("최고의"), "banned list must name the hit");
        assert!((plan.temperature - GUARD_TEMPERATURE).abs() < f32::EPSILON);
    }

    #[test]
    fn guard_fires_on_length_violation() {
        assert!(plan_guard_rewrite("너무 짧은 캡션이에요", Tone::Casual, &rules()).is_some());
    }

    #[test]
    fn guard_fires_on_residual_formal_endings_in_casual() {
        // In-band length and casual markers, but a formal ending survives.
        let caption = "오늘부터 딸기라떼를 시작했어요. 비가 와도 찾아주신 분들이 진짜 많았어요. 생딸기를 넉넉하게 갈아 넣어 향이 진하게 준비했습니다.";
        let plan = plan_guard_rewrite(caption, Tone::Casual, &rules())
            .expect("casual-forbidden ending must trigger the guard");
        assert!(plan.instruction.contains("습니다"));
    }

    #[test]
    fn guard_fires_on_emotional_extra_block_for_emotional_tone() {
        let caption = "따뜻한 마음을 담아 천천히 내린 커피 한 잔이 오늘따라 감사하게 느껴진 하루였어요 창가의 인생샷 명당 자리도 정리해 두었어요";
        assert!(plan_guard_rewrite(caption, Tone::Emotional, &rules()).is_some());
        // The same extra phrase is not blocked for casual tone.
        let casual_caption = "오늘 창가 자리를 정리했어요 인생샷 명당이라고 다들 좋아했어요 진짜 뿌듯했어요 내일은 화분도 새로 들여서 더 아늑하게 꾸며 보려고요 구경 오세요 날씨도 좋았어요";
        assert!(plan_guard_rewrite(casual_caption, Tone::Casual, &rules()).is_none());
    }

    #[test]
    fn sweep_fires_only_while_blocks_persist() {
        let blocked = format!("{CLEAN_CASUAL} 무조건 와 보세요");
        let plan = plan_block_sweep(&blocked, Tone::Casual, &rules())
            .expect("sweep must fire on residual block");
        assert!(plan.instruction.contains("무조건"));
        assert!((plan.temperature - SWEEP_TEMPERATURE).abs() < f32::EPSILON);

        assert!(plan_block_sweep(CLEAN_CASUAL, Tone::Casual, &rules()).is_none());
    }

    #[test]
    fn touchup_fires_when_casual_still_reads_emotional() {
        let emotional_caption =
            "따뜻한 마음이 포근하게 번지는 오후였습니다 감사한 하루에 행복이 스며들었어요";
        assert!(plan_tone_touchup(emotional_caption, Tone::Casual, &rules()).is_some());
        assert!(plan_tone_touchup(CLEAN_CASUAL, Tone::Casual, &rules()).is_none());
    }

    #[test]
    fn touchup_fires_when_emotional_fails_to_read_emotional() {
        assert!(plan_tone_touchup(CLEAN_CASUAL, Tone::Emotional, &rules()).is_some());
        let emotional_caption =
            "따뜻한 마음이 포근하게 번지는 오후, 감사한 하루에 행복이 스며들었어요";
        assert!(plan_tone_touchup(emotional_caption, Tone::Emotional, &rules()).is_none());
    }

    #[test]
    fn touchup_never_fires_for_professional() {
        assert!(plan_tone_touchup(CLEAN_CASUAL, Tone::Professional, &rules()).is_none());
        let emotional_caption = "따뜻한 마음이 포근하게 번지는 감사한 오후였어요";
        assert!(plan_tone_touchup(emotional_caption, Tone::Professional, &rules()).is_none());
    }
}
