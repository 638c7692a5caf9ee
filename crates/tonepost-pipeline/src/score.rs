//! Candidate quality scoring and selection.
//!
//! Each non-empty draft gets a scalar score from the weighted formula in
//! [`score_candidate`]; [`select_candidate`] picks the winner from the pool
//! that passes the hard-blocked-phrase filter, falling back to the whole
//! pool if everything is blocked. The issue list is a separate, lighter
//! defect check whose entries drive the first rewrite stage.

use tonepost_core::{classify_tone, signal_hits, ScoringWeights, StyleRules};

use crate::types::{Candidate, CaptionIssue, GenerationRequest, ScoreResult};

/// Hashtag count below which the structural penalty applies.
const MIN_HASHTAGS: usize = 5;

/// Expected story-phrase count; any other count is a defect.
const EXPECTED_STORY_PHRASES: usize = 3;

/// Exclamation marks from which the excess penalty applies.
const EXCLAMATION_LIMIT: usize = 3;

/// Minimum token length (chars) for the keyword-overlap bonus.
const MIN_KEYWORD_CHARS: usize = 2;

/// Minimum normalized length for a context field to be copy-checked at all.
const COPY_MIN_CHARS: usize = 10;

/// Normalized length from which a context field is additionally checked as
/// two halves split at its midpoint.
const COPY_SPLIT_MIN_CHARS: usize = 18;

/// Sentence-ending repetitions from which the repetitive-ending defect fires.
const REPEATED_ENDING_LIMIT: usize = 3;

/// Score one candidate against the request.
#[must_use]
pub fn score_candidate(
    candidate: &Candidate,
    request: &GenerationRequest,
    rules: &StyleRules,
    weights: &ScoringWeights,
) -> ScoreResult {
    let tone_rules = rules.tone(request.tone);
    let caption = candidate.caption.as_str();
    let len = caption.chars().count();

    let detected_tone = classify_tone(rules, caption);

    let mut score = weights.base;
    score += length_fit(len, tone_rules.target_chars(), tone_rules.band_width(), weights);

    if detected_tone == request.tone {
        score += weights.tone_match_bonus;
    } else {
        score -= weights.tone_mismatch_penalty;
    }

    #[allow(clippy::cast_precision_loss)]
    let overlap = keyword_overlap(&request.content, caption, rules) as f32;
    score += (overlap * weights.keyword_bonus).min(weights.keyword_bonus_cap);

    if candidate.hashtags.len() < MIN_HASHTAGS {
        score -= weights.hashtag_penalty;
    }
    if candidate.story_phrases.len() != EXPECTED_STORY_PHRASES {
        score -= weights.story_phrase_penalty;
    }
    if candidate.engagement_question.trim().is_empty() {
        score -= weights.question_penalty;
    }

    let cliche_hits = signal_hits(caption, &rules.cliches);
    #[allow(clippy::cast_precision_loss)]
    {
        score -= cliche_hits as f32 * weights.cliche_penalty;
    }

    if caption.matches('!').count() >= EXCLAMATION_LIMIT {
        score -= weights.exclamation_penalty;
    }

    let forbidden_hits = signal_hits(caption, &tone_rules.forbidden);
    #[allow(clippy::cast_precision_loss)]
    {
        score -= forbidden_hits as f32 * weights.tone_forbidden_penalty;
    }

    if rules
        .generic_phrases
        .iter()
        .any(|p| caption.contains(p.as_str()))
    {
        score -= weights.generic_penalty;
    }

    let literal_copy = literal_context_copy(caption, request);
    if literal_copy {
        score -= weights.literal_copy_penalty;
    }

    let issues = detect_issues(candidate, request, rules, literal_copy);

    ScoreResult {
        score,
        detected_tone,
        issues,
        literal_copy,
    }
}

/// Pick the best candidate from the pool.
///
/// Empty drafts are discarded first. Candidates containing a hard-blocked
/// phrase are excluded from selection; if that excludes everything, the
/// unfiltered pool is scored instead so the rewrite chain and sanitizer can
/// still repair the winner.
#[must_use]
pub fn select_candidate(
    pool: &[Candidate],
    request: &GenerationRequest,
    rules: &StyleRules,
    weights: &ScoringWeights,
) -> Option<(Candidate, ScoreResult)> {
    let live: Vec<&Candidate> = pool.iter().filter(|c| !c.is_empty()).collect();
    if live.is_empty() {
        return None;
    }

    let unblocked: Vec<&Candidate> = live
        .iter()
        .copied()
        .filter(|c| {
            !rules
                .hard_blocked
                .iter()
                .any(|p| c.caption.contains(p.as_str()))
        })
        .collect();

    let eligible = if unblocked.is_empty() {
        tracing::debug!("every draft contains a hard-blocked phrase — scoring unfiltered pool");
        &live
    } else {
        &unblocked
    };

    eligible
        .iter()
        .map(|&c| (c.clone(), score_candidate(c, request, rules, weights)))
        .max_by(|a, b| {
            a.1.score
                .partial_cmp(&b.1.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Triangular falloff around the tone's target length: full bonus at the
/// target, linearly down to zero at one band-width away.
fn length_fit(len: usize, target: usize, band_width: usize, weights: &ScoringWeights) -> f32 {
    if band_width == 0 {
        return 0.0;
    }
    let distance = len.abs_diff(target);
    #[allow(clippy::cast_precision_loss)]
    let ratio = distance as f32 / band_width as f32;
    (weights.length_fit_max * (1.0 - ratio)).max(0.0)
}

/// Count content tokens (stopword-filtered, at least [`MIN_KEYWORD_CHARS`]
/// chars) that reappear in the caption. Substring matching keeps attached
/// particles from hiding a match.
fn keyword_overlap(content: &str, caption: &str, rules: &StyleRules) -> usize {
    let mut seen: Vec<String> = Vec::new();
    content
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_string()
        })
        .filter(|t| t.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|t| !rules.stopwords.iter().any(|s| s == t))
        .filter(|t| {
            if seen.contains(t) {
                false
            } else {
                seen.push(t.clone());
                true
            }
        })
        .filter(|t| caption.contains(t.as_str()))
        .count()
}

/// Whether the caption literally copies a today-context field.
///
/// Comparison happens on normalized text (whitespace and punctuation
/// stripped). A field is flagged when the caption contains the whole
/// normalized field (at [`COPY_MIN_CHARS`]+ chars), or either half of a
/// field of [`COPY_SPLIT_MIN_CHARS`]+ chars split at its midpoint. Shorter
/// fields are never checked.
fn literal_context_copy(caption: &str, request: &GenerationRequest) -> bool {
    let Some(ctx) = &request.today_context else {
        return false;
    };
    let caption_norm = normalize_for_copy_check(caption);
    ctx.provided_fields()
        .iter()
        .any(|field| field_copied(&caption_norm, field))
}

pub(crate) fn field_copied(caption_norm: &str, field: &str) -> bool {
    let norm = normalize_for_copy_check(field);
    let len = norm.chars().count();

    if len >= COPY_MIN_CHARS && caption_norm.contains(norm.as_str()) {
        return true;
    }
    if len >= COPY_SPLIT_MIN_CHARS {
        let mid = len / 2;
        let first: String = norm.chars().take(mid).collect();
        let second: String = norm.chars().skip(mid).collect();
        for half in [first, second] {
            if half.chars().count() >= COPY_MIN_CHARS && caption_norm.contains(half.as_str()) {
                return true;
            }
        }
    }
    false
}

/// Strip whitespace and punctuation so spacing differences cannot hide a
/// literal copy.
pub(crate) fn normalize_for_copy_check(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// The lighter defect check backing the scorer's issue list.
fn detect_issues(
    candidate: &Candidate,
    request: &GenerationRequest,
    rules: &StyleRules,
    literal_copy: bool,
) -> Vec<CaptionIssue> {
    let tone_rules = rules.tone(request.tone);
    let caption = candidate.caption.as_str();
    let mut issues = Vec::new();

    if !tone_rules.contains_len(caption.chars().count()) {
        issues.push(CaptionIssue::LengthOutOfRange);
    }
    if signal_hits(caption, &rules.cliches) > 0 {
        issues.push(CaptionIssue::ClichePhrase);
    }
    if caption.matches('!').count() >= EXCLAMATION_LIMIT {
        issues.push(CaptionIssue::ExcessExclamation);
    }
    if rules
        .generic_phrases
        .iter()
        .any(|p| caption.contains(p.as_str()))
    {
        issues.push(CaptionIssue::GenericPhrasing);
    }
    if repetitive_endings(caption) {
        issues.push(CaptionIssue::RepetitiveEnding);
    }
    if literal_copy {
        issues.push(CaptionIssue::LiteralContextCopy);
    }

    issues
}

/// True when [`REPEATED_ENDING_LIMIT`] or more sentences end with the same
/// final word.
fn repetitive_endings(caption: &str) -> bool {
    let mut counts: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for sentence in caption.split(['.', '!', '?', '\n']) {
        let Some(last) = sentence.split_whitespace().last() else {
            continue;
        };
        let ending = last
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        if ending.is_empty() {
            continue;
        }
        let count = counts.entry(ending).or_insert(0);
        *count += 1;
        if *count >= REPEATED_ENDING_LIMIT {
            return true;
        }
    }
    false
}
