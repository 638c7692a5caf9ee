//! Ranking of usable exemplars.

use std::collections::HashSet;

use tonepost_core::{classify_tone, RankerWeights, StyleRules, Tone};

use crate::types::ExemplarCaption;

/// Number of exemplars handed to the prompt composer.
const RESULT_CAP: usize = 4;

/// Prefix length used for near-duplicate elimination.
const DEDUP_PREFIX_CHARS: usize = 80;

/// Rank exemplars and return the top candidates.
///
/// Score per exemplar:
/// `similarity · W1 + min(popularity, cap)/cap · W2 + tone_bonus` when the
/// labeled tone — or, for unlabeled rows, the detected tone — equals the
/// target. Results are sorted descending, deduplicated by an 80-character
/// text prefix, and capped at 4.
#[must_use]
pub fn rank_exemplars(
    pool: Vec<ExemplarCaption>,
    target: Tone,
    weights: &RankerWeights,
    rules: &StyleRules,
) -> Vec<ExemplarCaption> {
    let mut scored: Vec<(f32, ExemplarCaption)> = pool
        .into_iter()
        .map(|e| (exemplar_score(&e, target, weights, rules), e))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut seen_prefixes: HashSet<String> = HashSet::new();
    let mut top = Vec::with_capacity(RESULT_CAP);
    for (_, exemplar) in scored {
        let prefix: String = exemplar.text.chars().take(DEDUP_PREFIX_CHARS).collect();
        if !seen_prefixes.insert(prefix) {
            continue;
        }
        top.push(exemplar);
        if top.len() == RESULT_CAP {
            break;
        }
    }
    top
}

fn exemplar_score(
    exemplar: &ExemplarCaption,
    target: Tone,
    weights: &RankerWeights,
    rules: &StyleRules,
) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let popularity = (exemplar.popularity as f32).min(weights.popularity_cap);
    let popularity_term = if weights.popularity_cap > 0.0 {
        popularity / weights.popularity_cap
    } else {
        0.0
    };

    let effective_tone = exemplar
        .tone
        .unwrap_or_else(|| classify_tone(rules, &exemplar.text));
    let tone_term = if effective_tone == target {
        weights.tone_bonus
    } else {
        0.0
    };

    exemplar.similarity * weights.similarity_weight
        + popularity_term * weights.popularity_weight
        + tone_term
}
