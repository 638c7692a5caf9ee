//! Usability filter for retrieved exemplars.
//!
//! An exemplar only makes a good rhythm reference if it reads like a real
//! owner-written caption in the target register: right length, no list
//! formatting, little administrative noise, no promotional phrasing, and the
//! tone-appropriate markers.

use tonepost_core::{signal_hits, StyleRules, Tone};

use crate::types::ExemplarCaption;

/// Minimum exemplar length in characters.
const MIN_CHARS: usize = 45;

/// Maximum exemplar length for the strict band.
const STRICT_MAX_CHARS: usize = 180;

/// Maximum exemplar length for the relaxed band, used only when the strict
/// band yields nothing.
const RELAXED_MAX_CHARS: usize = 220;

/// Maximum administrative noise-word occurrences before rejection.
const MAX_NOISE_HITS: usize = 2;

/// Maximum exclamation marks allowed in a professional exemplar.
const MAX_PROFESSIONAL_EXCLAMATIONS: usize = 1;

/// Screen a pool of exemplars for usability under the target tone.
///
/// Applies the strict length band first; if no exemplar survives it, retries
/// the whole pool with the relaxed band.
#[must_use]
pub fn usable_exemplars(
    pool: &[ExemplarCaption],
    tone: Tone,
    rules: &StyleRules,
) -> Vec<ExemplarCaption> {
    let strict: Vec<ExemplarCaption> = pool
        .iter()
        .filter(|e| passes(e, tone, rules, STRICT_MAX_CHARS))
        .cloned()
        .collect();
    if !strict.is_empty() {
        return strict;
    }
    pool.iter()
        .filter(|e| passes(e, tone, rules, RELAXED_MAX_CHARS))
        .cloned()
        .collect()
}

fn passes(exemplar: &ExemplarCaption, tone: Tone, rules: &StyleRules, max_chars: usize) -> bool {
    let text = exemplar.text.as_str();
    let len = text.chars().count();

    if !(MIN_CHARS..=max_chars).contains(&len) {
        return false;
    }
    if looks_like_list(text) {
        return false;
    }
    if signal_hits(text, &rules.noise_words) > MAX_NOISE_HITS {
        return false;
    }
    if rules.promo_phrases.iter().any(|p| text.contains(p.as_str())) {
        return false;
    }

    tone_requirements(text, tone, rules)
}

/// Tone-specific marker requirements.
///
/// - Casual: owner-voice markers must be present and professional-register
///   markers absent.
/// - Emotional: must not be dominated by casual markers.
/// - Professional: markers must be present, with at most one exclamation.
fn tone_requirements(text: &str, tone: Tone, rules: &StyleRules) -> bool {
    let casual = signal_hits(text, &rules.casual.signals);
    let emotional = signal_hits(text, &rules.emotional.signals);
    let professional = signal_hits(text, &rules.professional.signals);

    match tone {
        Tone::Casual => casual >= 1 && professional == 0,
        Tone::Emotional => !(casual >= 2 && casual > emotional),
        Tone::Professional => {
            professional >= 1 && text.matches('!').count() <= MAX_PROFESSIONAL_EXCLAMATIONS
        }
    }
}

/// Whether the text is structured as a numbered or bulleted list.
fn looks_like_list(text: &str) -> bool {
    text.lines().any(|line| {
        let trimmed = line.trim_start();
        let after_digits = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
        if after_digits.len() < trimmed.len()
            && (after_digits.starts_with('.') || after_digits.starts_with(')'))
        {
            return true;
        }
        trimmed.starts_with("- ") || trimmed.starts_with("* ") || trimmed.starts_with('•')
    })
}
