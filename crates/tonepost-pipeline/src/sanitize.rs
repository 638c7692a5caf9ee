//! Deterministic final cleanup.
//!
//! Always applied, whatever the rewrite chain achieved. Removal runs to a
//! fixpoint so a deletion can never splice a new blocked phrase together,
//! which is what makes the no-blocked-phrase guarantee hard rather than
//! best-effort. The whole pass is idempotent.

use regex::Regex;

use tonepost_core::{StyleRules, Tone};

/// Strip blocked phrases and normalize whitespace/punctuation.
///
/// Steps, in order:
/// 1. Remove every hard-blocked phrase (plus the emotional extras for
///    emotional tone), repeating until none remains.
/// 2. Collapse runs of spaces/tabs to a single space.
/// 3. Remove spaces before punctuation.
/// 4. Collapse repeated punctuation runs.
/// 5. Trim.
#[must_use]
pub fn sanitize(caption: &str, tone: Tone, rules: &StyleRules) -> String {
    let blocked = rules.blocked_for(tone);

    let mut text = caption.to_string();
    loop {
        let before = text.len();
        for phrase in &blocked {
            text = text.replace(phrase, "");
        }
        if text.len() == before {
            break;
        }
    }

    let spaces = Regex::new(r"[ \t]{2,}").expect("valid space-run regex");
    let text = spaces.replace_all(&text, " ");

    let space_before_punct = Regex::new(r"[ \t]+([.,!?~…])").expect("valid punct-space regex");
    let text = space_before_punct.replace_all(&text, "$1");

    let punct_runs = Regex::new(r"([.,!?])\1+").expect("valid punct-run regex");
    let text = punct_runs.replace_all(&text, "$1");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> StyleRules {
        StyleRules::builtin()
    }

    #[test]
    fn removes_hard_blocked_phrases() {
        let out = sanitize("최고의 원두로 내린 커피", Tone::Professional, &rules());
        assert!(!out.contains("최고의"));
        assert_eq!(out, "원두로 내린 커피");
    }

    #[test]
    fn removes_emotional_extras_only_for_emotional_tone() {
        let input = "창가 자리는 인생샷 명당이에요";
        let emotional = sanitize(input, Tone::Emotional, &rules());
        assert!(!emotional.contains("인생샷"));
        let casual = sanitize(input, Tone::Casual, &rules());
        assert!(casual.contains("인생샷"));
    }

    #[test]
    fn removal_runs_to_a_fixpoint() {
        // Deleting the inner phrase splices the outer one together:
        // "최고" + ("대박" removed) + "의" -> "최고의", which must also go.
        let input = "최고대박의 커피";
        let out = sanitize(input, Tone::Casual, &rules());
        assert!(!out.contains("대박"));
        assert!(!out.contains("최고의"));
        assert_eq!(out, "커피");
    }

    #[test]
    fn collapses_space_runs() {
        let out = sanitize("커피가   아주  좋아요", Tone::Casual, &rules());
        assert_eq!(out, "커피가 아주 좋아요");
    }

    #[test]
    fn removes_space_before_punctuation() {
        let out = sanitize("좋은 아침이에요 . 반가워요 !", Tone::Casual, &rules());
        assert_eq!(out, "좋은 아침이에요. 반가워요!");
    }

    #[test]
    fn collapses_repeated_punctuation() {
        let out = sanitize("정말 좋아요!!! 그렇죠??", Tone::Casual, &rules());
        assert_eq!(out, "정말 좋아요! 그렇죠?");
    }

    #[test]
    fn phrase_removal_leaves_no_double_spaces() {
        let out = sanitize("오늘은 대박 손님이 많았어요", Tone::Casual, &rules());
        assert_eq!(out, "오늘은 손님이 많았어요");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "최고의 원두!!! 무조건  들러보세요 . 대박",
            "평범한 캡션이에요. 문제 없어요!",
            "  앞뒤 공백과   중복 공백 ,  그리고 인생샷  ",
            "",
        ];
        for tone in Tone::ALL {
            for input in inputs {
                let once = sanitize(input, tone, &rules());
                let twice = sanitize(&once, tone, &rules());
                assert_eq!(once, twice, "sanitize must be idempotent for {input:?} ({tone})");
            }
        }
    }

    #[test]
    fn clean_caption_passes_through_unchanged() {
        let input = "오늘부터 딸기라떼를 시작했어요. 생딸기를 넉넉하게 넣었어요.";
        assert_eq!(sanitize(input, Tone::Casual, &rules()), input);
    }

    #[test]
    fn no_blocked_phrase_survives_any_input() {
        let hostile = "최고의최고의 대박대박 무조건 놓치지 마세요 100% 만족 강추!!";
        for tone in Tone::ALL {
            let out = sanitize(hostile, tone, &rules());
            for phrase in rules().blocked_for(tone) {
                assert!(!out.contains(phrase), "{phrase:?} survived for {tone}: {out:?}");
            }
        }
    }
}
