//! Immutable tone and style rule tables.
//!
//! The pattern sets driving the exemplar filter, the quality scorer, the tone
//! classifier, and the sanitizer live here as a single loaded-once
//! [`StyleRules`] value. The built-in tables cover the Korean shop-owner copy
//! the product generates; deployments can override them with a YAML file the
//! same way `tonepost-server` loads the rest of its configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Target stylistic register for generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tone {
    Emotional,
    Casual,
    Professional,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Emotional, Tone::Casual, Tone::Professional];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Emotional => "EMOTIONAL",
            Tone::Casual => "CASUAL",
            Tone::Professional => "PROFESSIONAL",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-tone generation constraints and classifier signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToneRules {
    /// Minimum caption length in characters.
    pub min_chars: usize,
    /// Maximum caption length in characters.
    pub max_chars: usize,
    /// Sampling temperature used for this tone's initial drafts.
    pub temperature: f32,
    /// Phrases that must not appear in copy generated for this tone.
    pub forbidden: Vec<String>,
    /// Detection signals counted by the tone classifier.
    pub signals: Vec<String>,
}

impl ToneRules {
    /// Midpoint of the configured length band, used for length-fit scoring.
    #[must_use]
    pub fn target_chars(&self) -> usize {
        usize::midpoint(self.min_chars, self.max_chars)
    }

    /// Width of the configured length band.
    #[must_use]
    pub fn band_width(&self) -> usize {
        self.max_chars.saturating_sub(self.min_chars)
    }

    /// Whether `len` falls inside the configured band (inclusive).
    #[must_use]
    pub fn contains_len(&self, len: usize) -> bool {
        (self.min_chars..=self.max_chars).contains(&len)
    }
}

/// The full style rule table, loaded once at startup and treated as
/// read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleRules {
    pub emotional: ToneRules,
    pub casual: ToneRules,
    pub professional: ToneRules,
    /// Phrases unconditionally removed from any final output.
    pub hard_blocked: Vec<String>,
    /// Additional phrases blocked only for emotional-tone output.
    pub emotional_blocked: Vec<String>,
    /// Banned clichés listed in prompts and penalized by the scorer.
    pub cliches: Vec<String>,
    /// Promotional phrasing that disqualifies exemplars outright.
    pub promo_phrases: Vec<String>,
    /// Generic stock phrases penalized by the scorer.
    pub generic_phrases: Vec<String>,
    /// Administrative/informational noise words capped in exemplars.
    pub noise_words: Vec<String>,
    /// Tokens ignored by the keyword-overlap bonus.
    pub stopwords: Vec<String>,
}

// Built-in tables. Keys are literal substrings, not regexes; matching is
// simple `contains` everywhere they are used.

const HARD_BLOCKED: &[&str] = &["최고의", "대박", "무조건", "놓치지 마세요", "100% 만족", "강추"];

const EMOTIONAL_BLOCKED: &[&str] = &["인생샷", "소확행", "갓성비", "꿀템"];

const CLICHES: &[&str] = &[
    "오늘도 화이팅",
    "많은 관심 부탁드립니다",
    "정성을 다해",
    "언제나 최선을",
    "행복한 하루 되세요",
];

const PROMO_PHRASES: &[&str] = &["할인", "세일", "이벤트", "증정", "쿠폰", "특가"];

const GENERIC_PHRASES: &[&str] = &["찾아주셔서 감사합니다", "좋은 하루 보내세요", "항상 감사드립니다"];

const NOISE_WORDS: &[&str] = &["공지", "안내", "영업시간", "휴무", "예약", "주차"];

const STOPWORDS: &[&str] = &[
    "오늘", "정말", "너무", "그리고", "하지만", "그래서", "있어요", "합니다", "해요", "이제",
    "조금", "많이", "살짝", "우리", "저희",
];

const EMOTIONAL_SIGNALS: &[&str] = &["마음", "따뜻", "감사", "행복", "설레", "뭉클", "포근", "위로", "천천히"];

const CASUAL_SIGNALS: &[&str] = &[
    "ㅎㅎ", "ㅋㅋ", "했어요", "왔어요", "봤어요", "나갔어요", "있었어요", "요즘", "진짜", "넉넉",
];

const PROFESSIONAL_SIGNALS: &[&str] = &["습니다", "입니다", "드립니다", "바랍니다", "운영", "준비되어"];

const CASUAL_FORBIDDEN: &[&str] = &["습니다", "입니다", "드립니다", "바랍니다"];

const EMOTIONAL_FORBIDDEN: &[&str] = &["ㅋㅋ", "ㅎㅎ", "존맛", "ㄹㅇ"];

const PROFESSIONAL_FORBIDDEN: &[&str] = &["ㅋㅋ", "ㅎㅎ", "짱", "개이득"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

impl StyleRules {
    /// The built-in rule table.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            emotional: ToneRules {
                min_chars: 90,
                max_chars: 140,
                temperature: 0.9,
                forbidden: owned(EMOTIONAL_FORBIDDEN),
                signals: owned(EMOTIONAL_SIGNALS),
            },
            casual: ToneRules {
                min_chars: 85,
                max_chars: 125,
                temperature: 0.65,
                forbidden: owned(CASUAL_FORBIDDEN),
                signals: owned(CASUAL_SIGNALS),
            },
            professional: ToneRules {
                min_chars: 80,
                max_chars: 120,
                temperature: 0.75,
                forbidden: owned(PROFESSIONAL_FORBIDDEN),
                signals: owned(PROFESSIONAL_SIGNALS),
            },
            hard_blocked: owned(HARD_BLOCKED),
            emotional_blocked: owned(EMOTIONAL_BLOCKED),
            cliches: owned(CLICHES),
            promo_phrases: owned(PROMO_PHRASES),
            generic_phrases: owned(GENERIC_PHRASES),
            noise_words: owned(NOISE_WORDS),
            stopwords: owned(STOPWORDS),
        }
    }

    /// Load rules from an optional YAML override, falling back to the
    /// built-in tables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the override file cannot be read, parsed, or
    /// fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let rules = match path {
            Some(p) => Self::from_yaml_file(p)?,
            None => Self::builtin(),
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Load and validate a full rule table from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or parsed.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StyleRulesIo {
            path: path.display().to_string(),
            source: e,
        })?;
        let rules: StyleRules = serde_yaml::from_str(&content)?;
        Ok(rules)
    }

    /// The per-tone rules for `tone`.
    #[must_use]
    pub fn tone(&self, tone: Tone) -> &ToneRules {
        match tone {
            Tone::Emotional => &self.emotional,
            Tone::Casual => &self.casual,
            Tone::Professional => &self.professional,
        }
    }

    /// Blocked phrases for a finished caption of the given tone: the hard
    /// set plus the emotional extras when applicable.
    #[must_use]
    pub fn blocked_for(&self, tone: Tone) -> Vec<&str> {
        let mut blocked: Vec<&str> = self.hard_blocked.iter().map(String::as_str).collect();
        if tone == Tone::Emotional {
            blocked.extend(self.emotional_blocked.iter().map(String::as_str));
        }
        blocked
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for tone in Tone::ALL {
            let rules = self.tone(tone);
            if rules.min_chars == 0 || rules.min_chars >= rules.max_chars {
                return Err(ConfigError::Validation(format!(
                    "tone {tone} has invalid length band [{}, {}]",
                    rules.min_chars, rules.max_chars
                )));
            }
            if !(0.0..=2.0).contains(&rules.temperature) {
                return Err(ConfigError::Validation(format!(
                    "tone {tone} has invalid temperature {}",
                    rules.temperature
                )));
            }
            if rules.signals.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "tone {tone} has no classifier signals"
                )));
            }
        }
        if self.hard_blocked.is_empty() {
            return Err(ConfigError::Validation(
                "hard_blocked phrase set must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
